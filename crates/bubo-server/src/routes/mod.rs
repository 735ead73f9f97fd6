//! HTTP Routes
//!
//! - `POST /ask` - forward a message to the agent
//! - `GET /health` - static integration descriptor

pub mod ask;
pub mod health;
