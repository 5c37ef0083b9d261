//! HTTP side-channel running alongside the Discord bot

mod server;

pub use server::{start_liveness_server, LivenessConfig};
