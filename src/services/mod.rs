// Services module - Business logic

pub mod access_gate;
pub mod bootstrap;
pub mod credentials;
pub mod stats;
