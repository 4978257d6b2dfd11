// Library target holds the session model, content client and persistence so
// integration tests can drive them without a terminal. The binary entry point
// (main.rs) layers the ratatui front end on top.

pub mod client;
pub mod config;
pub mod content;
pub mod session;
pub mod store;
