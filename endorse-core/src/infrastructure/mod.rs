pub mod config;
pub mod keys;
pub mod logging;
pub mod retry;
pub mod transport;
