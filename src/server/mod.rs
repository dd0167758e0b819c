// Server module entry point
// Listener setup, per-connection serving, accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

pub use listener::create_reusable_listener;
pub use serve::run;
pub use signal::ShutdownSignal;
