// Server module entry point
// Process startup, listener binding, the accept loop and shutdown

pub mod browser;
pub mod connection;
pub mod listener;
pub mod signal;
pub mod startup;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::bind_listener;
pub use server_loop::PwaServer;
