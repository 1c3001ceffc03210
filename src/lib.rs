//! Local developer tooling for a progressive web app: a static file server
//! with PWA-friendly headers and a PNG icon generator.

pub mod config;
pub mod handler;
pub mod http;
pub mod icon;
pub mod logger;
pub mod server;
