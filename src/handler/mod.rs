//! Request handler module
//!
//! Static file serving with pluggable response policies.

pub mod policy;
pub mod router;
pub mod static_files;

// Re-export main entry points
pub use policy::{DefaultPolicy, PwaPolicy, ResponsePolicy, MANIFEST_CONTENT_TYPE};
pub use router::RequestHandler;
pub use static_files::{FileRequest, StaticFiles};
