//! HTTP protocol layer module
//!
//! Protocol-level helpers, decoupled from how files are located on disk.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_404_response, build_416_response, build_501_response,
    build_file_response, build_html_response, build_moved_permanently, build_partial_response,
    FileHeaders,
};
