//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233): `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.

/// Resolved inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[cfg(test)]
    pub const fn byte_count(self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    Satisfiable(ByteRange),
    /// Start beyond the end of the file or zero-length suffix - answer 416
    NotSatisfiable,
    /// No Range header, other unit, multi-range or malformed - serve the full body
    Ignored,
}

/// Parse HTTP Range header against a file of `file_size` bytes
///
/// # Examples
/// ```
/// use pwa_devtools::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Satisfiable(ByteRange { start: 0, end: 99 }));
///
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::Ignored);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::Ignored;
    };

    if spec.contains(',') {
        return RangeParseResult::Ignored;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::Ignored;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        suffix_range(last, file_size)
    } else {
        bounded_range(first, last, file_size)
    }
}

/// `-500`: the last 500 bytes (whole file when larger)
fn suffix_range(suffix: &str, file_size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Satisfiable(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// `100-` or `100-199`; the end is clamped to the last byte
fn bounded_range(first: &str, last: &str, file_size: usize) -> RangeParseResult {
    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        file_size - 1
    } else {
        match last.parse::<usize>() {
            Ok(e) if e < start => return RangeParseResult::Ignored,
            Ok(e) => e.min(file_size - 1),
            Err(_) => return RangeParseResult::Ignored,
        }
    };

    RangeParseResult::Satisfiable(ByteRange { start, end })
}
