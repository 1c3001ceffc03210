// Browser launch module

/// Open `url` in the default browser.
///
/// Best-effort: callers are expected to discard the result.
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    webbrowser::open(url)
}
