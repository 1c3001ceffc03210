// Startup module
// One-time process setup performed before the listener is bound

use std::io;
use std::path::Path;

use crate::logger;

/// Change the working directory to the served root, so relative paths resolve
/// the same no matter where the server was launched from.
pub fn enter_root(root: &Path) -> io::Result<()> {
    std::env::set_current_dir(root).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("cannot enter server root '{}': {e}", root.display()),
        )
    })
}

/// Switch the Windows console to UTF-8 output so emoji in the banner render.
///
/// Best-effort; failure only degrades how the console displays output.
#[cfg(windows)]
#[allow(unsafe_code)]
pub fn init_console() {
    use windows::Win32::Globalization::CP_UTF8;
    use windows::Win32::System::Console::SetConsoleOutputCP;

    // SAFETY: no pointers involved; the call only changes the console code page.
    if let Err(e) = unsafe { SetConsoleOutputCP(CP_UTF8) } {
        logger::log_warning(&format!("Could not switch console to UTF-8: {e}"));
    }
}

/// Rust writes UTF-8 to the terminal on every other platform
#[cfg(not(windows))]
pub const fn init_console() {}

/// Connection instructions printed once the listener is bound
pub fn banner_lines(port: u16) -> Vec<String> {
    vec![
        "🚀 Smart Scheduler PWA Server running at:".to_string(),
        format!("   http://localhost:{port}"),
        format!("   http://127.0.0.1:{port}"),
        String::new(),
        "📱 To test on mobile:".to_string(),
        "   1. Connect mobile to same WiFi".to_string(),
        "   2. Find your computer's IP address".to_string(),
        format!("   3. Open http://YOUR_IP:{port} on mobile"),
        String::new(),
        "🔧 Features to test:".to_string(),
        "   • Install prompt on mobile".to_string(),
        "   • Offline functionality".to_string(),
        "   • Voice input".to_string(),
        "   • Gmail invitations".to_string(),
        String::new(),
        "Press Ctrl+C to stop the server".to_string(),
    ]
}

pub fn print_banner(port: u16) {
    for line in banner_lines(port) {
        logger::log_info(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_uses_port() {
        let lines = banner_lines(8000);
        assert!(lines.contains(&"   http://localhost:8000".to_string()));
        assert!(lines.contains(&"   http://127.0.0.1:8000".to_string()));
        assert!(lines.contains(&"   3. Open http://YOUR_IP:8000 on mobile".to_string()));
        assert_eq!(lines.last().unwrap(), "Press Ctrl+C to stop the server");
    }

    #[test]
    fn test_enter_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = enter_root(&dir.path().join("does-not-exist")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
