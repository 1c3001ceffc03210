// Listener module
// Creates the TCP listener with explicit socket options

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is only set when `reuse_address` is true; otherwise the
/// platform default applies and binding a port that is still in use fails.
///
/// Must be called from within a Tokio runtime.
pub fn bind_listener(addr: std::net::SocketAddr, reuse_address: bool) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    if reuse_address {
        socket.set_reuse_address(true)?;
    }

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
