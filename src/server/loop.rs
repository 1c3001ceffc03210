// Server loop module
// Binds the PWA server and runs the sequential accept loop until shutdown

use std::error::Error;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::serve_connection;
use super::listener::bind_listener;
use crate::config::Config;
use crate::handler::{PwaPolicy, RequestHandler, ResponsePolicy, StaticFiles};
use crate::logger;

/// A bound server that has not started accepting yet.
///
/// [`PwaServer::serve`] consumes it, so a server is serving at most once and
/// its socket is closed when serving ends.
pub struct PwaServer<P> {
    listener: TcpListener,
    handler: Arc<RequestHandler<P>>,
}

impl PwaServer<PwaPolicy> {
    /// Bind the configured address and serve `root` with the PWA policy
    pub fn bind(config: &Config, root: PathBuf) -> Result<Self, Box<dyn Error>> {
        let addr = config.get_socket_addr()?;
        let listener = bind_listener(addr, config.server.reuse_address)?;

        let files = StaticFiles::new(
            root,
            config.http.index_files.clone(),
            config.http.directory_listing,
        );
        let handler = RequestHandler::new(files, PwaPolicy, &config.http, &config.logging);
        Ok(Self::new(listener, handler))
    }
}

impl<P: ResponsePolicy + 'static> PwaServer<P> {
    pub fn new(listener: TcpListener, handler: RequestHandler<P>) -> Self {
        Self {
            listener,
            handler: Arc::new(handler),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections one at a time until `shutdown` resolves.
    ///
    /// A shutdown interrupts whatever connection is in flight. The listener is
    /// dropped before this returns.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Self { listener, handler } = self;

        tokio::select! {
            () = accept_loop(&listener, &handler) => {}
            () = shutdown => {}
        }

        drop(listener);
    }
}

async fn accept_loop<P: ResponsePolicy + 'static>(listener: &TcpListener, handler: &Arc<RequestHandler<P>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                serve_connection(stream, peer_addr, Arc::clone(handler)).await;
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}
