// Connection module
// Serves a single accepted TCP connection to completion

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::handler::{RequestHandler, ResponsePolicy};
use crate::logger;

/// Serve one connection.
///
/// Keep-alive is disabled so each connection carries exactly one request;
/// the caller awaits this before accepting the next connection.
pub async fn serve_connection<P>(stream: TcpStream, peer_addr: SocketAddr, handler: Arc<RequestHandler<P>>)
where
    P: ResponsePolicy + 'static,
{
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(false);

    let service = service_fn(move |req: Request<Incoming>| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Infallible>(handler.handle(&req, Some(peer_addr)).await) }
    });

    if let Err(err) = builder.serve_connection(io, service).await {
        logger::log_connection_error(&err);
    }
}
