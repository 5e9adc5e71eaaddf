use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Accept loop for an auxiliary hyper listener (the admin port).
///
/// The main API surface runs on axum; this loop only serves the small
/// operational endpoints that must stay up even when the API is degraded.
pub async fn run_http_service<S, E>(host: &str, port: u16, service: S) -> Result<(), E>
where
    S: Service<Request<Incoming>, Response = Response<BoxBody<Bytes, Infallible>>, Error = E>
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    E: From<std::io::Error> + std::error::Error + Send + Sync + 'static,
{
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(host, port, "admin listener bound");
    let service_arc = Arc::new(service);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let _ = stream.set_nodelay(true);
        let io = TokioIo::new(stream);
        let svc = service_arc.clone();

        // Hand the connection to hyper; auto-detect h1/h2 on this socket
        tokio::spawn(async move {
            if let Err(err) = Builder::new(TokioExecutor::new())
                .serve_connection(io, svc)
                .await
            {
                tracing::debug!(%peer_addr, "admin connection closed with error: {err}");
            }
        });
    }
}

/// Plain-text response carrying the canonical reason phrase for a status.
pub fn make_error_response(status: StatusCode) -> Response<Bytes> {
    let text = status.canonical_reason().unwrap_or("error");
    let mut response = Response::new(Bytes::from(format!("{text}\n")));
    *response.status_mut() = status;
    response
}

/// Boxed-body variant of [`make_error_response`] for hyper `Service` impls.
pub fn make_boxed_error_response(status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    let (parts, body) = make_error_response(status).into_parts();
    Response::from_parts(parts, Full::new(body).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_carries_reason_phrase() {
        let response = make_error_response(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_ref(), b"Not Found\n");
    }

    #[test]
    fn test_boxed_error_response_status() {
        let response = make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
