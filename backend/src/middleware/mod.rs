use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const TRACE_HEADER: &str = "x-trace-id";

pub async fn assign_trace_id(mut req: Request<Body>, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(trace_id.clone());

    let path = req.uri().path().to_string();
    let method = req.method().to_string();

    let mut res = next.run(req).await;
    if res.status().is_server_error() {
        tracing::warn!(%method, %path, %trace_id, status = res.status().as_u16(), "request failed");
    }

    res.headers_mut().insert(
        TRACE_HEADER,
        HeaderValue::from_str(&trace_id).unwrap_or(HeaderValue::from_static("invalid")),
    );
    res
}
