use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::auth::USER_HEADER;

/// One info line per request, tagged with the calling user
pub async fn log_request(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user = req
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        user = user.as_deref().unwrap_or("-"),
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    response
}
