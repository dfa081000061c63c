use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use opendesk::StaffContext;
use std::sync::Arc;

/// Pull an API key from `x-api-key` or `Authorization: Bearer <key>`.
fn api_key_from_headers(request: &Request) -> Option<String> {
    request
        .headers()
        .get("x-api-key")
        .or_else(|| request.headers().get(AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).to_string())
}

/// Staff authentication middleware for administrative routes.
///
/// Authenticates the key and rate-limits it; per-endpoint privilege levels
/// are checked by the handlers against the injected [`StaffContext`].
pub async fn staff_auth(
    state: axum::extract::State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(key) = api_key_from_headers(&request) else {
        return Err(ServerError::Authentication(
            "Staff API key required. Provide it in 'X-API-Key' or 'Authorization: Bearer <key>' header"
                .to_string(),
        ));
    };

    let Some(level) = state.staff_level(&key) else {
        return Err(ServerError::Authentication("Invalid API key".to_string()));
    };

    if !state.check_rate_limit(&key) {
        return Err(ServerError::RateLimitExceeded);
    }

    request.extensions_mut().insert(StaffContext::staff(level));
    Ok(next.run(request).await)
}

/// Staff resolution middleware for public routes.
///
/// Never rejects: a missing or unknown key resolves to an anonymous
/// [`StaffContext`], so public flows can still recognize staff callers.
pub async fn resolve_staff(
    state: axum::extract::State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = api_key_from_headers(&request)
        .and_then(|key| state.staff_level(&key))
        .map(StaffContext::staff)
        .unwrap_or_else(StaffContext::anonymous);

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Generate or extract request ID
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Add to request extensions for handlers to access
    request.extensions_mut().insert(RequestId(request_id.clone()));

    // Process request
    let mut response = next.run(request).await;

    // Add request ID to response headers
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Request ID carried through request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    metrics::counter!(
        "opendesk_http_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("opendesk_http_request_duration_seconds")
        .record(duration.as_secs_f64());

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}
