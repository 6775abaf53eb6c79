use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use genmetr_core::HttpMetrics;

/// Standard methods pass through; anything else collapses to `OTHER` so a
/// client cannot mint new series by inventing methods.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "OTHER",
    }
}

/// axum middleware (`from_fn_with_state`) recording every request.
///
/// The route label is the matched template (`/users/:id`), taken from
/// `MatchedPath`. Requests that hit the fallback have no template and are
/// recorded under the configured unmatched label. If the inner service
/// panics or the request future is dropped, the guard records a 500.
pub async fn track_http_metrics(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = method_label(request.method());
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| metrics.unmatched_route().to_owned());

    let guard = metrics.start(method, &route);
    let response = next.run(request).await;
    guard.finish(response.status().as_u16());

    response
}
