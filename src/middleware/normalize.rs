use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::error::ApiError;

/// How failures are rendered once they reach the normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    /// Add internal error detail to fault bodies.
    pub detail: bool,
    /// Render non-validation failures as framework-style HTML pages.
    pub legacy_pages: bool,
}

impl ErrorPolicy {
    pub fn render(&self, error: &ApiError) -> Response {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!(
                code = error.error_code(),
                detail = error.detail().unwrap_or_default(),
                "{}",
                error.message()
            );
        } else {
            tracing::debug!(code = error.error_code(), "{}", error.message());
        }

        if self.legacy_pages && !matches!(error, ApiError::Validation(_)) {
            let text = match (self.detail, error.detail()) {
                (true, Some(detail)) => format!("{}\n{}", error.message(), detail),
                _ => error.message().to_string(),
            };
            return legacy_page(status, &text);
        }

        (status, Json(error.to_json(self.detail))).into_response()
    }
}

/// Turns every failure into its final response.
///
/// Errors raised by handlers and extractors arrive as an [`ApiError`] in the
/// response extensions. Bare 404/405 responses produced by the router or the
/// static file service are treated as unmatched routes.
pub async fn normalize_errors(
    State(policy): State<ErrorPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    if let Some(error) = response.extensions_mut().remove::<ApiError>() {
        return policy.render(&error);
    }

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            policy.render(&ApiError::route_not_found(&method, &path))
        }
        _ => response,
    }
}

fn legacy_page(status: StatusCode, text: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Error</title>\n</head>\n<body>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(text)
    );
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'"),
    );
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}
