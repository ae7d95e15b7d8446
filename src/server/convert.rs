//! Translation between axum requests/responses and the dispatch protocol.

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use tracing::warn;

use crate::error::DispatchError;
use crate::protocol::{cookie_value, HttpRequest, HttpResponse, Method};

fn invalid_body(e: impl std::fmt::Display) -> DispatchError {
    DispatchError::Server {
        message: format!("Invalid request body: {}", e),
    }
}

/// Read an axum request into an [`HttpRequest`].
///
/// Query parameters come first, then url-encoded or multipart form fields.
/// Multipart parts with a file name become uploads. Other bodies are ignored.
pub async fn read_request(
    request: Request,
    cookie_name: &str,
    max_body_bytes: usize,
) -> Result<HttpRequest, DispatchError> {
    let (parts, body) = request.into_parts();

    let mut converted = HttpRequest::new(Method::parse(parts.method.as_str()), parts.uri.path());
    if let Some(query) = parts.uri.query() {
        converted = converted.with_query(query);
    }
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            converted = converted.with_header(name.as_str(), value);
        }
    }

    let session_id = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name));
    if let Some(session_id) = session_id {
        converted = converted.with_session_id(session_id);
    }

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let request = Request::from_parts(parts, body);
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(invalid_body)?;

        while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(invalid_body)?;

            converted = match file_name {
                Some(file_name) => converted.with_upload(name, file_name, bytes.to_vec()),
                None => converted.with_param(name, String::from_utf8_lossy(&bytes).into_owned()),
            };
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let bytes = to_bytes(body, max_body_bytes)
            .await
            .map_err(invalid_body)?;
        converted = converted.with_form_body(&bytes);
    }

    Ok(converted)
}

/// Convert a committed [`HttpResponse`] into an axum response.
///
/// Headers that cannot be represented on the wire are dropped with a warning.
pub fn into_axum_response(response: HttpResponse) -> Response {
    let (status, headers, body) = response.into_parts();

    let mut converted = Response::new(Body::from(body));
    *converted.status_mut() = status;

    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            (Ok(name), Ok(value)) => {
                converted.headers_mut().append(name, value);
            }
            _ => warn!(header = %name, "Dropping header that is not valid on the wire"),
        }
    }

    converted
}
