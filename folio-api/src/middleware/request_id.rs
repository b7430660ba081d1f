/// Request-id middleware
///
/// Every request gets a fresh UUID, attached to the request extensions for
/// handlers that want it and echoed back in the `Request-Id` response
/// header so clients can reference a specific request in bug reports.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Per-request identifier available from the request extensions
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    request.extensions_mut().insert(RequestId(id));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert("Request-Id", value);
    }

    response
}
