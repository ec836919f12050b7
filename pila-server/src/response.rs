use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};
use serde::Serialize;

/// Render a JSON body with HTTP 200. Success and failure both ride in the
/// body's `status` field; the HTTP status stays 200.
pub fn json<T: Serialize>(body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut resp = Response::new(Body::from(bytes));
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }
        Err(error) => {
            tracing::error!(?error, "failed to serialize response body");
            fallback()
        }
    }
}

fn fallback() -> Response<Body> {
    let mut resp = Response::new(Body::from(
        r#"{"status":"error","message":"Internal error"}"#,
    ));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

pub fn not_found() -> Response<Body> {
    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = StatusCode::NOT_FOUND;
    resp
}
