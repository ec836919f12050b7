use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::future::BoxFuture;
use http_body::Limited;
use hyper::{Body, Request, Response};
use pila_types::response::{ApiResponse, PopMessage};
use tower::Service;
use tracing::info;

use crate::core::Core;
use crate::error::{Error, ErrorType};
use crate::response;

/// Lease duration applied when the `timeout` field is absent or does not
/// parse as an integer.
const DEFAULT_POP_TIMEOUT_SECS: i64 = 300;

/// Routes the four task-stack endpoints to the engine.
#[derive(Clone)]
pub struct RouterService {
    core: Arc<Core>,
}

impl RouterService {
    #[must_use]
    pub fn new(core: Arc<Core>) -> Self {
        Self { core }
    }
}

impl Service<Request<Limited<Body>>> for RouterService {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Limited<Body>>) -> Self::Future {
        let core = Arc::clone(&self.core);
        Box::pin(async move { Ok(handle(core, req).await) })
    }
}

async fn handle(core: Arc<Core>, req: Request<Limited<Body>>) -> Response<Body> {
    info!(method = %req.method(), uri = %req.uri(), "request");

    match req.uri().path().trim_end_matches('/') {
        "/push" => push(core, req).await,
        "/pop" => pop(core, req).await,
        "/confirm" => confirm(core, req).await,
        "/status" => status(core).await,
        _ => response::not_found(),
    }
}

async fn push(core: Arc<Core>, req: Request<Limited<Body>>) -> Response<Body> {
    let params = match Params::read(req).await {
        Ok(params) => params,
        Err(resp) => return resp,
    };
    let data = params.value("data").to_owned();
    if data.is_empty() {
        return response::json(&ApiResponse::error("data is empty"));
    }

    match blocking(move || core.push(data.as_bytes())).await {
        Ok(()) => response::json(&ApiResponse::ok_empty()),
        Err(error) => response::json(&ApiResponse::error(error)),
    }
}

async fn pop(core: Arc<Core>, req: Request<Limited<Body>>) -> Response<Body> {
    let params = match Params::read(req).await {
        Ok(params) => params,
        Err(resp) => return resp,
    };
    let timeout = params
        .value("timeout")
        .parse::<i64>()
        .unwrap_or(DEFAULT_POP_TIMEOUT_SECS);

    match blocking(move || core.pop(timeout)).await {
        Ok(task) => {
            let message = PopMessage {
                key: task.key.map(|k| k.into_string()).unwrap_or_default(),
                value: BASE64.encode(&task.value),
            };
            match serde_json::to_value(&message) {
                Ok(message) => response::json(&ApiResponse::ok(message)),
                Err(error) => response::json(&ApiResponse::error(error)),
            }
        }
        Err(error) => response::json(&ApiResponse::error(error)),
    }
}

async fn confirm(core: Arc<Core>, req: Request<Limited<Body>>) -> Response<Body> {
    let params = match Params::read(req).await {
        Ok(params) => params,
        Err(resp) => return resp,
    };
    let key = params.value("key").to_owned();
    if key.is_empty() {
        return response::json(&ApiResponse::error("empty key"));
    }

    match blocking(move || core.confirm(&key)).await {
        Ok(()) => response::json(&ApiResponse::ok_empty()),
        Err(error) => response::json(&ApiResponse::error(error)),
    }
}

async fn status(core: Arc<Core>) -> Response<Body> {
    match blocking(move || core.status()).await {
        // advisory counts ride without the status envelope
        Ok(status) => response::json(&status),
        Err(error) => response::json(&ApiResponse::error(error)),
    }
}

/// Run an engine call on the blocking thread pool; storage work may touch
/// disk.
async fn blocking<T, F>(f: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(error) => Err(ErrorType::InternalError(error.into()).into()),
    }
}

/// Request fields, merged from the form body and the query string. Body
/// fields win, mirroring standard form handling.
struct Params(Vec<(String, String)>);

impl Params {
    async fn read(req: Request<Limited<Body>>) -> Result<Self, Response<Body>> {
        let (parts, body) = req.into_parts();

        let mut pairs = match hyper::body::to_bytes(body).await {
            Ok(bytes) => serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
                .unwrap_or_default(),
            Err(error) => {
                return Err(response::json(&ApiResponse::error(format!(
                    "failed to read request body: {error}"
                ))));
            }
        };
        if let Some(query) = parts.uri.query() {
            if let Ok(query_pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
                pairs.extend(query_pairs);
            }
        }

        Ok(Self(pairs))
    }

    /// First value for `name`, whitespace-trimmed; `""` when absent.
    fn value(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map_or("", |(_, value)| value.trim())
    }
}
