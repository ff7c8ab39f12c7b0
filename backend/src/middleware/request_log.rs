//! Request logging middleware.
//!
//! Every request is assigned a UUID `request_id`, runs inside a tracing span
//! carrying the method and path, and is logged once on completion with its
//! status and latency. The identifier is echoed in a `request-id` response
//! header and kept in task-local storage for handlers.

use std::future::Future;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

task_local! {
    static REQUEST_ID: RequestId;
}

const REQUEST_ID_HEADER: &str = "request-id";

/// Identifier attached to a single HTTP request.
///
/// # Examples
/// ```
/// use accounts::middleware::RequestId;
///
/// async fn handler() {
///     if let Some(id) = RequestId::current() {
///         println!("request id: {id}");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The identifier of the request being served, if any.
    pub fn current() -> Option<Self> {
        REQUEST_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `request_id` in scope.
    ///
    /// Task-locals are not inherited by spawned tasks; wrap the spawned
    /// future with this to keep the identifier.
    pub async fn scope<Fut>(request_id: RequestId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_ID.scope(request_id, fut).await
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Middleware logging each request and tagging the response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use accounts::RequestLog;
///
/// let app = App::new().wrap(RequestLog);
/// ```
#[derive(Clone)]
pub struct RequestLog;

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestLog`].
pub struct RequestLogMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = RequestId::generate();
        let span = info_span!(
            "http_request",
            method = %req.method(),
            path = %req.path(),
            request_id = %request_id,
        );
        let started = Instant::now();
        let fut = span.in_scope(|| self.service.call(req));

        let logged = async move {
            let result = fut.await;
            let elapsed_ms = started.elapsed().as_millis();
            match result {
                Ok(mut res) => {
                    let status = res.status();
                    if status.is_server_error() {
                        warn!(status = status.as_u16(), elapsed_ms, "request failed");
                    } else {
                        info!(status = status.as_u16(), elapsed_ms, "request completed");
                    }
                    attach_header(&mut res, request_id);
                    Ok(res)
                }
                Err(err) => {
                    error!(error = %err, elapsed_ms, "request errored before responding");
                    Err(err)
                }
            }
        }
        .instrument(span);

        Box::pin(RequestId::scope(request_id, logged))
    }
}

fn attach_header<B>(res: &mut ServiceResponse<B>, request_id: RequestId) {
    match HeaderValue::from_str(&request_id.to_string()) {
        Ok(value) => {
            res.response_mut()
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        Err(error) => {
            error!(%error, %request_id, "failed to encode request identifier header");
        }
    }
}
