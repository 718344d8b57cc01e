use crate::messages;
use crate::registry::Registry;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use phonebook_core::{BatchPayload, PersonInput};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;


const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/getAll", get(get_all))
        .route("/addOne", post(add_one))
        .route("/addMany", post(add_many))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(allow_any_origin))
        .with_state(registry)
}

async fn get_all(State(registry): State<Arc<Registry>>) -> Response {
    match registry.list_phones().await {
        Ok(phones) => phones.join(" ").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, messages::ERROR_RECORDED).into_response(),
    }
}

async fn add_one(
    State(registry): State<Arc<Registry>>,
    body: Result<PersonBody, BodyRejected>,
) -> &'static str {
    let input = match body {
        Ok(PersonBody(input)) => input,
        Err(rejected) => {
            debug!(reason = %rejected, "addOne body rejected");
            return messages::INVALID_FORMAT;
        }
    };
    let reply = registry.add_one(&input).await;
    debug!(outcome = reply.outcome(), "addOne handled");
    reply.message()
}

async fn add_many(
    State(registry): State<Arc<Registry>>,
    body: Result<Bytes, BytesRejection>,
) -> String {
    let parsed = body
        .map_err(|err| err.body_text())
        .and_then(|raw| BatchPayload::from_slice(&raw).map_err(|err| err.to_string()));
    let payload = match parsed {
        Ok(payload) => payload,
        Err(reason) => {
            debug!(%reason, "addMany body rejected");
            return messages::INVALID_FORMAT.to_string();
        }
    };
    let reply = registry.add_many(&payload).await;
    debug!(outcome = reply.outcome(), "addMany handled");
    reply.message().into_owned()
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz(State(registry): State<Arc<Registry>>) -> (StatusCode, Json<Health>) {
    match registry.list_phones().await {
        Ok(_) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Health {
                status: "unavailable",
            }),
        ),
    }
}

/// A single entry posted as an urlencoded form, or as JSON under any other
/// content type.
pub struct PersonBody(pub PersonInput);

/// Why a body could not be read as an entry. Never shown to the client.
#[derive(Debug)]
pub struct BodyRejected(String);

impl fmt::Display for BodyRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl IntoResponse for BodyRejected {
    fn into_response(self) -> Response {
        messages::INVALID_FORMAT.into_response()
    }
}

#[async_trait]
impl<S> FromRequest<S> for PersonBody
where
    S: Send + Sync,
{
    type Rejection = BodyRejected;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(input) = Form::<PersonInput>::from_request(req, state)
                .await
                .map_err(|err| BodyRejected(err.body_text()))?;
            return Ok(Self(input));
        }
        let raw = Bytes::from_request(req, state)
            .await
            .map_err(|err| BodyRejected(err.body_text()))?;
        serde_json::from_slice(&raw)
            .map(Self)
            .map_err(|err| BodyRejected(err.to_string()))
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Any origin may call the service; preflight requests are answered here.
async fn allow_any_origin(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let requested_headers = request
            .headers()
            .get("access-control-request-headers")
            .cloned();
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        if let Some(requested) = requested_headers {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested);
        }
        return response;
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
