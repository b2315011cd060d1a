//! Request/response logging middleware.
//!
//! Buffers both bodies so the handler and the client still see them intact,
//! then emits a single `tracing` event per request. Request bodies over
//! [`MAX_BUFFERED_BODY`] are refused with 413 before reaching any handler.

use actix_web::{
    Error, HttpMessage, ResponseError,
    body::{BoxBody, MessageBody, to_bytes},
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::ErrorInternalServerError,
    http::header::{self, HeaderMap},
    web::{Bytes, BytesMut},
};
use futures::StreamExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::time::Instant;

use super::error::AppError;

/// Largest request body accepted by the server.
pub const MAX_BUFFERED_BODY: usize = 64 * 1024;

/// Bodies longer than this are truncated in the log entry.
const MAX_LOGGED_BODY: usize = 4096;

const REDACTED: &str = "[REDACTED]";

/// JSON fields whose values never reach the logs.
const SECRET_FIELDS: &[&str] = &["password", "token"];

/// Middleware that logs method, path, headers, bodies, status and latency.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = RequestLoggerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let started = Instant::now();
            let method = req.method().to_string();
            let path = req.path().to_string();
            let headers = redact_headers(req.headers());
            let is_json = is_json(req.content_type());

            let declared_len = req
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared_len.is_some_and(|len| len > MAX_BUFFERED_BODY) {
                return Ok(reject_oversized(req, &method, &path));
            }

            // Drain the payload, then hand an identical copy to the handler
            let mut payload = req.take_payload();
            let mut buf = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk?;
                if buf.len() + chunk.len() > MAX_BUFFERED_BODY {
                    return Ok(reject_oversized(req, &method, &path));
                }
                buf.extend_from_slice(&chunk);
            }
            let request_body = buf.freeze();
            req.set_payload(Payload::from(request_body.clone()));

            let res = match service.call(req).await {
                Ok(res) => res,
                Err(err) => {
                    tracing::warn!(
                        method = %method,
                        path = %path,
                        error = %err,
                        latency_ms = started.elapsed().as_millis() as u64,
                        "request failed"
                    );
                    return Err(err);
                }
            };

            let status = res.status();
            let (http_req, http_res) = res.into_parts();
            let response_is_json = http_res
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with("application/json"));
            let (http_res, body) = http_res.into_parts();
            let response_body = to_bytes(body).await.map_err(body_error)?;

            tracing::info!(
                method = %method,
                path = %path,
                headers = ?headers,
                request_body = %render_body(&request_body, is_json),
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                response_body = %render_body(&response_body, response_is_json),
                "request completed"
            );

            let http_res = http_res.set_body(response_body).map_into_boxed_body();
            Ok(ServiceResponse::new(http_req, http_res))
        })
    }
}

fn reject_oversized(req: ServiceRequest, method: &str, path: &str) -> ServiceResponse<BoxBody> {
    tracing::warn!(
        method = %method,
        path = %path,
        limit = MAX_BUFFERED_BODY,
        "request body too large"
    );
    let err = AppError::PayloadTooLarge(format!(
        "request body exceeds {MAX_BUFFERED_BODY} bytes"
    ));
    req.into_response(err.error_response())
}

fn body_error<E: Into<Box<dyn std::error::Error>>>(err: E) -> Error {
    let err: Box<dyn std::error::Error> = err.into();
    ErrorInternalServerError(err.to_string())
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json")
}

fn redact_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == header::AUTHORIZATION || name == header::COOKIE {
                REDACTED.to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}

/// Text form of a body for the log entry, secrets masked.
fn render_body(body: &Bytes, json: bool) -> String {
    if body.is_empty() {
        return String::new();
    }

    let text = match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            mask_secrets(&mut value);
            value.to_string()
        }
        // Unparseable JSON may still carry a password
        Err(_) if json => REDACTED.to_string(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };

    truncate(text)
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.to_ascii_lowercase().as_str()) {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    mask_secrets(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_LOGGED_BODY {
        let mut cut = MAX_LOGGED_BODY;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
