//! Bearer token authentication middleware and the [`Identity`] extractor.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use justdo_core::ports::TokenService;

use super::error::AppError;

/// Authenticated caller, placed in request extensions by [`AuthMiddleware`].
///
/// Use this in handlers behind the middleware:
/// ```ignore
/// async fn list(identity: Identity) -> impl Responder {
///     format!("tasks of {}", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: uuid::Uuid,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().copied();
        ready(identity.ok_or_else(|| {
            // Route mounted outside the auth scope
            tracing::error!("Identity requested without AuthMiddleware");
            AppError::Unauthorized("missing token".to_string())
        }))
    }
}

/// Resolve the caller from the `Authorization` header.
///
/// Checks run in order: header present, `Bearer <token>` shape (scheme is
/// case-insensitive), token non-empty, token verifies.
pub fn authenticate(req: &HttpRequest, tokens: &dyn TokenService) -> Result<Identity, AppError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(AppError::Unauthorized("missing token".to_string()));
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed token".to_string()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized("malformed token".to_string()));
    }

    let token = parts[1];
    if token.is_empty() {
        return Err(AppError::Unauthorized("missing token".to_string()));
    }

    match tokens.verify(token) {
        Ok(claims) => Ok(Identity {
            user_id: claims.user_id,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "token rejected");
            Err(AppError::Unauthorized("invalid token".to_string()))
        }
    }
}

/// Authentication middleware factory.
pub struct AuthMiddleware {
    tokens: Arc<dyn TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<dyn TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.request(), self.tokens.as_ref()) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                tracing::warn!(path = %req.path(), reason = %err, "Request rejected");

                // Short-circuit: the wrapped service never sees the request
                let response = err.error_response();
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                Box::pin(async move { Ok(srv_response.map_into_right_body()) })
            }
        }
    }
}
