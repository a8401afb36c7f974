use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenManager;
use crate::error::AppError;

/// Rejects requests without a valid bearer token.
///
/// The [`TokenManager`] is taken from app data, so the middleware can be used
/// in `wrap = "AuthMiddleware"` route attributes. Verified [`Claims`] are
/// stored in the request extensions.
///
/// [`Claims`]: crate::auth::token::Claims
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match req.app_data::<web::Data<TokenManager>>() {
            Some(tokens) => tokens
                .verify_header(req.headers().get(header::AUTHORIZATION))
                .map_err(AppError::from),
            None => Err(AppError::InternalServerError(
                "TokenManager is not registered as app data".into(),
            )),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                log::debug!("rejected request to {}: {}", req.path(), app_err);
                let response = app_err.error_response().map_into_right_body();
                Box::pin(ready(Ok(req.into_response(response))))
            }
        }
    }
}
