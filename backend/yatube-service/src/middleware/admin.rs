use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

use crate::error::AppError;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Requires `X-Admin-Token` to match the configured token.
/// With no token configured every request passes.
#[derive(Clone)]
pub struct AdminTokenGuard {
    token: Option<Arc<str>>,
}

impl AdminTokenGuard {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminTokenGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminTokenGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminTokenGuardService {
            service: Rc::new(service),
            token: self.token.clone(),
        }))
    }
}

pub struct AdminTokenGuardService<S> {
    service: Rc<S>,
    token: Option<Arc<str>>,
}

impl<S, B> Service<ServiceRequest> for AdminTokenGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let expected = self.token.clone();

        Box::pin(async move {
            if let Some(expected) = expected {
                let provided = req
                    .headers()
                    .get(ADMIN_TOKEN_HEADER)
                    .and_then(|h| h.to_str().ok());

                if provided != Some(expected.as_ref()) {
                    warn!(path = %req.path(), "Rejected operational request without valid admin token");
                    return Err(AppError::forbidden("admin token required").into());
                }
            }

            service.call(req).await
        })
    }
}
