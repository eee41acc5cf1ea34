//! Request middleware

use crate::auth::identity::bearer_token;
use crate::server::state::AppState;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http::Method, web};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Appends an audit row for every mutating API request.
///
/// The caller id comes from the bearer token alone (no store round-trip);
/// audit writes are best-effort and never fail the audited request.
pub struct AuditLogger;

impl<S, B> Transform<S, ServiceRequest> for AuditLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuditLoggerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuditLoggerService { service }))
    }
}

pub struct AuditLoggerService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuditLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_mutation = matches!(
            *req.method(),
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        ) && req.path().starts_with("/api");

        if !is_mutation {
            return Box::pin(self.service.call(req));
        }

        let action = format!("{} {}", req.method(), req.path());
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_string);
        let user_id = caller_id(&req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            if let Some(state) = state {
                state
                    .storage
                    .database
                    .record_audit(user_id, &action, None, None, ip.as_deref())
                    .await;
            }
            Ok(res)
        })
    }
}

/// Caller id from the bearer token, when one verifies
fn caller_id(req: &ServiceRequest) -> Option<Uuid> {
    let state = req.app_data::<web::Data<AppState>>()?;
    let token = bearer_token(req.headers()).ok()?;
    state.auth.jwt().verify(&token).ok().map(|claims| claims.sub)
}
