use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, HttpResponse};
use futures::future::LocalBoxFuture;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::Environment;

const PREFLIGHT_MAX_AGE_SECS: usize = 86400;

#[derive(Debug, Error, PartialEq)]
pub enum CorsError {
    #[error("Not allowed by CORS")]
    NotAllowed,
}

impl CorsError {
    pub fn code(&self) -> &'static str {
        match self {
            CorsError::NotAllowed => "CORS_NOT_ALLOWED",
        }
    }

    /// GraphQL-shaped error document returned to rejected clients.
    ///
    /// ## Example JSON
    /// ```json
    /// {
    ///   "errors": [
    ///     { "message": "Not allowed by CORS", "extensions": { "code": "CORS_NOT_ALLOWED" } }
    ///   ]
    /// }
    /// ```
    pub fn to_graphql_body(&self) -> Value {
        json!({
            "errors": [{
                "message": self.to_string(),
                "extensions": { "code": self.code() }
            }]
        })
    }
}

/// # Origin Policy
///
/// Decides which cross-origin callers may reach the service.
///
/// ## Fields
/// - `environment`: Development and testing accept every origin, production
///   accepts only exact whitelist matches, any other mode is denied
/// - `whitelist`: Origins allowed in production, compared byte for byte
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    environment: Environment,
    whitelist: Vec<String>,
}

impl CorsPolicy {
    pub fn new(environment: Environment, whitelist: Vec<String>) -> Self {
        Self {
            environment,
            whitelist,
        }
    }

    /// Checks the `Origin` of a request, `None` when the header is absent.
    ///
    /// # Returns
    /// `Ok(())` when the origin may proceed, [`CorsError::NotAllowed`] otherwise.
    pub fn check_origin(&self, origin: Option<&str>) -> Result<(), CorsError> {
        match &self.environment {
            Environment::Development | Environment::Testing => Ok(()),
            Environment::Production => match origin {
                Some(origin) if self.whitelist.iter().any(|allowed| allowed == origin) => Ok(()),
                _ => Err(CorsError::NotAllowed),
            },
            Environment::Unrecognized(_) => Err(CorsError::NotAllowed),
        }
    }

    /// CORS response headers for the origins this policy admits.
    ///
    /// Handles preflights and echoes the request origin with credentials
    /// enabled. Wrap it inside a [`CorsGuard`] so rejected origins get the
    /// GraphQL error body rather than the crate's plain 400.
    ///
    /// # Returns
    /// An [`actix_cors::Cors`] middleware allowing `GET` and `POST` with the
    /// `Authorization`, `Content-Type` and `Accept` headers.
    pub fn headers(&self) -> actix_cors::Cors {
        let policy = self.clone();

        actix_cors::Cors::default()
            .allowed_origin_fn(move |origin, _head| {
                policy.check_origin(origin.to_str().ok()).is_ok()
            })
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(PREFLIGHT_MAX_AGE_SECS)
    }
}

/// Actix middleware factory rejecting requests whose origin a [`CorsPolicy`]
/// refuses.
///
/// Rejections are answered with HTTP 403 and [`CorsError::to_graphql_body`];
/// the wrapped service, GraphQL included, is never called for them.
///
/// # Example
///
/// ```rust,no_run
/// use actix_web::App;
/// use user_registration::config::Environment;
/// use user_registration::cors::{CorsGuard, CorsPolicy};
///
/// let policy = CorsPolicy::new(Environment::Production, vec!["https://app.example.com".into()]);
/// let app = App::new()
///     .wrap(policy.headers())
///     .wrap(CorsGuard::new(policy));
/// ```
pub struct CorsGuard {
    policy: Rc<CorsPolicy>,
}

impl CorsGuard {
    pub fn new(policy: CorsPolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsGuardMiddleware {
            service,
            policy: Rc::clone(&self.policy),
        }))
    }
}

pub struct CorsGuardMiddleware<S> {
    service: S,
    policy: Rc<CorsPolicy>,
}

impl<S, B> Service<ServiceRequest> for CorsGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());

        if let Err(err) = self.policy.check_origin(origin) {
            tracing::warn!(origin = origin.unwrap_or("<none>"), "rejected cross-origin request");
            let response = HttpResponse::build(StatusCode::FORBIDDEN)
                .json(err.to_graphql_body())
                .map_into_right_body();
            return Box::pin(async move { Ok(req.into_response(response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
