use std::sync::{Arc, OnceLock};

use actix_web::HttpRequest;
use actix_web::http::header::{self, HeaderMap};

use crate::auth::{AuthError, TokenService};
use crate::cache::CacheClient;

/// Values handed to every resolver of a single request.
///
/// Built by the GraphQL handler and dropped when the request completes,
/// which also releases this request's share of the cache client.
#[derive(Clone)]
pub struct RequestContext {
    pub cache: CacheClient,
    /// Externally visible base URL, e.g. `https://api.example.com`.
    pub url: String,
    /// Raw `Authorization` header value.
    pub token: Option<String>,
    /// Address of the connected peer. Forwarding headers are not trusted.
    pub client_ip: Option<String>,
    pub headers: HeaderMap,
    identity: Arc<OnceLock<Result<String, AuthError>>>,
}

impl RequestContext {
    pub fn from_request(req: &HttpRequest, cache: CacheClient) -> Self {
        let info = req.connection_info();

        Self {
            cache,
            url: format!("{}://{}", info.scheme(), info.host()),
            token: req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            client_ip: req.peer_addr().map(|addr| addr.ip().to_string()),
            headers: req.headers().clone(),
            identity: Arc::default(),
        }
    }

    /// Id of the user the bearer token belongs to. Verified on first call,
    /// later calls return the same outcome.
    pub fn user_id(&self, tokens: &TokenService) -> Result<String, AuthError> {
        self.identity
            .get_or_init(|| {
                let token = self.bearer_token().ok_or(AuthError::MissingToken)?;
                tokens.verify(token).map(|claims| claims.sub)
            })
            .clone()
    }

    /// Token with the `Bearer ` scheme stripped.
    pub fn bearer_token(&self) -> Option<&str> {
        let raw = self.token.as_deref()?.trim_start();
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        (!token.is_empty()).then_some(token)
    }
}
