//! Caller identity resolution.
//!
//! Every API operation runs on behalf of one user. The HTTP layer extracts
//! [`Credentials`] from the request and hands them to an [`IdentityChain`],
//! which asks each configured provider in turn:
//!
//! - [`header::HeaderIdentity`]: trusts an `x-user-id` header or an
//!   `orbita_user_id` cookie set by a gateway in front of the API
//! - [`remote::RemoteIdentity`]: exchanges a bearer token for a user id at a
//!   hosted user endpoint (one provider per configured backend)
//!
//! The first provider that recognises the caller wins. A provider that fails
//! (network error, unexpected response) is logged and skipped; if nobody
//! recognises the caller the request is unauthenticated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orbita::api::{Credentials, IdentityChain};
//! use orbita::libs::config::IdentityConfig;
//!
//! # async fn run() -> orbita::error::Result<()> {
//! let chain = IdentityChain::from_config(&IdentityConfig::default());
//! let user_id = chain.resolve(&Credentials::for_user("ana")).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::libs::config::IdentityConfig;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

pub mod header;
pub mod remote;

pub use header::HeaderIdentity;
pub use remote::RemoteIdentity;

/// Header carrying a caller id asserted by a trusted gateway.
pub const USER_HEADER: &str = "x-user-id";

/// Cookie carrying a caller id asserted by a trusted gateway.
pub const USER_COOKIE: &str = "orbita_user_id";

/// Everything a request offers to prove who is calling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_header: Option<String>,
    pub user_cookie: Option<String>,
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_header = headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let user_cookie = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookies| cookie_value(cookies, USER_COOKIE));

        let bearer_token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Self {
            user_header,
            user_cookie,
            bearer_token,
        }
    }

    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_header: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    pub fn bearer(token: &str) -> Self {
        Self {
            bearer_token: Some(token.to_string()),
            ..Default::default()
        }
    }
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Turns credentials into a user id.
///
/// `Ok(None)` means the provider does not recognise the caller; errors are
/// reserved for providers that could not give an answer at all.
#[allow(async_fn_in_trait)]
pub trait IdentityResolver {
    fn name(&self) -> &str;

    async fn resolve(&self, credentials: &Credentials) -> Result<Option<String>>;
}

pub enum Provider {
    Header(HeaderIdentity),
    Remote(RemoteIdentity),
}

impl IdentityResolver for Provider {
    fn name(&self) -> &str {
        match self {
            Provider::Header(provider) => provider.name(),
            Provider::Remote(provider) => provider.name(),
        }
    }

    async fn resolve(&self, credentials: &Credentials) -> Result<Option<String>> {
        match self {
            Provider::Header(provider) => provider.resolve(credentials).await,
            Provider::Remote(provider) => provider.resolve(credentials).await,
        }
    }
}

/// Ordered list of identity providers.
pub struct IdentityChain {
    providers: Vec<Provider>,
}

impl IdentityChain {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Header provider first (when trusted), then the remote providers in
    /// configuration order.
    pub fn from_config(config: &IdentityConfig) -> Self {
        let mut providers = Vec::new();
        if config.trust_user_header {
            providers.push(Provider::Header(HeaderIdentity::new()));
        }
        for provider in &config.providers {
            providers.push(Provider::Remote(RemoteIdentity::new(provider.clone())));
        }
        Self::new(providers)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The caller's user id, or `Unauthenticated` when no provider recognises them.
    pub async fn resolve(&self, credentials: &Credentials) -> Result<String> {
        for provider in &self.providers {
            match provider.resolve(credentials).await {
                Ok(Some(user_id)) => {
                    msg_debug!(Message::IdentityResolved(provider.name().to_string(), user_id.clone()));
                    return Ok(user_id);
                }
                Ok(None) => {}
                Err(e) => {
                    msg_warning!(Message::IdentityProviderFailed(provider.name().to_string(), e.to_string()));
                }
            }
        }
        Err(Error::Unauthenticated)
    }
}
