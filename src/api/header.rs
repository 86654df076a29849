use super::{Credentials, IdentityResolver};
use crate::error::Result;

/// Accepts the caller id a trusted gateway put in a header or cookie.
/// The header wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct HeaderIdentity;

impl HeaderIdentity {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityResolver for HeaderIdentity {
    fn name(&self) -> &str {
        "header"
    }

    async fn resolve(&self, credentials: &Credentials) -> Result<Option<String>> {
        Ok(credentials.user_header.clone().or_else(|| credentials.user_cookie.clone()))
    }
}
