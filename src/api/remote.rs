//! Bearer-token identity backed by a hosted user endpoint.
//!
//! Hosted auth services expose an endpoint that returns the user owning an
//! access token:
//!
//! ```text
//! GET {user_url}
//! Authorization: Bearer <token>
//! apikey: <project key>
//!
//! 200 {"id": "8c1f…", "email": "…", …}
//! ```
//!
//! A 401 or 403 answer means the token is not valid for this backend, so the
//! next provider gets a chance. Any other failure is an error.

use super::{Credentials, IdentityResolver};
use crate::error::{Error, Result};
use crate::libs::config::ProviderConfig;
use crate::libs::messages::Message;
use crate::msg_debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RemoteIdentity {
    config: ProviderConfig,
    client: Client,
}

impl RemoteIdentity {
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    fn user_id_from(&self, body: &Value) -> Option<String> {
        match body.get(&self.config.user_id_field)? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl IdentityResolver for RemoteIdentity {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn resolve(&self, credentials: &Credentials) -> Result<Option<String>> {
        let Some(token) = &credentials.bearer_token else {
            return Ok(None);
        };

        let mut request = self.client.get(&self.config.user_url).bearer_auth(token);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("apikey", api_key);
        }

        let response = request.send().await.map_err(|e| Error::Identity(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            msg_debug!(Message::IdentityRejected(self.config.name.clone(), status.as_u16()));
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Identity(format!("{} answered {}", self.config.user_url, status)));
        }

        let body: Value = response.json().await.map_err(|e| Error::Identity(e.to_string()))?;
        match self.user_id_from(&body) {
            Some(user_id) => Ok(Some(user_id)),
            None => Err(Error::Identity(format!(
                "response of {} has no '{}' field",
                self.config.user_url, self.config.user_id_field
            ))),
        }
    }
}
