#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use orbita::api::{Credentials, HeaderIdentity, IdentityChain, IdentityResolver, Provider, RemoteIdentity};
    use orbita::error::Error;
    use orbita::libs::config::{IdentityConfig, ProviderConfig};
    use serde_json::json;
    use test_context::{test_context, AsyncTestContext};
    use tokio::net::TcpListener;

    /// Stand-in for a hosted user endpoint.
    ///
    /// `/user` accepts the token `good` with the api key `anon`; `/broken`
    /// always fails; `/numeric` answers with a numeric id.
    struct ProviderTestContext {
        base_url: String,
    }

    async fn user(headers: HeaderMap) -> axum::response::Response {
        let token = headers.get("authorization").and_then(|v| v.to_str().ok());
        let api_key = headers.get("apikey").and_then(|v| v.to_str().ok());
        match (token, api_key) {
            (Some("Bearer good"), Some("anon")) => Json(json!({"id": "user-42", "email": "ana@example.com"})).into_response(),
            (Some("Bearer good"), _) => StatusCode::FORBIDDEN.into_response(),
            _ => StatusCode::UNAUTHORIZED.into_response(),
        }
    }

    async fn broken() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn numeric() -> Json<serde_json::Value> {
        Json(json!({"sub": 7}))
    }

    impl AsyncTestContext for ProviderTestContext {
        async fn setup() -> Self {
            let app = Router::new()
                .route("/user", get(user))
                .route("/broken", get(broken))
                .route("/numeric", get(numeric));
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let address = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            ProviderTestContext {
                base_url: format!("http://{}", address),
            }
        }
    }

    impl ProviderTestContext {
        fn provider(&self, name: &str, path: &str, field: &str) -> ProviderConfig {
            ProviderConfig {
                name: name.to_string(),
                user_url: format!("{}{}", self.base_url, path),
                api_key: Some("anon".to_string()),
                user_id_field: field.to_string(),
            }
        }
    }

    #[test]
    fn test_credentials_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static(" ana "));
        headers.insert("cookie", HeaderValue::from_static("theme=dark; orbita_user_id=bob"));
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));

        let credentials = Credentials::from_headers(&headers);
        assert_eq!(credentials.user_header.as_deref(), Some("ana"));
        assert_eq!(credentials.user_cookie.as_deref(), Some("bob"));
        assert_eq!(credentials.bearer_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_credentials_ignore_blank_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("  "));
        headers.insert("cookie", HeaderValue::from_static("orbita_user_id="));
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));

        assert_eq!(Credentials::from_headers(&headers), Credentials::default());
    }

    #[tokio::test]
    async fn test_header_identity_prefers_header() {
        let provider = HeaderIdentity::new();

        let both = Credentials {
            user_header: Some("ana".to_string()),
            user_cookie: Some("bob".to_string()),
            bearer_token: None,
        };
        assert_eq!(provider.resolve(&both).await.unwrap().as_deref(), Some("ana"));

        let cookie_only = Credentials {
            user_cookie: Some("bob".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.resolve(&cookie_only).await.unwrap().as_deref(), Some("bob"));
        assert!(provider.resolve(&Credentials::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_chain_without_identity_is_unauthenticated() {
        let chain = IdentityChain::from_config(&IdentityConfig::default());
        assert!(matches!(chain.resolve(&Credentials::default()).await, Err(Error::Unauthenticated)));
        assert_eq!(chain.resolve(&Credentials::for_user("ana")).await.unwrap(), "ana");
    }

    #[tokio::test]
    async fn test_untrusted_header_is_ignored() {
        let config = IdentityConfig {
            trust_user_header: false,
            providers: Vec::new(),
        };
        let chain = IdentityChain::from_config(&config);

        assert!(chain.is_empty());
        assert!(matches!(
            chain.resolve(&Credentials::for_user("ana")).await,
            Err(Error::Unauthenticated)
        ));
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_remote_identity_accepts_valid_token(ctx: &mut ProviderTestContext) {
        let provider = RemoteIdentity::new(ctx.provider("hosted", "/user", "id"));

        let user = provider.resolve(&Credentials::bearer("good")).await.unwrap();
        assert_eq!(user.as_deref(), Some("user-42"));
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_remote_identity_rejects_bad_token(ctx: &mut ProviderTestContext) {
        let provider = RemoteIdentity::new(ctx.provider("hosted", "/user", "id"));

        assert!(provider.resolve(&Credentials::bearer("bad")).await.unwrap().is_none());
        // No token, no request
        assert!(provider.resolve(&Credentials::for_user("ana")).await.unwrap().is_none());
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_remote_identity_without_api_key_is_forbidden(ctx: &mut ProviderTestContext) {
        let mut config = ctx.provider("hosted", "/user", "id");
        config.api_key = None;
        let provider = RemoteIdentity::new(config);

        assert!(provider.resolve(&Credentials::bearer("good")).await.unwrap().is_none());
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_remote_identity_reports_failures(ctx: &mut ProviderTestContext) {
        let broken = RemoteIdentity::new(ctx.provider("broken", "/broken", "id"));
        assert!(matches!(
            broken.resolve(&Credentials::bearer("good")).await,
            Err(Error::Identity(_))
        ));

        let missing_field = RemoteIdentity::new(ctx.provider("hosted", "/user", "uid"));
        assert!(matches!(
            missing_field.resolve(&Credentials::bearer("good")).await,
            Err(Error::Identity(_))
        ));
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_remote_identity_reads_numeric_ids(ctx: &mut ProviderTestContext) {
        let provider = RemoteIdentity::new(ctx.provider("numeric", "/numeric", "sub"));
        assert_eq!(
            provider.resolve(&Credentials::bearer("any")).await.unwrap().as_deref(),
            Some("7")
        );
    }

    #[test_context(ProviderTestContext)]
    #[tokio::test]
    async fn test_chain_skips_failing_provider(ctx: &mut ProviderTestContext) {
        let chain = IdentityChain::new(vec![
            Provider::Remote(RemoteIdentity::new(ctx.provider("broken", "/broken", "id"))),
            Provider::Remote(RemoteIdentity::new(ctx.provider("hosted", "/user", "id"))),
        ]);

        assert_eq!(chain.resolve(&Credentials::bearer("good")).await.unwrap(), "user-42");
        assert!(matches!(
            chain.resolve(&Credentials::bearer("bad")).await,
            Err(Error::Unauthenticated)
        ));
    }
}
