//! Token endpoint processor.
//!
//! Authenticates the client, dispatches on `grant_type`, validates the
//! grant-specific preconditions, and assembles the token response. Each
//! grant resolves to the same shape (subject, effective grant type, scope)
//! before minting, so the response assembly is shared.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::EndpointConfig;
use crate::oauth::client_auth::authenticate_client;
use crate::oauth::token::{AccessTokenResponse, TokenEndpointError, TokenError};
use crate::params::RequestParams;
use crate::scope::{Scope, check_client_scope, check_requested_scope, contains_openid, parse_scope_list};
use crate::storage::{AuthorizationStore, ClientStore, UserStore};
use crate::token::issuer::TokenIssuer;
use crate::types::{Client, GrantType};

/// Token endpoint service.
pub struct TokenService {
    client_store: Arc<dyn ClientStore>,
    authorization_store: Arc<dyn AuthorizationStore>,
    user_store: Arc<dyn UserStore>,
    issuer: Arc<dyn TokenIssuer>,
    config: EndpointConfig,
}

/// A validated grant, normalized across the grant types.
struct ResolvedGrant {
    subject: Option<String>,
    effective_grant: GrantType,
    scope: Vec<Scope>,
    mint_id_token: bool,
    nonce: Option<String>,
    code: Option<String>,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        authorization_store: Arc<dyn AuthorizationStore>,
        user_store: Arc<dyn UserStore>,
        issuer: Arc<dyn TokenIssuer>,
        config: EndpointConfig,
    ) -> Self {
        Self {
            client_store,
            authorization_store,
            user_store,
            issuer,
            config,
        }
    }

    /// Processes one token request.
    ///
    /// `authorization_header` is the raw `Authorization` header value, if
    /// the request carried one.
    ///
    /// # Errors
    ///
    /// Returns [`TokenEndpointError::OAuth`] with the RFC 6749 error body
    /// for protocol failures, and [`TokenEndpointError::Store`] when a
    /// capability fails; the adapter answers the latter with its own 5xx.
    pub async fn token(
        &self,
        params: &RequestParams,
        authorization_header: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<AccessTokenResponse, TokenEndpointError> {
        let authenticated =
            authenticate_client(params, authorization_header, self.client_store.as_ref(), now)
                .await?;
        let client = authenticated.client;

        let grant_param = params
            .require("grant_type")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;
        let grant_type = GrantType::from_param(grant_param).ok_or_else(|| {
            TokenError::unsupported_grant_type(format!("Unsupported grant_type: {grant_param}"))
        })?;

        // The implicit flow never passes through the token endpoint,
        // regardless of what the client is registered for.
        if grant_type == GrantType::Implicit {
            return Err(TokenError::invalid_grant(
                "Implicit grant is not supported by the token endpoint",
            )
            .into());
        }
        if !client.is_grant_type_allowed(grant_type) {
            return Err(TokenError::unauthorized_client(format!(
                "Client is not authorized for the {grant_param} grant"
            ))
            .into());
        }

        let resolved = match grant_type {
            GrantType::AuthorizationCode => {
                self.resolve_code_grant(params, &client, now).await?
            }
            GrantType::ResourceOwner => self.resolve_password_grant(params, &client).await?,
            GrantType::ClientCredentials => self.resolve_client_credentials_grant(params, &client)?,
            GrantType::RefreshToken => self.resolve_refresh_grant(params, &client, now).await?,
            GrantType::Implicit => {
                return Err(TokenError::invalid_grant(
                    "Implicit grant is not supported by the token endpoint",
                )
                .into());
            }
        };

        let issued = self
            .issuer
            .create_access_token(
                resolved.subject.as_deref(),
                &client,
                resolved.effective_grant,
                &resolved.scope,
                now,
            )
            .await?;

        let mut response = AccessTokenResponse::new(issued.access_token.clone(), issued.expires_in);
        if let Some(refresh_token) = issued.refresh_token {
            response = response.with_refresh_token(refresh_token);
        }
        if resolved.mint_id_token {
            if let Some(subject) = resolved.subject.as_deref() {
                let id_token = self
                    .issuer
                    .create_id_token(
                        subject,
                        &client,
                        resolved.nonce.as_deref(),
                        now,
                        Some(&issued.access_token),
                        resolved.code.as_deref(),
                    )
                    .await?;
                response = response.with_id_token(id_token);
            }
        }
        if !resolved.scope.is_empty() {
            response = response.with_scope(&resolved.scope);
        }

        Ok(response)
    }

    async fn resolve_code_grant(
        &self,
        params: &RequestParams,
        client: &Client,
        now: OffsetDateTime,
    ) -> Result<ResolvedGrant, TokenEndpointError> {
        let code = params
            .require("code")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;
        let redirect_uri = params
            .maybe("redirect_uri")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;

        let authorization = self
            .authorization_store
            .take(code)
            .await?
            .ok_or_else(|| TokenError::invalid_grant("Invalid authorization code"))?;

        // The token request must repeat the redirect_uri of the authorize
        // request; both absent counts as a match.
        if authorization.redirect_uri.as_deref() != redirect_uri {
            return Err(TokenError::invalid_grant("Invalid redirect_uri").into());
        }
        if authorization.client_id != client.id {
            tracing::warn!(
                client_id = %client.id,
                "authorization code presented by a different client"
            );
            return Err(TokenError::invalid_grant("Invalid authorization code").into());
        }
        if authorization.age_seconds(now) > self.config.code_lifetime_secs() {
            return Err(TokenError::invalid_grant("Expired code").into());
        }

        let mint_id_token = contains_openid(&authorization.scope);
        Ok(ResolvedGrant {
            subject: Some(authorization.subject),
            effective_grant: GrantType::AuthorizationCode,
            scope: authorization.scope,
            mint_id_token,
            nonce: authorization.nonce,
            code: Some(code.to_string()),
        })
    }

    async fn resolve_password_grant(
        &self,
        params: &RequestParams,
        client: &Client,
    ) -> Result<ResolvedGrant, TokenEndpointError> {
        let username = params
            .require("username")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;
        let password = params
            .require("password")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;

        let subject = self
            .user_store
            .authenticate(username, password)
            .await?
            .ok_or_else(|| TokenError::invalid_grant("authentication failed"))?;

        let scope = self.client_scope(params, client)?;
        Ok(ResolvedGrant {
            subject: Some(subject),
            effective_grant: GrantType::ResourceOwner,
            scope,
            mint_id_token: false,
            nonce: None,
            code: None,
        })
    }

    fn resolve_client_credentials_grant(
        &self,
        params: &RequestParams,
        client: &Client,
    ) -> Result<ResolvedGrant, TokenEndpointError> {
        let scope = self.client_scope(params, client)?;
        Ok(ResolvedGrant {
            subject: None,
            effective_grant: GrantType::ClientCredentials,
            scope,
            mint_id_token: false,
            nonce: None,
            code: None,
        })
    }

    async fn resolve_refresh_grant(
        &self,
        params: &RequestParams,
        client: &Client,
        now: OffsetDateTime,
    ) -> Result<ResolvedGrant, TokenEndpointError> {
        let token = params
            .require("refresh_token")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?;

        let grant = self
            .issuer
            .decode_refresh_token(client, token)
            .await?
            .ok_or_else(|| TokenError::invalid_grant("Invalid refresh token"))?;

        if grant.client_id != client.id {
            tracing::warn!(
                client_id = %client.id,
                "refresh token presented by a different client"
            );
            return Err(
                TokenError::invalid_grant("Refresh token was issued to a different client").into(),
            );
        }
        if grant.is_expired(now) {
            return Err(TokenError::invalid_grant("Refresh token has expired").into());
        }

        let requested = params
            .maybe("scope")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?
            .map(parse_scope_list);
        let scope = check_requested_scope(&grant.scope, requested.as_deref())
            .map_err(|e| TokenError::invalid_scope(e.to_string()))?;

        Ok(ResolvedGrant {
            subject: grant.subject,
            effective_grant: grant.grant_type,
            scope,
            mint_id_token: false,
            nonce: None,
            code: None,
        })
    }

    /// Resolves the requested scope against the client registration for the
    /// grants that start from nothing but the client.
    fn client_scope(
        &self,
        params: &RequestParams,
        client: &Client,
    ) -> Result<Vec<Scope>, TokenEndpointError> {
        let requested = params
            .maybe("scope")
            .map_err(|e| TokenError::invalid_request(e.to_string()))?
            .map(parse_scope_list);
        let scope = check_client_scope(client, requested.as_deref())
            .map_err(|e| TokenError::invalid_scope(e.to_string()))?;
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::oauth::token::TokenErrorCode;
    use crate::scope::join_scopes;
    use crate::token::issuer::IssuedAccessToken;
    use crate::types::{AccessGrant, Authorization, TokenEndpointAuthMethod};
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const NOW: i64 = 1_400_000_000;

    fn ts(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(secs).unwrap()
    }

    struct MockClientStore {
        clients: HashMap<String, Client>,
    }

    #[async_trait]
    impl ClientStore for MockClientStore {
        async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Client>, StoreError> {
            Ok(self.clients.get(client_id).cloned())
        }
    }

    #[derive(Default)]
    struct MockAuthorizationStore {
        codes: Mutex<HashMap<String, Authorization>>,
    }

    impl MockAuthorizationStore {
        fn seed(&self, code: &str, authorization: Authorization) {
            self.codes
                .lock()
                .unwrap()
                .insert(code.to_string(), authorization);
        }
    }

    #[async_trait]
    impl AuthorizationStore for MockAuthorizationStore {
        async fn create(
            &self,
            code: &str,
            authorization: &Authorization,
        ) -> Result<(), StoreError> {
            self.seed(code, authorization.clone());
            Ok(())
        }

        async fn take(&self, code: &str) -> Result<Option<Authorization>, StoreError> {
            Ok(self.codes.lock().unwrap().remove(code))
        }
    }

    struct MockUserStore;

    #[async_trait]
    impl UserStore for MockUserStore {
        async fn authenticate(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<String>, StoreError> {
            Ok((username == "alice" && password == "wonderland")
                .then(|| "subject-alice".to_string()))
        }
    }

    /// Deterministic issuer: predictable token strings, refresh tokens
    /// looked up from a seeded table.
    #[derive(Default)]
    struct MockIssuer {
        refresh_tokens: Mutex<HashMap<String, AccessGrant>>,
    }

    impl MockIssuer {
        fn seed_refresh(&self, token: &str, grant: AccessGrant) {
            self.refresh_tokens
                .lock()
                .unwrap()
                .insert(token.to_string(), grant);
        }
    }

    #[async_trait]
    impl TokenIssuer for MockIssuer {
        async fn create_access_token(
            &self,
            subject: Option<&str>,
            client: &Client,
            _grant_type: GrantType,
            _scope: &[Scope],
            _now: OffsetDateTime,
        ) -> Result<IssuedAccessToken, StoreError> {
            let refresh_token = client
                .is_grant_type_allowed(GrantType::RefreshToken)
                .then(|| "refresh-1".to_string());
            Ok(IssuedAccessToken {
                access_token: format!("at-{}", subject.unwrap_or(&client.id)),
                refresh_token,
                expires_in: client.access_token_ttl_secs() as u64,
            })
        }

        async fn create_id_token(
            &self,
            subject: &str,
            client: &Client,
            nonce: Option<&str>,
            _now: OffsetDateTime,
            _access_token: Option<&str>,
            _code: Option<&str>,
        ) -> Result<String, StoreError> {
            Ok(format!(
                "idt-{}-{}-{}",
                subject,
                client.id,
                nonce.unwrap_or("none")
            ))
        }

        async fn decode_refresh_token(
            &self,
            _client: &Client,
            token: &str,
        ) -> Result<Option<AccessGrant>, StoreError> {
            Ok(self.refresh_tokens.lock().unwrap().get(token).cloned())
        }
    }

    fn app_client() -> Client {
        Client {
            id: "app".to_string(),
            secret: Some("appsecret".to_string()),
            authorized_grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            redirect_uris: vec!["http://app2".to_string(), "http://app".to_string()],
            allowed_scopes: parse_scope_list("openid email"),
            access_token_ttl: Some(900),
            refresh_token_ttl: None,
            token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
            token_endpoint_auth_alg: None,
        }
    }

    fn admin_client() -> Client {
        Client {
            id: "admin".to_string(),
            secret: Some("adminsecret".to_string()),
            authorized_grant_types: vec![
                GrantType::ClientCredentials,
                GrantType::ResourceOwner,
                GrantType::RefreshToken,
            ],
            redirect_uris: vec![],
            allowed_scopes: parse_scope_list("reports audit"),
            access_token_ttl: None,
            refresh_token_ttl: None,
            token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
            token_endpoint_auth_alg: None,
        }
    }

    struct Fixture {
        service: TokenService,
        authorization_store: Arc<MockAuthorizationStore>,
        issuer: Arc<MockIssuer>,
    }

    fn fixture() -> Fixture {
        let clients = MockClientStore {
            clients: HashMap::from([
                ("app".to_string(), app_client()),
                ("admin".to_string(), admin_client()),
            ]),
        };
        let authorization_store = Arc::new(MockAuthorizationStore::default());
        let issuer = Arc::new(MockIssuer::default());
        let service = TokenService::new(
            Arc::new(clients),
            Arc::clone(&authorization_store) as Arc<dyn AuthorizationStore>,
            Arc::new(MockUserStore),
            Arc::clone(&issuer) as Arc<dyn TokenIssuer>,
            EndpointConfig::default(),
        );
        Fixture {
            service,
            authorization_store,
            issuer,
        }
    }

    fn basic_header(id: &str, secret: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
    }

    fn authorization(issued_at: i64, scope: &str, redirect_uri: Option<&str>) -> Authorization {
        Authorization {
            subject: "subject-alice".to_string(),
            client_id: "app".to_string(),
            issued_at: ts(issued_at),
            scope: parse_scope_list(scope),
            nonce: Some("n-1".to_string()),
            redirect_uri: redirect_uri.map(str::to_owned),
        }
    }

    fn expect_oauth(err: TokenEndpointError) -> TokenError {
        match err {
            TokenEndpointError::OAuth(e) => e,
            TokenEndpointError::Store(e) => panic!("unexpected store error: {e}"),
        }
    }

    #[tokio::test]
    async fn code_exchange_mints_tokens_and_an_id_token() {
        let f = fixture();
        f.authorization_store
            .seed("c0de", authorization(NOW - 10, "openid email", Some("http://app")));

        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "c0de"),
            ("redirect_uri", "http://app"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap();

        assert_eq!(response.access_token, "at-subject-alice");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 900);
        assert_eq!(response.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(
            response.id_token.as_deref(),
            Some("idt-subject-alice-app-n-1")
        );
        assert_eq!(response.scope.as_deref(), Some("openid email"));
    }

    #[tokio::test]
    async fn code_without_openid_scope_mints_no_id_token() {
        let f = fixture();
        f.authorization_store
            .seed("c0de", authorization(NOW, "email", Some("http://app")));

        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "c0de"),
            ("redirect_uri", "http://app"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap();

        assert!(response.id_token.is_none());
    }

    #[tokio::test]
    async fn codes_are_single_use() {
        let f = fixture();
        f.authorization_store
            .seed("c0de", authorization(NOW, "email", Some("http://app")));

        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "c0de"),
            ("redirect_uri", "http://app"),
        ]);
        let header = basic_header("app", "appsecret");

        assert!(f.service.token(&params, Some(&header), ts(NOW)).await.is_ok());

        let err = f.service.token(&params, Some(&header), ts(NOW)).await.unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidGrant);
    }

    #[tokio::test]
    async fn code_age_boundary_is_inclusive() {
        let f = fixture();
        f.authorization_store
            .seed("fresh", authorization(NOW - 300, "email", Some("http://app")));
        f.authorization_store
            .seed("stale", authorization(NOW - 301, "email", Some("http://app")));

        let header = basic_header("app", "appsecret");
        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "fresh"),
            ("redirect_uri", "http://app"),
        ]);
        assert!(f.service.token(&params, Some(&header), ts(NOW)).await.is_ok());

        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "stale"),
            ("redirect_uri", "http://app"),
        ]);
        let err = f.service.token(&params, Some(&header), ts(NOW)).await.unwrap_err();
        let err = expect_oauth(err);
        assert_eq!(err.error, TokenErrorCode::InvalidGrant);
        assert_eq!(err.error_description.as_deref(), Some("Expired code"));
    }

    #[tokio::test]
    async fn redirect_uri_must_be_echoed() {
        let f = fixture();
        f.authorization_store
            .seed("c0de", authorization(NOW, "email", Some("http://app")));

        // Different value
        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "c0de"),
            ("redirect_uri", "http://app2"),
        ]);
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidGrant);
    }

    #[tokio::test]
    async fn redirect_uri_absent_on_both_sides_matches() {
        let f = fixture();
        f.authorization_store
            .seed("c0de", authorization(NOW, "email", None));

        let params =
            RequestParams::from_pairs([("grant_type", "authorization_code"), ("code", "c0de")]);
        assert!(
            f.service
                .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn code_issued_to_another_client_is_rejected() {
        let f = fixture();
        let mut foreign = authorization(NOW, "email", None);
        foreign.client_id = "admin".to_string();
        f.authorization_store.seed("c0de", foreign);

        let params =
            RequestParams::from_pairs([("grant_type", "authorization_code"), ("code", "c0de")]);
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidGrant);
    }

    #[tokio::test]
    async fn client_credentials_grant_has_no_subject() {
        let f = fixture();
        let params = RequestParams::from_pairs([
            ("grant_type", "client_credentials"),
            ("scope", "reports"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap();

        assert_eq!(response.access_token, "at-admin");
        assert_eq!(response.scope.as_deref(), Some("reports"));
        assert!(response.id_token.is_none());
    }

    #[tokio::test]
    async fn client_credentials_scope_defaults_to_the_allowed_set() {
        let f = fixture();
        let params = RequestParams::from_pairs([("grant_type", "client_credentials")]);
        let response = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap();

        assert_eq!(response.scope.as_deref(), Some("reports audit"));
    }

    #[tokio::test]
    async fn client_credentials_rejects_foreign_scope() {
        let f = fixture();
        let params = RequestParams::from_pairs([
            ("grant_type", "client_credentials"),
            ("scope", "reports secrets"),
        ]);
        let err = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap_err();
        let err = expect_oauth(err);
        assert_eq!(err.error, TokenErrorCode::InvalidScope);
        assert!(err.error_description.unwrap().contains("secrets"));
    }

    #[tokio::test]
    async fn password_grant_authenticates_the_resource_owner() {
        let f = fixture();
        let params = RequestParams::from_pairs([
            ("grant_type", "password"),
            ("username", "alice"),
            ("password", "wonderland"),
            ("scope", "reports"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap();

        assert_eq!(response.access_token, "at-subject-alice");
        assert_eq!(response.scope.as_deref(), Some("reports"));
    }

    #[tokio::test]
    async fn password_grant_rejects_bad_credentials() {
        let f = fixture();
        let params = RequestParams::from_pairs([
            ("grant_type", "password"),
            ("username", "alice"),
            ("password", "queen-of-hearts"),
        ]);
        let err = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap_err();
        let err = expect_oauth(err);
        assert_eq!(err.error, TokenErrorCode::InvalidGrant);
        assert_eq!(err.error_description.as_deref(), Some("authentication failed"));
    }

    #[tokio::test]
    async fn refresh_grant_reissues_from_the_embedded_grant() {
        let f = fixture();
        f.issuer.seed_refresh(
            "refresh-1",
            AccessGrant {
                subject: Some("subject-alice".to_string()),
                client_id: "app".to_string(),
                grant_type: GrantType::AuthorizationCode,
                scope: parse_scope_list("openid email"),
                expires_at: ts(NOW + 1000),
            },
        );

        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "refresh-1"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap();

        assert_eq!(response.access_token, "at-subject-alice");
        assert_eq!(response.scope.as_deref(), Some("openid email"));
        // Refresh exchanges never mint ID tokens.
        assert!(response.id_token.is_none());
    }

    #[tokio::test]
    async fn refresh_token_of_another_client_is_rejected() {
        let f = fixture();
        f.issuer.seed_refresh(
            "refresh-app",
            AccessGrant {
                subject: Some("subject-alice".to_string()),
                client_id: "app".to_string(),
                grant_type: GrantType::AuthorizationCode,
                scope: parse_scope_list("email"),
                expires_at: ts(NOW + 1000),
            },
        );

        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "refresh-app"),
        ]);
        let err = f
            .service
            .token(&params, Some(&basic_header("admin", "adminsecret")), ts(NOW))
            .await
            .unwrap_err();
        let err = expect_oauth(err);
        assert_eq!(err.error, TokenErrorCode::InvalidGrant);
        assert_eq!(
            err.error_description.as_deref(),
            Some("Refresh token was issued to a different client")
        );
    }

    #[tokio::test]
    async fn refresh_expiry_is_strict() {
        let f = fixture();
        for (token, expires_at) in [("alive", NOW), ("dead", NOW - 1)] {
            f.issuer.seed_refresh(
                token,
                AccessGrant {
                    subject: Some("subject-alice".to_string()),
                    client_id: "app".to_string(),
                    grant_type: GrantType::AuthorizationCode,
                    scope: parse_scope_list("email"),
                    expires_at: ts(expires_at),
                },
            );
        }

        let header = basic_header("app", "appsecret");
        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "alive"),
        ]);
        assert!(f.service.token(&params, Some(&header), ts(NOW)).await.is_ok());

        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "dead"),
        ]);
        let err = f.service.token(&params, Some(&header), ts(NOW)).await.unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidGrant);
    }

    #[tokio::test]
    async fn refresh_scope_may_narrow_but_not_widen() {
        let f = fixture();
        f.issuer.seed_refresh(
            "refresh-1",
            AccessGrant {
                subject: Some("subject-alice".to_string()),
                client_id: "app".to_string(),
                grant_type: GrantType::AuthorizationCode,
                scope: parse_scope_list("openid email"),
                expires_at: ts(NOW + 1000),
            },
        );

        let header = basic_header("app", "appsecret");
        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "refresh-1"),
            ("scope", "email"),
        ]);
        let response = f.service.token(&params, Some(&header), ts(NOW)).await.unwrap();
        assert_eq!(response.scope.as_deref(), Some("email"));

        f.issuer.seed_refresh(
            "refresh-2",
            AccessGrant {
                subject: Some("subject-alice".to_string()),
                client_id: "app".to_string(),
                grant_type: GrantType::AuthorizationCode,
                scope: parse_scope_list("email"),
                expires_at: ts(NOW + 1000),
            },
        );
        let params = RequestParams::from_pairs([
            ("grant_type", "refresh_token"),
            ("refresh_token", "refresh-2"),
            ("scope", "email openid"),
        ]);
        let err = f.service.token(&params, Some(&header), ts(NOW)).await.unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidScope);
    }

    #[tokio::test]
    async fn implicit_grant_is_refused() {
        let f = fixture();
        let params = RequestParams::from_pairs([("grant_type", "implicit")]);
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        let err = expect_oauth(err);
        assert_eq!(err.error, TokenErrorCode::InvalidGrant);
        assert_eq!(
            err.error_description.as_deref(),
            Some("Implicit grant is not supported by the token endpoint")
        );
    }

    #[tokio::test]
    async fn unknown_grant_type_is_unsupported() {
        let f = fixture();
        let params = RequestParams::from_pairs([("grant_type", "device_code")]);
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::UnsupportedGrantType);
    }

    #[tokio::test]
    async fn unauthorized_grant_type_is_rejected() {
        let f = fixture();
        // app is not registered for client_credentials
        let params = RequestParams::from_pairs([("grant_type", "client_credentials")]);
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::UnauthorizedClient);
    }

    #[tokio::test]
    async fn missing_grant_type_is_invalid_request() {
        let f = fixture();
        let params = RequestParams::new();
        let err = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap_err();
        assert_eq!(expect_oauth(err).error, TokenErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn empty_granted_scope_is_omitted_from_the_response() {
        let f = fixture();
        f.authorization_store.seed("c0de", {
            let mut a = authorization(NOW, "", Some("http://app"));
            a.scope = vec![];
            a
        });

        let params = RequestParams::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "c0de"),
            ("redirect_uri", "http://app"),
        ]);
        let response = f
            .service
            .token(&params, Some(&basic_header("app", "appsecret")), ts(NOW))
            .await
            .unwrap();
        assert!(response.scope.is_none());
        assert_eq!(join_scopes(&[]), "");
    }
}
