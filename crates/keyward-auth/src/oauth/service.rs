//! Authorization endpoint processor.
//!
//! Drives the authorize-request state machine over the injected
//! capabilities. The defining behavior is the two-tier error routing:
//! until the client and redirect URI are established, errors are returned
//! as [`UntrustedClientError`] and must be shown to the resource owner;
//! after that, every error is encoded onto the validated redirect URI and
//! returned as a *successful* result carrying the error redirect.
//!
//! The `state` parameter is extracted before any client-visible error so
//! the client can always correlate the response with its request.

use std::sync::Arc;

use time::OffsetDateTime;
use url::Url;

use crate::config::EndpointConfig;
use crate::consent::{ApprovalDecision, ScopeApproval};
use crate::error::UntrustedClientError;
use crate::oauth::authorize::{AuthorizationError, AuthorizationResponse};
use crate::oauth::code::{CodeGenerator, HexCodeGenerator};
use crate::params::RequestParams;
use crate::scope::{Scope, check_client_scope, parse_scope_list};
use crate::storage::{AuthorizationStore, ClientStore};
use crate::types::{Authorization, Client, GrantType};

/// Authorization endpoint service.
///
/// A pure coordinator: all side effects (client lookup, approval,
/// authorization persistence, code generation) run through the injected
/// capabilities, so the whole state machine is deterministic under test.
pub struct AuthorizationService {
    client_store: Arc<dyn ClientStore>,
    authorization_store: Arc<dyn AuthorizationStore>,
    approval: Arc<dyn ScopeApproval>,
    code_generator: Arc<dyn CodeGenerator>,
    config: EndpointConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service with the standard code generator.
    #[must_use]
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        authorization_store: Arc<dyn AuthorizationStore>,
        approval: Arc<dyn ScopeApproval>,
        config: EndpointConfig,
    ) -> Self {
        Self {
            client_store,
            authorization_store,
            approval,
            code_generator: Arc::new(HexCodeGenerator),
            config,
        }
    }

    /// Replaces the code generator.
    #[must_use]
    pub fn with_code_generator(mut self, code_generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = code_generator;
        self
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Processes one authorization request for the authenticated resource
    /// owner `user`.
    ///
    /// On success the returned URL is the 302 target: either the success
    /// redirect carrying the authorization code or an error redirect
    /// carrying OAuth error parameters.
    ///
    /// # Errors
    ///
    /// Returns [`UntrustedClientError`] when the client identity or the
    /// redirect URI cannot be established; those must be rendered to the
    /// resource owner directly.
    pub async fn authorize(
        &self,
        user: &str,
        params: &RequestParams,
        now: OffsetDateTime,
    ) -> Result<Url, UntrustedClientError> {
        // Client and redirect URI resolution. Errors here stay with the
        // resource owner.
        let client_id = params.require("client_id").map_err(|e| {
            UntrustedClientError::invalid_client(e.to_string())
        })?;

        let client = self
            .client_store
            .find_by_client_id(client_id)
            .await
            .map_err(|e| {
                tracing::warn!(client_id = %client_id, "client lookup failed: {e}");
                UntrustedClientError::invalid_client("Client lookup failed")
            })?
            .ok_or_else(|| UntrustedClientError::invalid_client("Unknown client"))?;

        let supplied_redirect = params
            .maybe("redirect_uri")
            .map_err(|_| UntrustedClientError::InvalidRedirectUri)?;
        if let Some(uri) = supplied_redirect {
            if uri.contains('#') {
                return Err(UntrustedClientError::FragmentInUri);
            }
            if !client.is_redirect_uri_allowed(uri) {
                return Err(UntrustedClientError::InvalidRedirectUri);
            }
        }
        let redirect_uri = supplied_redirect
            .or_else(|| client.default_redirect_uri())
            .ok_or(UntrustedClientError::InvalidRedirectUri)?;
        let redirect_uri =
            Url::parse(redirect_uri).map_err(|_| UntrustedClientError::InvalidRedirectUri)?;

        // State comes out before anything the client gets told about.
        let state = match params.maybe("state") {
            Ok(state) => state.map(str::to_owned),
            Err(e) => {
                let error = AuthorizationError::invalid_request(e.to_string(), None);
                return Ok(error.to_redirect_url(&redirect_uri, false));
            }
        };

        match self
            .try_authorize(user, params, &client, supplied_redirect, state.clone(), now)
            .await
        {
            Ok(response) => Ok(response.to_redirect_url(&redirect_uri, false)),
            Err(error) => Ok(error.to_redirect_url(&redirect_uri, false)),
        }
    }

    /// The redirect-scoped tail of the state machine: everything from
    /// `response_type` validation to code issuance.
    async fn try_authorize(
        &self,
        user: &str,
        params: &RequestParams,
        client: &Client,
        supplied_redirect: Option<&str>,
        state: Option<String>,
        now: OffsetDateTime,
    ) -> Result<AuthorizationResponse, AuthorizationError> {
        let response_type = params
            .require("response_type")
            .map_err(|e| AuthorizationError::invalid_request(e.to_string(), state.clone()))?;

        if normalize_response_type(response_type) != "code" {
            return Err(AuthorizationError::unsupported_response_type(
                format!("Unsupported response_type: {response_type}"),
                state,
            ));
        }

        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthorizationError::unauthorized_client(
                "Client is not authorized for the authorization code grant",
                state,
            ));
        }

        let requested: Option<Vec<Scope>> = params
            .maybe("scope")
            .map_err(|e| AuthorizationError::invalid_request(e.to_string(), state.clone()))?
            .map(parse_scope_list);
        let requested = check_client_scope(client, requested.as_deref())
            .map_err(|e| AuthorizationError::invalid_scope(e.to_string(), state.clone()))?;

        let nonce = params
            .maybe("nonce")
            .map_err(|e| AuthorizationError::invalid_request(e.to_string(), state.clone()))?
            .map(str::to_owned);

        let decision = self
            .approval
            .approve(user, client, &requested, now)
            .await
            .map_err(|e| {
                tracing::warn!(client_id = %client.id, "approval capability failed: {e}");
                AuthorizationError::server_error(state.clone())
            })?;
        let granted = match decision {
            ApprovalDecision::Granted(granted) => granted,
            ApprovalDecision::Denied => {
                return Err(AuthorizationError::access_denied(state));
            }
        };
        if granted.iter().any(|scope| !client.is_scope_allowed(scope)) {
            tracing::warn!(client_id = %client.id, "approval granted a scope outside the client's allowed set");
            return Err(AuthorizationError::server_error(state));
        }

        let code = self.code_generator.generate_code();
        let authorization = Authorization {
            subject: user.to_string(),
            client_id: client.id.clone(),
            issued_at: now,
            scope: granted.clone(),
            nonce,
            redirect_uri: supplied_redirect.map(str::to_owned),
        };
        self.authorization_store
            .create(&code, &authorization)
            .await
            .map_err(|e| {
                tracing::warn!(client_id = %client.id, "failed to persist authorization: {e}");
                AuthorizationError::server_error(state.clone())
            })?;

        let mut response = AuthorizationResponse::new(code, state);
        if granted != requested {
            response = response.with_scope(&granted);
        }
        Ok(response)
    }
}

/// Normalizes a `response_type` value for comparison.
///
/// Compound response types such as `code id_token` are sets, so the tokens
/// are lowercased and sorted before matching.
fn normalize_response_type(value: &str) -> String {
    let mut tokens: Vec<String> = value
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    tokens.sort();
    tokens.join(" ")
}
