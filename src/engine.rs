//! Protocol engine capability interface
//!
//! The OAuth2 mechanics of an authorization attempt (building the
//! authorization URL, processing the redirect for the selected grant type,
//! exchanging codes for tokens, signing outbound requests) live behind the
//! [`ProtocolEngine`] trait. The session treats the engine as a black box:
//! it writes the composed scope into it, asks it for the authorization URL,
//! forwards redirects to it, and receives success or failure back through
//! [`AuthorizationSession::engine_authorized`] and
//! [`AuthorizationSession::engine_failed`].
//!
//! Engines are created once per session through an [`EngineFactory`], keyed
//! by the selected [`AuthMethod`]; the method never changes after
//! construction.
//!
//! [`AuthorizationSession::engine_authorized`]: crate::session::AuthorizationSession::engine_authorized
//! [`AuthorizationSession::engine_failed`]: crate::session::AuthorizationSession::engine_failed

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use crate::discovery::AuthMethod;
use crate::error::Result;
use crate::settings::AuthSettings;

/// String-keyed result parameters delivered by a successful authorization
/// (access token, granted scope, launch context, selected patient, ...).
pub type AuthParameters = HashMap<String, serde_json::Value>;

/// Outcome of grant-type-specific redirect processing.
///
/// Produced by the application layer driving a [`ProtocolEngine`] and
/// consumed by [`AuthorizationSession::deliver`], which routes it to the
/// attempt's resolution.
///
/// [`AuthorizationSession::deliver`]: crate::session::AuthorizationSession::deliver
#[derive(Debug)]
pub enum RedirectResult {
    /// The grant completed; the parameters carry the token response.
    Authorized(AuthParameters),

    /// The grant failed with an engine-reported error.
    Failed(crate::error::SmartGrantError),
}

/// A signed outbound request descriptor produced by the engine.
///
/// Carries everything a transport needs to issue the request; the crate
/// itself never performs HTTP.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,

    /// Target URL.
    pub url: Url,

    /// Request headers, including the authorization header the engine
    /// attached.
    pub headers: HashMap<String, String>,

    /// Request body, when applicable.
    pub body: Option<Vec<u8>>,
}

/// Grant-type-specific OAuth2 mechanics, owned exclusively by one session.
///
/// Implementations wrap whatever OAuth2 client library the application uses.
/// `handle_redirect` performs the grant-specific processing of the redirect
/// (for a code grant, extracting the code and kicking off the token
/// exchange); the eventual outcome is delivered to the owning session by the
/// application layer driving the engine.
#[async_trait]
pub trait ProtocolEngine: Send {
    /// The scope currently configured on the engine, if any.
    fn scope(&self) -> Option<String>;

    /// Replaces the engine's configured scope.
    fn set_scope(&mut self, scope: String);

    /// Builds the authorization URL for the configured grant type.
    async fn authorize_url(&mut self) -> Result<Url>;

    /// Processes a redirect URL for the configured grant type.
    ///
    /// Errors are routed to the session's completion callback by the caller;
    /// they never cross the session boundary as exceptions.
    async fn handle_redirect(&mut self, url: &Url) -> Result<()>;

    /// Produces a signed request for `url`, or `None` when the engine holds
    /// no credentials to sign with.
    fn sign_request(&self, url: &Url) -> Option<SignedRequest>;
}

/// Creates the protocol engine variant for a selected authorization method.
///
/// This is the single selection point: the session calls it from
/// [`configure_with`](crate::session::AuthorizationSession::configure_with)
/// and the resulting engine is used unchanged for the session's lifetime
/// (until `configure_with` is called again). Returns `Ok(None)` for
/// [`AuthMethod::None`], where no engine is required.
pub trait EngineFactory {
    /// Builds an engine for `method` configured from `settings`.
    fn engine_for(
        &self,
        method: AuthMethod,
        settings: &AuthSettings,
    ) -> Result<Option<Box<dyn ProtocolEngine>>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
