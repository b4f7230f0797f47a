//! Authorization session state machine
//!
//! This module owns one in-flight authorization attempt at a time and
//! coordinates grant selection, scope composition, the protocol engine, and
//! the presentation bridge into a single façade.
//!
//! # Attempt lifecycle
//!
//! An attempt moves through: idle → starting (callback registered, scope
//! composed) → awaiting redirect (presentation dispatched) → resolving
//! (redirect, failure, or abort received) → idle again. The session itself
//! has no terminal state; `authorize` may be called repeatedly, each attempt
//! fully resolving before the next is accepted.
//!
//! # Exactly-once resolution
//!
//! Every `authorize` call registers exactly one completion callback, and
//! that callback fires exactly once: with parameters on success, with an
//! error on failure, and with neither on a voluntary abort. Stray events
//! after resolution (a duplicate redirect, a late engine report) are logged
//! and dropped. Calling `authorize` while an attempt is pending is a caller
//! contract violation and panics.

use url::Url;

use crate::bridge::{AuthContext, RedirectBridge};
use crate::conformance::SecurityDescription;
use crate::discovery::{select_method, AuthMethod};
use crate::engine::{AuthParameters, EngineFactory, ProtocolEngine, RedirectResult, SignedRequest};
use crate::error::{Result, SmartGrantError};
use crate::scope::{compose, AccessContextGranularity, DEFAULT_SCOPE};
use crate::settings::AuthSettings;

// ---------------------------------------------------------------------------
// AuthorizeProperties / AuthCallback
// ---------------------------------------------------------------------------

/// Per-attempt authorization inputs.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct AuthorizeProperties {
    /// How much access context this attempt should establish.
    pub granularity: AccessContextGranularity,

    /// Present the flow in an embedded view instead of the system browser.
    pub embedded: bool,
}

/// Completion callback for one authorization attempt.
///
/// Invoked exactly once per `authorize` call with `(parameters, error)`:
/// `(Some, None)` on success, `(None, Some)` on failure, and `(None, None)`
/// when the attempt was aborted; callers must treat the last as
/// "cancelled", not "succeeded with no data".
pub type AuthCallback = Box<dyn FnOnce(Option<AuthParameters>, Option<SmartGrantError>) + Send>;

/// The one in-flight attempt: its granularity and its unfired callback.
struct PendingAttempt {
    granularity: AccessContextGranularity,
    callback: AuthCallback,
}

// ---------------------------------------------------------------------------
// AuthorizationSession
// ---------------------------------------------------------------------------

/// Drives OAuth2 authorization attempts against one server.
///
/// A session is created once per server-and-method pairing and lives for the
/// application's session with that server. It exclusively owns its settings
/// and protocol engine; presentation code must never mutate them. The
/// platform context returned by embedded presentation is held for the
/// duration of one attempt and dropped on resolution.
///
/// # Thread safety
///
/// `AuthorizationSession` is `Send` but not internally synchronized: the
/// thread that calls `authorize` and the thread that later delivers the
/// redirect or engine report may differ, but only one delivery matters per
/// attempt. Wrap the session in an `Arc<tokio::sync::Mutex<_>>` when sharing
/// across tasks.
///
/// # Timeouts
///
/// No timeout is modeled internally: a hung presentation leaves the session
/// awaiting a redirect indefinitely. Callers own cancellation by calling
/// [`abort`](Self::abort).
///
/// # Examples
///
/// ```no_run
/// use smartgrant::{
///     AccessContextGranularity, AuthMethod, AuthSettings, AuthorizationSession,
///     AuthorizeProperties, SystemBrowser,
/// };
///
/// # async fn example() {
/// let mut session = AuthorizationSession::new(
///     AuthMethod::None,
///     AuthSettings::new(),
///     Box::new(SystemBrowser),
/// );
///
/// session
///     .authorize(
///         AuthorizeProperties {
///             granularity: AccessContextGranularity::TokenOnly,
///             embedded: false,
///         },
///         Box::new(|parameters, error| {
///             // An open server authorizes trivially: no parameters, no error.
///             assert!(parameters.is_none() && error.is_none());
///         }),
///     )
///     .await;
/// # }
/// ```
pub struct AuthorizationSession {
    /// The selected authorization method; immutable for the session's life.
    method: AuthMethod,

    /// Endpoint and client settings; frozen once the engine is configured.
    settings: AuthSettings,

    /// The protocol engine, recreated only by [`configure_with`](Self::configure_with).
    engine: Option<Box<dyn ProtocolEngine>>,

    /// The presentation mechanism.
    bridge: Box<dyn RedirectBridge>,

    /// Platform context for the in-flight attempt's presentation.
    context: Option<AuthContext>,

    /// The in-flight attempt, when one exists.
    pending: Option<PendingAttempt>,
}

impl AuthorizationSession {
    /// Creates a session for `method` with no engine configured yet.
    ///
    /// Call [`configure_with`](Self::configure_with) before authorizing
    /// unless the method is [`AuthMethod::None`].
    pub fn new(
        method: AuthMethod,
        settings: AuthSettings,
        bridge: Box<dyn RedirectBridge>,
    ) -> Self {
        Self {
            method,
            settings,
            engine: None,
            bridge,
            context: None,
            pending: None,
        }
    }

    /// Creates a session from a server's conformance security description.
    ///
    /// Runs endpoint discovery over `security`, writing discovered URIs into
    /// `settings` (overwriting preseeded values for the same keys), and
    /// selects the authorization method. Returns `None` when the server
    /// advertises no supported method; that outcome has already been logged
    /// and is recoverable.
    pub fn from_security(
        security: &SecurityDescription,
        mut settings: AuthSettings,
        bridge: Box<dyn RedirectBridge>,
    ) -> Option<Self> {
        let method = select_method(security, &mut settings)?;
        Some(Self::new(method, settings, bridge))
    }

    /// The authorization method this session was constructed with.
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// The session's settings.
    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Returns `true` while an authorization attempt is in flight.
    pub fn is_authorizing(&self) -> bool {
        self.pending.is_some()
    }

    /// The platform context of the in-flight attempt, if presentation
    /// produced one.
    pub fn context(&self) -> Option<&AuthContext> {
        self.context.as_ref()
    }

    /// (Re)creates the protocol engine for this session's method.
    ///
    /// Validates the endpoint settings, then asks `factory` for the engine
    /// variant matching the session's method. Any stale platform context is
    /// discarded. Must not be called while an attempt is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SmartGrantError::Configuration`] when the settings are
    /// malformed, or whatever error the factory reports.
    pub fn configure_with(&mut self, factory: &dyn EngineFactory) -> Result<()> {
        self.settings.validate()?;
        self.engine = factory.engine_for(self.method, &self.settings)?;
        self.context = None;
        Ok(())
    }

    /// Starts an authorization attempt.
    ///
    /// Composes the effective scope from the engine's configured scope (or
    /// [`DEFAULT_SCOPE`]) and the requested granularity, writes it back into
    /// the engine, then dispatches to embedded presentation or the system
    /// browser. Returns as soon as presentation is under way; the outcome
    /// arrives later through `callback`, exactly once.
    ///
    /// When no engine is configured the attempt resolves immediately:
    /// `(None, None)` when the method is legitimately [`AuthMethod::None`],
    /// or with a configuration error otherwise. Presentation and engine
    /// failures also resolve through the callback; nothing is thrown across
    /// this boundary.
    ///
    /// # Panics
    ///
    /// Panics when a previous attempt is still pending. That is a caller
    /// contract violation, not a runtime condition.
    pub async fn authorize(&mut self, properties: AuthorizeProperties, callback: AuthCallback) {
        assert!(
            self.pending.is_none(),
            "authorize() called while a previous authorization attempt is still pending"
        );

        // Discard anything a previous attempt's presentation left behind.
        self.context = None;
        self.pending = Some(PendingAttempt {
            granularity: properties.granularity,
            callback,
        });

        tracing::debug!(
            granularity = ?properties.granularity,
            embedded = properties.embedded,
            "starting authorization attempt"
        );

        let url = {
            let engine = match self.engine.as_mut() {
                Some(engine) => engine,
                None => {
                    if self.method == AuthMethod::None {
                        self.resolve(None, None);
                    } else {
                        self.resolve(
                            None,
                            Some(SmartGrantError::Configuration(format!(
                                "no protocol engine configured for {:?} authorization",
                                self.method
                            ))),
                        );
                    }
                    return;
                }
            };

            let base = engine.scope().unwrap_or_else(|| DEFAULT_SCOPE.to_string());
            let effective = compose(&base, properties.granularity);
            tracing::debug!(scope = %effective, "composed effective scope");
            engine.set_scope(effective);

            match engine.authorize_url().await {
                Ok(url) => url,
                Err(e) => {
                    self.resolve(None, Some(engine_error(e)));
                    return;
                }
            }
        };

        if properties.embedded {
            match self
                .bridge
                .present_embedded(&url, properties.granularity)
                .await
            {
                Ok(context) => self.context = context,
                Err(e) => self.resolve(None, Some(presentation_error(e))),
            }
        } else if let Err(e) = self.bridge.open_browser(&url).await {
            self.resolve(None, Some(presentation_error(e)));
        }
    }

    /// Accepts a redirect URL captured by the presentation mechanism.
    ///
    /// Returns `true` when the session is in a state able to handle it (an
    /// engine is configured and an attempt is pending) after forwarding the
    /// URL to the engine for grant-type-specific processing. Returns `false`
    /// without side effects otherwise, so presentation code may call this
    /// unconditionally, even after the attempt has resolved.
    ///
    /// Engine processing errors resolve the attempt as failures; they are
    /// not returned here.
    pub async fn handle_redirect(&mut self, url: &Url) -> bool {
        if self.pending.is_none() {
            tracing::debug!(%url, "redirect received with no pending attempt; ignoring");
            return false;
        }
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!(%url, "redirect received with no engine configured; ignoring");
            return false;
        };

        tracing::debug!(%url, "forwarding redirect to protocol engine");
        if let Err(e) = engine.handle_redirect(url).await {
            self.engine_failed(engine_error(e));
        }
        true
    }

    /// Delivers a successful authorization result from the engine.
    ///
    /// For every granularity except
    /// [`PatientSelectNative`](AccessContextGranularity::PatientSelectNative)
    /// the attempt resolves immediately with `parameters`. For native
    /// selection the bridge's patient picker is started instead, and the
    /// picker completes the attempt through [`resolve`](Self::resolve) with
    /// the parameters augmented by the selected patient.
    pub async fn engine_authorized(&mut self, parameters: AuthParameters) {
        let granularity = match self.pending.as_ref() {
            Some(pending) => pending.granularity,
            None => {
                tracing::debug!("engine reported success with no pending attempt; ignoring");
                return;
            }
        };

        if granularity == AccessContextGranularity::PatientSelectNative {
            tracing::debug!("authorization succeeded; starting native patient selection");
            if let Err(e) = self
                .bridge
                .select_patient(&parameters, self.context.as_mut())
                .await
            {
                self.resolve(None, Some(presentation_error(e)));
            }
        } else {
            self.resolve(Some(parameters), None);
        }
    }

    /// Delivers an engine-reported failure, resolving the attempt with
    /// `error`.
    pub fn engine_failed(&mut self, error: SmartGrantError) {
        self.resolve(None, Some(error));
    }

    /// Delivers a [`RedirectResult`] from the engine driver.
    ///
    /// Convenience over [`engine_authorized`](Self::engine_authorized) and
    /// [`engine_failed`](Self::engine_failed) for drivers that carry the
    /// outcome as a value.
    pub async fn deliver(&mut self, result: RedirectResult) {
        match result {
            RedirectResult::Authorized(parameters) => self.engine_authorized(parameters).await,
            RedirectResult::Failed(error) => self.engine_failed(error),
        }
    }

    /// Aborts the in-flight attempt.
    ///
    /// Resolves with neither parameters nor an error, distinguishing a
    /// voluntary cancel from a protocol failure. A no-op when nothing is
    /// pending.
    pub fn abort(&mut self) {
        tracing::debug!("authorization attempt aborted");
        self.resolve(None, None);
    }

    /// Resolves the in-flight attempt, firing its callback exactly once.
    ///
    /// Normally invoked internally; external native-selection collaborators
    /// complete an attempt by calling it directly with the augmented
    /// parameters. Safe to call when nothing is pending: the resolution is
    /// logged and dropped, so a stray engine event can never fire a callback
    /// twice.
    pub fn resolve(
        &mut self,
        parameters: Option<AuthParameters>,
        error: Option<SmartGrantError>,
    ) {
        match self.pending.take() {
            Some(attempt) => {
                self.context = None;
                tracing::debug!(
                    succeeded = parameters.is_some(),
                    failed = error.is_some(),
                    "resolving authorization attempt"
                );
                (attempt.callback)(parameters, error);
            }
            None => {
                tracing::debug!("resolution requested with no pending attempt; ignoring");
            }
        }
    }

    /// Produces a signed request for `url` via the engine.
    ///
    /// Returns `None` when no engine is configured or the engine holds no
    /// credentials.
    pub fn signed_request(&self, url: &Url) -> Option<SignedRequest> {
        self.engine.as_ref().and_then(|engine| engine.sign_request(url))
    }
}

// ---------------------------------------------------------------------------
// Error routing helpers
// ---------------------------------------------------------------------------

/// Maps an engine-reported error onto the callback error channel, passing
/// through structured errors untouched.
fn engine_error(e: anyhow::Error) -> SmartGrantError {
    match e.downcast::<SmartGrantError>() {
        Ok(error) => error,
        Err(other) => SmartGrantError::Protocol(other.to_string()),
    }
}

/// Maps a presentation error onto the callback error channel, passing
/// through structured errors untouched.
fn presentation_error(e: anyhow::Error) -> SmartGrantError {
    match e.downcast::<SmartGrantError>() {
        Ok(error) => error,
        Err(other) => SmartGrantError::Presentation(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
