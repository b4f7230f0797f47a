//! Presentation boundary for authorization flows
//!
//! The session never draws UI. Everything the user sees during an
//! authorization attempt (a system browser tab, an embedded web view, a
//! native patient picker) lives behind the [`RedirectBridge`] trait.
//!
//! # The redirect contract
//!
//! Whatever mechanism presents the authorization page must, upon receiving
//! the terminal redirect URL for the flow, call
//! [`AuthorizationSession::handle_redirect`] on the owning session. That is
//! the only write path from presentation code into the session, and it is
//! safe to call at any time: after the attempt has resolved it returns
//! `false` and has no side effects.
//!
//! A bridge that implements native patient selection completes the attempt
//! itself by calling [`AuthorizationSession::resolve`] with the augmented
//! parameters once the user has picked a patient.
//!
//! [`AuthorizationSession::handle_redirect`]: crate::session::AuthorizationSession::handle_redirect
//! [`AuthorizationSession::resolve`]: crate::session::AuthorizationSession::resolve

use std::any::Any;

use async_trait::async_trait;
use url::Url;

use crate::engine::AuthParameters;
use crate::error::{Result, SmartGrantError};
use crate::scope::AccessContextGranularity;

/// Opaque platform payload held for the duration of one authorization
/// attempt (a window handle, a view controller, an embedded browser
/// instance). Produced by [`RedirectBridge::present_embedded`], stored by
/// the session, and dropped when the attempt resolves.
pub type AuthContext = Box<dyn Any + Send>;

/// External presentation mechanism for authorization flows.
///
/// Implementations are platform-specific. The shipped [`SystemBrowser`]
/// covers the common non-embedded desktop case; GUI applications provide
/// their own bridge for embedded presentation and native patient selection.
#[async_trait]
pub trait RedirectBridge: Send {
    /// Opens `url` in an external system browser.
    async fn open_browser(&mut self, url: &Url) -> Result<()>;

    /// Presents `url` in an embedded view.
    ///
    /// Receives the attempt's granularity so an implementation can prepare a
    /// native-selection presentation up front. Returns the platform context
    /// for the presented view, which the session holds until the attempt
    /// resolves.
    async fn present_embedded(
        &mut self,
        url: &Url,
        granularity: AccessContextGranularity,
    ) -> Result<Option<AuthContext>>;

    /// Starts native patient selection after a successful authorization.
    ///
    /// `parameters` are the authorization result so far; `context` is the
    /// in-flight platform context, when embedded presentation produced one.
    /// The implementation finishes by calling the session's `resolve` with
    /// the parameters augmented by the selected patient.
    async fn select_patient(
        &mut self,
        parameters: &AuthParameters,
        context: Option<&mut AuthContext>,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SystemBrowser
// ---------------------------------------------------------------------------

/// Opens authorization URLs in the user's default browser.
///
/// Supports only the non-embedded path; embedded presentation and native
/// patient selection report a presentation error, which the session routes
/// to the attempt's completion callback.
pub struct SystemBrowser;

#[async_trait]
impl RedirectBridge for SystemBrowser {
    async fn open_browser(&mut self, url: &Url) -> Result<()> {
        tracing::debug!(%url, "opening authorization URL in system browser");
        open_in_system_browser(url)
    }

    async fn present_embedded(
        &mut self,
        _url: &Url,
        _granularity: AccessContextGranularity,
    ) -> Result<Option<AuthContext>> {
        Err(SmartGrantError::Presentation(
            "embedded presentation is not available with the system browser".to_string(),
        )
        .into())
    }

    async fn select_patient(
        &mut self,
        _parameters: &AuthParameters,
        _context: Option<&mut AuthContext>,
    ) -> Result<()> {
        Err(SmartGrantError::Presentation(
            "native patient selection is not available with the system browser".to_string(),
        )
        .into())
    }
}

#[cfg(target_os = "macos")]
fn open_in_system_browser(url: &Url) -> Result<()> {
    std::process::Command::new("open")
        .arg(url.as_str())
        .spawn()
        .map_err(|e| SmartGrantError::Presentation(format!("failed to open browser: {e}")))?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_in_system_browser(url: &Url) -> Result<()> {
    std::process::Command::new("xdg-open")
        .arg(url.as_str())
        .spawn()
        .map_err(|e| SmartGrantError::Presentation(format!("failed to open browser: {e}")))?;
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn open_in_system_browser(url: &Url) -> Result<()> {
    Err(SmartGrantError::Presentation(format!(
        "no system browser launcher on this platform; open the URL manually: {url}"
    ))
    .into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_browser_rejects_embedded_presentation() {
        let mut bridge = SystemBrowser;
        let url = Url::parse("https://auth.example.com/authorize").unwrap();
        let err = bridge
            .present_embedded(&url, AccessContextGranularity::TokenOnly)
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("embedded presentation"),
            "error should explain what is unsupported: {err}"
        );
    }

    #[tokio::test]
    async fn test_system_browser_rejects_native_patient_selection() {
        let mut bridge = SystemBrowser;
        let parameters = AuthParameters::new();
        let err = bridge
            .select_patient(&parameters, None)
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("patient selection"),
            "error should explain what is unsupported: {err}"
        );
    }

    #[test]
    fn test_auth_context_holds_arbitrary_payloads() {
        let context: AuthContext = Box::new(42u32);
        assert_eq!(context.downcast_ref::<u32>(), Some(&42));
    }

    #[test]
    fn test_system_browser_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SystemBrowser>();
    }
}
