//! Access-context granularity and scope composition
//!
//! SMART-on-FHIR carries clinical launch context through the authorization
//! flow via scope prefixes: requesting `launch` asks the server to resolve
//! the EHR launch context, and `launch/patient` asks it to put up a patient
//! picker during authorization. This module maps a caller's desired
//! access-context granularity onto the effective scope string to request.
//!
//! # References
//!
//! - SMART App Launch scopes and launch context
//!   <http://docs.smarthealthit.org/>

use serde::{Deserialize, Serialize};

/// Base scope requested when the protocol engine has none configured.
pub const DEFAULT_SCOPE: &str = "user/*.* openid profile";

/// How much access context an authorization attempt should establish.
///
/// Supplied fresh on every [`authorize`](crate::session::AuthorizationSession::authorize)
/// call; never persisted across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessContextGranularity {
    /// Request a token only; no launch context.
    TokenOnly,

    /// Request that the server resolve the launch context (`launch`).
    LaunchContext,

    /// Request a server-hosted patient picker during the web authorization
    /// flow (`launch/patient`).
    PatientSelectWeb,

    /// Select the patient natively after authorization completes; the scope
    /// is not modified because the picker runs client-side.
    PatientSelectNative,
}

/// Computes the effective scope for an authorization attempt.
///
/// The granularity prefix is applied to the base scope per call; it is never
/// cumulative across calls. [`AccessContextGranularity::PatientSelectNative`]
/// leaves the base unchanged because native selection happens after
/// authorization, not via scope.
///
/// # Examples
///
/// ```
/// use smartgrant::scope::{compose, AccessContextGranularity};
///
/// assert_eq!(
///     compose("user/*.* openid profile", AccessContextGranularity::LaunchContext),
///     "launch user/*.* openid profile"
/// );
/// ```
pub fn compose(base: &str, granularity: AccessContextGranularity) -> String {
    match granularity {
        AccessContextGranularity::TokenOnly => base.to_string(),
        AccessContextGranularity::LaunchContext => format!("launch {base}"),
        AccessContextGranularity::PatientSelectWeb => format!("launch/patient {base}"),
        AccessContextGranularity::PatientSelectNative => base.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
