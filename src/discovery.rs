//! Grant selection from conformance security descriptions
//!
//! SMART-on-FHIR servers advertise their OAuth endpoints as extensions on
//! the `CapabilityStatement.rest[].security` element. This module scans
//! those extensions for the three well-known endpoint identifiers, writes
//! the discovered URIs into the caller's settings map, and derives the
//! authorization method the client should use:
//!
//! - authorize and token endpoints present → authorization code grant
//! - authorize endpoint only → implicit grant
//! - no authorize endpoint → no supported method (recoverable; logged)
//!
//! Identifier matching is exact and case-sensitive; there is no partial or
//! prefix matching and no support for multiple simultaneous auth extensions
//! describing alternative methods.

use crate::conformance::SecurityDescription;
use crate::settings::AuthSettings;

// ---------------------------------------------------------------------------
// Well-known extension identifiers
// ---------------------------------------------------------------------------

/// Extension identifier carrying the dynamic registration endpoint URI.
pub const REGISTER_URI_EXTENSION: &str =
    "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#register";

/// Extension identifier carrying the authorization endpoint URI.
pub const AUTHORIZE_URI_EXTENSION: &str =
    "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#authorize";

/// Extension identifier carrying the token endpoint URI.
pub const TOKEN_URI_EXTENSION: &str =
    "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#token";

// ---------------------------------------------------------------------------
// AuthMethod
// ---------------------------------------------------------------------------

/// The authorization strategy selected for a server.
///
/// Fixed once an [`AuthorizationSession`](crate::session::AuthorizationSession)
/// is constructed; it determines which protocol engine variant the
/// [`EngineFactory`](crate::engine::EngineFactory) instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// The server requires no authorization (open endpoints).
    None,

    /// OAuth2 implicit grant: the token is issued directly from the
    /// authorization endpoint.
    ImplicitGrant,

    /// OAuth2 authorization code grant: an authorization code is exchanged
    /// at the token endpoint.
    CodeGrant,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Derives the authorization method from a security description, writing
/// discovered endpoint URIs into `settings`.
///
/// Declared security services are logged for diagnostics only; the endpoint
/// extensions are the operative signal. Discovered URIs overwrite any
/// caller-preseeded values for the same keys.
///
/// Returns `None` when the description advertises no authorize endpoint,
/// meaning the server has no supported authorization method. That outcome
/// is recoverable and logged at WARN; it is not an error.
///
/// # Examples
///
/// ```
/// use smartgrant::conformance::SecurityDescription;
/// use smartgrant::discovery::{select_method, AuthMethod};
/// use smartgrant::settings::AuthSettings;
///
/// let security: SecurityDescription = serde_json::from_str(r#"{
///     "extension": [
///         {
///             "url": "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#authorize",
///             "valueUri": "https://auth.example.com/authorize"
///         },
///         {
///             "url": "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#token",
///             "valueUri": "https://auth.example.com/token"
///         }
///     ]
/// }"#).unwrap();
///
/// let mut settings = AuthSettings::new();
/// let method = select_method(&security, &mut settings);
///
/// assert_eq!(method, Some(AuthMethod::CodeGrant));
/// assert_eq!(settings.authorize_uri(), Some("https://auth.example.com/authorize"));
/// ```
pub fn select_method(
    security: &SecurityDescription,
    settings: &mut AuthSettings,
) -> Option<AuthMethod> {
    // TODO: select between multiple declared security services; today every
    // advertised scheme is logged and only the extension-declared OAuth
    // endpoints are acted on.
    for service in &security.service {
        for coding in &service.coding {
            tracing::debug!(
                system = coding.system.as_deref().unwrap_or("<none>"),
                code = coding.code.as_deref().unwrap_or("<none>"),
                "server declares security service"
            );
        }
    }

    let mut found_authorize = false;
    let mut found_token = false;

    for extension in &security.extension {
        let Some(value) = extension.value_uri.as_deref() else {
            continue;
        };
        match extension.url.as_str() {
            REGISTER_URI_EXTENSION => {
                settings.set(AuthSettings::REGISTRATION_URI, value);
            }
            AUTHORIZE_URI_EXTENSION => {
                settings.set(AuthSettings::AUTHORIZE_URI, value);
                found_authorize = true;
            }
            TOKEN_URI_EXTENSION => {
                settings.set(AuthSettings::TOKEN_URI, value);
                found_token = true;
            }
            _ => {}
        }
    }

    if !found_authorize {
        tracing::warn!("security description advertises no authorize endpoint; no supported authorization method");
        return None;
    }

    let method = if found_token {
        AuthMethod::CodeGrant
    } else {
        AuthMethod::ImplicitGrant
    };
    tracing::debug!(?method, "selected authorization method from conformance");
    Some(method)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::{SecurityExtension, SecurityService};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn extension(url: &str, value: Option<&str>) -> SecurityExtension {
        SecurityExtension {
            url: url.to_string(),
            value_uri: value.map(String::from),
        }
    }

    fn security_with(extensions: Vec<SecurityExtension>) -> SecurityDescription {
        SecurityDescription {
            service: Vec::new(),
            extension: extensions,
            description: None,
        }
    }

    // -----------------------------------------------------------------------
    // Decision rule
    // -----------------------------------------------------------------------

    #[test]
    fn test_both_endpoints_select_code_grant() {
        let security = security_with(vec![
            extension(AUTHORIZE_URI_EXTENSION, Some("https://a/authorize")),
            extension(TOKEN_URI_EXTENSION, Some("https://a/token")),
        ]);
        let mut settings = AuthSettings::new();

        assert_eq!(
            select_method(&security, &mut settings),
            Some(AuthMethod::CodeGrant)
        );
        assert_eq!(settings.authorize_uri(), Some("https://a/authorize"));
        assert_eq!(settings.token_uri(), Some("https://a/token"));
    }

    #[test]
    fn test_authorize_only_selects_implicit_grant() {
        let security = security_with(vec![extension(
            AUTHORIZE_URI_EXTENSION,
            Some("https://a/authorize"),
        )]);
        let mut settings = AuthSettings::new();

        assert_eq!(
            select_method(&security, &mut settings),
            Some(AuthMethod::ImplicitGrant)
        );
        assert!(settings.token_uri().is_none());
    }

    #[test]
    fn test_token_without_authorize_is_unsupported() {
        let security = security_with(vec![extension(
            TOKEN_URI_EXTENSION,
            Some("https://a/token"),
        )]);
        let mut settings = AuthSettings::new();

        assert_eq!(select_method(&security, &mut settings), None);
        // The token URI was still recorded before the decision fell through.
        assert_eq!(settings.token_uri(), Some("https://a/token"));
    }

    #[test]
    fn test_empty_description_is_unsupported() {
        let security = SecurityDescription::default();
        let mut settings = AuthSettings::new();
        assert_eq!(select_method(&security, &mut settings), None);
        assert!(settings.is_empty());
    }

    // -----------------------------------------------------------------------
    // Settings interaction
    // -----------------------------------------------------------------------

    #[test]
    fn test_registration_endpoint_is_recorded() {
        let security = security_with(vec![
            extension(REGISTER_URI_EXTENSION, Some("https://a/register")),
            extension(AUTHORIZE_URI_EXTENSION, Some("https://a/authorize")),
            extension(TOKEN_URI_EXTENSION, Some("https://a/token")),
        ]);
        let mut settings = AuthSettings::new();

        select_method(&security, &mut settings);
        assert_eq!(settings.registration_uri(), Some("https://a/register"));
    }

    #[test]
    fn test_discovery_overwrites_preseeded_settings() {
        let security = security_with(vec![
            extension(AUTHORIZE_URI_EXTENSION, Some("https://discovered/authorize")),
            extension(TOKEN_URI_EXTENSION, Some("https://discovered/token")),
        ]);
        let mut settings = AuthSettings::new();
        settings.set(AuthSettings::AUTHORIZE_URI, "https://preseeded/authorize");
        settings.set(AuthSettings::CLIENT_ID, "my-app");

        select_method(&security, &mut settings);

        // Discovered values win for discovery-owned keys; caller keys for
        // other settings are untouched.
        assert_eq!(
            settings.authorize_uri(),
            Some("https://discovered/authorize")
        );
        assert_eq!(settings.client_id(), Some("my-app"));
    }

    // -----------------------------------------------------------------------
    // Matching strictness
    // -----------------------------------------------------------------------

    #[test]
    fn test_identifier_match_is_exact_not_prefix() {
        let security = security_with(vec![extension(
            "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#authorize-v2",
            Some("https://a/authorize"),
        )]);
        let mut settings = AuthSettings::new();

        assert_eq!(select_method(&security, &mut settings), None);
        assert!(settings.authorize_uri().is_none());
    }

    #[test]
    fn test_identifier_match_is_case_sensitive() {
        let security = security_with(vec![extension(
            "http://fhir-registry.smarthealthit.org/Profile/oauth-uris#Authorize",
            Some("https://a/authorize"),
        )]);
        let mut settings = AuthSettings::new();

        assert_eq!(select_method(&security, &mut settings), None);
    }

    #[test]
    fn test_extension_without_value_uri_is_ignored() {
        let security = security_with(vec![extension(AUTHORIZE_URI_EXTENSION, None)]);
        let mut settings = AuthSettings::new();

        assert_eq!(select_method(&security, &mut settings), None);
        assert!(settings.authorize_uri().is_none());
    }

    #[test]
    fn test_unrecognized_extensions_are_ignored() {
        let security = security_with(vec![
            extension("http://example.com/unrelated", Some("https://x")),
            extension(AUTHORIZE_URI_EXTENSION, Some("https://a/authorize")),
            extension(TOKEN_URI_EXTENSION, Some("https://a/token")),
        ]);
        let mut settings = AuthSettings::new();

        assert_eq!(
            select_method(&security, &mut settings),
            Some(AuthMethod::CodeGrant)
        );
        assert!(!settings.contains("http://example.com/unrelated"));
    }

    // -----------------------------------------------------------------------
    // Services are informational only
    // -----------------------------------------------------------------------

    #[test]
    fn test_declared_services_do_not_affect_selection() {
        let security = SecurityDescription {
            service: vec![SecurityService {
                coding: vec![crate::conformance::Coding {
                    system: Some(
                        "http://terminology.hl7.org/CodeSystem/restful-security-service"
                            .to_string(),
                    ),
                    code: Some("OAuth".to_string()),
                    display: None,
                }],
                text: None,
            }],
            extension: Vec::new(),
            description: None,
        };
        let mut settings = AuthSettings::new();

        // A declared OAuth service without endpoint extensions still yields
        // no supported method.
        assert_eq!(select_method(&security, &mut settings), None);
    }
}
