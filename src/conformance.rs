//! Conformance security description input types
//!
//! This module models the slice of a FHIR `CapabilityStatement.rest[].security`
//! element that SMART-on-FHIR endpoint discovery operates on: the declared
//! security services (used for informational logging only) and the flat list
//! of identifier/value extensions carrying the OAuth endpoint URIs.
//!
//! Parsing a full CapabilityStatement is out of scope; callers hand the
//! already-extracted security element to [`select_method`](crate::discovery::select_method).
//! Field names follow the FHIR JSON representation so a real security element
//! deserializes directly.
//!
//! # References
//!
//! - FHIR CapabilityStatement <https://hl7.org/fhir/capabilitystatement.html>
//! - SMART App Launch conformance <http://docs.smarthealthit.org/>

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Coding / SecurityService
// ---------------------------------------------------------------------------

/// A single FHIR coding as it appears in `security.service[].coding[]`.
///
/// All fields are optional in FHIR; servers commonly populate `system` and
/// `code` (e.g. code `SMART-on-FHIR` from the restful-security-service code
/// system).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coding {
    /// The code system URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The symbol defined by the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable representation of the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A declared security service (`security.service[]`).
///
/// Services carry coded identifiers naming the authorization scheme in use.
/// Discovery logs them for diagnostics but does not branch on them; the
/// endpoint extensions are the operative signal.
///
/// # Examples
///
/// ```
/// use smartgrant::conformance::SecurityService;
///
/// let json = r#"{
///     "coding": [{
///         "system": "http://terminology.hl7.org/CodeSystem/restful-security-service",
///         "code": "SMART-on-FHIR"
///     }],
///     "text": "OAuth2 using SMART-on-FHIR profile"
/// }"#;
///
/// let service: SecurityService = serde_json::from_str(json).unwrap();
/// assert_eq!(service.coding[0].code.as_deref(), Some("SMART-on-FHIR"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityService {
    /// Coded identifiers for the scheme.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    /// Plain-text description of the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// SecurityExtension / SecurityDescription
// ---------------------------------------------------------------------------

/// An identifier/value extension on the security element.
///
/// SMART servers advertise their OAuth endpoints as extensions whose `url`
/// is one of three well-known identifiers and whose `valueUri` is the
/// endpoint location. Extensions with unrecognized identifiers are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityExtension {
    /// The extension identifier, matched exactly against the well-known
    /// SMART OAuth URI identifiers.
    pub url: String,

    /// The URI value carried by the extension.
    #[serde(
        default,
        rename = "valueUri",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_uri: Option<String>,
}

/// The security element of a server's conformance REST description.
///
/// # Examples
///
/// ```
/// use smartgrant::conformance::SecurityDescription;
///
/// let json = r#"{
///     "service": [{"coding": [{"code": "SMART-on-FHIR"}]}],
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
/// }"#;
///
/// let security: SecurityDescription = serde_json::from_str(json).unwrap();
/// assert_eq!(security.extension.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityDescription {
    /// Declared security services.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<SecurityService>,

    /// Identifier/value extensions, including the SMART OAuth URI markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<SecurityExtension>,

    /// Human-readable description of the security arrangements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
