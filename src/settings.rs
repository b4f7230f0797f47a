//! Authorization settings management
//!
//! This module handles the string-keyed settings map that configures an
//! authorization session: partially supplied by the caller (client id,
//! display title), partially written by conformance endpoint discovery
//! (registration, authorize, and token URIs).
//!
//! Settings can also be loaded from a YAML file so client applications can
//! preseed the caller-supplied half from configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartGrantError};

/// String-keyed authorization settings.
///
/// A thin wrapper over a name → value map with typed accessors for the
/// recognized keys. Endpoint discovery writes the discovered URIs directly
/// into this map, so caller-preseeded values for the same keys are
/// overwritten by discovery. That precedence is part of the contract;
/// preseed only the keys discovery does not produce (client id, title) when
/// discovery is in use.
///
/// # Examples
///
/// ```
/// use smartgrant::settings::AuthSettings;
///
/// let mut settings = AuthSettings::new();
/// settings.set(AuthSettings::CLIENT_ID, "growth-chart-app");
/// settings.set(AuthSettings::TITLE, "Growth Chart");
///
/// assert_eq!(settings.client_id(), Some("growth-chart-app"));
/// assert_eq!(settings.get("title"), Some("Growth Chart"));
/// assert!(settings.authorize_uri().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthSettings(HashMap<String, String>);

impl AuthSettings {
    /// OAuth2 client identifier.
    pub const CLIENT_ID: &'static str = "client_id";

    /// Dynamic client registration endpoint URI.
    pub const REGISTRATION_URI: &'static str = "registration_uri";

    /// Authorization endpoint URI.
    pub const AUTHORIZE_URI: &'static str = "authorize_uri";

    /// Token endpoint URI.
    pub const TOKEN_URI: &'static str = "token_uri";

    /// Human-readable title shown during authorization.
    pub const TITLE: &'static str = "title";

    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`, overwriting any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns `true` when `key` has a value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns `true` when no settings are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The configured OAuth2 client identifier.
    pub fn client_id(&self) -> Option<&str> {
        self.get(Self::CLIENT_ID)
    }

    /// The discovered dynamic registration endpoint.
    pub fn registration_uri(&self) -> Option<&str> {
        self.get(Self::REGISTRATION_URI)
    }

    /// The discovered authorization endpoint.
    pub fn authorize_uri(&self) -> Option<&str> {
        self.get(Self::AUTHORIZE_URI)
    }

    /// The discovered token endpoint.
    pub fn token_uri(&self) -> Option<&str> {
        self.get(Self::TOKEN_URI)
    }

    /// The display title for the authorization UI.
    pub fn title(&self) -> Option<&str> {
        self.get(Self::TITLE)
    }

    /// Loads settings from a YAML file.
    ///
    /// The file is a flat string-to-string mapping:
    ///
    /// ```yaml
    /// client_id: growth-chart-app
    /// title: Growth Chart
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SmartGrantError::Io`] when the file cannot be read and
    /// [`SmartGrantError::Yaml`] when it is not a flat string mapping.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(SmartGrantError::Io)?;
        let settings: AuthSettings =
            serde_yaml::from_str(&contents).map_err(SmartGrantError::Yaml)?;
        Ok(settings)
    }

    /// Validates the endpoint settings.
    ///
    /// Each of the three endpoint keys that is present must hold an absolute
    /// URL. Absent keys are fine; which ones are required depends on the
    /// selected authorization method and is checked at engine configuration
    /// time, not here.
    ///
    /// # Errors
    ///
    /// Returns [`SmartGrantError::Configuration`] naming the first offending
    /// key.
    pub fn validate(&self) -> Result<()> {
        for key in [
            Self::REGISTRATION_URI,
            Self::AUTHORIZE_URI,
            Self::TOKEN_URI,
        ] {
            if let Some(value) = self.get(key) {
                url::Url::parse(value).map_err(|e| {
                    SmartGrantError::Configuration(format!("{key} is not a valid URL: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

impl From<HashMap<String, String>> for AuthSettings {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
