//! SmartGrant - SMART-on-FHIR client authorization library
//!
//! This library selects and drives an OAuth2 authorization flow for a client
//! application talking to a FHIR server whose security requirements are
//! published in its conformance (CapabilityStatement) security description.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conformance`: input types for the server's security description
//! - `discovery`: endpoint discovery and authorization method selection
//! - `scope`: access-context granularity and scope composition
//! - `settings`: the string-keyed authorization settings map
//! - `engine`: the protocol engine capability interface (token exchange,
//!   URL building, request signing live behind it)
//! - `bridge`: the presentation boundary (browser, embedded view, native
//!   patient picker)
//! - `session`: the authorization attempt state machine
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use smartgrant::{
//!     AccessContextGranularity, AuthSettings, AuthorizationSession, AuthorizeProperties,
//!     EngineFactory, SecurityDescription, SystemBrowser,
//! };
//!
//! async fn authorize_against(
//!     security: &SecurityDescription,
//!     factory: &dyn EngineFactory,
//! ) -> anyhow::Result<()> {
//!     let mut settings = AuthSettings::new();
//!     settings.set(AuthSettings::CLIENT_ID, "growth-chart-app");
//!
//!     let Some(mut session) =
//!         AuthorizationSession::from_security(security, settings, Box::new(SystemBrowser))
//!     else {
//!         // The server advertises no supported authorization method.
//!         return Ok(());
//!     };
//!     session.configure_with(factory)?;
//!
//!     session
//!         .authorize(
//!             AuthorizeProperties {
//!                 granularity: AccessContextGranularity::LaunchContext,
//!                 embedded: false,
//!             },
//!             Box::new(|parameters, error| match (parameters, error) {
//!                 (Some(parameters), None) => println!("authorized: {parameters:?}"),
//!                 (None, Some(error)) => eprintln!("authorization failed: {error}"),
//!                 _ => eprintln!("authorization cancelled"),
//!             }),
//!         )
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod conformance;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod scope;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use bridge::{AuthContext, RedirectBridge, SystemBrowser};
pub use conformance::{Coding, SecurityDescription, SecurityExtension, SecurityService};
pub use discovery::{select_method, AuthMethod};
pub use engine::{AuthParameters, EngineFactory, ProtocolEngine, RedirectResult, SignedRequest};
pub use error::{Result, SmartGrantError};
pub use scope::{compose, AccessContextGranularity, DEFAULT_SCOPE};
pub use session::{AuthCallback, AuthorizationSession, AuthorizeProperties};
pub use settings::AuthSettings;
