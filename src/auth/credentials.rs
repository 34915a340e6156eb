//! Client credentials, scopes and access tokens.
//!
//! Secrets are held in [`SecretString`] so they are redacted from `Debug`
//! output and never end up in logs.

use crate::core::address::ServiceAddress;

use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeSet;
use std::fmt;

/// Audience for clients created locally on the scanning node.
pub const LOCALLY_MANAGED_CLIENT_AUDIENCE: &str = "f-secure-atlant";

/// Audience for clients created with the central management console.
pub const POLICY_MANAGER_MANAGED_CLIENT_AUDIENCE: &str = "policy-manager";

/// An OAuth2 scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Submit content for scanning.
    Scan,
    /// Manage the scanning node.
    Management,
}

impl Scope {
    /// Returns the wire name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Management => "management",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client credentials for the token endpoint.
pub struct Credentials {
    /// Address of the authorization service.
    pub service_address: ServiceAddress,
    /// OAuth2 client id.
    pub client_id: String,
    client_secret: SecretString,
    /// Requested scopes. Empty means the `scope` field is omitted.
    pub scopes: BTreeSet<Scope>,
    /// Token audience.
    pub audience: String,
}

impl Credentials {
    /// Creates credentials with no scopes and the locally managed audience.
    pub fn new(
        service_address: impl Into<ServiceAddress>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            service_address: service_address.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            scopes: BTreeSet::new(),
            audience: LOCALLY_MANAGED_CLIENT_AUDIENCE.to_string(),
        }
    }

    /// Adds a scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.insert(scope);
        self
    }

    /// Replaces the scopes.
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    /// Sets the token audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Returns the space-joined scope string, or `None` if no scopes are set.
    pub fn scope_string(&self) -> Option<String> {
        if self.scopes.is_empty() {
            return None;
        }
        Some(
            self.scopes
                .iter()
                .map(Scope::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Builds the form fields of a client-credentials token request.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            (
                "client_secret".to_string(),
                self.client_secret.expose_secret().to_string(),
            ),
            ("audience".to_string(), self.audience.clone()),
        ];
        if let Some(scope) = self.scope_string() {
            fields.push(("scope".to_string(), scope));
        }
        fields
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("service_address", &self.service_address)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("audience", &self.audience)
            .finish()
    }
}

/// A bearer access token.
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wraps a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Returns the token value.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for AccessToken {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_without_scopes() {
        let credentials = Credentials::new("auth.example", "client-1", "s3cret");
        let fields = credentials.form_fields();
        assert_eq!(
            fields,
            vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("client_id".to_string(), "client-1".to_string()),
                ("client_secret".to_string(), "s3cret".to_string()),
                ("audience".to_string(), "f-secure-atlant".to_string()),
            ]
        );
    }

    #[test]
    fn test_scopes_are_space_joined() {
        let credentials = Credentials::new("auth.example", "client-1", "s3cret")
            .with_scopes([Scope::Management, Scope::Scan]);
        assert_eq!(credentials.scope_string().as_deref(), Some("scan management"));
        assert!(credentials
            .form_fields()
            .contains(&("scope".to_string(), "scan management".to_string())));
    }

    #[test]
    fn test_secrets_redacted_from_debug() {
        let credentials = Credentials::new("auth.example", "client-1", "s3cret");
        assert!(!format!("{:?}", credentials).contains("s3cret"));

        let token = AccessToken::new("tok-123");
        assert!(!format!("{:?}", token).contains("tok-123"));
        assert_eq!(token.clone().expose_secret(), "tok-123");
    }

    #[test]
    fn test_audience_override() {
        let credentials = Credentials::new("auth.example", "c", "s")
            .with_audience(POLICY_MANAGER_MANAGED_CLIENT_AUDIENCE);
        assert!(credentials
            .form_fields()
            .contains(&("audience".to_string(), "policy-manager".to_string())));
    }
}
