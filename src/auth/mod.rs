//! Authentication against the authorization service.
//!
//! - [`credentials`] - Client credentials, scopes and access tokens
//! - [`token`] - The client-credentials token exchange

pub mod credentials;
pub mod token;

pub use credentials::{
    AccessToken, Credentials, Scope, LOCALLY_MANAGED_CLIENT_AUDIENCE,
    POLICY_MANAGER_MANAGED_CLIENT_AUDIENCE,
};
pub use token::TokenProvider;
