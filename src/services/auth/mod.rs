pub mod credentials;
pub mod factory;
pub mod policy;
pub mod token;

pub use credentials::CredentialStore;
pub use factory::{build_credential_store, build_token_service};
pub use policy::{AuthorizationPolicy, Decision};
pub use token::{TokenError, TokenService};
