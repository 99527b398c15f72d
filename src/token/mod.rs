mod cache;
pub mod codec;
mod policy;
mod provider;

pub use cache::TokenCache;
pub use codec::TokenClaims;
pub use policy::RefreshPolicy;
pub use provider::CredentialProvider;
