mod identity_verifier;
mod jwt_verifier;

pub use identity_verifier::*;
pub use jwt_verifier::*;
