use crate::auth::IdentityVerifier;
use async_trait::async_trait;
use huddle_core::{JoinRejection, ParticipantId, ParticipantIdentity};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Participant id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: u64,
}

/// HS256 verifier for the tokens issued at login.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<ParticipantIdentity, JoinRejection> {
        let token = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Rejected credential: {}", e);
                JoinRejection::InvalidCredential
            })?;

        let claims = token.claims;
        if claims.id.trim().is_empty() {
            return Err(JoinRejection::InvalidCredential);
        }

        Ok(ParticipantIdentity {
            participant_id: ParticipantId(claims.id),
            display_name: claims
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_USER.to_owned()),
        })
    }
}

/// Mint a token `JwtVerifier::new(secret)` accepts for `ttl`.
pub fn issue_token(
    secret: &str,
    id: &str,
    name: Option<&str>,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        id: id.to_owned(),
        name: name.map(str::to_owned),
        exp: jsonwebtoken::get_current_timestamp().saturating_add(ttl.as_secs()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
