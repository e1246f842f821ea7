#[cfg(test)]
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
#[cfg(test)]
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Claims of an operator session token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Operator ID
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn operator_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidSubject)
    }
}

/// Sign a token for an operator. The dashboard only validates tokens; this
/// mirrors what the identity provider issues.
#[cfg(test)]
pub fn generate_token(
    operator_id: &Uuid,
    secret: &str,
    ttl: Duration,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: operator_id.to_string(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token and extract its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| JwtError::InvalidToken)?;

    Ok(token_data.claims)
}

#[derive(Debug, PartialEq)]
pub enum JwtError {
    InvalidToken,
    InvalidSubject,
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtError::InvalidToken => write!(f, "Invalid or expired JWT token"),
            JwtError::InvalidSubject => write!(f, "Token subject is not an operator id"),
        }
    }
}
