//! HS256 bearer token codec.

use chrono::{Duration, TimeZone, Utc};
use clinic_application::{AUTHENTICATION_REQUIRED, IssuedToken, TokenCodec};
use clinic_core::{AppError, AppResult, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Minimum accepted signing secret length in bytes.
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens carrying only the user identifier.
///
/// Roles and permissions are never embedded in the token. They are resolved
/// again on every request.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    time_to_live: Duration,
}

impl JwtTokenCodec {
    /// Creates a codec from a shared secret and token lifetime.
    pub fn new(secret: &str, time_to_live: Duration) -> AppResult<Self> {
        if secret.len() < MIN_TOKEN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "token secret must be at least {MIN_TOKEN_SECRET_LENGTH} bytes"
            )));
        }
        if time_to_live <= Duration::zero() {
            return Err(AppError::Validation(
                "token lifetime must be positive".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            time_to_live,
        })
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user_id: UserId) -> AppResult<IssuedToken> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.time_to_live;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at);

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> AppResult<UserId> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|error| {
                tracing::debug!(error = %error, "bearer token rejected");
                AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_owned())
            })?
            .claims;

        UserId::parse(claims.sub.as_str())
            .map_err(|_| AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_owned()))
    }
}
