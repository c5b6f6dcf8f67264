use crate::errors::ApiError;
use crate::models::Claims;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Matches the work factor the store was provisioned with (2^11 rounds).
const BCRYPT_COST: u32 = 11;

/// Tokens are valid for 24 hours.
const TOKEN_TTL_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    Ok(bcrypt::verify(password, hash)?)
}

pub fn create_jwt(user_id: i64, email: &str, secret: &[u8]) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).map_err(|err| {
        log::error!("failed to sign token: {err}");
        ApiError::Internal
    })
}

pub fn validate_jwt(token: &str, secret: &[u8]) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
        _ => ApiError::TokenInvalid,
    })
}
