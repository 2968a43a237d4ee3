use crate::error::AppError;
use crate::models::Role;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i32,
    /// Role the token was issued for.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues a signed session token for a user.
///
/// The signing secret and lifetime come from [`crate::config::Config`]; this
/// function never touches the environment.
pub fn generate_token(
    user_id: i32,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(ttl_hours))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a session token's signature and expiry and decodes its claims.
///
/// Every failure mode (malformed, bad signature, expired) surfaces as the
/// same generic `Unauthorized` so callers cannot probe token state.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";

    #[test]
    fn test_token_generation_and_verification() {
        let token = generate_token(1, Role::User, SECRET, 24).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_token_carries_admin_role() {
        let token = generate_token(7, Role::Admin, SECRET, 24).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_is_generic_unauthorized() {
        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: 2,
            role: Role::User,
            exp: expiration,
        };
        let expired_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        match verify_token(&expired_token, SECRET) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Unauthenticated"),
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_wrong_secret_is_generic_unauthorized() {
        let token = generate_token(3, Role::User, SECRET, 24).unwrap();

        // Same generic answer as the expired case above: no oracle.
        match verify_token(&token, "a_completely_different_secret") {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Unauthenticated"),
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_generic_unauthorized() {
        match verify_token("not-a-token", SECRET) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Unauthenticated"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
