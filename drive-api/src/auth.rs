use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::AppError;

// ============================================================================
// Hold Token Claims
// ============================================================================

/// Proof that the caller placed a given soft hold. Issued with the hold,
/// required to convert it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HoldClaims {
    pub sub: String,
    pub car: String,
    pub exp: usize,
}

pub fn issue_hold_token(
    secret: &str,
    hold_id: Uuid,
    car_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let claims = HoldClaims {
        sub: hold_id.to_string(),
        car: car_id.to_string(),
        exp: expires_at.timestamp().max(0) as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

/// Checks the signature and that the token names `hold_id`. Expiry is
/// left to the hold ledger, which judges it against the server clock.
pub fn verify_hold_token(secret: &str, token: &str, hold_id: Uuid) -> Result<HoldClaims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let token_data = decode::<HoldClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|_| AppError::AuthenticationError("Invalid hold token".to_string()))?;

    if token_data.claims.sub != hold_id.to_string() {
        return Err(AppError::AuthorizationError(
            "Hold token was issued for another reservation".to_string(),
        ));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hold_token_round_trip() {
        let hold_id = Uuid::new_v4();
        let expires = Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap();
        let token = issue_hold_token("secret", hold_id, "12", expires).unwrap();

        let claims = verify_hold_token("secret", &token, hold_id).unwrap();
        assert_eq!(claims.car, "12");
        assert_eq!(claims.exp, expires.timestamp() as usize);
    }

    #[test]
    fn test_hold_token_rejects_other_hold_or_key() {
        let hold_id = Uuid::new_v4();
        let expires = Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap();
        let token = issue_hold_token("secret", hold_id, "12", expires).unwrap();

        assert!(matches!(
            verify_hold_token("secret", &token, Uuid::new_v4()),
            Err(AppError::AuthorizationError(_))
        ));
        assert!(matches!(
            verify_hold_token("other", &token, hold_id),
            Err(AppError::AuthenticationError(_))
        ));
    }
}
