use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn issue_token_pair(user_id: Uuid, role: &str) -> Result<TokenPair> {
    let config = get_config();
    let now = Utc::now();

    let access_claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::minutes(config.access_token_ttl_minutes)).timestamp() as usize,
        role: Some(role.to_string()),
        token_type: Some("access".to_string()),
    };
    let refresh_claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::days(config.refresh_token_ttl_days)).timestamp() as usize,
        role: Some(role.to_string()),
        token_type: Some("refresh".to_string()),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let access_token = encode(&Header::default(), &access_claims, &key)
        .map_err(|e| Error::Internal(format!("Failed to sign access token: {}", e)))?;
    let refresh_token = encode(&Header::default(), &refresh_claims, &key)
        .map_err(|e| Error::Internal(format!("Failed to sign refresh token: {}", e)))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

pub fn issue_access_token(user_id: Uuid, role: &str) -> Result<String> {
    let config = get_config();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::minutes(config.access_token_ttl_minutes)).timestamp() as usize,
        role: Some(role.to_string()),
        token_type: Some("access".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign access token: {}", e)))
}

pub fn decode_token(token: &str) -> Result<Claims> {
    let config = get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("Invalid token".to_string()))?;
    Ok(data.claims)
}
