use actix_web::HttpRequest;
use jsonwebtoken::{decode, Validation, DecodingKey};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Operator id
    pub exp: usize,  // Expiration timestamp
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Claims of the `Authorization: Bearer <token>` header.
pub fn bearer_claims(req: &HttpRequest, secret: &str) -> Result<Claims, AppError> {
    let token = req.headers().get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    validate_token(token.trim(), secret)
        .map_err(|err| AppError::Unauthorized(err.to_string()))
}
