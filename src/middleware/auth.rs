use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const STAFF_ROLES: [&str; 2] = ["admin", "hr"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Verification key for staff bearer tokens, built once from the configured
/// secret.
#[derive(Clone)]
pub struct AuthKeys {
    decoding: Arc<DecodingKey>,
}

impl AuthKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

/// Admits requests carrying a valid HS256 bearer token whose role is `admin`
/// or `hr`. The decoded claims are stored in the request extensions.
pub async fn require_staff(
    State(keys): State<AuthKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".into()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".into()))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))?;

    let claims = keys
        .verify(token.trim())
        .ok_or_else(|| Error::Unauthorized("invalid_token".into()))?;

    let role = claims.role.clone().unwrap_or_default();
    if !STAFF_ROLES.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        return Err(Error::Forbidden("forbidden".into()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
