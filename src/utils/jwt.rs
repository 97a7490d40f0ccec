// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::user::{Role, User},
    utils::guard::Identity,
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Mints and checks signed, time-limited tokens.
///
/// The secret is handed in at construction; replacing it invalidates every
/// token issued under the previous one.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_seconds: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiration_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }

    /// Signs a new token carrying the user's id and role.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let expiration = now_seconds()? + self.expiration_seconds as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            exp: expiration,
        };

        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// Verifies and decodes a token.
    ///
    /// Expired, malformed and badly signed tokens all fail the same way.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let invalid = || AppError::AuthError("Invalid or expired token".to_string());

        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| invalid())?;

        let user_id = token_data.claims.sub.parse::<i64>().map_err(|_| invalid())?;

        Ok(Identity {
            user_id,
            role: token_data.claims.role,
        })
    }
}

fn now_seconds() -> Result<usize, AppError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header.
/// If valid, injects the caller's `Identity` into the request extensions.
/// If missing or invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(tokens): State<TokenIssuer>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token.trim(),
        None => return Err(AppError::AuthError("Missing bearer token".to_string())),
    };

    let identity = tokens.verify(token)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
