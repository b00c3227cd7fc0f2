use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub barbershop: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs an HS256 token for a user. Used by tooling and tests; interactive
/// login lives outside this service.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    role: Role,
    barbershop: &str,
    ttl: Duration,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        barbershop: barbershop.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        AppError::Unauthorized
    })?;
    Ok(data.claims)
}

/// The verified caller, passed explicitly into every core operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub user_id: String,
    pub role: Role,
    pub barbershop: String,
}

impl RequestContext {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if !allowed.contains(&self.role) {
            return Err(AppError::forbidden(format!(
                "Role {} is not allowed to perform this action.",
                self.role.as_str()
            )));
        }
        Ok(())
    }
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            barbershop: claims.barbershop,
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = decode_token(&state.config.jwt_secret, token)?;
        Ok(claims.into())
    }
}

#[derive(Debug, Deserialize)]
struct TenantQuery {
    #[serde(rename = "barberShopId")]
    barber_shop_id: Option<String>,
}

/// A caller whose `barberShopId` query parameter matches their token's barbershop.
#[derive(Debug, Clone)]
pub struct TenantScoped(pub RequestContext);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for TenantScoped {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;

        let Query(query) = Query::<TenantQuery>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::bad_request("Invalid query string"))?;

        match query.barber_shop_id {
            Some(requested) if requested == ctx.barbershop => Ok(TenantScoped(ctx)),
            _ => {
                tracing::warn!(user_id = %ctx.user_id, "tenant mismatch");
                Err(AppError::forbidden("You do not have access to this barbershop."))
            }
        }
    }
}
