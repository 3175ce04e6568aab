use std::str::FromStr;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub exp: u64,
    pub user_id: String,
    pub username: String,
    /// Per-session authenticity token; every draft save must echo it.
    pub edit_token: String,
}

/// Claims of the host wiki calling the lifecycle hooks. Signed with the
/// hook key, never with the key used for editors.
#[derive(Debug, Serialize, Deserialize)]
pub struct HostClaims {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub exp: u64,
    pub service: String,
}

#[derive(Debug, Clone)]
pub struct Host {
    pub service: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub edit_token: Secret<String>,
}

pub async fn auth_middleware(
    State(signing_key): State<Secret<String>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::AuthError("bearer token missing".to_string()))?;

    let token = decode_jwt::<Claims>(bearer.token(), &signing_key).map_err(|e| {
        tracing::error!(?e, "JWT decoding error");
        ApiError::AuthError("invalid token".to_string())
    })?;

    let id = Uuid::from_str(&token.claims.user_id).map_err(|e| {
        tracing::error!(?e, user_id = %token.claims.user_id, "JWT carries malformed user id");
        ApiError::AuthError("invalid token".to_string())
    })?;

    let user = User {
        id,
        username: token.claims.username,
        edit_token: Secret::new(token.claims.edit_token),
    };
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

pub async fn host_middleware(
    State(hook_key): State<Secret<String>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::AuthError("bearer token missing".to_string()))?;

    let token = decode_jwt::<HostClaims>(bearer.token(), &hook_key).map_err(|e| {
        tracing::warn!(?e, "rejected hook call without a valid host token");
        ApiError::AuthError("invalid host token".to_string())
    })?;

    req.extensions_mut().insert(Host {
        service: token.claims.service,
    });

    Ok(next.run(req).await)
}

fn decode_jwt<T: DeserializeOwned>(
    token: &str,
    signing_key: &Secret<String>,
) -> jsonwebtoken::errors::Result<TokenData<T>> {
    decode(
        token,
        &DecodingKey::from_secret(signing_key.expose_secret().as_ref()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
}
