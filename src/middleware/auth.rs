use axum::{
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::Settings,
    models::{AuthContext, Role},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id
    pub sub: String,
    pub role: String,
    pub verification_status: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

/// Signs a token the way the external identity system would. Used by tests
/// and local development; the server itself only ever decodes.
pub fn issue_token(
    settings: &Settings,
    uid: &str,
    role: Role,
    verification_status: &str,
    days: i64,
) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: uid.to_string(),
        role: role.as_str().to_string(),
        verification_status: verification_status.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

fn get_bearer(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

pub async fn inject_auth_context(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(token) = get_bearer(req.headers()) {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
            &validation,
        );

        if let Ok(data) = decoded {
            if let Some(role) = Role::parse(&data.claims.role) {
                // Store the caller's identity in request extensions so
                // handlers can access it
                req.extensions_mut().insert(AuthContext {
                    uid: data.claims.sub,
                    role,
                    verification_status: data.claims.verification_status,
                });
            }
        }
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/health"
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_public_path(path) {
        return next.run(req).await;
    }

    // If inject_auth_context already put AuthContext in extensions => authenticated
    if req.extensions().get::<AuthContext>().is_some() {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": "missing or invalid credentials" })),
    )
        .into_response()
}
