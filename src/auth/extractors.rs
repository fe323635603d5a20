use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::state::AppState;

/// Extracts and validates the access token, returning the user ID.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".to_string()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".to_string()))?;

        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

        let data = decode::<Claims>(token, &decoding, &validation).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
        })?;

        if data.claims.kind != TokenKind::Access {
            return Err((StatusCode::UNAUTHORIZED, "access token required".to_string()));
        }

        debug!(user_id = %data.claims.sub, "request authenticated");
        Ok(AuthUser(data.claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::sign;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AuthUser, (StatusCode, String)> {
        let mut builder = Request::builder().uri("/api/v1/safe-foods");
        if let Some(h) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn accepts_a_valid_access_token() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = sign(&state, user_id, TokenKind::Access);
        let AuthUser(got) = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(got, user_id);
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let state = AppState::fake();
        let (status, _) = extract(&state, None).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_other_schemes() {
        let state = AppState::fake();
        let (status, msg) = extract(&state, Some("Basic Zm9vOmJhcg==")).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "invalid auth scheme");
    }

    #[tokio::test]
    async fn rejects_refresh_tokens() {
        let state = AppState::fake();
        let token = sign(&state, Uuid::new_v4(), TokenKind::Refresh);
        let (status, msg) = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "access token required");
    }

    #[tokio::test]
    async fn rejects_tokens_for_another_audience() {
        let state = AppState::fake();
        let cfg = &state.config.jwt;
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now.unix_timestamp() as usize,
            exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
            iss: cfg.issuer.clone(),
            aud: "someone-else".into(),
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();
        let (status, _) = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
