use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// JWT payload. Nothing but the caller's identity and expiry is carried;
/// rotating the signing secret invalidates every outstanding token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub id: Uuid,    // user id
    pub exp: usize,  // expires at (unix timestamp)
}

/// Authentication failures. All of them surface as 401 with one external
/// message; the variant is kept for logs and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("invalid authorization scheme")]
    InvalidScheme,
    #[error("token signature rejected")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token claims incomplete")]
    MalformedClaims,
    #[error("invalid username or password")]
    InvalidCredentials,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl From<JwtConfig> for JwtKeys {
    fn from(config: JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::minutes(config.ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from(state.config.jwt.clone())
    }
}

impl JwtKeys {
    pub fn sign(&self, username: &str, user_id: Uuid) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + self.ttl;
        let claims = Claims {
            sub: username.to_string(),
            id: user_id,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        // no leeway: a ttl-0 token must read as expired on the next call
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                // absent sub/id fails claim deserialization
                ErrorKind::Json(_) => AuthError::MalformedClaims,
                _ => AuthError::InvalidSignature,
            }
        })?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and validates the bearer token, yielding the caller's identity.
#[derive(Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?;

        let claims = keys.verify(token)?;
        Ok(AuthUser {
            id: claims.id,
            username: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn make_keys(secret: &str, ttl_minutes: i64) -> JwtKeys {
        JwtKeys::from(JwtConfig {
            secret: secret.into(),
            ttl_minutes,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", 20);
        let user_id = Uuid::new_v4();
        let token = keys.sign("alice", user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.id, user_id);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("secret-a", 20);
        let other = make_keys("secret-b", 20);
        let token = keys.sign("alice", Uuid::new_v4()).expect("sign");
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn verify_rejects_past_expiry() {
        let keys = make_keys("dev-secret", 20);
        let claims = Claims {
            sub: "alice".into(),
            id: Uuid::new_v4(),
            exp: (OffsetDateTime::now_utc() - Duration::minutes(5)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn zero_ttl_token_expires_by_the_next_call() {
        let keys = make_keys("dev-secret", 0);
        let token = keys.sign("alice", Uuid::new_v4()).expect("sign");
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(keys.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn verify_rejects_missing_id_claim() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: usize,
        }
        let keys = make_keys("dev-secret", 20);
        let claims = Partial {
            sub: "alice".into(),
            exp: (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(AuthError::MalformedClaims));
    }

    #[tokio::test]
    async fn extractor_resolves_identity_from_bearer_header() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign("alice", user_id).expect("sign");

        let (mut parts, _) = Request::builder()
            .uri("/habits")
            .header("authorization", format!("Bearer {token}"))
            .body(())
            .expect("request")
            .into_parts();

        let auth = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(auth.id, user_id);
        assert_eq!(auth.username, "alice");
    }

    #[tokio::test]
    async fn extractor_rejects_missing_header_with_401() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder()
            .uri("/habits")
            .body(())
            .expect("request")
            .into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect_err("must reject");
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
