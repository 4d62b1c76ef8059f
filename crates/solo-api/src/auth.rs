//! Session token authentication.
//!
//! Tokens are HS256 JWTs signed with the server secret and carried in the
//! `token` cookie. Only `GET /bids/:email` requires one.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Rejection message when no token is presented.
pub const MISSING_TOKEN_MESSAGE: &str = "Unauthorized access!!";

/// Rejection message when the token does not verify.
pub const INVALID_TOKEN_MESSAGE: &str = "Unauthorized access";

/// Rejection message when the token belongs to someone else.
pub const FORBIDDEN_MESSAGE: &str = "Forbidden access!!";

/// Claims embedded in a session token.
///
/// Anything the client sent alongside `email` at issue time is carried in
/// `extra` and comes back verbatim on verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cookie attributes for the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// Cross-site secure cookies in production, strict same-site otherwise.
    pub fn for_production(production: bool) -> Self {
        if production {
            Self {
                secure: true,
                same_site: SameSite::None,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Strict,
            }
        }
    }
}

/// Issues and verifies session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    policy: CookiePolicy,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration, policy: CookiePolicy) -> Self {
        // Extra claims are client-chosen; an `aud` among them must not fail verification.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            policy,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            &config.token_secret,
            config.token_ttl,
            CookiePolicy::for_production(config.is_production()),
        )
    }

    pub fn policy(&self) -> CookiePolicy {
        self.policy
    }

    /// Sign a token for `email`, carrying `extra` claims along.
    pub fn issue(&self, email: &str, mut extra: Map<String, Value>) -> Result<String, ApiError> {
        for reserved in ["email", "iat", "exp"] {
            extra.remove(reserved);
        }

        let iat = Utc::now().timestamp();
        let claims = TokenClaims {
            email: email.to_string(),
            iat,
            exp: iat + self.ttl.as_secs() as i64,
            extra,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))?;

        metrics::record_token_issued();
        Ok(token)
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, ApiError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                metrics::record_auth_failure("invalid");
                ApiError::unauthorized(INVALID_TOKEN_MESSAGE)
            })
    }

    /// The `token` cookie carrying `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(self.policy.same_site)
            .path("/")
            .build()
    }

    /// A cookie that clears the session cookie in the browser.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

/// Authenticated user extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub claims: TokenClaims,
}

impl AuthUser {
    /// Require that the token belongs to `email`.
    pub fn ensure_email(&self, email: &str) -> Result<(), ApiError> {
        if self.email == email {
            Ok(())
        } else {
            metrics::record_auth_failure("forbidden");
            Err(ApiError::forbidden(FORBIDDEN_MESSAGE))
        }
    }
}

impl From<TokenClaims> for AuthUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            email: claims.email.clone(),
            claims,
        }
    }
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                metrics::record_auth_failure("missing");
                ApiError::unauthorized(MISSING_TOKEN_MESSAGE)
            })?;

        let claims = state.tokens.verify(&token)?;

        Ok(AuthUser::from(claims))
    }
}
