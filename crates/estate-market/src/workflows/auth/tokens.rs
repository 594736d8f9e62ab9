use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::workflows::identity::{Principal, RoleName};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign access token: {0}")]
    Signing(String),
    #[error("access token is invalid: {0}")]
    Invalid(String),
    #[error("access token has expired")]
    Expired,
}

impl TokenError {
    /// Whether the failure lies with the presented token rather than the issuer.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TokenError::Signing(_))
    }
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub user_id: i64,
    pub email: String,
    pub roles: Vec<RoleName>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

pub trait TokenIssuer: Send + Sync {
    fn issue_access_token(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, TokenError>;

    fn verify_access_token(&self, token: &str, now: DateTime<Utc>)
        -> Result<TokenClaims, TokenError>;
}

/// HS256 issuer. Expiry is checked against the injected instant, not the wall clock.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, issuer: String, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.issuer.clone(),
            Duration::seconds(config.access_token_ttl_secs),
        )
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_access_token(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, TokenError> {
        let claims = TokenClaims {
            sub: principal.email.clone(),
            user_id: principal.user_id.0,
            email: principal.email.clone(),
            roles: principal.roles.iter().copied().collect(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok(AccessToken {
            token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    fn verify_access_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| TokenError::Invalid(err.to_string()))?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::identity::UserId;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn principal() -> Principal {
        Principal {
            user_id: UserId(42),
            email: "seller@x.com".into(),
            roles: BTreeSet::from([RoleName::User, RoleName::Seller]),
        }
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).single().expect("valid instant")
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let issuer = JwtTokenIssuer::new("test-secret", "estate-market".into(), Duration::hours(24));
        let access = issuer.issue_access_token(&principal(), instant()).expect("token issues");
        assert_eq!(access.expires_in, 86_400);

        let claims = issuer
            .verify_access_token(&access.token, instant() + Duration::hours(1))
            .expect("token verifies");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "seller@x.com");
        assert_eq!(claims.roles, vec![RoleName::User, RoleName::Seller]);
        assert_eq!(claims.iss, "estate-market");
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = JwtTokenIssuer::new("test-secret", "estate-market".into(), Duration::hours(1));
        let access = issuer.issue_access_token(&principal(), instant()).expect("token issues");
        let result = issuer.verify_access_token(&access.token, instant() + Duration::minutes(61));
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn foreign_secret_or_issuer_is_rejected() {
        let ours = JwtTokenIssuer::new("secret-one", "estate-market".into(), Duration::hours(1));
        let theirs = JwtTokenIssuer::new("secret-two", "estate-market".into(), Duration::hours(1));
        let other_issuer = JwtTokenIssuer::new("secret-one", "elsewhere".into(), Duration::hours(1));

        let access = ours.issue_access_token(&principal(), instant()).expect("token issues");
        assert!(matches!(
            theirs.verify_access_token(&access.token, instant()),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            other_issuer.verify_access_token(&access.token, instant()),
            Err(TokenError::Invalid(_))
        ));
        assert!(ours.verify_access_token("not-a-jwt", instant()).is_err());
    }
}
