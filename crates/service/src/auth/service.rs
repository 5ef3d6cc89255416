use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{info, instrument, warn};

use super::domain::{Claims, LoginInput};
use super::errors::AuthError;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub admin_user: String,
    pub admin_password: String,
}

/// Issues and verifies bearer tokens, independent of the web framework.
#[derive(Clone)]
pub struct AuthService {
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(cfg: AuthConfig) -> Self { Self { cfg } }

    /// Check the admin credentials and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, domain::LoginInput};
    /// let svc = AuthService::new(AuthConfig {
    ///     jwt_secret: "secret".into(),
    ///     token_ttl_secs: 3600,
    ///     admin_user: "admin".into(),
    ///     admin_password: "1234".into(),
    /// });
    /// let token = svc.login(&LoginInput { usuario: "admin".into(), password: "1234".into() }).unwrap();
    /// assert_eq!(svc.verify(&token).unwrap().sub, "admin");
    /// ```
    #[instrument(skip(self, input), fields(usuario = %input.usuario))]
    pub fn login(&self, input: &LoginInput) -> Result<String, AuthError> {
        if input.usuario != self.cfg.admin_user || input.password != self.cfg.admin_password {
            warn!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let token = self.issue(&input.usuario)?;
        info!("token issued");
        Ok(token)
    }

    /// Sign a token for `sub` valid for the configured TTL.
    pub fn issue(&self, sub: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: sub.to_string(),
            usuario: sub.to_string(),
            iat: now,
            exp: now + self.cfg.token_ttl_secs as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Verify signature and expiry (no leeway) and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Token(e.to_string()))
    }
}
