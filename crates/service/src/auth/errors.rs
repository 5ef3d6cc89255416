use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    /// Signature, format or expiry check failed.
    #[error("token error: {0}")]
    Token(String),
}
