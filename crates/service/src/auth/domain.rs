use serde::{Deserialize, Serialize};

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub usuario: String,
    pub password: String,
}

/// Login result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginOutput {
    pub token: String,
}

/// Claims carried by issued tokens. `usuario` mirrors `sub` so clients that
/// read the user from `usuario` keep working; tokens carrying only one of the
/// two still verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub usuario: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    /// The authenticated user, whichever claim carried it.
    pub fn user(&self) -> &str {
        if self.sub.is_empty() { &self.usuario } else { &self.sub }
    }
}
