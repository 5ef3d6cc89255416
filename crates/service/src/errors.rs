use thiserror::Error;

/// User-facing message for a failed save.
pub const SAVE_FAILED_MSG: &str = "No se pudo guardar la información de los productos.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    DuplicateId(String),
    #[error("{0}")]
    ImmutableField(String),
    /// Writing the document failed; carries the message shown to clients.
    #[error("{0}")]
    Persistence(String),
    /// Reading the document failed for a reason other than missing/corrupt data.
    #[error("io error: {0}")]
    Io(String),
}

impl ServiceError {
    pub fn persistence() -> Self { Self::Persistence(SAVE_FAILED_MSG.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        assert_eq!(ServiceError::Validation("bad precio".into()).to_string(), "bad precio");
        assert_eq!(ServiceError::persistence().to_string(), SAVE_FAILED_MSG);
        assert_eq!(ServiceError::Io("denied".into()).to_string(), "io error: denied");
    }
}
