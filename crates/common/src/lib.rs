//! Shared helpers for the API binaries: logging setup, runtime environment
//! checks and small wire types reused across crates.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_body_serializes_under_error_key() {
        let body = serde_json::to_value(types::ErrorBody::new("boom")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "boom"}));
    }
}
