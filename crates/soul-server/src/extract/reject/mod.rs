//! Drop-in replacements for axum's body, path and query extractors.
//!
//! Each wrapper converts its rejection into a handler [`Error`] so clients
//! always receive the JSON error body, and each implements
//! [`aide::OperationInput`] so routes document their inputs.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;
mod enhanced_query;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;
pub use self::validated_json::ValidateJson;

/// Shortens an error message before it is placed into a response.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_lines_and_length() {
        let message = "first\nsecond\nthird\nfourth";
        assert_eq!(sanitize_error_message(message), "first second third");

        let long = "x".repeat(500);
        assert_eq!(sanitize_error_message(&long).len(), 200);
    }
}
