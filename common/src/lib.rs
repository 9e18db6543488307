pub mod config;
pub mod logger;

use validator::ValidationErrors;

/// Flattens every field message of a failed validation into one `; `-joined line.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}
