use validator::Validate;

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Emails are stored trimmed and lowercased so lookups are stable.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims the value; blank strings become `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
