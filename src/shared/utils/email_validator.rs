use crate::domain::errors::FieldError;

/// Validate an email address and normalise it to trimmed lowercase.
pub fn validate_and_normalize_email(email: &str) -> Result<String, FieldError> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(FieldError::new(
            "email",
            "Invalid email format. Must be in format user@domain.tld",
        ));
    }

    // email_address accepts dotless domains; a TLD is required here
    if let Some(at_pos) = trimmed.find('@') {
        let domain_part = &trimmed[at_pos + 1..];
        if !domain_part.contains('.') {
            return Err(FieldError::new(
                "email",
                "Invalid email format. Domain must include a TLD (e.g., .com, .org)",
            ));
        }
    }

    Ok(trimmed.to_lowercase())
}
