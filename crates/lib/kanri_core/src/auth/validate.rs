//! Registration payload validation.

/// Validate a registration payload, collecting every failing field.
///
/// Returns the list of human-readable messages; empty means valid.
pub fn validate_registration(
    name: &str,
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Vec<String> {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push("Name is required".to_string());
    } else if !(3..=30).contains(&name.chars().count()) {
        errors.push("Name must be between 3 and 30 characters".to_string());
    }

    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else if !(5..=30).contains(&username.chars().count()) {
        errors.push("Username must be between 5 and 30 characters".to_string());
    }

    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(email) {
        errors.push("Email is not valid".to_string());
    }

    if password.is_empty() {
        errors.push("Password is required".to_string());
    } else if !(8..=30).contains(&password.chars().count()) {
        errors.push("Password must be between 8 and 30 characters".to_string());
    } else if !is_strong_password(password) {
        errors.push(
            "Password must contain uppercase, lowercase, number, and special character"
                .to_string(),
        );
    }

    if confirm_password.is_empty() {
        errors.push("Confirm password is required".to_string());
    } else if password != confirm_password {
        errors.push("Passwords do not match".to_string());
    }

    errors
}

/// Minimal structural email check: one `@`, non-empty local part, and a
/// dotted domain with non-empty labels.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

/// Strong password: at least one lowercase, uppercase, digit, and symbol.
pub fn is_strong_password(password: &str) -> bool {
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());
    has_lower && has_upper && has_digit && has_symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_payload_passes() {
        let errors =
            validate_registration("Alice Example", "alice1", "alice@x.com", "Secret1!", "Secret1!");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn weak_password_is_rejected() {
        let errors = validate_registration(
            "Alice Example",
            "alice1",
            "alice@x.com",
            "alllowercase1",
            "alllowercase1",
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("uppercase"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let errors =
            validate_registration("Alice Example", "alice1", "alice@x.com", "Secret1!", "Other1!x");
        assert_eq!(errors, vec!["Passwords do not match".to_string()]);
    }

    #[test]
    fn short_username_and_bad_email_collect_both_errors() {
        let errors = validate_registration("Alice", "bob", "not-an-email", "Secret1!", "Secret1!");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@b..co"));
        assert!(!is_valid_email("a@@b.co"));
    }
}
