//! Variable name grammar

/// Check whether `candidate` is a legal variable path such as `user.firstName`.
///
/// Surrounding whitespace is ignored. Each dot-separated segment must start
/// with an ASCII letter or underscore, followed by ASCII letters, digits or
/// underscores.
pub fn is_valid_variable_name(candidate: &str) -> bool {
    let name = candidate.trim();

    if name.is_empty() {
        return false;
    }

    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return false;
    }

    if name.chars().any(char::is_whitespace) {
        return false;
    }

    name.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_dotted_paths() {
        assert!(is_valid_variable_name("user"));
        assert!(is_valid_variable_name("user.firstName"));
        assert!(is_valid_variable_name("user.profile.first_name"));
        assert!(is_valid_variable_name("_private.v2"));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert!(is_valid_variable_name("  user.name  "));
        assert!(is_valid_variable_name("\tuser\n"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!is_valid_variable_name(""));
        assert!(!is_valid_variable_name("   "));
    }

    #[test]
    fn test_rejects_misplaced_dots() {
        assert!(!is_valid_variable_name(".user"));
        assert!(!is_valid_variable_name("user."));
        assert!(!is_valid_variable_name("user..name"));
        assert!(!is_valid_variable_name("."));
    }

    #[test]
    fn test_rejects_inner_whitespace() {
        assert!(!is_valid_variable_name("user name"));
        assert!(!is_valid_variable_name("user. name"));
    }

    #[test]
    fn test_rejects_bad_segments() {
        assert!(!is_valid_variable_name("123user"));
        assert!(!is_valid_variable_name("user.1st"));
        assert!(!is_valid_variable_name("user-name"));
        assert!(!is_valid_variable_name("user.näme"));
        assert!(!is_valid_variable_name("{{user}}"));
    }
}
