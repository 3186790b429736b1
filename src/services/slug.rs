//! Slug generation and validation shared by categories and posts

/// Longest slug the store accepts
pub const MAX_SLUG_LENGTH: usize = 50;

/// Derive a URL-safe slug from a display string.
///
/// Lowercases ASCII letters and digits, turns every other run of characters
/// into a single hyphen, drops leading and trailing hyphens, and cuts the
/// result to [`MAX_SLUG_LENGTH`]. May return an empty string.
pub fn generate_slug(text: &str) -> String {
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen && !result.is_empty() {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.truncate(MAX_SLUG_LENGTH);
    result.trim_end_matches('-').to_string()
}

/// Check a slug against `[-a-zA-Z0-9_]+` and the length limit.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug cannot be empty".to_string());
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(format!(
            "Slug cannot exceed {} characters",
            MAX_SLUG_LENGTH
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Slug may only contain letters, numbers, hyphens and underscores".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_special_chars() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
        assert_eq!(generate_slug("  --Rust & Axum--  "), "rust-axum");
    }

    #[test]
    fn test_generate_slug_with_underscores() {
        assert_eq!(generate_slug("hello_world"), "hello-world");
    }

    #[test]
    fn test_generate_slug_drops_non_ascii() {
        assert_eq!(generate_slug("Café Crème"), "caf-cr-me");
        assert_eq!(generate_slug("技术"), "");
    }

    #[test]
    fn test_generate_slug_truncates() {
        let slug = generate_slug(&"word ".repeat(30));
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("hello-world_2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("ünïcode").is_err());
        assert!(validate_slug(&"a".repeat(51)).is_err());
        assert!(validate_slug(&"a".repeat(50)).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Any non-empty generated slug passes validation.
        #[test]
        fn generated_slugs_are_valid(text in "\\PC{0,120}") {
            let slug = generate_slug(&text);
            if !slug.is_empty() {
                prop_assert!(validate_slug(&slug).is_ok());
            }
        }
    }
}
