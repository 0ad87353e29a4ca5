/// Longest text a single field may occupy in the table
pub const MAX_FIELD_CHARS: usize = 1000;

/// Clean and normalize free text from a form field
///
/// Trims the edges, collapses every run of whitespace (spaces, tabs,
/// newlines) into a single space and truncates the result to
/// [`MAX_FIELD_CHARS`] characters.
///
/// # Arguments
/// * `text` - Raw field value, `None` when the field was absent
///
/// # Returns
/// * `String` - The cleaned text, empty for absent input
///
/// # Examples
/// ```
/// use formsheet::sanitize::clean;
///
/// assert_eq!(clean(Some("  a   b  ")), "a b");
/// assert_eq!(clean(None), "");
/// ```
pub fn clean(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut cleaned = String::with_capacity(text.len().min(MAX_FIELD_CHARS));
    for word in text.split_whitespace() {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(word);
    }

    match cleaned.char_indices().nth(MAX_FIELD_CHARS) {
        Some((cut, _)) => {
            cleaned.truncate(cut);
            cleaned
        }
        None => cleaned,
    }
}

/// Normalize an email address: surrounding whitespace removed, lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_and_outer_whitespace() {
        assert_eq!(clean(Some("  a   b  ")), "a b");
        assert_eq!(clean(Some("line one\n\n\tline two")), "line one line two");
    }

    #[test]
    fn absent_text_is_empty() {
        assert_eq!(clean(None), "");
        assert_eq!(clean(Some("   ")), "");
    }

    #[test]
    fn truncates_to_limit() {
        let long = "x".repeat(2000);
        assert_eq!(clean(Some(&long)).chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(1500);
        let cleaned = clean(Some(&long));
        assert_eq!(cleaned.chars().count(), MAX_FIELD_CHARS);
        assert_eq!(cleaned.len(), MAX_FIELD_CHARS * 2);
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  JOHN@Example.COM "), "john@example.com");
    }
}
