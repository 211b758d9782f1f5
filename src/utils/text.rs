/// Lowercase ascii slug: alphanumerics kept, runs of anything else collapse to
/// a single hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Senior Backend Engineer"), "senior-backend-engineer");
        assert_eq!(slugify("  C++ / Rust Dev!  "), "c-rust-dev");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn emails_are_lowercased_and_trimmed() {
        assert_eq!(normalize_email(" Jane.Doe@Example.COM "), "jane.doe@example.com");
    }
}
