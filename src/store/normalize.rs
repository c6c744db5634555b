use crate::error::{Error, Result};

const MAX_CATALOG_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

/// Collapses runs of whitespace into single spaces and trims both ends.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn check_catalog_name(name: &str, entity: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(format!("{entity} name cannot be empty")));
    }
    if name.chars().count() > MAX_CATALOG_NAME_LEN {
        return Err(Error::validation(format!(
            "{entity} name cannot exceed {MAX_CATALOG_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::validation(format!(
            "{entity} name contains invalid characters"
        )));
    }
    Ok(())
}

/// Canonical product key: trimmed, upper-cased, internal whitespace collapsed.
pub fn normalize_product_name(name: &str) -> Result<String> {
    let normalized = collapse_whitespace(name).to_uppercase();
    check_catalog_name(&normalized, "Product")?;
    Ok(normalized)
}

/// Canonical unit key: trimmed, lower-cased, internal whitespace collapsed.
pub fn normalize_unit_name(name: &str) -> Result<String> {
    let normalized = collapse_whitespace(name).to_lowercase();
    check_catalog_name(&normalized, "Unit")?;
    Ok(normalized)
}

/// Search terms use the product normalization but may be empty.
#[must_use]
pub fn normalize_search_term(q: &str) -> String {
    collapse_whitespace(q).to_uppercase()
}

/// Escapes LIKE wildcards so user input is matched literally (`ESCAPE '\'`).
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Emails are unique case-insensitively; store them trimmed and lower-cased.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(Error::validation("Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(Error::validation(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| Error::validation("Email must contain '@'"))?;

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(Error::validation("Email address is not valid"));
    }

    Ok(email)
}
