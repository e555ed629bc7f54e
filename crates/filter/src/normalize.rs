//! Canonical phone-number form for contact comparison.

/// Canonicalize a raw phone number string.
///
/// Strips every character that is not an ASCII digit or `+`, keeps a leading
/// `+` as-is, rewrites a leading `00` into `+`, and otherwise returns the
/// bare digit string. Pure and total: malformed input degrades to an empty
/// or partial digit string, never an error.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if stripped.starts_with('+') {
        return stripped;
    }
    if let Some(rest) = stripped.strip_prefix("00") {
        return format!("+{rest}");
    }
    stripped
}

/// The part of a JID before the first `@` (`33612345678@s.whatsapp.net` →
/// `33612345678`). Returns the whole string when there is no `@`.
#[must_use]
pub fn local_part(jid: &str) -> &str {
    jid.split('@').next().unwrap_or_default()
}

/// Extract and normalize the phone number carried by a JID.
#[must_use]
pub fn number_from_jid(jid: &str) -> String {
    normalize(local_part(jid))
}
