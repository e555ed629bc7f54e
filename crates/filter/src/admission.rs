use tracing::debug;

use crate::normalize::{normalize, number_from_jid};

/// Symmetric containment match between two normalized numbers.
///
/// Two numbers are considered equivalent when either is a substring of the
/// other. This is deliberately permissive — a short list entry like `+3361`
/// matches every number under that prefix — and is preserved as-is rather
/// than tightened to exact equality.
#[must_use]
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Reason an inbound contact was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDenied {
    /// The number matched an entry on the deny list.
    Excluded,
    /// An allow list is configured and the number matched none of its entries.
    NotIncluded,
}

impl std::fmt::Display for AdmissionDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excluded => write!(f, "contact is on the deny list"),
            Self::NotIncluded => write!(f, "contact is not on the allow list"),
        }
    }
}

/// Per-contact admission filter, built once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    included_only: Vec<String>,
    excluded: Vec<String>,
}

impl ContactFilter {
    /// Build a filter from raw list entries. Every entry is normalized;
    /// entries that normalize to nothing are dropped.
    #[must_use]
    pub fn new<I, E, S, T>(included_only: I, excluded: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            included_only: normalize_entries(included_only),
            excluded: normalize_entries(excluded),
        }
    }

    /// Build a filter from the comma-separated environment form
    /// (`INCLUDED_ONLY` / `EXCLUDED`).
    #[must_use]
    pub fn from_lists(included_only: &str, excluded: &str) -> Self {
        Self::new(parse_contact_list(included_only), parse_contact_list(excluded))
    }

    /// Allow-list entries, normalized.
    #[must_use]
    pub fn included_only(&self) -> &[String] {
        &self.included_only
    }

    /// Deny-list entries, normalized.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Decide admission for a contact JID.
    ///
    /// The deny list is checked first and wins; the allow list only applies
    /// when non-empty. `is_group` is accepted for future per-group policy
    /// but currently applies identical rules to group and private contacts.
    /// Never panics: an unparseable JID normalizes to a degenerate string
    /// and flows through the same rules.
    pub fn check(&self, jid: &str, is_group: bool) -> Result<(), AdmissionDenied> {
        let number = number_from_jid(jid);

        if !self.excluded.is_empty()
            && self.excluded.iter().any(|entry| fuzzy_match(&number, entry))
        {
            debug!(%number, is_group, "contact excluded");
            return Err(AdmissionDenied::Excluded);
        }

        if !self.included_only.is_empty()
            && !self.included_only.iter().any(|entry| fuzzy_match(&number, entry))
        {
            debug!(%number, is_group, "contact not on allow list");
            return Err(AdmissionDenied::NotIncluded);
        }

        debug!(%number, is_group, "contact admitted");
        Ok(())
    }

    /// Convenience boolean form of [`check`](Self::check).
    #[must_use]
    pub fn is_allowed(&self, jid: &str, is_group: bool) -> bool {
        self.check(jid, is_group).is_ok()
    }
}

/// Parse a comma-separated contact list: split, trim, drop empties.
#[must_use]
pub fn parse_contact_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

fn normalize_entries<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| normalize(entry.as_ref()))
        .filter(|entry| !entry.is_empty())
        .collect()
}
