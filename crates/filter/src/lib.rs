//! Contact normalization and per-contact admission filtering.
//!
//! The filter holds two lists of normalized phone numbers: a deny list
//! (always checked, wins) and an allow list (empty means everyone is
//! allowed). Numbers are compared with a symmetric substring containment
//! match, see [`admission::fuzzy_match`].

pub mod admission;
pub mod normalize;

pub use {
    admission::{AdmissionDenied, ContactFilter, fuzzy_match, parse_contact_list},
    normalize::{local_part, normalize, number_from_jid},
};
