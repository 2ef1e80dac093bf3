//! Customer policy model
//!
//! Parses and validates raw customer documents into typed policy entities:
//! capabilities, path rules, groups, approles, and whole documents. All
//! validation is pure: the conventions in force (customer prefix, forbidden
//! group prefix) are threaded explicitly rather than read from globals.

mod capability;
mod document;
mod rule;
mod target;

pub use capability::Capability;
pub use document::{
    CustomerConfig, RawAppRole, RawDocument, RawGroup, RawRule, find_document_files, parse_file,
    parse_files, parse_str,
};
pub use rule::PolicyRule;
pub use target::{AppRole, Group, TargetKind};

use crate::config::CustomerSettings;

/// Naming conventions a customer's documents are validated against.
#[derive(Debug, Clone)]
pub struct Conventions {
    /// Mandatory root section of every policy path, and the required
    /// `<prefix>-` start of every approle name.
    pub customer_prefix: String,

    /// Case-insensitive prefix group names may not start with. Empty
    /// disables the check.
    pub invalid_group_prefix: String,
}

impl Conventions {
    pub fn new(
        customer_prefix: impl Into<String>,
        invalid_group_prefix: impl Into<String>,
    ) -> Self {
        Self {
            customer_prefix: customer_prefix.into(),
            invalid_group_prefix: invalid_group_prefix.into(),
        }
    }

    /// The `<prefix>-` string approle names must start with.
    pub fn approle_prefix(&self) -> String {
        format!("{}-", self.customer_prefix)
    }
}

impl From<&CustomerSettings> for Conventions {
    fn from(settings: &CustomerSettings) -> Self {
        Self::new(&settings.prefix, &settings.invalid_group_prefix)
    }
}

/// Whether a string can serve as a customer prefix: a legal path section
/// that is not one of the reserved roots.
pub fn is_legal_prefix(prefix: &str) -> bool {
    rule::is_word_section(prefix) && !rule::NEVER_ALLOWED_ROOTS.contains(&prefix)
}

/// Convert a cardinal integer into an ordinal string.
// Yes, this returns 21th if a document ever gets that far.
pub(crate) fn ordinal(num: usize) -> String {
    match num {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{n}th"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
    }

    #[test]
    fn test_is_legal_prefix() {
        assert!(is_legal_prefix("customer"));
        assert!(is_legal_prefix("some-customer_2"));
        assert!(!is_legal_prefix(""));
        assert!(!is_legal_prefix("sys"));
        assert!(!is_legal_prefix("auth"));
        assert!(!is_legal_prefix("+"));
        assert!(!is_legal_prefix("a/b"));
    }

    #[test]
    fn test_approle_prefix() {
        let conv = Conventions::new("customer", "");
        assert_eq!(conv.approle_prefix(), "customer-");
    }
}
