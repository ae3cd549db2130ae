//! Naming-rule validation for the Azure storage namespaces
//!
//! Storage account names: 3-24 characters, lowercase letters and digits only.
//! Container names: 3-63 characters, lowercase letters, digits and dashes,
//! no two consecutive dashes.

use crate::types::Namespace;
use regex::Regex;

/// Charset and length rules for one namespace.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    charset: Regex,
    min_len: usize,
    max_len: usize,
    forbid_double_dash: bool,
}

impl ValidationRule {
    fn account() -> Self {
        Self {
            charset: Regex::new(r"^[a-z0-9]+$").expect("static charset pattern"),
            min_len: 3,
            max_len: 24,
            forbid_double_dash: false,
        }
    }

    fn container() -> Self {
        Self {
            charset: Regex::new(r"^[a-z0-9-]+$").expect("static charset pattern"),
            min_len: 3,
            max_len: 63,
            forbid_double_dash: true,
        }
    }

    fn allows(&self, name: &str) -> bool {
        if name.len() < self.min_len || name.len() > self.max_len {
            return false;
        }
        if !self.charset.is_match(name) {
            return false;
        }
        if self.forbid_double_dash && name.contains("--") {
            return false;
        }
        true
    }
}

/// Validator for generated candidate names.
///
/// Invalid input is a normal `false` result, never an error: the candidate
/// generators lean on this to silently drop out-of-rule permutations.
#[derive(Debug, Clone)]
pub struct NameValidator {
    account: ValidationRule,
    container: ValidationRule,
}

impl NameValidator {
    pub fn new() -> Self {
        Self {
            account: ValidationRule::account(),
            container: ValidationRule::container(),
        }
    }

    /// Check `name` against the rules of `namespace`. Pure, no side effects.
    pub fn validate(&self, name: &str, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Account => self.account.allows(name),
            Namespace::Container => self.container.allows(name),
        }
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::new()
    }
}
