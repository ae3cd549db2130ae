//! Candidate generation from an organization identifier and a keyword list
//!
//! Both generators are deterministic and order-preserving: identical inputs
//! always yield the identical candidate sequence, which keeps reconnaissance
//! re-runs reproducible. Every emitted candidate has already passed the
//! namespace rules, and duplicates produced by different derivation
//! strategies are collapsed to their first occurrence.

use crate::naming::NameValidator;
use crate::types::{Candidate, Namespace, Strategy};
use std::collections::HashSet;

/// Generates storage-account and container name candidates.
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    validator: NameValidator,
}

impl CandidateGenerator {
    pub fn new() -> Self {
        Self {
            validator: NameValidator::new(),
        }
    }

    /// Account-namespace candidates: the organization identifier alone, then
    /// per keyword `keyword+org` and `org+keyword`. Pure concatenation only;
    /// the account namespace forbids the dash character entirely.
    pub fn account_candidates(&self, org: &str, keywords: &[String]) -> Vec<Candidate> {
        let mut out = Accumulator::new(&self.validator, Namespace::Account);

        out.push(org.to_string(), Strategy::Bare);
        for keyword in keywords {
            out.push(format!("{keyword}{org}"), Strategy::Prepend);
            out.push(format!("{org}{keyword}"), Strategy::Append);
        }

        out.into_vec()
    }

    /// Container-namespace candidates for one confirmed storage account:
    /// the bare organization identifier and account base name, then per
    /// keyword the keyword alone plus all four separator/no-separator
    /// combinations with the organization identifier. The container
    /// namespace permits dashes, so the dashed variants are distinct
    /// candidates here.
    pub fn container_candidates(
        &self,
        org: &str,
        account_base: &str,
        keywords: &[String],
    ) -> Vec<Candidate> {
        let mut out = Accumulator::new(&self.validator, Namespace::Container);

        out.push(org.to_string(), Strategy::Bare);
        out.push(account_base.to_string(), Strategy::Bare);
        for keyword in keywords {
            out.push(keyword.clone(), Strategy::KeywordOnly);
            out.push(format!("{keyword}{org}"), Strategy::Prepend);
            out.push(format!("{keyword}-{org}"), Strategy::PrependDashed);
            out.push(format!("{org}{keyword}"), Strategy::Append);
            out.push(format!("{org}-{keyword}"), Strategy::AppendDashed);
        }

        out.into_vec()
    }
}

/// Collects candidates, dropping rule violations and duplicate names while
/// preserving first-occurrence order.
struct Accumulator<'a> {
    validator: &'a NameValidator,
    namespace: Namespace,
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl<'a> Accumulator<'a> {
    fn new(validator: &'a NameValidator, namespace: Namespace) -> Self {
        Self {
            validator,
            namespace,
            seen: HashSet::new(),
            candidates: Vec::new(),
        }
    }

    fn push(&mut self, name: String, strategy: Strategy) {
        if !self.validator.validate(&name, self.namespace) {
            return;
        }
        if self.seen.insert(name.clone()) {
            self.candidates
                .push(Candidate::new(name, self.namespace, strategy));
        }
    }

    fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn account_candidates_for_acme_backup() {
        let gen = CandidateGenerator::new();
        let candidates = gen.account_candidates("acme", &["backup".to_string()]);

        assert_eq!(names(&candidates), vec!["acme", "backupacme", "acmebackup"]);
        assert!(!candidates.iter().any(|c| c.name.contains('-')));
    }

    #[test]
    fn account_candidates_drop_invalid_permutations() {
        let gen = CandidateGenerator::new();
        // The 22-char keyword makes both combined forms exceed 24 chars.
        let keywords = vec!["x".repeat(22)];
        let candidates = gen.account_candidates("acme", &keywords);
        assert_eq!(names(&candidates), vec!["acme"]);
    }

    #[test]
    fn account_candidates_are_deterministic() {
        let gen = CandidateGenerator::new();
        let keywords = vec!["backup".to_string(), "data".to_string()];
        let first = gen.account_candidates("acme", &keywords);
        let second = gen.account_candidates("acme", &keywords);
        assert_eq!(first, second);
    }

    #[test]
    fn account_candidates_deduplicate_across_strategies() {
        let gen = CandidateGenerator::new();
        // keyword == org makes prepend and append collide on "acmeacme".
        let candidates = gen.account_candidates("acme", &["acme".to_string()]);
        assert_eq!(names(&candidates), vec!["acme", "acmeacme"]);
    }

    #[test]
    fn container_candidates_for_confirmed_account() {
        let gen = CandidateGenerator::new();
        let candidates =
            gen.container_candidates("acme", "acmebackup", &["data".to_string()]);

        assert_eq!(
            names(&candidates),
            vec![
                "acme",
                "acmebackup",
                "data",
                "dataacme",
                "data-acme",
                "acmedata",
                "acme-data",
            ]
        );
    }

    #[test]
    fn container_keyword_only_requires_independent_validity() {
        let gen = CandidateGenerator::new();
        // "db" alone is below the length floor, but its combinations pass.
        let candidates = gen.container_candidates("acme", "acmedb", &["db".to_string()]);
        let names = names(&candidates);

        assert!(!names.contains(&"db"));
        assert!(names.contains(&"dbacme"));
        assert!(names.contains(&"db-acme"));
        assert!(names.contains(&"acmedb"));
        assert!(names.contains(&"acme-db"));
    }

    #[test]
    fn container_candidates_deduplicate_org_and_base() {
        let gen = CandidateGenerator::new();
        // Account base equal to the org collapses the two bare entries.
        let candidates = gen.container_candidates("acme", "acme", &[]);
        assert_eq!(names(&candidates), vec!["acme"]);
    }
}
