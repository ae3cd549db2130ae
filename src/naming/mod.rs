//! Candidate naming: per-namespace validation rules and permutation
//! generators.

pub mod generator;
pub mod validator;

pub use generator::CandidateGenerator;
pub use validator::{NameValidator, ValidationRule};
