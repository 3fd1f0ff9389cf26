//! URL discovery: candidate generation, health testing and ranking.
//!
//! [`generate_candidates`] guesses where a project might be deployed without
//! touching the network. [`UrlTester`] then loads each guess in a throwaway
//! browser tab, scores it (see [`scoring`]) and ranks the results.

mod candidates;
pub mod scoring;
mod tester;

pub use candidates::{generate_candidates, generate_typed_candidates, manual_candidates};
pub use tester::{rank_candidates, select_best, CandidateRanking, UrlTester};
