use crate::domain::model::{ExternalRecord, InternalRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One way of pairing an imported row with a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Exact equality of the roster's member id. Rows without one never match.
    MemberId,
    /// Exact equality of (first name, last name).
    Name,
}

impl MatchStrategy {
    pub fn matches(&self, external: &ExternalRecord, candidate: &InternalRecord) -> bool {
        match self {
            Self::MemberId => {
                external.member_id.is_some() && external.member_id == candidate.member_id
            }
            Self::Name => {
                external.first_name == candidate.first_name
                    && external.last_name == candidate.last_name
            }
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemberId => write!(f, "member_id"),
            Self::Name => write!(f, "name"),
        }
    }
}

pub const DEFAULT_STRATEGIES: [MatchStrategy; 2] = [MatchStrategy::MemberId, MatchStrategy::Name];

/// Tries each strategy in order against the whole candidate list; the first
/// strategy that finds anything wins, and within it the first candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMatcher {
    strategies: Vec<MatchStrategy>,
}

impl RecordMatcher {
    pub fn new(strategies: Vec<MatchStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[MatchStrategy] {
        &self.strategies
    }

    /// Returns the matched candidate together with its position in `candidates`.
    pub fn find_match<'a>(
        &self,
        external: &ExternalRecord,
        candidates: &'a [InternalRecord],
    ) -> Option<(usize, &'a InternalRecord)> {
        self.strategies.iter().find_map(|strategy| {
            let found = candidates
                .iter()
                .enumerate()
                .find(|(_, candidate)| strategy.matches(external, candidate));
            if let Some((_, candidate)) = found {
                tracing::trace!(
                    "{} matched record {} by {}",
                    external.display_name(),
                    candidate.id,
                    strategy
                );
            }
            found
        })
    }
}

impl Default for RecordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGIES.to_vec())
    }
}
