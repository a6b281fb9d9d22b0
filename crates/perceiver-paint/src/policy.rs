use foldbeacon_policy_center::PaintPolicy;
use serde::{Deserialize, Serialize};

/// How many ranked candidates survive truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateLimit {
    Unlimited,
    Top(usize),
}

impl CandidateLimit {
    pub fn apply<T>(&self, items: &mut Vec<T>) {
        if let CandidateLimit::Top(limit) = self {
            items.truncate(*limit);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScanConfig {
    pub selector: String,
    pub limit: CandidateLimit,
}

impl CandidateScanConfig {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            limit: CandidateLimit::Unlimited,
        }
    }

    /// Only the top-ranked candidate is kept.
    pub fn single_winner(mut self) -> Self {
        self.limit = CandidateLimit::Top(1);
        self
    }

    pub fn with_limit(mut self, limit: CandidateLimit) -> Self {
        self.limit = limit;
        self
    }
}

impl From<&PaintPolicy> for CandidateScanConfig {
    fn from(policy: &PaintPolicy) -> Self {
        CandidateScanConfig {
            selector: policy.elements.clone(),
            limit: match policy.max_candidates {
                Some(limit) => CandidateLimit::Top(limit),
                None => CandidateLimit::Unlimited,
            },
        }
    }
}
