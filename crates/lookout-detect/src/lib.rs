pub mod classify;
pub mod extract;
pub mod score;
pub mod select;

pub use classify::{classify, delivery_moments, is_delivery_moment, InvocationKind};
pub use extract::{extract_artifact, ExtractedArtifact};
pub use score::{score, score_breakdown, CandidateContext, ScoreBreakdown};
pub use select::{rank_candidates, select_main_artifact, ScoredCandidate};
