//! Kho Vải Tồn 照合コア
//!
//! 布地コードと画像IDの照合ロジック（I/Oなし）。
//! analyze / apply / run / lookup の各コマンドはすべてこのクレートを経由する。

pub mod error;
pub mod lookup;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod similarity;
pub mod types;

pub use error::{Error, Result};
pub use lookup::{ArtifactFormat, ArtifactHeader, ImageLookup};
pub use matcher::{match_codes, match_codes_with_progress, MatchOptions, MatchOutcome};
pub use normalize::normalize_key;
pub use report::{confirmed_codes, MatchReport, TierSummary};
pub use similarity::{key_similarity, levenshtein_distance, similarity};
pub use types::{
    ConfidenceTier, MatchCandidate, MatchKind, DEFAULT_MIN_SCORE, HIGH_THRESHOLD, MEDIUM_THRESHOLD,
};
