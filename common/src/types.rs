//! 照合結果の型定義
//!
//! CLIの各コマンド（analyze / apply / run）で共有される型:
//! - ConfidenceTier: スコアから決まる信頼度区分
//! - MatchKind: どの段階で照合されたか
//! - MatchCandidate: 画像ID→布地コードの1対1ペア

use serde::{Deserialize, Serialize};

/// 既定の最低スコア
pub const DEFAULT_MIN_SCORE: f64 = 0.6;
/// high 区分の下限
pub const HIGH_THRESHOLD: f64 = 0.9;
/// medium 区分の下限
pub const MEDIUM_THRESHOLD: f64 = 0.7;

// 1 - 3/10 のような浮動小数の丸めで境界を取りこぼさないための許容幅
const SCORE_EPSILON: f64 = 1e-9;

/// 信頼度区分（Low < Medium < High の順序を持つ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// 0.7 未満（通常は最低スコア以上）
    Low,
    /// 0.7 以上 0.9 未満
    #[default]
    Medium,
    /// 0.9 以上
    High,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score + SCORE_EPSILON >= HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if score + SCORE_EPSILON >= MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// レポート表示用の記号
    pub fn marker(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "🟢",
            ConfidenceTier::Medium => "🟡",
            ConfidenceTier::Low => "🔴",
        }
    }
}

impl std::str::FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(ConfidenceTier::High),
            "medium" | "med" | "m" => Ok(ConfidenceTier::Medium),
            "low" | "l" | "all" => Ok(ConfidenceTier::Low),
            _ => Err(format!("Unknown tier: {}. Use high, medium, or low", s)),
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// 照合の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// 生の文字列が完全一致
    Exact,
    /// 正規化キーが一致
    ExactNormalized,
    /// 類似度による照合
    Fuzzy,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::ExactNormalized => write!(f, "exact_normalized"),
            MatchKind::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// 画像ID→布地コードの照合ペア
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub image_identifier: String,
    pub fabric_code: String,
    pub score: f64,
    pub tier: ConfidenceTier,
    pub kind: MatchKind,
}

impl MatchCandidate {
    pub fn new(image_identifier: &str, fabric_code: &str, score: f64, kind: MatchKind) -> Self {
        Self {
            image_identifier: image_identifier.to_string(),
            fabric_code: fabric_code.to_string(),
            score,
            tier: ConfidenceTier::from_score(score),
            kind,
        }
    }

    /// スコアの百分率表記（四捨五入）
    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_score() {
        assert_eq!(ConfidenceTier::from_score(1.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.9), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(0.89), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.75), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(1.0 - 3.0 / 10.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(0.69), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(0.6), ConfidenceTier::Low);
    }

    #[test]
    fn test_tier_order() {
        assert!(ConfidenceTier::High > ConfidenceTier::Medium);
        assert!(ConfidenceTier::Medium > ConfidenceTier::Low);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("HIGH".parse::<ConfidenceTier>(), Ok(ConfidenceTier::High));
        assert_eq!("m".parse::<ConfidenceTier>(), Ok(ConfidenceTier::Medium));
        assert_eq!("all".parse::<ConfidenceTier>(), Ok(ConfidenceTier::Low));
        assert!("best".parse::<ConfidenceTier>().is_err());
    }

    #[test]
    fn test_candidate_serialization() {
        let candidate = MatchCandidate::new("AR-071-02B", "071-02B", 0.75, MatchKind::Fuzzy);
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["imageIdentifier"], "AR-071-02B");
        assert_eq!(json["fabricCode"], "071-02B");
        assert_eq!(json["tier"], "medium");
        assert_eq!(json["kind"], "fuzzy");
        assert_eq!(candidate.percent(), 75);
    }
}
