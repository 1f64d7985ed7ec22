//! 照合レポート
//!
//! 照合結果を信頼度区分ごとに集計し、JSONで保存・再読込できる形にまとめる。

use crate::matcher::MatchOutcome;
use crate::types::{ConfidenceTier, MatchCandidate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 信頼度区分ごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierSummary {
    pub fn from_matches(matches: &[MatchCandidate]) -> Self {
        let mut summary = Self::default();
        for m in matches {
            match m.tier {
                ConfidenceTier::High => summary.high += 1,
                ConfidenceTier::Medium => summary.medium += 1,
                ConfidenceTier::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn get(&self, tier: ConfidenceTier) -> usize {
        match tier {
            ConfidenceTier::High => self.high,
            ConfidenceTier::Medium => self.medium,
            ConfidenceTier::Low => self.low,
        }
    }
}

/// 照合レポート（analyze の出力、apply の入力）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// 生成日時（RFC 3339）
    #[serde(default)]
    pub generated_at: String,
    pub min_score: f64,
    pub total_fabric_codes: usize,
    pub total_image_identifiers: usize,
    pub matched_count: usize,
    #[serde(default)]
    pub summary: TierSummary,
    pub unmatched_fabric_codes: Vec<String>,
    pub unmatched_image_identifiers: Vec<String>,
    /// 読み込み時にスキップした行数
    #[serde(default)]
    pub skipped_rows: usize,
    /// 照合前に読み込んだ既存参照セットのコード数
    #[serde(default)]
    pub current_mapping: usize,
    /// 既存参照セットにあるため照合から外した布地コード数
    #[serde(default)]
    pub excluded_fabric_codes: usize,
    /// 既存参照セットにあるため照合から外した画像ID数
    #[serde(default)]
    pub excluded_image_identifiers: usize,
    pub matches: Vec<MatchCandidate>,
}

impl MatchReport {
    /// 照合結果からレポートを組み立てる
    pub fn build(
        outcome: MatchOutcome,
        total_fabric_codes: usize,
        total_image_identifiers: usize,
        min_score: f64,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            generated_at: generated_at.into(),
            min_score,
            total_fabric_codes,
            total_image_identifiers,
            matched_count: outcome.matches.len(),
            summary: TierSummary::from_matches(&outcome.matches),
            unmatched_fabric_codes: outcome.unmatched_fabric_codes,
            unmatched_image_identifiers: outcome.unmatched_image_identifiers,
            skipped_rows: 0,
            current_mapping: 0,
            excluded_fabric_codes: 0,
            excluded_image_identifiers: 0,
            matches: outcome.matches,
        }
    }

    pub fn with_skipped_rows(mut self, skipped_rows: usize) -> Self {
        self.skipped_rows = skipped_rows;
        self
    }

    /// 既存参照セットによる除外件数を記録する
    pub fn with_exclusions(
        mut self,
        current_mapping: usize,
        excluded_fabric_codes: usize,
        excluded_image_identifiers: usize,
    ) -> Self {
        self.current_mapping = current_mapping;
        self.excluded_fabric_codes = excluded_fabric_codes;
        self.excluded_image_identifiers = excluded_image_identifiers;
        self
    }

    /// 指定区分のペア（入力順）
    pub fn matches_in(&self, tier: ConfidenceTier) -> impl Iterator<Item = &MatchCandidate> {
        self.matches.iter().filter(move |m| m.tier == tier)
    }

    /// 下限区分以上で画像ありと確定した布地コード
    pub fn confirmed_codes(&self, floor: ConfidenceTier) -> Vec<String> {
        confirmed_codes(&self.matches, floor)
    }

    /// 区分ごとの推奨アクション
    pub fn recommendations(&self) -> Vec<String> {
        vec![
            format!("high: {}件はそのまま適用可能", self.summary.high),
            format!("medium: {}件は目視確認を推奨", self.summary.medium),
            format!("low: {}件は慎重に検討", self.summary.low),
        ]
    }
}

/// 下限区分以上のペアから布地コードを集め、ソート・重複除去して返す
pub fn confirmed_codes(matches: &[MatchCandidate], floor: ConfidenceTier) -> Vec<String> {
    matches
        .iter()
        .filter(|m| m.tier >= floor)
        .map(|m| m.fabric_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
