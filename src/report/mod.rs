//! レポートの保存・読み込み・表示

pub mod excel;

use crate::error::{ReconcileError, Result};
use khovai_common::{ConfidenceTier, MatchCandidate, MatchReport};
use std::path::Path;

const RULE_WIDTH: usize = 60;
const HIGH_PREVIEW: usize = 10;
const MEDIUM_PREVIEW: usize = 5;

/// レポートをJSONで保存
pub fn save_report(report: &MatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "レポート保存");
    Ok(())
}

/// 保存済みレポートを読み込む
pub fn load_report(path: &Path) -> Result<MatchReport> {
    if !path.exists() {
        return Err(ReconcileError::MissingFile(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let report: MatchReport = serde_json::from_str(&content)
        .map_err(|e| ReconcileError::InvalidReport(format!("{}: {}", path.display(), e)))?;

    if let Some(bad) = report.matches.iter().find(|m| !(0.0..=1.0).contains(&m.score)) {
        return Err(ReconcileError::InvalidReport(format!(
            "スコアが範囲外: {} → {} ({})",
            bad.image_identifier, bad.fabric_code, bad.score
        )));
    }

    Ok(report)
}

/// 1件分の表示行
pub fn format_match(m: &MatchCandidate) -> String {
    format!(
        "{} {} → {} ({}%)",
        m.tier.marker(),
        m.image_identifier,
        m.fabric_code,
        m.percent()
    )
}

/// 集計をコンソールに表示
pub fn print_summary(report: &MatchReport) {
    let rule = "=".repeat(RULE_WIDTH);

    println!("{}", rule);
    println!("🔍 画像照合レポート");
    println!("{}", rule);
    println!("  生成日時: {}", report.generated_at);
    println!("  布地コード: {}件", report.total_fabric_codes);
    println!("  画像ID: {}件", report.total_image_identifiers);
    println!("  照合済み: {}件 (最低スコア {})", report.matched_count, report.min_score);
    println!("  未照合の布地コード: {}件", report.unmatched_fabric_codes.len());
    println!("  未照合の画像ID: {}件", report.unmatched_image_identifiers.len());
    if report.current_mapping > 0 {
        println!(
            "  既存の参照セット: {}件 (除外: 布地コード {}件 / 画像ID {}件)",
            report.current_mapping, report.excluded_fabric_codes, report.excluded_image_identifiers
        );
    }
    if report.skipped_rows > 0 {
        println!("  ⚠ スキップした行: {}件", report.skipped_rows);
    }
    println!();

    println!("🎯 信頼度別:");
    println!("  🟢 high   (≥90%): {}", report.summary.high);
    println!("  🟡 medium (70-89%): {}", report.summary.medium);
    println!("  🔴 low    (<70%): {}", report.summary.low);

    print_preview(report, ConfidenceTier::High, HIGH_PREVIEW);
    print_preview(report, ConfidenceTier::Medium, MEDIUM_PREVIEW);

    println!();
    println!("💡 推奨:");
    for line in report.recommendations() {
        println!("  - {}", line);
    }
    println!("{}", rule);
}

fn print_preview(report: &MatchReport, tier: ConfidenceTier, limit: usize) {
    let total = report.summary.get(tier);
    if total == 0 {
        return;
    }

    println!();
    println!("{} {} (先頭{}件):", tier.marker(), tier, limit.min(total));
    for m in report.matches_in(tier).take(limit) {
        println!("  {}", format_match(m));
    }
    if total > limit {
        println!("  ... 他{}件", total - limit);
    }
}
