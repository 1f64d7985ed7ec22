//! 照合結果の適用
//!
//! レポートから下限区分以上の布地コードを選び、画像あり参照セット（成果物）を更新する。
//!
//! ## 処理フロー
//! 1. 既存の成果物を読み込む（なければ空）
//! 2. 確定コードを追加（`replace` 時は置き換え）
//! 3. 既存ファイルをコピーでバックアップ
//! 4. 新しい成果物を書き込む

use crate::error::Result;
use khovai_common::{ArtifactFormat, ArtifactHeader, ConfidenceTier, ImageLookup, MatchReport};
use std::path::{Path, PathBuf};

/// 長すぎるコードとみなす文字数
const LONG_CODE_CHARS: usize = 50;
const ADDED_PREVIEW: usize = 10;

/// 適用オプション
#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    /// この区分以上を採用
    pub floor: ConfidenceTier,
    /// 既存の成果物を引き継がない
    pub replace: bool,
    /// ファイルを書き換えない
    pub dry_run: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            floor: ConfidenceTier::Medium,
            replace: false,
            dry_run: false,
        }
    }
}

/// 適用計画（書き込み前の内容）
#[derive(Debug, Clone)]
pub struct ApplyPlan {
    pub lookup: ImageLookup,
    /// 既存成果物のコード数
    pub previous_count: usize,
    /// 今回採用したペア数
    pub selected_matches: usize,
    /// 新規に加わったコード
    pub added: Vec<String>,
    /// 全布地コードに対する割合（0.0-1.0）
    pub coverage: f64,
    pub warnings: Vec<String>,
}

/// 適用結果
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub plan: ApplyPlan,
    pub backup: Option<PathBuf>,
    pub written: bool,
}

/// 成果物を読み込む（ファイルがなければ空のセット）
pub fn load_lookup(path: &Path) -> Result<ImageLookup> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "成果物がないため空のセットから開始");
        return Ok(ImageLookup::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(ImageLookup::parse(&content, ArtifactFormat::from_path(path))?)
}

/// 適用計画を立てる
pub fn plan_apply(report: &MatchReport, existing: ImageLookup, options: &ApplyOptions) -> ApplyPlan {
    let previous_count = existing.len();
    let mut lookup = if options.replace {
        ImageLookup::new()
    } else {
        existing.clone()
    };

    let confirmed = report.confirmed_codes(options.floor);
    let selected_matches = report.matches.iter().filter(|m| m.tier >= options.floor).count();

    let mut warnings = Vec::new();
    // 手で編集されたレポートでは同じコードが複数回現れることがある
    let duplicates = selected_matches.saturating_sub(confirmed.len());
    if duplicates > 0 {
        warnings.push(format!("重複した布地コードが{}件あります", duplicates));
    }

    lookup.extend(&confirmed);
    let added: Vec<String> = confirmed
        .into_iter()
        .filter(|code| !existing.has_image(code))
        .collect();

    let long_codes = lookup
        .codes()
        .filter(|c| c.chars().count() > LONG_CODE_CHARS)
        .count();
    if long_codes > 0 {
        warnings.push(format!("{}文字を超えるコードが{}件あります", LONG_CODE_CHARS, long_codes));
    }

    let coverage = if report.total_fabric_codes == 0 {
        0.0
    } else {
        lookup.len() as f64 / report.total_fabric_codes as f64
    };

    ApplyPlan {
        lookup,
        previous_count,
        selected_matches,
        added,
        coverage,
        warnings,
    }
}

/// 既存の成果物を `<path>.backup.<timestamp>` にコピーする
pub fn backup_artifact(path: &Path, timestamp: &str) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let base = format!("{}.backup.{}", path.display(), timestamp);
    let mut backup = PathBuf::from(&base);
    let mut counter = 1;
    while backup.exists() {
        backup = PathBuf::from(format!("{}-{}", base, counter));
        counter += 1;
    }

    std::fs::copy(path, &backup)?;
    tracing::info!(backup = %backup.display(), "バックアップ作成");
    Ok(Some(backup))
}

/// レポートを成果物に適用する
///
/// # Arguments
/// * `report` - analyze で保存したレポート
/// * `artifact_path` - 成果物のパス（拡張子で形式を判定）
/// * `options` - 適用オプション
/// * `generated_at` - 成果物ヘッダに記録する日時
/// * `backup_stamp` - バックアップ名に付ける時刻
pub fn apply_report(
    report: &MatchReport,
    artifact_path: &Path,
    options: &ApplyOptions,
    generated_at: &str,
    backup_stamp: &str,
) -> Result<ApplyOutcome> {
    let existing = load_lookup(artifact_path)?;
    let plan = plan_apply(report, existing, options);

    if options.dry_run {
        tracing::info!("ドライランのため書き込みません");
        return Ok(ApplyOutcome {
            plan,
            backup: None,
            written: false,
        });
    }

    let header = ArtifactHeader {
        generated_at: generated_at.to_string(),
        floor: Some(options.floor),
        previous_count: plan.previous_count,
        added_count: plan.added.len(),
    };
    let content = plan
        .lookup
        .render(ArtifactFormat::from_path(artifact_path), &header)?;

    let backup = backup_artifact(artifact_path, backup_stamp)?;

    if let Some(parent) = artifact_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(artifact_path, content)?;
    tracing::info!(path = %artifact_path.display(), count = plan.lookup.len(), "成果物を更新");

    Ok(ApplyOutcome {
        plan,
        backup,
        written: true,
    })
}

/// 適用結果の検証サマリーを表示
pub fn print_outcome(outcome: &ApplyOutcome, floor: ConfidenceTier) {
    let plan = &outcome.plan;

    println!("📊 適用結果 ({}以上):", floor);
    println!("  既存のコード: {}件", plan.previous_count);
    println!("  採用したペア: {}件", plan.selected_matches);
    println!("  新規追加: {}件", plan.added.len());
    println!("  合計: {}件", plan.lookup.len());
    println!("  カバー率: {:.1}%", plan.coverage * 100.0);

    if !plan.added.is_empty() {
        println!();
        println!("✨ 新規追加 (先頭{}件):", ADDED_PREVIEW.min(plan.added.len()));
        for code in plan.added.iter().take(ADDED_PREVIEW) {
            println!("  + {}", code);
        }
        if plan.added.len() > ADDED_PREVIEW {
            println!("  ... 他{}件", plan.added.len() - ADDED_PREVIEW);
        }
    }

    for warning in &plan.warnings {
        println!("⚠ {}", warning);
    }

    if let Some(backup) = &outcome.backup {
        println!("💾 バックアップ: {}", backup.display());
    }
    if !outcome.written {
        println!("（ドライラン: ファイルは変更していません）");
    }
}
