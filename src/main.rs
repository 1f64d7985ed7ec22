use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use khovai_common::{match_codes_with_progress, MatchOptions, MatchReport};
use khovai_reconcile::{applier, cli, config, error, loader, logging, report};
use cli::{AnalyzeArgs, ApplyArgs, Cli, Commands};
use config::Config;
use error::ReconcileError;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Analyze(args) => {
            println!("🔍 khovai-reconcile - 画像照合\n");
            analyze(&args, args.current.as_deref(), &config)?;
            println!("\n✅ 照合完了");
        }

        Commands::Apply { report: report_path, artifact, apply } => {
            println!("📝 khovai-reconcile - 参照セット更新\n");
            let loaded = report::load_report(&report_path)
                .with_context(|| format!("レポートの読み込みに失敗: {}", report_path.display()))?;
            if apply_to_artifact(&loaded, &artifact, &apply, &config)? {
                println!("\n✅ 適用完了");
            }
        }

        Commands::Run { analyze: analyze_args, artifact, apply } => {
            println!("🚀 khovai-reconcile - 一括処理\n");
            // 置き換え時は既存コードを残さないので除外もしない
            let current = match &analyze_args.current {
                Some(path) => Some(path.as_path()),
                None if !apply.replace => Some(artifact.as_path()),
                None => None,
            };
            let report = analyze(&analyze_args, current, &config)?;
            println!();
            if apply_to_artifact(&report, &artifact, &apply, &config)? {
                println!("\n✅ 一括処理完了");
            }
        }

        Commands::Lookup { artifact, codes } => {
            if !artifact.exists() {
                return Err(ReconcileError::MissingFile(artifact.display().to_string()).into());
            }
            let lookup = applier::load_lookup(&artifact)
                .with_context(|| format!("参照セットの読み込みに失敗: {}", artifact.display()))?;

            println!("📖 参照セット: {} ({}件)\n", artifact.display(), lookup.len());
            for code in &codes {
                if lookup.has_image(code) {
                    println!("  ✔ {}: 画像あり", code);
                } else {
                    println!("  ✘ {}: 画像なし", code);
                }
            }
        }

        Commands::Config { show, set_min_score, set_floor, set_code_column } => {
            let changed = set_min_score.is_some() || set_floor.is_some() || set_code_column.is_some();

            if changed {
                // 環境変数による上書きを保存しないよう、ファイルの内容から編集する
                let mut updated = Config::load_file().context("設定の読み込みに失敗しました")?;
                if let Some(score) = set_min_score {
                    updated.min_score = score;
                }
                if let Some(floor) = set_floor {
                    updated.apply_floor = floor;
                }
                if let Some(column) = set_code_column {
                    updated.code_column = column;
                }
                updated.save().context("設定の保存に失敗しました")?;
                println!("✔ 設定を保存: {}", Config::config_path()?.display());
                print_config(&updated)?;
            } else if show {
                print_config(&config)?;
            } else {
                println!("使い方: khovai-reconcile config --show");
                println!("        khovai-reconcile config --set-min-score 0.7");
                println!("        khovai-reconcile config --set-floor high");
                println!("        khovai-reconcile config --set-code-column 1");
            }
        }
    }

    Ok(())
}

/// 読み込み → 照合 → レポート出力
fn analyze(args: &AnalyzeArgs, current: Option<&Path>, config: &Config) -> anyhow::Result<MatchReport> {
    let min_score = config.min_score_or(args.min_score)?;
    let mut options = loader::LoadOptions::from_config(config);
    if let Some(column) = args.code_column {
        options.code_column = column;
    }
    options.clean_names = args.clean_names;

    // 1. 読み込み
    println!("[1/3] 入力を読み込み中...");
    let mut fabrics = loader::load_fabric_codes(&args.fabrics, &options)
        .with_context(|| format!("布地コードの読み込みに失敗: {}", args.fabrics.display()))?;
    let mut images = loader::load_image_identifiers(&args.images, &options)
        .with_context(|| format!("画像IDの読み込みに失敗: {}", args.images.display()))?;
    println!("✔ 布地コード {}件 / 画像ID {}件", fabrics.len(), images.len());
    if !fabrics.skipped.is_empty() {
        println!("⚠ 不正な行を{}件スキップしました", fabrics.skipped.len());
    }
    let total_fabrics = fabrics.len();
    let total_images = images.len();

    // 既存の参照セットにあるものは対応済み
    let (current_mapping, excluded_fabrics, excluded_images) = match current {
        Some(path) => {
            let lookup = applier::load_lookup(path)
                .with_context(|| format!("参照セットの読み込みに失敗: {}", path.display()))?;
            let excluded_fabrics = lookup.retain_unmapped(&mut fabrics.values);
            let excluded_images = lookup.retain_unmapped(&mut images.values);
            println!(
                "✔ 既存の参照セット {}件: 布地コード {}件 / 画像ID {}件を除外",
                lookup.len(),
                excluded_fabrics,
                excluded_images
            );
            (lookup.len(), excluded_fabrics, excluded_images)
        }
        None => (0, 0, 0),
    };
    if fabrics.is_empty() || images.is_empty() {
        tracing::warn!(fabrics = fabrics.len(), images = images.len(), "入力が空です");
        println!("⚠ 入力が空のため照合結果は0件になります");
    }
    println!();

    // 2. 照合
    println!("[2/3] 照合中... (最低スコア {})", min_score);
    let progress = create_progress_bar(images.len() as u64);
    let outcome = match_codes_with_progress(
        &fabrics.values,
        &images.values,
        &MatchOptions { min_score },
        |done| progress.set_position(done as u64),
    );
    progress.finish_and_clear();
    println!("✔ {}件を照合\n", outcome.matches.len());

    // 3. レポート
    println!("[3/3] レポートを出力中...");
    let report = MatchReport::build(
        outcome,
        total_fabrics,
        total_images,
        min_score,
        chrono::Local::now().to_rfc3339(),
    )
    .with_skipped_rows(fabrics.skipped.len())
    .with_exclusions(current_mapping, excluded_fabrics, excluded_images);

    report::print_summary(&report);
    report::save_report(&report, &args.output)
        .with_context(|| format!("レポートの保存に失敗: {}", args.output.display()))?;
    println!("✔ レポートを保存: {}", args.output.display());

    if let Some(xlsx) = &args.xlsx {
        report::excel::export_report_xlsx(&report, xlsx)?;
        println!("✔ Excelを保存: {}", xlsx.display());
    }

    Ok(report)
}

/// 確認の上でレポートを参照セットに適用する。中止した場合は false
fn apply_to_artifact(
    report: &MatchReport,
    artifact: &Path,
    args: &ApplyArgs,
    config: &Config,
) -> anyhow::Result<bool> {
    let options = applier::ApplyOptions {
        floor: args.floor.unwrap_or(config.apply_floor),
        replace: args.replace,
        dry_run: args.dry_run,
    };

    let selected = report.matches.iter().filter(|m| m.tier >= options.floor).count();
    println!(
        "適用対象: {}件 ({}以上) → {}{}",
        selected,
        options.floor,
        artifact.display(),
        if options.replace { " (置き換え)" } else { "" }
    );

    if !args.yes && !args.dry_run {
        let confirmed = Confirm::new()
            .with_prompt("参照セットを更新しますか?")
            .default(false)
            .interact()
            .map_err(|e| ReconcileError::Prompt(e.to_string()))?;
        if !confirmed {
            println!("中止しました");
            return Ok(false);
        }
    }

    let now = chrono::Local::now();
    let outcome = applier::apply_report(
        report,
        artifact,
        &options,
        &now.to_rfc3339(),
        &now.format("%Y%m%d%H%M%S").to_string(),
    )
    .with_context(|| format!("参照セットの更新に失敗: {}", artifact.display()))?;

    println!();
    applier::print_outcome(&outcome, options.floor);
    if outcome.written {
        println!("✔ 参照セットを保存: {}", artifact.display());
    }
    Ok(true)
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    println!("⚙ 設定ファイル: {}", Config::config_path()?.display());
    for line in config.describe() {
        println!("  {}", line);
    }
    Ok(())
}
