use clap::{Args, Parser, Subcommand};
use khovai_common::ConfidenceTier;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "khovai-reconcile")]
#[command(about = "布地コードと画像IDの照合・画像あり参照セット生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 布地コードと画像IDを照合してレポートを出力
    Analyze(AnalyzeArgs),

    /// 保存済みレポートを参照セットに適用
    Apply {
        /// レポートJSONファイル
        #[arg(short, long, required = true)]
        report: PathBuf,

        /// 参照セット（.ts なら TypeScript モジュール、それ以外は JSON）
        #[arg(short, long, required = true)]
        artifact: PathBuf,

        #[command(flatten)]
        apply: ApplyArgs,
    },

    /// 照合から適用まで一括実行
    Run {
        #[command(flatten)]
        analyze: AnalyzeArgs,

        /// 参照セット（.ts なら TypeScript モジュール、それ以外は JSON）
        #[arg(short, long, required = true)]
        artifact: PathBuf,

        #[command(flatten)]
        apply: ApplyArgs,
    },

    /// 布地コードに画像があるか確認
    Lookup {
        /// 参照セット
        #[arg(short, long, required = true)]
        artifact: PathBuf,

        /// 確認する布地コード
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// 設定を表示・変更
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 最低スコアを設定（0.0-1.0）
        #[arg(long)]
        set_min_score: Option<f64>,

        /// apply の最低区分を設定 (high/medium/low)
        #[arg(long)]
        set_floor: Option<ConfidenceTier>,

        /// 布地コード列を設定（0始まり）
        #[arg(long)]
        set_code_column: Option<usize>,
    },
}

/// 照合の入力と出力
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// 布地コード一覧（CSV / JSON / Excel）
    #[arg(short, long, required = true)]
    pub fabrics: PathBuf,

    /// 画像一覧スナップショットJSON、または画像フォルダ
    #[arg(short, long, required = true)]
    pub images: PathBuf,

    /// 出力レポートJSON
    #[arg(short, long, default_value = "image-matches.json")]
    pub output: PathBuf,

    /// 最低スコア（未指定なら設定値）
    #[arg(long)]
    pub min_score: Option<f64>,

    /// 布地コード列（0始まり、未指定なら設定値）
    #[arg(long)]
    pub code_column: Option<usize>,

    /// 画像IDからファイル名由来のノイズを除去
    #[arg(long)]
    pub clean_names: bool,

    /// 照合結果をExcelにも出力
    #[arg(long)]
    pub xlsx: Option<PathBuf>,

    /// 既存の参照セット（含まれるコード・画像IDは照合から外す。run では --artifact を使う）
    #[arg(long)]
    pub current: Option<PathBuf>,
}

/// 適用時のオプション
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// 採用する最低区分 (high/medium/low、未指定なら設定値)
    #[arg(long)]
    pub floor: Option<ConfidenceTier>,

    /// 既存の参照セットを引き継がずに置き換える
    #[arg(long)]
    pub replace: bool,

    /// 書き込まずに結果だけ表示
    #[arg(long)]
    pub dry_run: bool,

    /// 確認をスキップ
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "khovai-reconcile",
            "run",
            "--fabrics",
            "fabrics.csv",
            "--images",
            "images.json",
            "--artifact",
            "mapping.ts",
            "--floor",
            "high",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { analyze, artifact, apply } => {
                assert_eq!(analyze.fabrics, PathBuf::from("fabrics.csv"));
                assert_eq!(analyze.output, PathBuf::from("image-matches.json"));
                assert!(analyze.current.is_none());
                assert_eq!(artifact, PathBuf::from("mapping.ts"));
                assert_eq!(apply.floor, Some(ConfidenceTier::High));
                assert!(apply.dry_run);
                assert!(!apply.replace);
            }
            _ => panic!("run として解析されませんでした"),
        }
    }

    #[test]
    fn test_parse_lookup_requires_codes() {
        assert!(Cli::try_parse_from(["khovai-reconcile", "lookup", "--artifact", "m.ts"]).is_err());
    }
}
