use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    MissingFile(String),

    #[error("入力ファイルを解釈できません ({path}): {reason}")]
    InvalidSource { path: String, reason: String },

    #[error("レポートが不正: {0}")]
    InvalidReport(String),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("確認入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] khovai_common::Error),
}

impl ReconcileError {
    pub fn invalid_source(path: &std::path::Path, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidSource {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

/// 読み込み時にスキップした行
///
/// バッチ全体は止めず、ログとレポートに件数を残す。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("不正な行をスキップ {path}:{line}: {reason}")]
pub struct MalformedRow {
    pub path: PathBuf,
    /// 1始まりの行番号
    pub line: usize,
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
