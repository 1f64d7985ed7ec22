//! 入力読み込みモジュール
//!
//! 布地コード（CSV / JSON / Excel）と画像ID（スナップショットJSON / 画像フォルダ）を
//! 読み込み、前後空白の除去・空値と見出しの除外を行った順序付きリストを返す。
//!
//! - ファイルがない → `MissingFile`（致命的）
//! - 不正な行 → `MalformedRow` としてスキップし、処理は続行

pub mod csv;
pub mod excel;
pub mod fabrics;
pub mod folder;
pub mod identifier;
pub mod snapshot;

use crate::config::Config;
use crate::error::{MalformedRow, ReconcileError, Result};
use std::path::Path;

/// 読み込み結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedList {
    /// 整形済みの値（入力順）
    pub values: Vec<String>,
    /// スキップした行
    pub skipped: Vec<MalformedRow>,
}

impl LoadedList {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 読み込みオプション
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// 布地コード列（0始まり）
    pub code_column: usize,
    /// 1行に必要な最低列数
    pub min_columns: usize,
    pub header_sentinels: Vec<String>,
    pub image_folders: Vec<String>,
    /// ファイル名由来のノイズを除去する
    pub clean_names: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl LoadOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            code_column: config.code_column,
            min_columns: config.min_columns,
            header_sentinels: config.header_sentinels.clone(),
            image_folders: config.image_folders.clone(),
            clean_names: false,
        }
    }

    /// 布地コード列を含むのに必要な列数
    pub fn required_columns(&self) -> usize {
        self.min_columns.max(self.code_column + 1)
    }

    fn is_sentinel(&self, value: &str) -> bool {
        self.header_sentinels.iter().any(|s| s == value)
    }

    /// 前後空白を除去し、空値・見出しを除外
    pub(crate) fn accept(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() || self.is_sentinel(value) {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// 布地コードを読み込む（拡張子で形式を判定）
pub fn load_fabric_codes(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    require_exists(path)?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let loaded = match extension.as_str() {
        "json" => fabrics::load_json(path, options)?,
        "xlsx" | "xlsm" | "xls" | "ods" => excel::load_workbook(path, options)?,
        _ => fabrics::load_csv(path, options)?,
    };

    tracing::info!(
        path = %path.display(),
        count = loaded.len(),
        skipped = loaded.skipped.len(),
        "布地コード読み込み完了"
    );
    Ok(loaded)
}

/// 画像IDを読み込む（フォルダなら画像ファイル名、ファイルならスナップショットJSON）
pub fn load_image_identifiers(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    require_exists(path)?;

    let mut loaded = if path.is_dir() {
        folder::scan_image_folder(path)?
    } else {
        snapshot::load_snapshot(path, options)?
    };

    if options.clean_names {
        loaded.values = loaded
            .values
            .iter()
            .map(|v| identifier::clean_identifier(v))
            .collect();
    }
    loaded.values.retain(|v| options.accept(v).is_some());

    tracing::info!(path = %path.display(), count = loaded.len(), "画像ID読み込み完了");
    Ok(loaded)
}

fn require_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReconcileError::MissingFile(path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns() {
        let mut options = LoadOptions::default();
        assert_eq!(options.required_columns(), 2);
        options.code_column = 4;
        assert_eq!(options.required_columns(), 5);
    }

    #[test]
    fn test_accept_filters_sentinels() {
        let options = LoadOptions::default();
        assert_eq!(options.accept("  AB-12 "), Some("AB-12".to_string()));
        assert_eq!(options.accept("Mã vải"), None);
        assert_eq!(options.accept("   "), None);
    }

    #[test]
    fn test_missing_file() {
        let result = load_fabric_codes(Path::new("/nonexistent/fabrics.csv"), &LoadOptions::default());
        assert!(matches!(result, Err(ReconcileError::MissingFile(_))));

        let result = load_image_identifiers(Path::new("/nonexistent/images.json"), &LoadOptions::default());
        assert!(matches!(result, Err(ReconcileError::MissingFile(_))));
    }
}
