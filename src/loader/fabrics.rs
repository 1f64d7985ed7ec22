//! 布地コードの読み込み（CSV / JSON）

use super::csv::parse_csv_line;
use super::{LoadOptions, LoadedList};
use crate::error::{MalformedRow, ReconcileError, Result};
use serde_json::Value;
use std::path::Path;

/// CSVから布地コード列を読み込む（1行目は見出し）
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_csv(&content, path, options))
}

/// CSV文字列から読み込み
pub fn parse_csv(content: &str, path: &Path, options: &LoadOptions) -> LoadedList {
    let required = options.required_columns();
    let mut loaded = LoadedList::default();

    // BOM付きUTF-8に対応
    let content = content.trim_start_matches('\u{feff}');

    let rows = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .skip(1);

    for (index, line) in rows {
        let fields = match parse_csv_line(line) {
            Ok(fields) if fields.len() >= required => fields,
            Ok(fields) => {
                skip_row(
                    &mut loaded,
                    path,
                    index + 1,
                    format!("列数不足（{}列、必要{}列）", fields.len(), required),
                );
                continue;
            }
            Err(reason) => {
                skip_row(&mut loaded, path, index + 1, reason);
                continue;
            }
        };

        if let Some(code) = options.accept(&fields[options.code_column]) {
            loaded.values.push(code);
        }
    }

    loaded
}

/// 在庫JSONから読み込む
///
/// 対応形式:
/// - `{"fabrics": [{"code": "..."}, ...]}`
/// - `["...", ...]` / `[{"code": "..."}, ...]`
pub fn load_json(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| ReconcileError::invalid_source(path, e.to_string()))?;

    let entries = match &value {
        Value::Object(map) => map
            .get("fabrics")
            .and_then(Value::as_array)
            .ok_or_else(|| ReconcileError::invalid_source(path, "fabrics 配列がありません"))?,
        Value::Array(items) => items,
        _ => return Err(ReconcileError::invalid_source(path, "オブジェクトまたは配列が必要です")),
    };

    let mut loaded = LoadedList::default();
    for (index, entry) in entries.iter().enumerate() {
        let code = match entry {
            Value::Object(fabric) => fabric.get("code").and_then(scalar_to_string),
            other => scalar_to_string(other),
        };

        match code {
            Some(code) => {
                if let Some(code) = options.accept(&code) {
                    loaded.values.push(code);
                }
            }
            None => tracing::debug!(index, "code のない要素をスキップ"),
        }
    }

    Ok(loaded)
}

/// 文字列・数値をコード文字列に変換
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn skip_row(loaded: &mut LoadedList, path: &Path, line: usize, reason: String) {
    let row = MalformedRow {
        path: path.to_path_buf(),
        line,
        reason,
    };
    tracing::warn!("{}", row);
    loaded.skipped.push(row);
}
