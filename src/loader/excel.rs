//! Excel読み込み（在庫ブック）
//!
//! 先頭シートの1行目を見出しとして読み飛ばし、布地コード列を取り出す。

use super::fabrics::skip_row;
use super::{LoadOptions, LoadedList};
use crate::error::{ReconcileError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub fn load_workbook(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconcileError::ExcelRead(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReconcileError::ExcelRead(format!("シートがありません: {}", path.display())))?
        .map_err(|e| ReconcileError::ExcelRead(e.to_string()))?;

    let required = options.required_columns();
    let mut loaded = LoadedList::default();

    // Range は最初の非空セルから始まるため、絶対位置に戻して扱う
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let code_column = options.code_column.checked_sub(col_offset);

    for (index, row) in range.rows().enumerate().skip(1) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let filled = row.iter().filter(|cell| !matches!(cell, Data::Empty)).count();
        let cell = match code_column.and_then(|c| row.get(c)) {
            Some(cell) if col_offset + row.len() >= required => cell,
            _ => {
                skip_row(
                    &mut loaded,
                    path,
                    row_offset + index + 1,
                    format!("列数不足（{}列、必要{}列）", filled, required),
                );
                continue;
            }
        };

        if let Some(code) = options.accept(&cell_to_string(cell)) {
            loaded.values.push(code);
        }
    }

    Ok(loaded)
}

/// セル値をコード文字列に変換（整数値の浮動小数は ".0" を付けない）
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
