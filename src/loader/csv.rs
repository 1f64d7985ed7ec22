//! CSV行パーサー
//!
//! 在庫エクスポートのCSVを1行ずつ分割する。
//! 引用符で囲まれたカンマ、`""` によるエスケープに対応。

/// CSVの1行をフィールドに分割
///
/// 引用符が閉じていない行はエラー文字列を返す。
pub fn parse_csv_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err("引用符が閉じていません".into());
    }

    fields.push(current.trim().to_string());
    Ok(fields)
}
