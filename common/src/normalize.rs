//! 比較キーの正規化
//!
//! 布地コード・画像IDを小文字化し、`[a-z0-9]` 以外を除去する。
//! 比較専用であり、結果を保存することはない。

/// 比較用の正規化キーを生成
///
/// # Examples
/// ```
/// use khovai_common::normalize_key;
///
/// assert_eq!(normalize_key("AR-071-02B"), "ar07102b");
/// assert_eq!(normalize_key("  --  "), "");
/// ```
pub fn normalize_key(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_strips_symbols() {
        assert_eq!(normalize_key("83102-19"), "8310219");
        assert_eq!(normalize_key("071-02B"), "07102b");
        assert_eq!(normalize_key("AB 12/R"), "ab12r");
    }

    #[test]
    fn test_normalize_key_empty() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("---"), "");
    }

    #[test]
    fn test_normalize_key_drops_non_ascii() {
        // ベトナム語の声調記号付き文字は比較キーに残らない
        assert_eq!(normalize_key("Mã vải 01"), "mvi01");
    }
}
