//! 類似度計算
//!
//! 正規化キー同士を比較し、0.0〜1.0 のスコアを返す。
//! - 片方が空 → 0.0
//! - 完全一致 → 1.0
//! - 部分文字列 → 短い方の長さ / 長い方の長さ
//! - それ以外 → 1 - 編集距離 / 長い方の長さ

use crate::normalize::normalize_key;

/// 生の文字列同士の類似度（内部で正規化してから比較）
pub fn similarity(a: &str, b: &str) -> f64 {
    key_similarity(&normalize_key(a), &normalize_key(b))
}

/// 正規化済みキー同士の類似度
pub fn key_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let max_len = a_len.max(b_len);

    if a.contains(b) || b.contains(a) {
        return a_len.min(b_len) as f64 / max_len as f64;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

/// レーベンシュタイン距離を計算（挿入・削除・置換すべてコスト1）
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // 直前の行だけ保持する
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}
