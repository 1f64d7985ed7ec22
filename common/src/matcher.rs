//! 布地コード⇔画像ID 照合モジュール
//!
//! ## 処理フロー
//! 1. 両方の一覧にある生の文字列を対応済みとして確定（score = 1.0）
//! 2. 正規化キーが一致するペアを確定（score = 1.0）
//! 3. 残りの画像を入力順に処理し、未使用の布地コードから最高スコアを選ぶ
//!
//! 重複した文字列は最初の出現にまとめ、1つの値が複数の候補に現れることはない。
//!
//! 割り当ては画像ごとの貪欲法で、全体最適（二部マッチング）ではない。
//! 既存のレビュー済みレポートと結果を揃えるため、この挙動を維持している。

use crate::normalize::normalize_key;
use crate::similarity::key_similarity;
use crate::types::{MatchCandidate, MatchKind, DEFAULT_MIN_SCORE};
use std::collections::HashMap;

/// 照合オプション
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// この値未満のスコアは採用しない
    pub min_score: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// 照合結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// 採用されたペア（画像の入力順）
    pub matches: Vec<MatchCandidate>,
    /// どの画像にも割り当てられなかった布地コード（入力順）
    pub unmatched_fabric_codes: Vec<String>,
    /// どの布地コードにも割り当てられなかった画像ID（入力順）
    pub unmatched_image_identifiers: Vec<String>,
}

/// 布地コードと画像IDを照合する
///
/// # Arguments
/// * `fabric_codes` - 布地コード一覧
/// * `image_identifiers` - 画像ID一覧
/// * `options` - 照合オプション
pub fn match_codes(
    fabric_codes: &[String],
    image_identifiers: &[String],
    options: &MatchOptions,
) -> MatchOutcome {
    match_codes_with_progress(fabric_codes, image_identifiers, options, |_| {})
}

/// 進捗コールバック付きで照合する
///
/// `on_progress` は類似度計算の段階で画像を1件処理するたびに、
/// 処理済み件数を引数に呼ばれる。
pub fn match_codes_with_progress<F>(
    fabric_codes: &[String],
    image_identifiers: &[String],
    options: &MatchOptions,
    mut on_progress: F,
) -> MatchOutcome
where
    F: FnMut(usize),
{
    let fabric_keys: Vec<String> = fabric_codes.iter().map(|c| normalize_key(c)).collect();
    let image_keys: Vec<String> = image_identifiers.iter().map(|i| normalize_key(i)).collect();

    // 同じ文字列の2件目以降は最初の出現と同じ扱い
    let fabric_first = first_occurrences(fabric_codes);
    let image_first = first_occurrences(image_identifiers);

    let mut claimed: Vec<bool> = fabric_first
        .iter()
        .enumerate()
        .map(|(i, &first)| first != i)
        .collect();
    let mut assigned: Vec<Option<MatchCandidate>> = vec![None; image_identifiers.len()];
    let is_first_image = |idx: usize| image_first[idx] == idx;

    // 1. 両方の一覧にある文字列は対応済みとして確定し、以降の照合から外す
    let raw_index = index_by(fabric_codes.iter().map(|c| c.as_str()));
    for (image_idx, image) in image_identifiers.iter().enumerate() {
        if !is_first_image(image_idx) {
            continue;
        }
        if let Some(fabric_idx) = first_unclaimed(&raw_index, image, &claimed) {
            claimed[fabric_idx] = true;
            assigned[image_idx] = Some(MatchCandidate::new(
                image,
                &fabric_codes[fabric_idx],
                1.0,
                MatchKind::Exact,
            ));
        }
    }

    // 2. 正規化キーの一致
    let key_index = index_by(fabric_keys.iter().map(|k| k.as_str()));
    for (image_idx, image) in image_identifiers.iter().enumerate() {
        if !is_first_image(image_idx) || assigned[image_idx].is_some() {
            continue;
        }
        if let Some(fabric_idx) = first_unclaimed(&key_index, &image_keys[image_idx], &claimed) {
            claimed[fabric_idx] = true;
            assigned[image_idx] = Some(MatchCandidate::new(
                image,
                &fabric_codes[fabric_idx],
                1.0,
                MatchKind::ExactNormalized,
            ));
        }
    }

    // 3. 類似度による貪欲割り当て
    for (image_idx, image) in image_identifiers.iter().enumerate() {
        if is_first_image(image_idx) && assigned[image_idx].is_none() {
            if let Some((fabric_idx, score)) =
                best_unclaimed(&image_keys[image_idx], &fabric_keys, &claimed, options.min_score)
            {
                claimed[fabric_idx] = true;
                assigned[image_idx] = Some(MatchCandidate::new(
                    image,
                    &fabric_codes[fabric_idx],
                    score,
                    MatchKind::Fuzzy,
                ));
            }
        }
        on_progress(image_idx + 1);
    }

    let unmatched_image_identifiers = image_identifiers
        .iter()
        .zip(&image_first)
        .filter(|&(_, &first)| assigned[first].is_none())
        .map(|(image, _)| image.clone())
        .collect();

    let unmatched_fabric_codes = fabric_codes
        .iter()
        .zip(&fabric_first)
        .filter(|&(_, &first)| !claimed[first])
        .map(|(code, _)| code.clone())
        .collect();

    MatchOutcome {
        matches: assigned.into_iter().flatten().collect(),
        unmatched_fabric_codes,
        unmatched_image_identifiers,
    }
}

/// 各要素について、同じ文字列が最初に現れた位置
fn first_occurrences(values: &[String]) -> Vec<usize> {
    let mut first: HashMap<&str, usize> = HashMap::new();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| *first.entry(value.as_str()).or_insert(i))
        .collect()
}

/// 値 → 出現位置（入力順）の索引を作る。空文字は索引に含めない
fn index_by<'a>(values: impl Iterator<Item = &'a str>) -> HashMap<&'a str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, value) in values.enumerate() {
        if !value.is_empty() {
            index.entry(value).or_default().push(i);
        }
    }
    index
}

fn first_unclaimed(index: &HashMap<&str, Vec<usize>>, value: &str, claimed: &[bool]) -> Option<usize> {
    if value.is_empty() {
        return None;
    }
    index
        .get(value)
        .and_then(|positions| positions.iter().copied().find(|&i| !claimed[i]))
}

/// 未使用の布地コードから最高スコアを探す。同点は先に出現した方
fn best_unclaimed(
    image_key: &str,
    fabric_keys: &[String],
    claimed: &[bool],
    min_score: f64,
) -> Option<(usize, f64)> {
    if image_key.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (fabric_idx, fabric_key) in fabric_keys.iter().enumerate() {
        if claimed[fabric_idx] {
            continue;
        }
        let score = key_similarity(image_key, fabric_key);
        if score <= 0.0 || score < min_score {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((fabric_idx, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfidenceTier;
    use std::collections::HashSet;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn run(fabrics: &[&str], images: &[&str], min_score: f64) -> MatchOutcome {
        match_codes(&strings(fabrics), &strings(images), &MatchOptions { min_score })
    }

    #[test]
    fn test_exact_match_leaves_other_codes_unmatched() {
        let outcome = run(&["AB-12", "CD-34"], &["AB-12"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.image_identifier, "AB-12");
        assert_eq!(m.fabric_code, "AB-12");
        assert_eq!(m.score, 1.0);
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(outcome.unmatched_fabric_codes, vec!["CD-34"]);
        assert!(outcome.unmatched_image_identifiers.is_empty());
    }

    #[test]
    fn test_substring_match_is_medium() {
        let outcome = run(&["071-02B"], &["AR-071-02B"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.fabric_code, "071-02B");
        assert!((m.score - 0.75).abs() < 1e-9);
        assert_eq!(m.tier, ConfidenceTier::Medium);
        assert_eq!(m.kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_unrelated_names_do_not_match() {
        let outcome = run(&["XYZ"], &["completely-different-name-here"], 0.6);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_fabric_codes, vec!["XYZ"]);
        assert_eq!(outcome.unmatched_image_identifiers, vec!["completely-different-name-here"]);
    }

    #[test]
    fn test_empty_strings_never_match() {
        let outcome = run(&["", "ABC"], &[""], 0.0);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_image_identifiers, vec![""]);
        assert_eq!(outcome.unmatched_fabric_codes, vec!["", "ABC"]);
    }

    #[test]
    fn test_symbol_only_names_never_match_by_normalization() {
        let outcome = run(&["---"], &["__"], 0.0);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_each_image_takes_its_own_best_code() {
        let outcome = run(&["A1", "A2"], &["A1X", "A2X"], 0.6);

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].image_identifier, "A1X");
        assert_eq!(outcome.matches[0].fabric_code, "A1");
        assert_eq!(outcome.matches[1].image_identifier, "A2X");
        assert_eq!(outcome.matches[1].fabric_code, "A2");
    }

    #[test]
    fn test_normalized_equality_scores_one() {
        let outcome = run(&["83102-19"], &["83102 19"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].score, 1.0);
        assert_eq!(outcome.matches[0].kind, MatchKind::ExactNormalized);
        assert_eq!(outcome.matches[0].tier, ConfidenceTier::High);
    }

    #[test]
    fn test_normalized_pass_runs_before_similarity_pass() {
        // "AB-123" は "AB12" と類似度0.8だが、後続画像の正規化一致が優先される
        let outcome = run(&["AB12"], &["AB-123", "ab 12"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].image_identifier, "ab 12");
        assert_eq!(outcome.unmatched_image_identifiers, vec!["AB-123"]);
    }

    #[test]
    fn test_mapped_string_is_consumed_in_both_lists() {
        let outcome = run(&["AB-12", "AB-13"], &["AB-12", "AB-12"], 0.6);

        // 2枚目の "AB-12" も対応済みで、"AB-13" を取りにいかない
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].fabric_code, "AB-12");
        assert_eq!(outcome.matches[0].kind, MatchKind::Exact);
        assert_eq!(outcome.unmatched_fabric_codes, vec!["AB-13"]);
        assert!(outcome.unmatched_image_identifiers.is_empty());
    }

    #[test]
    fn test_duplicate_fabric_code_is_claimed_once() {
        let outcome = run(&["AB-12", "AB-12"], &["AB-12", "AB-12x"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].image_identifier, "AB-12");
        assert_eq!(outcome.matches[0].kind, MatchKind::Exact);
        assert!(outcome.unmatched_fabric_codes.is_empty());
        assert_eq!(outcome.unmatched_image_identifiers, vec!["AB-12x"]);
    }

    #[test]
    fn test_duplicate_image_yields_one_fuzzy_candidate() {
        let outcome = run(&["AB-12", "AB-13"], &["AB-12x", "AB-12x"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].fabric_code, "AB-12");
        assert_eq!(outcome.unmatched_fabric_codes, vec!["AB-13"]);
        assert!(outcome.unmatched_image_identifiers.is_empty());
    }

    #[test]
    fn test_unmatched_duplicates_keep_every_occurrence() {
        let outcome = run(&["XYZ", "XYZ"], &["qqq", "qqq"], 0.6);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_fabric_codes, vec!["XYZ", "XYZ"]);
        assert_eq!(outcome.unmatched_image_identifiers, vec!["qqq", "qqq"]);
    }

    #[test]
    fn test_tie_goes_to_first_code_in_list() {
        let outcome = run(&["AB1", "AB2"], &["AB"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].fabric_code, "AB1");
    }

    #[test]
    fn test_greedy_assignment_is_not_globally_optimal() {
        // 全体最適なら abcdxy→abcd, abcdxyz0→abcdxyz だが、先着の画像が良い方を取る
        let outcome = run(&["abcd", "abcdxyz"], &["abcdxy", "abcdxyz0"], 0.6);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].image_identifier, "abcdxy");
        assert_eq!(outcome.matches[0].fabric_code, "abcdxyz");
        assert_eq!(outcome.unmatched_image_identifiers, vec!["abcdxyz0"]);
        assert_eq!(outcome.unmatched_fabric_codes, vec!["abcd"]);
    }

    #[test]
    fn test_min_score_is_respected() {
        // 0.75 は 0.7 では採用、0.8 では不採用
        assert_eq!(run(&["071-02B"], &["AR-071-02B"], 0.7).matches.len(), 1);
        assert!(run(&["071-02B"], &["AR-071-02B"], 0.8).matches.is_empty());
    }

    #[test]
    fn test_uniqueness_and_determinism() {
        let fabrics = [
            "83102-19", "83102-18", "071-02B", "AB-12", "AB-13", "CD-34", "VL-9001", "VL-9002", "",
        ];
        let images = [
            "83102-19", "83102 18", "AR-071-02B", "AB-12 copy", "AB12", "VL9001", "VL-9001", "", "zzz",
        ];

        let first = run(&fabrics, &images, 0.6);
        let second = run(&fabrics, &images, 0.6);
        assert_eq!(first, second);

        let mut seen_codes = HashSet::new();
        let mut seen_images = HashSet::new();
        for m in &first.matches {
            assert!(seen_codes.insert(m.fabric_code.clone()), "布地コード重複: {}", m.fabric_code);
            assert!(seen_images.insert(m.image_identifier.clone()), "画像ID重複: {}", m.image_identifier);
            assert!((0.0..=1.0).contains(&m.score));
            assert!(m.score >= 0.6);
        }

        assert_eq!(first.matches.len() + first.unmatched_image_identifiers.len(), images.len());
        assert_eq!(first.matches.len() + first.unmatched_fabric_codes.len(), fabrics.len());
    }

    #[test]
    fn test_exact_pairs_appear_only_once() {
        let outcome = run(&["AB-12", "AB-120"], &["AB-120", "AB-12"], 0.6);

        let exact: Vec<_> = outcome
            .matches
            .iter()
            .filter(|m| m.image_identifier == m.fabric_code)
            .collect();
        assert_eq!(exact.len(), 2);
        assert!(exact.iter().all(|m| m.kind == MatchKind::Exact && m.score == 1.0));
    }

    #[test]
    fn test_empty_inputs() {
        let outcome = run(&[], &["AB-12"], 0.6);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_image_identifiers, vec!["AB-12"]);

        let outcome = run(&["AB-12"], &[], 0.6);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched_fabric_codes, vec!["AB-12"]);
    }

    #[test]
    fn test_progress_callback_counts_images() {
        let mut calls = Vec::new();
        match_codes_with_progress(
            &strings(&["A1"]),
            &strings(&["A1", "B2", "C3"]),
            &MatchOptions::default(),
            |done| calls.push(done),
        );
        assert_eq!(calls, vec![1, 2, 3]);
    }
}
