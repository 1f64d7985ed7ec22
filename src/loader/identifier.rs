//! 画像IDの整形
//!
//! - public id からフォルダ接頭辞・拡張子を除去
//! - ファイル名由来のノイズ（IMG_ 接頭辞、" copy"、日付など）を除去

use regex::Regex;

/// 画像ファイルとして扱う拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic"];

/// public id の先頭フォルダ（なければ None）
pub fn folder_of(public_id: &str) -> Option<&str> {
    public_id.split_once('/').map(|(folder, _)| folder)
}

/// public id から既知フォルダの接頭辞と画像拡張子を除去
pub fn strip_public_id(public_id: &str, folders: &[String]) -> String {
    let mut id = public_id.trim();

    if let Some(folder) = folder_of(id) {
        if folders.iter().any(|f| f == folder) {
            id = &id[folder.len() + 1..];
        }
    }

    strip_image_extension(id).to_string()
}

/// 末尾の画像拡張子だけを除去（"3.5-AB" のようなコードは変えない）
pub fn strip_image_extension(name: &str) -> &str {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if !stem.is_empty() && IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return stem;
        }
    }
    name
}

/// ファイル名由来の画像IDを整形する
pub fn clean_identifier(name: &str) -> String {
    lazy_static::lazy_static! {
        // カメラ・書き出し時の接頭辞
        static ref PREFIX_RE: Regex =
            Regex::new(r"(?i)^(mo rong vai_|mở rộng vải_|morong_|vai_|fabric_|img_|dsc_)").unwrap();
        // コピー・倉庫メモの接尾辞
        static ref COPY_SUFFIX_RE: Regex =
            Regex::new(r"(?i)(\s+-\s+copy|\s+copy|\s+cankhoto|\s*\(\d+\))$").unwrap();
        // 末尾の日付（YYYYMMDD / YYMMDD）
        static ref DATE_SUFFIX_RE: Regex = Regex::new(r"[\s_]+(\d{8}|\d{6})$").unwrap();
        static ref PAREN_RE: Regex = Regex::new(r"\s*\([^)]*\)\s*").unwrap();
        static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
        static ref DASH_RE: Regex = Regex::new(r"\s*-\s*").unwrap();
    }

    let name = PREFIX_RE.replace(name.trim(), "");
    let name = COPY_SUFFIX_RE.replace(&name, "");
    let name = DATE_SUFFIX_RE.replace(&name, "");
    let name = PAREN_RE.replace_all(&name, " ");
    let name = SPACE_RE.replace_all(name.trim(), " ");
    let name = DASH_RE.replace_all(&name, "-");

    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folders() -> Vec<String> {
        vec!["fabric_images".to_string(), "fabrics".to_string()]
    }

    #[test]
    fn test_folder_of() {
        assert_eq!(folder_of("fabrics/AB-12"), Some("fabrics"));
        assert_eq!(folder_of("AB-12"), None);
    }

    #[test]
    fn test_strip_public_id() {
        assert_eq!(strip_public_id("fabrics/AB-12", &folders()), "AB-12");
        assert_eq!(strip_public_id("fabric_images/83102-19.jpg", &folders()), "83102-19");
        assert_eq!(strip_public_id("AB-12.PNG", &folders()), "AB-12");
        // 未知のフォルダはそのまま残す
        assert_eq!(strip_public_id("banners/AB-12", &folders()), "banners/AB-12");
    }

    #[test]
    fn test_strip_image_extension_keeps_dotted_codes() {
        assert_eq!(strip_image_extension("3.5-AB"), "3.5-AB");
        assert_eq!(strip_image_extension("VL.9001.jpeg"), "VL.9001");
        assert_eq!(strip_image_extension(".jpg"), ".jpg");
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("IMG_83102-19 copy"), "83102-19");
        assert_eq!(clean_identifier("MO RONG VAI_AB 12 - 34 (2)"), "AB 12-34");
        assert_eq!(clean_identifier("DSC_VL9001 20240115"), "VL9001");
        assert_eq!(clean_identifier("8015-1 cankhoto"), "8015-1");
        assert_eq!(clean_identifier("  071-02B (mau xanh) A "), "071-02B A");
    }

    #[test]
    fn test_clean_identifier_keeps_numeric_codes() {
        // 区切りのない数字列は日付とみなさない
        assert_eq!(clean_identifier("VL-900100"), "VL-900100");
        assert_eq!(clean_identifier("83102-19"), "83102-19");
    }
}
