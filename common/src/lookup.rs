//! 画像あり布地コードの参照セット
//!
//! 「布地コード X に画像があるか」を答える集合。
//! 読み込み → 追加 → 保存 の順で明示的に受け渡して使う。
//!
//! 保存形式:
//! - TypeScript: `FABRICS_WITH_CLOUDINARY_IMAGES` セットと参照関数を持つモジュール
//! - JSON: `{ "generatedAt", "count", "fabricCodes": [...] }`

use crate::error::{Error, Result};
use crate::types::ConfidenceTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const TS_SET_OPEN: &str = "new Set([";
const TS_SET_CLOSE: &str = "])";

/// 成果物の保存形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    TypeScript,
    Json,
}

impl ArtifactFormat {
    /// 拡張子から形式を決める（.ts / .tsx 以外は JSON）
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ts") || ext.eq_ignore_ascii_case("tsx") => {
                ArtifactFormat::TypeScript
            }
            _ => ArtifactFormat::Json,
        }
    }
}

/// 成果物のヘッダ情報
#[derive(Debug, Clone, Default)]
pub struct ArtifactHeader {
    pub generated_at: String,
    pub floor: Option<ConfidenceTier>,
    pub previous_count: usize,
    pub added_count: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonArtifact {
    #[serde(default)]
    generated_at: String,
    #[serde(default)]
    count: usize,
    fabric_codes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonArtifactInput {
    Document(JsonArtifact),
    Codes(Vec<String>),
}

/// 画像あり布地コードの集合（コード順）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLookup {
    codes: BTreeSet<String>,
}

impl ImageLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// コード一覧から作成（前後空白を除去し、空は捨てる）
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lookup = Self::new();
        lookup.extend(codes);
        lookup
    }

    pub fn has_image(&self, code: &str) -> bool {
        self.codes.contains(code.trim())
    }

    /// 追加した場合 true
    pub fn insert(&mut self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }
        self.codes.insert(code.to_string())
    }

    /// 追加し、新規だった件数を返す
    pub fn extend<I, S>(&mut self, codes: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter(|c| self.insert(c.as_ref()))
            .count()
    }

    /// 参照セットに含まれる値を取り除き、取り除いた件数を返す
    pub fn retain_unmapped(&self, values: &mut Vec<String>) -> usize {
        let before = values.len();
        values.retain(|v| !self.has_image(v));
        before - values.len()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(|c| c.as_str())
    }

    /// 成果物の文字列から読み込み
    pub fn parse(content: &str, format: ArtifactFormat) -> Result<Self> {
        match format {
            ArtifactFormat::Json => {
                let input: JsonArtifactInput = serde_json::from_str(content)?;
                let codes = match input {
                    JsonArtifactInput::Document(doc) => doc.fabric_codes,
                    JsonArtifactInput::Codes(codes) => codes,
                };
                Ok(Self::from_codes(codes))
            }
            ArtifactFormat::TypeScript => Ok(Self::from_codes(parse_ts_set(content)?)),
        }
    }

    /// 成果物の文字列を生成
    pub fn render(&self, format: ArtifactFormat, header: &ArtifactHeader) -> Result<String> {
        match format {
            ArtifactFormat::Json => {
                let doc = JsonArtifact {
                    generated_at: header.generated_at.clone(),
                    count: self.len(),
                    fabric_codes: self.codes.iter().cloned().collect(),
                };
                let mut json = serde_json::to_string_pretty(&doc)?;
                json.push('\n');
                Ok(json)
            }
            ArtifactFormat::TypeScript => Ok(self.render_ts(header)),
        }
    }

    fn render_ts(&self, header: &ArtifactHeader) -> String {
        let floor = header
            .floor
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        let entries = self
            .codes
            .iter()
            .map(|c| format!("  '{}'", escape_ts(c)))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            r#"/**
 * Fabric Image Mapping - generated by khovai-reconcile
 *
 * Generated: {generated_at}
 * Confidence floor: {floor}
 * Previous mapping: {previous} codes
 * New matches: {added} codes
 * Total: {total} codes
 */

const FABRICS_WITH_CLOUDINARY_IMAGES = {open}
{entries}
{close}

export function hasRealImage(fabricCode: string): boolean {{
  return FABRICS_WITH_CLOUDINARY_IMAGES.has(fabricCode)
}}

export function getAllFabricsWithImages(): string[] {{
  return Array.from(FABRICS_WITH_CLOUDINARY_IMAGES)
}}

export function getFabricImageCount(): number {{
  return FABRICS_WITH_CLOUDINARY_IMAGES.size
}}

export function hasCloudinaryImage(fabricCode: string): boolean {{
  return FABRICS_WITH_CLOUDINARY_IMAGES.has(fabricCode)
}}
"#,
            generated_at = header.generated_at,
            floor = floor,
            previous = header.previous_count,
            added = header.added_count,
            total = self.len(),
            open = TS_SET_OPEN,
            entries = entries,
            close = TS_SET_CLOSE,
        )
    }
}

fn escape_ts(code: &str) -> String {
    code.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `new Set([ ... ])` の中の文字列リテラルを取り出す
///
/// 区切りの空白・カンマ・コメント以外が現れたらエラーにする。
fn parse_ts_set(content: &str) -> Result<Vec<String>> {
    let start = content
        .find(TS_SET_OPEN)
        .ok_or_else(|| Error::Parse("new Set([ が見つかりません".into()))?
        + TS_SET_OPEN.len();

    let mut codes = Vec::new();
    let mut chars = content[start..].chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => codes.push(read_literal(&mut chars, c)?),
            ']' if chars.peek() == Some(&')') => return Ok(codes),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    previous = c;
                }
                if !closed {
                    return Err(Error::Parse("コメントが閉じていません".into()));
                }
            }
            ',' => {}
            c if c.is_whitespace() => {}
            other => {
                return Err(Error::Parse(format!("Set の中に想定外の文字があります: {}", other)));
            }
        }
    }

    Err(Error::Parse("])が見つかりません".into()))
}

/// 開き引用符の直後から閉じ引用符までを読む
fn read_literal(chars: &mut impl Iterator<Item = char>, quote: char) -> Result<String> {
    let mut code = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    code.push(escaped);
                }
            }
            c if c == quote => return Ok(code),
            _ => code.push(c),
        }
    }
    Err(Error::Parse(format!("引用符が閉じていません: {}", code)))
}
