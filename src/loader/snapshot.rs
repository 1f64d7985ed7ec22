//! 画像一覧スナップショットの読み込み
//!
//! 画像ホストの一覧を事前に保存したJSONから画像IDを取り出す。
//!
//! 対応形式:
//! - 一覧レポート: `{"fabricImages": {"fabricCodes": [...]}}`（整形済みID）
//! - 生の一覧: `{"resources": [{"public_id": "fabrics/AB-12"}, ...]}`
//! - 配列: `["fabrics/AB-12", ...]` / `[{"public_id": ...}, ...]`

use super::fabrics::scalar_to_string;
use super::identifier::{folder_of, strip_public_id};
use super::{LoadOptions, LoadedList};
use crate::error::{ReconcileError, Result};
use serde_json::Value;
use std::path::Path;

pub fn load_snapshot(path: &Path, options: &LoadOptions) -> Result<LoadedList> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| ReconcileError::invalid_source(path, e.to_string()))?;

    let values = parse_snapshot(&value, options)
        .ok_or_else(|| ReconcileError::invalid_source(path, "対応していないスナップショット形式です"))?;

    Ok(LoadedList {
        values: values
            .iter()
            .filter_map(|v| options.accept(v))
            .collect(),
        skipped: Vec::new(),
    })
}

/// JSON値から画像IDを取り出す。形式が判別できなければ None
pub fn parse_snapshot(value: &Value, options: &LoadOptions) -> Option<Vec<String>> {
    match value {
        Value::Object(map) => {
            if let Some(codes) = map
                .get("fabricImages")
                .and_then(|f| f.get("fabricCodes"))
                .and_then(Value::as_array)
            {
                return Some(codes.iter().filter_map(scalar_to_string).collect());
            }

            map.get("resources")
                .and_then(Value::as_array)
                .map(|resources| from_resources(resources, options))
        }
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => public_id_of(item).map(|id| strip_public_id(id, &options.image_folders)),
                    other => scalar_to_string(other).map(|id| strip_public_id(&id, &options.image_folders)),
                })
                .collect(),
        ),
        _ => None,
    }
}

/// 布地画像フォルダ内のアセットだけを対象にする（フォルダ指定が空なら全件）
fn from_resources(resources: &[Value], options: &LoadOptions) -> Vec<String> {
    resources
        .iter()
        .filter_map(public_id_of)
        .filter(|id| {
            options.image_folders.is_empty()
                || folder_of(id).is_some_and(|folder| options.image_folders.iter().any(|f| f == folder))
        })
        .map(|id| strip_public_id(id, &options.image_folders))
        .collect()
}

fn public_id_of(resource: &Value) -> Option<&str> {
    resource
        .get("public_id")
        .or_else(|| resource.get("publicId"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_report_shape() {
        let value = json!({
            "summary": { "totalImages": 3 },
            "fabricImages": { "count": 2, "fabricCodes": ["83102-19", "AB-12"] }
        });
        let ids = parse_snapshot(&value, &LoadOptions::default()).unwrap();
        assert_eq!(ids, vec!["83102-19", "AB-12"]);
    }

    #[test]
    fn test_raw_resources_keep_fabric_folders_only() {
        let value = json!({
            "resources": [
                { "public_id": "fabrics/AB-12", "format": "jpg" },
                { "public_id": "fabric_images/83102-19.jpg" },
                { "public_id": "banners/home" },
                { "public_id": "loose-image" },
                { "format": "png" }
            ],
            "next_cursor": null
        });
        let ids = parse_snapshot(&value, &LoadOptions::default()).unwrap();
        assert_eq!(ids, vec!["AB-12", "83102-19"]);
    }

    #[test]
    fn test_plain_array() {
        let value = json!(["fabrics/AB-12", "CD-34.png", { "public_id": "fabrics/EF-56" }, 8015]);
        let ids = parse_snapshot(&value, &LoadOptions::default()).unwrap();
        assert_eq!(ids, vec!["AB-12", "CD-34", "EF-56", "8015"]);
    }

    #[test]
    fn test_unknown_shape() {
        assert!(parse_snapshot(&json!({ "images": [] }), &LoadOptions::default()).is_none());
        assert!(parse_snapshot(&json!("AB-12"), &LoadOptions::default()).is_none());
    }
}
