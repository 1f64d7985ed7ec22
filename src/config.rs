use crate::error::{ReconcileError, Result};
use khovai_common::{ConfidenceTier, DEFAULT_MIN_SCORE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MIN_SCORE_ENV: &str = "KHOVAI_MIN_SCORE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 類似度の最低スコア（0.0-1.0）
    pub min_score: f64,
    /// apply で採用する最低区分
    pub apply_floor: ConfidenceTier,
    /// CSV/Excel の布地コード列（0始まり）
    pub code_column: usize,
    /// 1行に必要な最低列数
    pub min_columns: usize,
    /// 値として現れたら捨てる見出し
    pub header_sentinels: Vec<String>,
    /// スナップショット中の布地画像フォルダ
    pub image_folders: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            apply_floor: ConfidenceTier::Medium,
            code_column: 1, // 在庫CSVの「Mã vải」列
            min_columns: 2,
            header_sentinels: vec![
                "Mã vải".into(),
                "Ma vai".into(),
                "Mã".into(),
                "code".into(),
                "Code".into(),
            ],
            image_folders: vec!["fabric_images".into(), "fabrics".into()],
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書きする
    pub fn load() -> Result<Self> {
        let config = Self::load_file()?.with_env_override()?;
        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルの内容だけを読み込む（保存前の編集用）
    pub fn load_file() -> Result<Self> {
        Self::from_file(&Self::config_path()?)
    }

    /// 指定パスから読み込む。ファイルがなければ既定値
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 環境変数を優先
    pub fn with_env_override(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(MIN_SCORE_ENV) {
            self.min_score = value.trim().parse().map_err(|_| {
                ReconcileError::Config(format!("{} が数値ではありません: {}", MIN_SCORE_ENV, value))
            })?;
        }
        Ok(self)
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReconcileError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("khovai").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        validate_min_score(self.min_score)?;
        if self.min_columns == 0 {
            return Err(ReconcileError::Config("min_columns は1以上にしてください".into()));
        }
        Ok(())
    }

    /// CLI 引数があればそれを、なければ設定値を使う
    pub fn min_score_or(&self, cli_value: Option<f64>) -> Result<f64> {
        match cli_value {
            Some(value) => {
                validate_min_score(value)?;
                Ok(value)
            }
            None => Ok(self.min_score),
        }
    }

    /// 設定値の表示行
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("最低スコア: {}", self.min_score),
            format!("apply最低区分: {}", self.apply_floor),
            format!("布地コード列: {}", self.code_column),
            format!("最低列数: {}", self.min_columns),
            format!("見出し: {}", self.header_sentinels.join(", ")),
            format!("画像フォルダ: {}", self.image_folders.join(", ")),
        ]
    }
}

pub fn validate_min_score(value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ReconcileError::Config(format!(
            "最低スコアは0.0〜1.0で指定してください: {}",
            value
        )));
    }
    Ok(())
}
