//! 診断ログの初期化
//!
//! ユーザー向けの進捗表示は `println!`、診断ログは `tracing` で標準エラーに出す。
//! `RUST_LOG` が設定されていればそれを優先する。

use tracing_subscriber::EnvFilter;

/// ログ出力を初期化する（二重初期化は無視）
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
