//! Runtime configuration from the command line and `BOOK_CATALOG_*` variables.

use std::path::PathBuf;

use crate::application::session::DEFAULT_COLLECTION;
use crate::domain::recommend::{RecommendationPolicy, DEFAULT_RECENT_WINDOW_YEARS};

pub const ENV_DIR: &str = "BOOK_CATALOG_DIR";
pub const ENV_COLLECTION: &str = "BOOK_CATALOG_COLLECTION";
pub const ENV_RECENT_YEARS: &str = "BOOK_CATALOG_RECENT_YEARS";
pub const ENV_LOG_JSON: &str = "BOOK_CATALOG_LOG_JSON";

const DEFAULT_DIR: &str = "book-catalog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// ドキュメントストアのルートディレクトリ
    pub store_dir: PathBuf,
    pub collection: String,
    pub recent_window_years: i32,
    /// stderr へのログを JSON で出すか
    pub log_json: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_DIR),
            collection: DEFAULT_COLLECTION.to_string(),
            recent_window_years: DEFAULT_RECENT_WINDOW_YEARS,
            log_json: false,
        }
    }
}

impl CatalogConfig {
    /// プロセスの引数と環境変数から組み立てる。
    pub fn from_env() -> Self {
        Self::from_sources(std::env::args().nth(1), |name| std::env::var(name).ok())
    }

    /// 第1引数 > 環境変数 > 既定値 の順。解釈できない値は既定値に落とす。
    pub fn from_sources(arg: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let store_dir = arg
            .or_else(|| lookup(ENV_DIR))
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.store_dir);

        let collection = lookup(ENV_COLLECTION)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.collection);

        let recent_window_years = lookup(ENV_RECENT_YEARS)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|n| *n >= 0)
            .unwrap_or(defaults.recent_window_years);

        let log_json = lookup(ENV_LOG_JSON)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.log_json);

        Self {
            store_dir,
            collection,
            recent_window_years,
            log_json,
        }
    }

    pub fn policy(&self) -> RecommendationPolicy {
        RecommendationPolicy {
            recent_window_years: self.recent_window_years,
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
