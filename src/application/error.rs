use crate::domain::error::DomainError;
use crate::domain::repository::CorruptDocument;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("corrupt document '{key}': {source}")]
    CorruptDocument {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<CorruptDocument> for AppError {
    fn from(e: CorruptDocument) -> Self {
        AppError::CorruptDocument {
            key: e.key,
            source: e.source,
        }
    }
}

impl AppError {
    pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::StoreUnavailable(Box::new(e))
    }

    /// 再試行で回復しうるか。ストア障害のみ true。入力エラーと壊れたドキュメントは false。
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }

    /// ユーザーの入力に起因するエラーか
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Domain(_))
    }
}
