/// ストア上の生ドキュメント。キーと任意のJSON本体。
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub data: serde_json::Value,
}

/// 読み取れなかったドキュメント。再読み込みしても直らないので、1件単位で報告する。
#[derive(Debug, thiserror::Error)]
#[error("corrupt document '{key}': {source}")]
pub struct CorruptDocument {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

/// `list_all` の1件分。壊れたドキュメントがあっても他の件は返る。
pub type Listed = Result<Document, CorruptDocument>;

/// ドキュメントストアの抽象。Infra層が実装する。
///
/// - `list_all`: コレクション全件をキーの文字列順で返す。`Self::Error` はストア自体の障害のみ
/// - `upsert`: キー単位で作成または置換（部分更新なし）
/// - `delete`: 冪等。存在しないキーの削除はエラーにしない
pub trait DocumentStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_all(&self, collection: &str) -> Result<Vec<Listed>, Self::Error>;
    fn upsert(
        &self,
        collection: &str,
        key: &str,
        data: &serde_json::Value,
    ) -> Result<(), Self::Error>;
    fn delete(&self, collection: &str, key: &str) -> Result<(), Self::Error>;
}
