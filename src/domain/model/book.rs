use serde::{Deserialize, Serialize};

use super::id::BookId;

/// タイトルの最大文字数
pub const MAX_TITLE_CHARS: usize = 100;
/// 出版年の下限
pub const MIN_YEAR: i32 = 1800;
/// 評価の範囲
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 0..=10;

/// 検証済みの書籍フィールド。新規作成・更新の両方で使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub rating: i32,
    pub isbn: Option<String>,
}

/// 書籍。カタログ唯一のエンティティ。
///
/// ストア上のドキュメント形状そのもの。`rating` 欠落は0、`year`/`isbn` 欠落は未設定として読む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    rating: i32,
    #[serde(default)]
    isbn: Option<String>,
}

impl Book {
    pub fn new(id: BookId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            year: fields.year,
            rating: fields.rating,
            isbn: fields.isbn,
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    /// 既存レコードにフォーム値を上書きした新しいレコード。IDは保持する。
    pub fn merged_with(&self, fields: BookFields) -> Self {
        Self::new(self.id, fields)
    }
}
