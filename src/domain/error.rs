use super::model::id::BookId;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("invalid record: {0}")]
    InvalidRecord(#[from] InvalidRecord),

    #[error("no book selected for edit")]
    NothingSelected,

    #[error("book {0} is being edited: save changes instead of adding")]
    EditInProgress(BookId),

    #[error("no book id left after {0}")]
    IdsExhausted(BookId),
}

/// フォーム入力の検証エラー。ユーザーが入力を直すまで再試行しても通らない。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("title is required")]
    EmptyTitle,

    #[error("title is {len} characters, max {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("author is required")]
    EmptyAuthor,

    #[error("{field} is not a number: '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("year {year} is before {min}")]
    YearTooEarly { year: i32, min: i32 },

    #[error("rating {rating} is outside {min}..={max}")]
    RatingOutOfRange { rating: i32, min: i32, max: i32 },
}
