use serde::{Deserialize, Serialize};

use super::book::{Book, BookFields, MAX_TITLE_CHARS, MIN_YEAR, RATING_RANGE};
use crate::domain::error::InvalidRecord;

/// 入力フォームのフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Title,
    Author,
    Year,
    Rating,
    Isbn,
}

/// 入力フォームの生の値。数値も文字列のまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
    pub rating: String,
    pub isbn: String,
}

impl BookForm {
    /// 既存書籍からフォームを埋める。未設定の項目は空文字列。
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title().to_string(),
            author: book.author().to_string(),
            year: book.year().map(|y| y.to_string()).unwrap_or_default(),
            rating: book.rating().to_string(),
            isbn: book.isbn().unwrap_or_default().to_string(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Year => &self.year,
            FormField::Rating => &self.rating,
            FormField::Isbn => &self.isbn,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Year => &mut self.year,
            FormField::Rating => &mut self.rating,
            FormField::Isbn => &mut self.isbn,
        };
        *slot = value.into();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// フォーム値を検証して書籍フィールドに変換する。
    ///
    /// - title / author: 空白のみは不可。値はそのまま保存する
    /// - year: 空なら未設定、それ以外は1800以上の整数
    /// - rating: 空なら0、それ以外は0..=10の整数
    /// - isbn: 空なら未設定
    pub fn validate(&self) -> Result<BookFields, InvalidRecord> {
        if self.title.trim().is_empty() {
            return Err(InvalidRecord::EmptyTitle);
        }
        let len = self.title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(InvalidRecord::TitleTooLong {
                len,
                max: MAX_TITLE_CHARS,
            });
        }
        if self.author.trim().is_empty() {
            return Err(InvalidRecord::EmptyAuthor);
        }

        let year = parse_optional_int("year", &self.year)?;
        if let Some(year) = year {
            if year < MIN_YEAR {
                return Err(InvalidRecord::YearTooEarly {
                    year,
                    min: MIN_YEAR,
                });
            }
        }

        let rating = parse_optional_int("rating", &self.rating)?.unwrap_or(0);
        if !RATING_RANGE.contains(&rating) {
            return Err(InvalidRecord::RatingOutOfRange {
                rating,
                min: *RATING_RANGE.start(),
                max: *RATING_RANGE.end(),
            });
        }

        let isbn = if self.isbn.is_empty() {
            None
        } else {
            Some(self.isbn.clone())
        };

        Ok(BookFields {
            title: self.title.clone(),
            author: self.author.clone(),
            year,
            rating,
            isbn,
        })
    }
}

fn parse_optional_int(field: &'static str, raw: &str) -> Result<Option<i32>, InvalidRecord> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| InvalidRecord::NotANumber {
            field,
            value: raw.to_string(),
        })
}
