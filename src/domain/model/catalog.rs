use super::book::Book;
use super::id::BookId;
use crate::domain::error::DomainError;

/// 現在の表示サイクルにおける書籍一覧。ストアから読み直すたびに丸ごと置き換わる。
///
/// `high_water` はこのセッションで保持・採番したIDの最大値。
/// 最大IDの書籍を削除しても、そのIDは再利用されない。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
    high_water: Option<BookId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: Vec<Book>) -> Self {
        let mut catalog = Self::new();
        catalog.replace(books);
        catalog
    }

    /// ストアから読んだ一覧で置き換える。順序はストアの返した順のまま。
    pub fn replace(&mut self, books: Vec<Book>) {
        let loaded_max = books.iter().map(Book::id).max();
        self.high_water = self.high_water.max(loaded_max);
        self.books = books;
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// 次に割り当てるID。max(既存ID, high_water) + 1、何もなければ1。
    ///
    /// 最大IDが u64 の上限なら既存書籍を上書きしないよう `IdsExhausted`。
    pub fn next_id(&self) -> Result<BookId, DomainError> {
        let current_max = self.books.iter().map(Book::id).max();
        match current_max.max(self.high_water) {
            Some(max) => max.next().ok_or(DomainError::IdsExhausted(max)),
            None => Ok(BookId::FIRST),
        }
    }

    /// 採番済みIDを記録する。書き込み成功後に呼ぶ。
    pub fn note_assigned(&mut self, id: BookId) {
        self.high_water = self.high_water.max(Some(id));
    }
}
