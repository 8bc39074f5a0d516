//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use book_catalog::application::session::{CatalogSession, DEFAULT_COLLECTION};
use book_catalog::domain::model::book::{Book, BookFields};
use book_catalog::domain::model::id::BookId;
use book_catalog::domain::repository::{Document, DocumentStore, Listed};

/// テストで使う「今年」
pub const THIS_YEAR: i32 = 2026;

// =============================================================================
// InMemoryStore: テスト用ドキュメントストア
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("in-memory store error: {0}")]
pub struct InMemoryError(pub &'static str);

/// ファイルI/O不要のインメモリストア。書き込み・一覧の失敗を注入できる。
pub struct InMemoryStore {
    collections: RefCell<BTreeMap<String, BTreeMap<String, serde_json::Value>>>,
    fail_writes: Cell<bool>,
    fail_lists: Cell<bool>,
    list_calls: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RefCell::new(BTreeMap::new()),
            fail_writes: Cell::new(false),
            fail_lists: Cell::new(false),
            list_calls: Cell::new(0),
        }
    }

    /// 書籍をあらかじめ投入したストア
    pub fn with_books(books: &[Book]) -> Self {
        let store = Self::new();
        for book in books {
            store.put_raw(&book.id().key(), serde_json::to_value(book).unwrap());
        }
        store
    }

    pub fn put_raw(&self, key: &str, data: serde_json::Value) {
        self.collections
            .borrow_mut()
            .entry(DEFAULT_COLLECTION.to_string())
            .or_default()
            .insert(key.to_string(), data);
    }

    pub fn get_raw(&self, key: &str) -> Option<serde_json::Value> {
        self.collections
            .borrow()
            .get(DEFAULT_COLLECTION)
            .and_then(|c| c.get(key).cloned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.collections
            .borrow()
            .get(DEFAULT_COLLECTION)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.set(fail);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }
}

impl DocumentStore for InMemoryStore {
    type Error = InMemoryError;

    fn list_all(&self, collection: &str) -> Result<Vec<Listed>, Self::Error> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_lists.get() {
            return Err(InMemoryError("list refused"));
        }
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(key, data)| {
                        Ok(Document {
                            key: key.clone(),
                            data: data.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        data: &serde_json::Value,
    ) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(InMemoryError("write refused"));
        }
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), data.clone());
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(InMemoryError("delete refused"));
        }
        if let Some(c) = self.collections.borrow_mut().get_mut(collection) {
            c.remove(key);
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn book(id: u64, title: &str, author: &str, year: Option<i32>, rating: i32) -> Book {
    Book::new(
        BookId::new(id),
        BookFields {
            title: title.into(),
            author: author.into(),
            year,
            rating,
            isbn: None,
        },
    )
}

/// 標準的なテスト用カタログ:
/// ```text
/// #1 Dune (Frank Herbert, 1965, 9)
/// #2 Project Hail Mary (Andy Weir, 2021, 9)
/// #3 The Martian (Andy Weir, 2011, 8)
/// #4 Children of Dune (Frank Herbert, 1976, 7)
/// #5 Untitled draft (Andy Weir, no year, 0)
/// #6 Children of Time (Adrian Tchaikovsky, 2015, 10)
/// #7 The Mountain in the Sea (Ray Nayler, 2023, 8)  ← 唯一の「最近」の書籍
/// ```
pub fn standard_books() -> Vec<Book> {
    vec![
        book(1, "Dune", "Frank Herbert", Some(1965), 9),
        book(2, "Project Hail Mary", "Andy Weir", Some(2021), 9),
        book(3, "The Martian", "Andy Weir", Some(2011), 8),
        book(4, "Children of Dune", "Frank Herbert", Some(1976), 7),
        book(5, "Untitled draft", "Andy Weir", None, 0),
        book(6, "Children of Time", "Adrian Tchaikovsky", Some(2015), 10),
        book(7, "The Mountain in the Sea", "Ray Nayler", Some(2023), 8),
    ]
}

/// 今年を固定し、乱数をシード固定したセッションを開く。
pub fn open_session(store: InMemoryStore, seed: u64) -> CatalogSession<InMemoryStore> {
    CatalogSession::new(store)
        .with_current_year(THIS_YEAR)
        .with_rng(StdRng::seed_from_u64(seed))
        .open()
        .unwrap()
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
