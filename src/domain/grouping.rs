//! Catalog grouping: by publication year or by author.

use std::cmp::Ordering;
use std::fmt;

use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};

use super::model::book::Book;

/// グルーピング方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// 出版年の降順
    #[default]
    ByYear,
    /// 著者の初出順
    ByAuthor,
}

impl GroupingMode {
    pub fn toggled(self) -> Self {
        match self {
            GroupingMode::ByYear => GroupingMode::ByAuthor,
            GroupingMode::ByAuthor => GroupingMode::ByYear,
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingMode::ByYear => write!(f, "by year"),
            GroupingMode::ByAuthor => write!(f, "by author"),
        }
    }
}

/// グループの見出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLabel {
    Year(i32),
    /// 出版年なしの書籍の見出し。メンバーは常に空。
    Undated,
    Author(String),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Year(y) => write!(f, "{y}"),
            GroupLabel::Undated => Ok(()),
            GroupLabel::Author(a) => write!(f, "{a}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookGroup<'a> {
    pub label: GroupLabel,
    /// タイトル昇順
    pub books: Vec<&'a Book>,
}

/// グルーピング結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView<'a> {
    /// 表示できる書籍がない
    NoBooks,
    Groups {
        groups: Vec<BookGroup<'a>>,
        /// 出版年なしの書籍（年別表示でのみ使う。著者別では空）
        undated: Vec<&'a Book>,
    },
}

impl<'a> CatalogView<'a> {
    pub fn groups(&self) -> &[BookGroup<'a>] {
        match self {
            CatalogView::NoBooks => &[],
            CatalogView::Groups { groups, .. } => groups,
        }
    }
}

/// 指定方式でカタログをグルーピングする。入力順は問わないが、著者別は初出順に依存する。
pub fn group(books: &[Book], mode: GroupingMode) -> CatalogView<'_> {
    match mode {
        GroupingMode::ByYear => group_by_year(books),
        GroupingMode::ByAuthor => group_by_author(books),
    }
}

/// 年別。年ありの書籍が1冊もなければ `NoBooks`。
pub fn group_by_year(books: &[Book]) -> CatalogView<'_> {
    let (with_year, undated): (Vec<&Book>, Vec<&Book>) =
        books.iter().partition(|b| b.year().is_some());

    if with_year.is_empty() {
        return CatalogView::NoBooks;
    }

    // None（年なし）は最小値として末尾に並ぶ
    let mut years: Vec<Option<i32>> = Vec::new();
    for book in books {
        if !years.contains(&book.year()) {
            years.push(book.year());
        }
    }
    years.sort_by(|a, b| b.cmp(a));

    let groups = years
        .into_iter()
        .map(|year| match year {
            Some(y) => BookGroup {
                label: GroupLabel::Year(y),
                books: sorted_by_title(with_year.iter().copied().filter(|b| b.year() == Some(y))),
            },
            None => BookGroup {
                label: GroupLabel::Undated,
                books: Vec::new(),
            },
        })
        .collect();

    CatalogView::Groups {
        groups,
        undated: sorted_by_title(undated),
    }
}

/// 著者別。空のカタログは `NoBooks`。
pub fn group_by_author(books: &[Book]) -> CatalogView<'_> {
    if books.is_empty() {
        return CatalogView::NoBooks;
    }

    let mut authors: Vec<&str> = Vec::new();
    for book in books {
        if !authors.contains(&book.author()) {
            authors.push(book.author());
        }
    }

    let groups = authors
        .into_iter()
        .map(|author| BookGroup {
            label: GroupLabel::Author(author.to_string()),
            books: sorted_by_title(books.iter().filter(|b| b.author() == author)),
        })
        .collect();

    CatalogView::Groups {
        groups,
        undated: Vec::new(),
    }
}

fn sorted_by_title<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<&'a Book> {
    let mut sorted: Vec<&Book> = books.into_iter().collect();
    // 安定ソート: 同じタイトルは入力順を保つ
    sorted.sort_by(|a, b| compare_titles(a.title(), b.title()));
    sorted
}

thread_local! {
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// ロケールを考慮したタイトル比較（CLDRルート照合順序）。
///
/// アクセント付き文字は基底文字のそばに並び（É は E、ё は е の隣）、
/// 大文字小文字だけが違う場合は小文字が先になる。
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => fold_case_compare(a, b),
    })
}

/// 照合データが使えないときの近似。大文字小文字を無視して比べ、同じなら小文字を先にする。
fn fold_case_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    primary.then_with(|| {
        a.chars()
            .zip(b.chars())
            .map(|(x, y)| case_rank(x).cmp(&case_rank(y)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() {
        1
    } else {
        0
    }
}
