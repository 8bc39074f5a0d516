//! Recommendation: the highest-rated recent book, ties broken at random.

use rand::Rng;

use super::model::book::Book;

/// 「最近」とみなす年数の既定値（今年 - 3 年以降）
pub const DEFAULT_RECENT_WINDOW_YEARS: i32 = 3;

/// おすすめ表示の装飾
pub const RECOMMENDATION_MARKER: &str = "---";

/// おすすめ選定のポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationPolicy {
    pub recent_window_years: i32,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            recent_window_years: DEFAULT_RECENT_WINDOW_YEARS,
        }
    }
}

impl RecommendationPolicy {
    /// 最近の書籍か（出版年あり、かつ current_year - window 以降）
    pub fn is_recent(&self, book: &Book, current_year: i32) -> bool {
        book.year()
            .is_some_and(|y| y >= current_year - self.recent_window_years)
    }

    /// 最高評価の最近の書籍（同率を含む）。入力順を保つ。
    pub fn candidates<'a>(&self, books: &'a [Book], current_year: i32) -> Vec<&'a Book> {
        let recent: Vec<&Book> = books
            .iter()
            .filter(|b| self.is_recent(b, current_year))
            .collect();
        let Some(max_rating) = recent.iter().map(|b| b.rating()).max() else {
            return Vec::new();
        };
        recent
            .into_iter()
            .filter(|b| b.rating() == max_rating)
            .collect()
    }

    /// 同率候補から一様乱数で1冊選ぶ。最近の書籍がなければ None。
    ///
    /// 評価0も候補に含める。最高評価が0でもおすすめは省略せず、評価0の中から選ぶ。
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        books: &'a [Book],
        current_year: i32,
        rng: &mut R,
    ) -> Option<&'a Book> {
        let ties = self.candidates(books, current_year);
        if ties.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..ties.len());
        Some(ties[index])
    }
}

/// 表示用の文字列（`---タイトル---`）
pub fn render_recommendation(book: Option<&Book>) -> String {
    match book {
        Some(b) => format!("{RECOMMENDATION_MARKER}{}{RECOMMENDATION_MARKER}", b.title()),
        None => String::new(),
    }
}
