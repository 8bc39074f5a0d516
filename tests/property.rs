//! Property-based tests: grouping, recommendation and id invariants with proptest.

mod common;

use std::collections::HashMap;

use common::{book, THIS_YEAR};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use book_catalog::domain::grouping::{
    compare_titles, group_by_author, group_by_year, BookGroup, GroupLabel,
};
use book_catalog::domain::model::book::Book;
use book_catalog::domain::model::catalog::Catalog;
use book_catalog::domain::model::id::BookId;
use book_catalog::domain::recommend::RecommendationPolicy;

// =============================================================================
// Strategies
// =============================================================================

/// 小さな語彙から作るので、同名タイトル・同一著者・同じ年が頻繁に出る。
fn arb_books() -> impl Strategy<Value = Vec<Book>> {
    let title = prop::sample::select(vec![
        "Dune", "dune", "Solaris", "Anathem", "anathem", "Hyperion", "Zeta", "Éclair",
    ]);
    let author = prop::sample::select(vec!["Herbert", "Lem", "Stephenson", "Simmons"]);
    let year = prop::option::of(2015i32..=2026);
    let rating = 0i32..=10;
    prop::collection::vec((title, author, year, rating), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (t, a, y, r))| book(i as u64 + 1, t, a, y, r))
            .collect()
    })
}

fn is_sorted_by_title(group: &BookGroup<'_>) -> bool {
    group
        .books
        .windows(2)
        .all(|w| compare_titles(w[0].title(), w[1].title()).is_le())
}

// =============================================================================
// Grouping invariants
// =============================================================================

proptest! {
    /// 年ありの書籍は、ちょうど1つの年グループに現れる。
    #[test]
    fn dated_books_in_exactly_one_year_group(books in arb_books()) {
        let view = group_by_year(&books);
        let mut seen: HashMap<BookId, usize> = HashMap::new();
        for group in view.groups() {
            for b in &group.books {
                *seen.entry(b.id()).or_default() += 1;
                prop_assert_eq!(GroupLabel::Year(b.year().unwrap()), group.label.clone());
            }
        }
        for b in &books {
            let expected = usize::from(b.year().is_some());
            prop_assert_eq!(seen.get(&b.id()).copied().unwrap_or(0), expected);
        }
    }

    /// 全書籍が、ちょうど1つの著者グループに現れる。
    #[test]
    fn every_book_in_exactly_one_author_group(books in arb_books()) {
        let view = group_by_author(&books);
        let total: usize = view.groups().iter().map(|g| g.books.len()).sum();
        prop_assert_eq!(total, books.len());
        for group in view.groups() {
            for b in &group.books {
                prop_assert_eq!(GroupLabel::Author(b.author().to_string()), group.label.clone());
            }
        }
    }

    /// グループ内はタイトル順。再ソートしても変わらない。
    #[test]
    fn groups_sorted_by_title_and_resort_is_noop(books in arb_books()) {
        for view in [group_by_year(&books), group_by_author(&books)] {
            for group in view.groups() {
                prop_assert!(is_sorted_by_title(group));
                let mut resorted = group.books.clone();
                resorted.sort_by(|a, b| compare_titles(a.title(), b.title()));
                prop_assert_eq!(&resorted, &group.books);
            }
        }
    }

    /// 年グループは降順（年なしは末尾）、著者グループは初出順。
    #[test]
    fn group_order(books in arb_books()) {
        let years: Vec<Option<i32>> = group_by_year(&books)
            .groups()
            .iter()
            .map(|g| match g.label {
                GroupLabel::Year(y) => Some(y),
                _ => None,
            })
            .collect();
        prop_assert!(years.windows(2).all(|w| w[0] > w[1]));

        let mut first_seen: Vec<String> = Vec::new();
        for b in &books {
            if !first_seen.iter().any(|a| a == b.author()) {
                first_seen.push(b.author().to_string());
            }
        }
        let authors: Vec<String> = group_by_author(&books)
            .groups()
            .iter()
            .map(|g| g.label.to_string())
            .collect();
        prop_assert_eq!(authors, first_seen);
    }

    /// 同じ入力からは同じ結果。
    #[test]
    fn grouping_is_deterministic(books in arb_books()) {
        prop_assert_eq!(group_by_year(&books), group_by_year(&books));
        prop_assert_eq!(group_by_author(&books), group_by_author(&books));
    }
}

// =============================================================================
// Recommendation invariants
// =============================================================================

proptest! {
    /// 選ばれるのは常に「最近」かつ最高評価の書籍。最近の書籍がなければ None。
    #[test]
    fn recommendation_is_a_recent_top_rated_book(books in arb_books(), seed in any::<u64>()) {
        let policy = RecommendationPolicy::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let recent: Vec<&Book> = books.iter().filter(|b| policy.is_recent(b, THIS_YEAR)).collect();

        match policy.select(&books, THIS_YEAR, &mut rng) {
            None => prop_assert!(recent.is_empty()),
            Some(chosen) => {
                prop_assert!(policy.is_recent(chosen, THIS_YEAR));
                let max = recent.iter().map(|b| b.rating()).max().unwrap();
                prop_assert_eq!(chosen.rating(), max);
            }
        }
    }

    /// 最高評価が1冊だけなら、乱数に関係なくその本が選ばれる。
    #[test]
    fn unique_top_rated_is_deterministic(seed in any::<u64>(), others in 0usize..6) {
        let mut books: Vec<Book> = (0..others)
            .map(|i| book(i as u64 + 1, "Other", "x", Some(THIS_YEAR), 5))
            .collect();
        books.push(book(100, "Best", "y", Some(THIS_YEAR - 3), 6));

        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = RecommendationPolicy::default().select(&books, THIS_YEAR, &mut rng);
        prop_assert_eq!(chosen.map(|b| b.id()), Some(BookId::new(100)));
    }
}

// =============================================================================
// Id assignment
// =============================================================================

proptest! {
    /// 次のIDは常に既存IDの最大値 + 1 で、既存IDと衝突しない。
    #[test]
    fn next_id_is_max_plus_one(id_values in prop::collection::btree_set(1u64..1000, 0..20)) {
        let books: Vec<Book> = id_values.iter().map(|&id| book(id, "T", "A", None, 0)).collect();
        let catalog = Catalog::from_books(books);
        let next = catalog.next_id().unwrap();

        let expected = id_values.iter().max().map(|m| m + 1).unwrap_or(1);
        prop_assert_eq!(next.get(), expected);
        prop_assert!(catalog.get(next).is_none());
    }
}
