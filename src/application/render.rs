//! Plain-text rendering of the catalog view and the edit form.

use crate::domain::grouping::{CatalogView, GroupLabel, GroupingMode};
use crate::domain::model::book::Book;
use crate::domain::model::form::FormField;
use crate::domain::recommend::render_recommendation;

use super::editor::EditorState;

/// 書籍がないときの表示
pub const NO_BOOKS: &str = "No books. Please add";

/// カタログ表示。おすすめ行（あれば）→ 見出しごとの書籍一覧。
///
/// 年なしグループは見出しを出さない。年別表示では年なしの冊数だけ末尾に示す。
pub fn render_catalog(
    view: &CatalogView<'_>,
    mode: GroupingMode,
    recommendation: Option<&Book>,
) -> String {
    let mut output = format!("# Books {}\n\n", mode);

    let rec = render_recommendation(recommendation);
    if !rec.is_empty() {
        output.push_str(&rec);
        output.push_str("\n\n");
    }

    match view {
        CatalogView::NoBooks => {
            output.push_str(NO_BOOKS);
            output.push('\n');
        }
        CatalogView::Groups { groups, undated } => {
            for group in groups {
                if group.label == GroupLabel::Undated {
                    continue;
                }
                output.push_str(&format!("{}\n", group.label));
                for book in &group.books {
                    output.push_str(&format!("  - {} (#{})\n", book.title(), book.id()));
                }
            }
            if !undated.is_empty() {
                output.push_str(&format!(
                    "\n({} without year; group {} to see them)\n",
                    undated.len(),
                    mode.toggled()
                ));
            }
        }
    }

    output
}

/// 入力フォーム表示。見出しと送信ラベルは編集状態で切り替わる。
pub fn render_form(state: &EditorState) -> String {
    let form = state.form();
    let mut output = format!("# {}", state.form_heading());
    if let Some(book) = state.selected() {
        output.push_str(&format!(" (#{})", book.id()));
    }
    output.push_str("\n\n");

    for (label, field) in [
        ("title", FormField::Title),
        ("author", FormField::Author),
        ("year", FormField::Year),
        ("rating", FormField::Rating),
        ("isbn", FormField::Isbn),
    ] {
        output.push_str(&format!("{label}: {}\n", form.get(field)));
    }
    output.push_str(&format!("\n[{}]\n", state.submit_label()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grouping;

    #[test]
    fn empty_catalog_shows_placeholder() {
        let books: Vec<Book> = Vec::new();
        let view = grouping::group(&books, GroupingMode::ByYear);
        let out = render_catalog(&view, GroupingMode::ByYear, None);
        assert!(out.starts_with("# Books by year"));
        assert!(out.contains(NO_BOOKS));
    }

    #[test]
    fn blank_form_is_add_mode() {
        let out = render_form(&EditorState::new());
        assert!(out.starts_with("# Add book\n"));
        assert!(out.ends_with("[Add]\n"));
    }
}
