//! Record editor: one explicit state record and its named transitions.
//!
//! Transitions are pure `(state, event) -> (state, effects)`. Store I/O is only
//! described here as [`StoreEffect`]s; the session executes them and commits the
//! new state only after every effect succeeded.

use crate::domain::error::DomainError;
use crate::domain::grouping::GroupingMode;
use crate::domain::model::book::Book;
use crate::domain::model::catalog::Catalog;
use crate::domain::model::form::{BookForm, FormField};
use crate::domain::model::id::BookId;

/// エディタへのイベント
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// ストアから読んだ一覧でカタログを置き換える
    LoadCatalog(Vec<Book>),
    /// 読めなかったドキュメントのIDを採番済みにする（上書き防止）
    ReserveIds(Vec<BookId>),
    /// フォーム1項目の入力
    EditField(FormField, String),
    /// 既存書籍を編集対象にしてフォームを埋める
    BeginEdit(BookId),
    /// 選択状態に応じて SubmitCreate / SubmitUpdate に振り分ける
    Submit,
    SubmitCreate,
    SubmitUpdate,
    Delete(BookId),
    ToggleGrouping,
}

/// ストアへの副作用
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEffect {
    Upsert(Book),
    Delete(BookId),
}

/// 編集セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Idle,
    Editing(BookId),
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    catalog: Catalog,
    form: BookForm,
    selected: Option<Book>,
    grouping: GroupingMode,
}

/// 遷移結果。effects が空でなければ、書き込み成功後にカタログを読み直す。
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: EditorState,
    pub effects: Vec<StoreEffect>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn form(&self) -> &BookForm {
        &self.form
    }

    pub fn selected(&self) -> Option<&Book> {
        self.selected.as_ref()
    }

    pub fn grouping(&self) -> GroupingMode {
        self.grouping
    }

    pub fn mode(&self) -> EditorMode {
        match &self.selected {
            Some(book) => EditorMode::Editing(book.id()),
            None => EditorMode::Idle,
        }
    }

    /// フォーム見出し
    pub fn form_heading(&self) -> &'static str {
        match self.mode() {
            EditorMode::Idle => "Add book",
            EditorMode::Editing(_) => "Edit book",
        }
    }

    /// 送信ボタンのラベル
    pub fn submit_label(&self) -> &'static str {
        match self.mode() {
            EditorMode::Idle => "Add",
            EditorMode::Editing(_) => "Save changes",
        }
    }

    /// イベントを適用した次の状態と副作用を返す。self は変更しない。
    pub fn apply(&self, event: EditorEvent) -> Result<Transition, DomainError> {
        let mut next = self.clone();
        let mut effects = Vec::new();

        match event {
            EditorEvent::LoadCatalog(books) => {
                next.catalog.replace(books);
            }
            EditorEvent::ReserveIds(ids) => {
                for id in ids {
                    next.catalog.note_assigned(id);
                }
            }
            EditorEvent::EditField(field, value) => {
                next.form.set(field, value);
            }
            EditorEvent::BeginEdit(id) => {
                let book = self
                    .catalog
                    .get(id)
                    .ok_or(DomainError::BookNotFound(id))?;
                next.form = BookForm::from_book(book);
                next.selected = Some(book.clone());
            }
            EditorEvent::Submit => {
                let resolved = match self.mode() {
                    EditorMode::Idle => EditorEvent::SubmitCreate,
                    EditorMode::Editing(_) => EditorEvent::SubmitUpdate,
                };
                return self.apply(resolved);
            }
            EditorEvent::SubmitCreate => {
                if let EditorMode::Editing(id) = self.mode() {
                    return Err(DomainError::EditInProgress(id));
                }
                let fields = self.form.validate()?;
                let id = self.catalog.next_id()?;
                next.catalog.note_assigned(id);
                next.form = BookForm::default();
                effects.push(StoreEffect::Upsert(Book::new(id, fields)));
            }
            EditorEvent::SubmitUpdate => {
                let selected = self.selected.as_ref().ok_or(DomainError::NothingSelected)?;
                let fields = self.form.validate()?;
                next.form = BookForm::default();
                next.selected = None;
                effects.push(StoreEffect::Upsert(selected.merged_with(fields)));
            }
            EditorEvent::Delete(id) => {
                // 編集中の書籍を削除しても選択は解除しない
                effects.push(StoreEffect::Delete(id));
            }
            EditorEvent::ToggleGrouping => {
                next.grouping = self.grouping.toggled();
            }
        }

        Ok(Transition {
            state: next,
            effects,
        })
    }
}
