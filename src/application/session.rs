use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::error::DomainError;
use crate::domain::grouping::{self, CatalogView, GroupingMode};
use crate::domain::model::book::Book;
use crate::domain::model::form::{BookForm, FormField};
use crate::domain::model::id::BookId;
use crate::domain::recommend::RecommendationPolicy;
use crate::domain::repository::{Document, DocumentStore};

use super::editor::{EditorEvent, EditorMode, EditorState, StoreEffect};
use super::error::AppError;

/// 書籍を格納する既定のコレクション名
pub const DEFAULT_COLLECTION: &str = "books";

/// 送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(BookId),
    Updated(BookId),
}

/// カタログ操作のユースケース。
///
/// イベント → 副作用の実行 → 成功時のみ状態を確定 → 変更があればカタログを読み直す。
/// カタログの読み込みは open 時と各変更後のみ。読み込みのたびにおすすめを引き直す。
pub struct CatalogSession<S: DocumentStore> {
    store: S,
    collection: String,
    state: EditorState,
    policy: RecommendationPolicy,
    rng: StdRng,
    fixed_year: Option<i32>,
    recommendation: Option<BookId>,
    corrupt_keys: Vec<String>,
}

impl<S: DocumentStore> CatalogSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            collection: DEFAULT_COLLECTION.to_string(),
            state: EditorState::new(),
            policy: RecommendationPolicy::default(),
            rng: StdRng::from_entropy(),
            fixed_year: None,
            recommendation: None,
            corrupt_keys: Vec::new(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_policy(mut self, policy: RecommendationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 乱数源を差し替える（テストでシード固定に使う）
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// 「今年」を固定する。未指定ならローカル時刻の年。
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.fixed_year = Some(year);
        self
    }

    /// 初回のカタログ読み込みを行ったセッションを返す。
    pub fn open(mut self) -> Result<Self, AppError> {
        self.refresh()?;
        Ok(self)
    }

    // --- 参照 ---

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn books(&self) -> &[Book] {
        self.state.catalog().books()
    }

    pub fn form(&self) -> &BookForm {
        self.state.form()
    }

    pub fn mode(&self) -> EditorMode {
        self.state.mode()
    }

    pub fn grouping(&self) -> GroupingMode {
        self.state.grouping()
    }

    pub fn view(&self) -> CatalogView<'_> {
        grouping::group(self.books(), self.state.grouping())
    }

    /// 直近の読み込み時に選ばれたおすすめ
    pub fn recommendation(&self) -> Option<&Book> {
        self.recommendation
            .and_then(|id| self.state.catalog().get(id))
    }

    /// 直近の読み込みで読み飛ばした壊れたドキュメントのキー
    pub fn corrupt_keys(&self) -> &[String] {
        &self.corrupt_keys
    }

    pub fn current_year(&self) -> i32 {
        self.fixed_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- 操作 ---

    /// ストアから全件読み直し、おすすめを引き直す。
    pub fn refresh(&mut self) -> Result<(), AppError> {
        let documents = self
            .store
            .list_all(&self.collection)
            .map_err(AppError::store)?;

        let mut books = Vec::with_capacity(documents.len());
        let mut corrupt = Vec::new();
        for listed in documents {
            match listed.map_err(AppError::from).and_then(decode_book) {
                Ok(book) => books.push(book),
                Err(AppError::CorruptDocument { key, source }) => {
                    tracing::warn!(key = %key, error = %source, "skipping corrupt document");
                    corrupt.push(key);
                }
                Err(e) => return Err(e),
            }
        }
        self.corrupt_keys = corrupt;

        let transition = self.state.apply(EditorEvent::LoadCatalog(books))?;
        self.state = transition.state;

        let reserved: Vec<BookId> = self
            .corrupt_keys
            .iter()
            .filter_map(|key| key.parse().ok())
            .collect();
        if !reserved.is_empty() {
            self.state = self.state.apply(EditorEvent::ReserveIds(reserved))?.state;
        }

        let year = self.current_year();
        self.recommendation = self
            .policy
            .select(self.state.catalog().books(), year, &mut self.rng)
            .map(Book::id);

        tracing::info!(
            collection = %self.collection,
            books = self.state.catalog().len(),
            recommendation = ?self.recommendation,
            "catalog loaded"
        );
        Ok(())
    }

    /// イベントを処理する。副作用が失敗した場合は状態を変えずにエラーを返す。
    pub fn dispatch(&mut self, event: EditorEvent) -> Result<(), AppError> {
        let transition = self.state.apply(event)?;

        for effect in &transition.effects {
            self.execute(effect)?;
        }

        let mutated = !transition.effects.is_empty();
        self.state = transition.state;
        if mutated {
            self.refresh()?;
        }
        Ok(())
    }

    pub fn edit_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.dispatch(EditorEvent::EditField(field, value.into()))
    }

    pub fn begin_edit(&mut self, id: BookId) -> Result<&Book, AppError> {
        self.dispatch(EditorEvent::BeginEdit(id))?;
        self.state
            .selected()
            .ok_or(AppError::Domain(DomainError::NothingSelected))
    }

    /// 選択中なら更新、そうでなければ新規作成。
    pub fn submit(&mut self) -> Result<SubmitOutcome, AppError> {
        let outcome = match self.state.mode() {
            EditorMode::Editing(id) => SubmitOutcome::Updated(id),
            EditorMode::Idle => SubmitOutcome::Created(self.state.catalog().next_id()?),
        };
        self.dispatch(EditorEvent::Submit)?;
        Ok(outcome)
    }

    pub fn delete(&mut self, id: BookId) -> Result<(), AppError> {
        self.dispatch(EditorEvent::Delete(id))
    }

    pub fn toggle_grouping(&mut self) -> Result<GroupingMode, AppError> {
        self.dispatch(EditorEvent::ToggleGrouping)?;
        Ok(self.state.grouping())
    }

    // --- private ---

    fn execute(&self, effect: &StoreEffect) -> Result<(), AppError> {
        match effect {
            StoreEffect::Upsert(book) => {
                let data = serde_json::to_value(book)?;
                self.store
                    .upsert(&self.collection, &book.id().key(), &data)
                    .map_err(AppError::store)?;
                tracing::info!(id = %book.id(), title = book.title(), "book saved");
            }
            StoreEffect::Delete(id) => {
                self.store
                    .delete(&self.collection, &id.key())
                    .map_err(AppError::store)?;
                tracing::info!(id = %id, "book deleted");
            }
        }
        Ok(())
    }
}

/// ストアのドキュメントを書籍として解釈する。形が合わなければ CorruptDocument。
fn decode_book(doc: Document) -> Result<Book, AppError> {
    serde_json::from_value::<Book>(doc.data).map_err(|source| AppError::CorruptDocument {
        key: doc.key,
        source,
    })
}
