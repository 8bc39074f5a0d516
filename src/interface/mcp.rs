//! MCP Server for book-catalog
//!
//! MCP Protocol (stdio) <-> application::CatalogSession
//!
//! 8 tools: catalog, toggle_grouping, form, edit_form, submit, begin_edit, delete, refresh

use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::render::{render_catalog, render_form};
use crate::application::session::{CatalogSession, SubmitOutcome};
use crate::config::CatalogConfig;
use crate::domain::model::form::FormField;
use crate::domain::model::id::BookId;
use crate::infra::json_store::JsonDocumentStore;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。起動時に一度だけカタログを読み込む。
pub async fn run(config: CatalogConfig) -> anyhow::Result<()> {
    let store = JsonDocumentStore::new(&config.store_dir);
    let session = CatalogSession::new(store)
        .with_collection(config.collection.clone())
        .with_policy(config.policy())
        .open()?;

    tracing::info!(
        store_dir = %config.store_dir.display(),
        collection = %config.collection,
        "book catalog MCP server starting"
    );

    let server = CatalogMcpServer::new(session);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct CatalogMcpServer {
    session: Arc<Mutex<CatalogSession<JsonDocumentStore>>>,
    tool_router: ToolRouter<Self>,
}

impl CatalogMcpServer {
    fn new(session: CatalogSession<JsonDocumentStore>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, CatalogSession<JsonDocumentStore>>, McpError> {
        self.session
            .lock()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    /// 入力起因のエラーは invalid_params、ストア障害は internal_error。
    fn to_mcp_error(e: AppError) -> McpError {
        if e.is_user_error() {
            McpError::invalid_params(format!("{e}"), None)
        } else {
            tracing::error!(error = %e, retryable = e.is_retryable(), "store operation failed");
            McpError::internal_error(format!("{e}"), None)
        }
    }
}

/// 現在のグルーピングでカタログを描画する。
fn catalog_text(session: &CatalogSession<JsonDocumentStore>) -> String {
    render_catalog(&session.view(), session.grouping(), session.recommendation())
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for CatalogMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "book-catalog-mcp".to_string(),
                title: Some("Book Catalog MCP: Personal Library".to_string()),
                description: Some(
                    "Personal book catalog grouped by year or author, \
                     with a recommendation from recent top-rated books."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Browse and edit a personal book catalog.\n\
                 \n\
                 Add: `edit_form` (title, author, year, rating, isbn) → `submit`.\n\
                 Edit: `begin_edit` with a book ID from `catalog` → `edit_form` → `submit`.\n\
                 Other tools: `catalog`, `toggle_grouping`, `delete`, `form`, `refresh`."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

/// "3" / "#3" 形式の書籍IDを解析する。
fn parse_book_id(s: &str) -> Result<BookId, McpError> {
    match s.parse::<BookId>() {
        Ok(id) if id.get() > 0 => Ok(id),
        _ => Err(McpError::invalid_params(
            format!("Invalid book_id: '{s}'. Use the number shown as (#N) in `catalog`."),
            None,
        )),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpEmptyRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookRequest {
    #[schemars(description = "Book ID shown as (#N) in `catalog` output (e.g. '3')")]
    pub book_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
struct McpEditFormRequest {
    #[schemars(description = "Title (required on submit, max 100 characters)")]
    pub title: Option<String>,
    #[schemars(description = "Author list as free text (required on submit)")]
    pub author: Option<String>,
    #[schemars(description = "Publication year, 1800 or later. Empty string clears it.")]
    pub year: Option<String>,
    #[schemars(description = "Rating 0-10. Empty string means 0.")]
    pub rating: Option<String>,
    #[schemars(description = "ISBN (e.g. 'xxx-x-xxxx-xxxx-x'). Empty string clears it.")]
    pub isbn: Option<String>,
}

impl McpEditFormRequest {
    /// 指定されたフィールドだけを返す
    fn fields(self) -> Vec<(FormField, String)> {
        [
            (FormField::Title, self.title),
            (FormField::Author, self.author),
            (FormField::Year, self.year),
            (FormField::Rating, self.rating),
            (FormField::Isbn, self.isbn),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl CatalogMcpServer {
    #[tool(
        name = "catalog",
        description = "Show the catalog grouped by year (newest first) or by author, with the current recommendation on top. Each book is listed with its ID as (#N).",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn catalog(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        Ok(CallToolResult::success(vec![Content::text(catalog_text(
            &session,
        ))]))
    }

    #[tool(
        name = "toggle_grouping",
        description = "Switch grouping between by-year and by-author, then show the catalog.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn toggle_grouping(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        session.toggle_grouping().map_err(Self::to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(catalog_text(
            &session,
        ))]))
    }

    #[tool(
        name = "form",
        description = "Show the current form values and whether `submit` will add a new book or save changes to the book being edited.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn form(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        Ok(CallToolResult::success(vec![Content::text(render_form(
            session.state(),
        ))]))
    }

    #[tool(
        name = "edit_form",
        description = "Set form fields. Only specified fields change. Values are kept as typed and validated on `submit`.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn edit_form(
        &self,
        Parameters(req): Parameters<McpEditFormRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        for (field, value) in req.fields() {
            session
                .edit_field(field, value)
                .map_err(Self::to_mcp_error)?;
        }
        Ok(CallToolResult::success(vec![Content::text(render_form(
            session.state(),
        ))]))
    }

    #[tool(
        name = "submit",
        description = "Submit the form: adds a new book, or saves changes when a book is being edited (see `begin_edit`). Clears the form on success.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn submit(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let outcome = session.submit().map_err(Self::to_mcp_error)?;

        let (verb, id) = match outcome {
            SubmitOutcome::Created(id) => ("Added", id),
            SubmitOutcome::Updated(id) => ("Saved", id),
        };
        let title = session
            .state()
            .catalog()
            .get(id)
            .map(|b| b.title().to_string())
            .unwrap_or_default();

        Ok(CallToolResult::success(vec![Content::text(format!(
            "{verb}: #{id} {title}\n\n{}",
            catalog_text(&session)
        ))]))
    }

    #[tool(
        name = "begin_edit",
        description = "Select a book for editing by its ID from `catalog` and fill the form with its values. The next `submit` saves changes to it.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn begin_edit(
        &self,
        Parameters(req): Parameters<McpBookRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let mut session = self.session()?;
        session.begin_edit(id).map_err(Self::to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(render_form(
            session.state(),
        ))]))
    }

    #[tool(
        name = "delete",
        description = "Delete a book by its ID from `catalog`. Deleting an unknown ID is a no-op.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn delete(
        &self,
        Parameters(req): Parameters<McpBookRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let mut session = self.session()?;

        // 削除前にタイトルを取得
        let title = session
            .state()
            .catalog()
            .get(id)
            .map(|b| b.title().to_string())
            .unwrap_or_default();

        session.delete(id).map_err(Self::to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Deleted: #{id} {title}\n\n{}",
            catalog_text(&session)
        ))]))
    }

    #[tool(
        name = "refresh",
        description = "Reload the catalog from the store (picks a new recommendation).",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn refresh(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        session.refresh().map_err(Self::to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(catalog_text(
            &session,
        ))]))
    }
}

// =============================================================================
// Tests
// =============================================================================
