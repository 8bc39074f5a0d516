use book_catalog::config::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env();
    book_catalog::logging::init_tracing(config.log_json);

    book_catalog::interface::mcp::run(config).await
}
