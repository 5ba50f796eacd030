use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::{
    config::NotesConfig,
    mcp_server::{JsonRpcHandler, McpServer},
    transport::StdioTransport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is the protocol channel, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_core=info,folio_mcp=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Folio MCP Server");

    let config = match NotesConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(
        default_folder = %config.default_folder,
        osascript = %config.osascript_path.display(),
        "configuration loaded"
    );

    let registry = folio_core::build_registry(&config);
    let server = McpServer::build(registry).await?;
    let handler = JsonRpcHandler::new(server);
    let transport = StdioTransport::new(handler);

    info!("MCP Server ready, listening on stdio");

    if let Err(e) = transport.run().await {
        error!("Transport error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
