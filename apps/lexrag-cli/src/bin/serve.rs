use anyhow::Context;
use tokio::net::TcpListener;

use lexrag_cli::server::{router, QueryWorker};
use lexrag_cli::{bootstrap, logging};
use lexrag_core::config::Config;

fn main() -> anyhow::Result<()> {
    logging::init();
    let config = Config::load()?;
    let settings = config.settings()?;

    // Built before the async runtime exists: the LanceDB index and the HTTP
    // client both drive their own blocking executors.
    let service = bootstrap::build_service(&settings)?;
    let (worker, _handle) = QueryWorker::spawn(service, settings.server.queue_capacity)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind to {bind_addr}"))?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, router(worker))
            .await
            .context("Server error")?;
        Ok::<(), anyhow::Error>(())
    })
}
