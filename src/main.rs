#[cfg(feature = "server")]
mod server_main {
    use clap::Parser;
    use graphdb::api;
    use graphdb::config::Config;
    use graphdb::engine::GraphEngine;
    use graphdb::error::DBResult;
    use graphdb::utils::logging;
    use std::sync::{Arc, Mutex};

    #[derive(Parser)]
    #[clap(version = "0.1.0", author = "GraphDB Contributors")]
    struct Cli {
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    }

    pub fn main() -> DBResult<()> {
        let cli = Cli::parse();

        let config = match Config::load(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config '{}': {e}; using defaults", cli.config);
                Config::default()
            }
        };

        if let Err(e) = logging::init(&config) {
            eprintln!("failed to initialize logging: {e}");
        }

        let result = run(config);

        logging::shutdown();
        result
    }

    fn run(config: Config) -> DBResult<()> {
        let engine = GraphEngine::open(&config)?;
        let state = api::http::AppState { engine: Arc::new(Mutex::new(engine)) };
        let bind = config.http_bind.clone();

        let rt = tokio::runtime::Runtime::new().expect("failed to start async runtime");
        rt.block_on(async move {
            let router = api::router(state);
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));
            log::info!("graphdb-server listening on {bind}");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .expect("server error");
        });
        Ok(())
    }

    async fn shutdown_signal() {
        let _ = tokio::signal::ctrl_c().await;
        log::info!("shutdown signal received");
    }
}

#[cfg(feature = "server")]
fn main() -> graphdb::error::DBResult<()> {
    server_main::main()
}

#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("error: the 'server' feature is not enabled, cannot run graphdb-server");
    eprintln!("rebuild with: cargo run --features server");
    std::process::exit(1);
}
