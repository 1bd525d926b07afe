//! Template Broker CLI - serves the OSB binding endpoints

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;

use template_broker::store::KubeStore;
use template_broker::{router, Resolver};

#[derive(Parser)]
#[command(name = "template-broker")]
#[command(about = "Template Broker - OSB binding resolution for templated cluster apps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the OSB bind/unbind endpoints
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:8081")]
        addr: String,

        /// Kubernetes API server URL (defaults to in-cluster address)
        #[arg(long)]
        api_server: Option<String>,
    },

    /// Verify the API server is reachable with the configured token
    Check {
        /// Kubernetes API server URL (defaults to in-cluster address)
        #[arg(long)]
        api_server: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { addr, api_server } => serve(&addr, api_server.as_deref()).await,
        Commands::Check { api_server } => check(api_server.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_store(api_server: Option<&str>) -> anyhow::Result<KubeStore> {
    match api_server {
        Some(addr) => KubeStore::with_api_server(addr),
        None => KubeStore::new(),
    }
}

async fn serve(addr: &str, api_server: Option<&str>) -> anyhow::Result<()> {
    let store = Arc::new(build_store(api_server)?);
    let resolver = Resolver::new(store.clone(), store);
    let app = router(resolver);

    tracing::info!(%addr, "starting template broker");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn check(api_server: Option<&str>) -> anyhow::Result<()> {
    let store = build_store(api_server)?;
    store.check().await?;
    println!("{}", "API server reachable".green());
    Ok(())
}
