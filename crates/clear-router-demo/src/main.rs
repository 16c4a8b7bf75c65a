//! clear-router demo server
//!
//! Declares the same routes against either backend and serves them.

mod axum_app;
mod chain_app;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use clear_router::RouteInfo;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::store::UserStore;

/// Router backend to serve the routes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// axum, handlers receive a single request event.
    Axum,
    /// chain-router, handlers receive request, response and continuation.
    Chain,
}

/// Serves the clear-router demo routes.
#[derive(Parser)]
#[command(name = "clear-router-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "CLEAR_ROUTER_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Router backend.
    #[arg(short, long, value_enum, env = "CLEAR_ROUTER_BACKEND", default_value_t = Backend::Axum)]
    backend: Backend,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(UserStore::default());

    match cli.backend {
        Backend::Axum => {
            let routes = axum_app::routes(store);
            print_routes(&routes.all_routes());
            axum_app::serve(cli.addr, &routes).await
        }
        Backend::Chain => {
            let routes = chain_app::routes(store);
            print_routes(&routes.all_routes());
            chain_app::serve(cli.addr, &routes).await
        }
    }
}

fn print_routes(routes: &[RouteInfo]) {
    info!("{} routes registered", routes.len());
    for route in routes {
        let methods: Vec<&str> = route.methods.iter().map(|m| m.as_str()).collect();
        info!(
            "  {:<8} {:<24} {} middleware, {:?} handler",
            methods.join("|"),
            route.path,
            route.middleware_count,
            route.handler_type
        );
    }
}
