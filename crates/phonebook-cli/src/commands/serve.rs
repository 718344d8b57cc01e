use crate::commands::Context;
use crate::http;
use anyhow::{Context as _, Result};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen port; overrides PORT and the config file
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
}

pub async fn serve(ctx: &Context<'_>, args: ServeArgs) -> Result<()> {
    let port = match args.port {
        Some(port) => port,
        None => ctx.config.require_port()?,
    };
    let addr = SocketAddr::new(args.bind, port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "phonebook listening");

    axum::serve(listener, http::router(Arc::clone(ctx.registry)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "serve http")?;

    info!("shutting down");
    ctx.registry.flush_errors().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
