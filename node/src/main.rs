use anyhow::Context;
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use suitwatch_node::{
    engine::Engine,
    server,
    transport::{run_poller, BotApi},
    Config,
};
use tokio::sync::mpsc;
use tracing::{error, info, Level};

/// Updates buffered between the poller and the engine.
const INBOUND_BUFFER: usize = 256;

fn init_tracing(level: Level, json: bool) {
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let config = Config::parse();
    let summary = format!("{:?}", config.redacted_debug());
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    init_tracing(config.log_level, config.log_json);
    info!(config = %summary, "configuration loaded");

    let transport =
        BotApi::new(&config.api_base_url, &config.bot_token).context("failed to build client")?;
    let (sender, receiver) = mpsc::channel(INBOUND_BUFFER);

    let (engine, status) = Engine::new(config.engine, transport.clone());
    let engine = engine.start(receiver);
    let poller = tokio::spawn(run_poller(transport, config.poll_timeout, sender));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let server = tokio::spawn(async move {
        if let Err(err) = server::serve(addr, status).await {
            error!(?err, "http server stopped");
        }
    });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("shutdown requested");
        }
        _ = engine => error!("engine stopped"),
    }
    poller.abort();
    server.abort();
    Ok(())
}
