use anyhow::Context;
use chatops_core::config::Config;
use chatops_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let state = AppState::new(config).context("failed to build server state")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        let actual_port = listener.local_addr()?.port();
        println!("chatops API → http://localhost:{actual_port}/api");

        tokio::select! {
            res = chatops_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
