use clap::Parser;
use site_edge::config::{AppState, Config, Overrides};
use site_edge::logger;
use site_edge::routing::RoutingPolicy;
use site_edge::server::{self, ShutdownSignal};
use std::path::Path;
use std::sync::Arc;

/// Static site edge router
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Listen host, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Site directory, overrides `site.root`
    #[arg(short, long)]
    root: Option<String>,

    /// Routing policy for unknown top-level paths, overrides `site.policy`
    #[arg(long, value_enum)]
    policy: Option<RoutingPolicy>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            policy: self.policy,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    if !Path::new(&cfg.site.root).is_dir() {
        logger::log_warning(&format!(
            "Site root '{}' is not a directory, every request will get a 404",
            cfg.site.root
        ));
    }

    let state = Arc::new(AppState::new(&cfg));
    logger::log_server_start(&addr, &cfg);

    let shutdown = ShutdownSignal::new();
    server::signal::listen_for_signals(shutdown.clone())?;

    // Connections are spawned with spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state, shutdown)).await;

    logger::log_info("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "site-edge", "--policy", "rewrite", "--root", "public", "-p", "9000",
        ])
        .unwrap();
        assert_eq!(cli.config, "config");

        let overrides = cli.overrides();
        assert_eq!(overrides.policy, Some(RoutingPolicy::Rewrite));
        assert_eq!(overrides.root.as_deref(), Some("public"));
        assert_eq!(overrides.port, Some(9000));
        assert!(overrides.host.is_none());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(Cli::try_parse_from(["site-edge", "--policy", "proxy"]).is_err());
    }
}
