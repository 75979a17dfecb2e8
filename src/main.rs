//! Keycloak gateway server.

// std
use std::path::PathBuf;
// crates.io
use clap::Parser;
use color_eyre::{Result, eyre::WrapErr};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use keycloak_gateway::{
	config::GatewayConfig,
	gateway::{self, GatewayState},
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// YAML configuration file applied between the defaults and `KC_GATEWAY_*` variables.
	#[arg(long, short, value_name = "PATH")]
	config: Option<PathBuf>,
	/// Overrides the configured listen address.
	#[arg(long, value_name = "ADDR")]
	listen: Option<String>,
	/// Validates the configuration and exits.
	#[arg(long)]
	check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();
	let mut config =
		GatewayConfig::load(cli.config.as_deref()).wrap_err("Failed to load configuration.")?;

	if let Some(listen) = cli.listen {
		config.listen_addr = listen;
	}

	let addr = config.listen_addr()?;

	init_tracing(&config.log_filter)?;

	let state = GatewayState::from_config(&config)?;

	if cli.check {
		tracing::info!(client = ?state.client(), %addr, "Configuration is valid.");

		return Ok(());
	}

	let listener =
		TcpListener::bind(addr).await.wrap_err_with(|| format!("Failed to bind {addr}."))?;

	tracing::info!(%addr, realm = %config.realm, "Gateway listening.");

	gateway::serve(listener, state, shutdown_signal()).await?;

	tracing::info!("Gateway stopped.");

	Ok(())
}

fn init_tracing(fallback: &str) -> Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(fallback)
			.wrap_err_with(|| format!("Invalid log filter `{fallback}`."))?,
	};

	tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).try_init()?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to listen for Ctrl-C.");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};

		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(e) => {
				tracing::error!(error = %e, "Failed to listen for SIGTERM.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("Shutdown signal received.");
}
