//! Pieces shared by Scout binaries: version string, help styling, tracing
//! setup and interrupt handling.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Parses `log_level` as an env-filter directive, falling back to `info`.
pub fn log_filter(log_level: &str) -> EnvFilter {
	EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a stderr subscriber filtered by `log_level`.
pub fn init_tracing(log_level: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(log_filter(log_level))
		.with_writer(std::io::stderr)
		.init();
}

/// Returns a token that is cancelled on the first Ctrl-C.
pub fn interrupt_token() -> CancellationToken {
	let token = CancellationToken::new();
	let trigger = token.clone();

	tokio::spawn(async move {
		match tokio::signal::ctrl_c().await {
			Ok(()) => {
				tracing::warn!("Interrupt received. Cancelling.");

				trigger.cancel();
			},
			Err(err) => tracing::error!(error = %err, "Failed to listen for interrupts."),
		}
	});

	token
}
