pub mod fetcher;

use std::{fs, path::PathBuf, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre;
use tokio_util::sync::CancellationToken;

use scout_config::Config;
use scout_domain::Endpoint;
use scout_service::{ScoutService, SearchOptions};

use crate::fetcher::HttpFetcher;

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch endpoints, embed them and write the index file.
	Index(IndexArgs),
	/// Rank indexed endpoints against a query.
	Search(SearchArgs),
	/// Answer a question by letting the agent search the index.
	Solve(SolveArgs),
}

#[derive(Debug, ClapArgs)]
pub struct IndexArgs {
	/// JSON array of endpoint URLs.
	#[arg(long, value_name = "FILE")]
	pub endpoints: PathBuf,
	#[arg(long, value_name = "FILE")]
	pub out: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub concurrency: Option<u32>,
}

#[derive(Debug, ClapArgs)]
pub struct SearchArgs {
	pub query: String,
	#[arg(long, value_name = "FILE")]
	pub index: Option<PathBuf>,
	#[arg(long, value_name = "N", allow_negative_numbers = true)]
	pub max_results: Option<i64>,
	#[arg(long, overrides_with = "no_verify")]
	pub verify: bool,
	#[arg(long, overrides_with = "verify")]
	pub no_verify: bool,
}
impl SearchArgs {
	fn verify_override(&self) -> Option<bool> {
		match (self.verify, self.no_verify) {
			(true, _) => Some(true),
			(_, true) => Some(false),
			_ => None,
		}
	}
}

#[derive(Debug, ClapArgs)]
pub struct SolveArgs {
	pub query: String,
	#[arg(long, value_name = "FILE")]
	pub index: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub max_steps: Option<u32>,
	#[arg(long, value_name = "N")]
	pub max_concurrency: Option<u32>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut cfg = scout_config::load(&args.config)?;

	apply_overrides(&mut cfg, &args.command);
	scout_config::validate(&cfg)?;
	scout_cli::init_tracing(&cfg.service.log_level);

	let cancel = scout_cli::interrupt_token();

	match args.command {
		Command::Index(index) => run_index(cfg, index, &cancel).await,
		Command::Search(search) => run_search(cfg, search, &cancel).await,
		Command::Solve(solve) => run_solve(cfg, solve, &cancel).await,
	}
}

pub fn apply_overrides(cfg: &mut Config, command: &Command) {
	match command {
		Command::Index(index) => {
			if let Some(concurrency) = index.concurrency {
				cfg.indexer.concurrency = concurrency;
			}
			if let Some(out) = &index.out {
				cfg.storage.index_path = out.clone();
			}
		},
		Command::Search(search) => {
			if let Some(index) = &search.index {
				cfg.storage.index_path = index.clone();
			}
			if let Some(max_results) = search.max_results {
				cfg.search.max_num_results = max_results;
			}
			if let Some(verify) = search.verify_override() {
				cfg.search.verify = verify;
			}
		},
		Command::Solve(solve) => {
			if let Some(index) = &solve.index {
				cfg.storage.index_path = index.clone();
			}
			if let Some(max_steps) = solve.max_steps {
				cfg.agent.max_steps = max_steps;
			}
			if let Some(max_concurrency) = solve.max_concurrency {
				cfg.browser.max_concurrency = max_concurrency;
			}
		},
	}
}

/// Reads a JSON array of endpoint URLs.
pub fn read_endpoints(raw: &str) -> color_eyre::Result<Vec<Endpoint>> {
	let urls: Vec<String> = serde_json::from_str(raw)
		.map_err(|err| eyre::eyre!("Endpoints file must be a JSON array of URLs: {err}."))?;
	let mut endpoints = Vec::with_capacity(urls.len());

	for url in urls {
		let endpoint = Endpoint::parse(&url)?;

		if !endpoints.contains(&endpoint) {
			endpoints.push(endpoint);
		}
	}

	Ok(endpoints)
}

async fn run_index(
	cfg: Config,
	args: IndexArgs,
	cancel: &CancellationToken,
) -> color_eyre::Result<()> {
	let endpoints = read_endpoints(&fs::read_to_string(&args.endpoints)?)?;
	let fetcher = HttpFetcher::new(Duration::from_millis(cfg.indexer.fetch_timeout_ms))?;
	let out = cfg.storage.index_path.clone();
	let summary_chars = cfg.storage.summary_chars as usize;
	let service = ScoutService::new(cfg);
	let report = service.indexer().index_endpoints(&fetcher, endpoints, cancel).await?;

	for failure in &report.failures {
		eprintln!("Failed: {} ({})", failure.endpoint, failure.error);
	}

	let failed = report.failures.len();
	let store = report.into_store()?;

	scout_storage::save_index(&out, &store, summary_chars)?;

	eprintln!("Indexed {} endpoints, {failed} failed. Wrote {}.", store.len(), out.display());

	Ok(())
}

async fn run_search(
	cfg: Config,
	args: SearchArgs,
	cancel: &CancellationToken,
) -> color_eyre::Result<()> {
	let store = scout_storage::load_index(&cfg.storage.index_path)?;
	let options = SearchOptions::from_config(&cfg.search);
	let engine = ScoutService::new(cfg).search_engine(store);
	let results = engine.search(&args.query, options, cancel).await?;

	if results.is_empty() {
		eprintln!("No results.");
	}

	for (rank, result) in results.iter().enumerate() {
		let Some(doc) = engine.document(&result.document_id) else {
			continue;
		};

		println!("{}. {} ({:.3}) {}", rank + 1, result.title, result.score, doc.source_endpoint);

		if let Some(verdict) = &result.verdict
			&& !verdict.rationale.is_empty()
		{
			println!("   {}", verdict.rationale);
		}
	}

	Ok(())
}

async fn run_solve(
	cfg: Config,
	args: SolveArgs,
	cancel: &CancellationToken,
) -> color_eyre::Result<()> {
	let store = scout_storage::load_index(&cfg.storage.index_path)?;
	let service = ScoutService::new(cfg);
	let agent = service.agent(service.browser(store));
	let answer = agent.solve(&args.query, cancel).await?;

	tracing::info!(steps = answer.steps, observations = answer.observations.len(), "Solved query.");

	println!("{}", answer.text);

	Ok(())
}
