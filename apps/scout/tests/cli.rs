use std::path::PathBuf;

use clap::Parser;

use scout::{Args, Command};

fn parse(argv: &[&str]) -> Args {
	Args::try_parse_from(argv).expect("Failed to parse arguments.")
}

#[test]
fn search_flags_override_config() {
	let args = parse(&[
		"scout",
		"--config",
		"scout.toml",
		"search",
		"list pets",
		"--index",
		"pets.json",
		"--max-results",
		"-1",
		"--verify",
	]);
	let mut cfg = scout_testkit::test_config(4);

	scout::apply_overrides(&mut cfg, &args.command);

	assert_eq!(args.config, PathBuf::from("scout.toml"));
	assert_eq!(cfg.storage.index_path, PathBuf::from("pets.json"));
	assert_eq!(cfg.search.max_num_results, -1);
	assert!(cfg.search.verify);
}

#[test]
fn last_verify_flag_wins() {
	let args = parse(&["scout", "-c", "scout.toml", "search", "pets", "--verify", "--no-verify"]);
	let mut cfg = scout_testkit::test_config(4);

	cfg.search.verify = true;

	scout::apply_overrides(&mut cfg, &args.command);

	assert!(!cfg.search.verify);
}

#[test]
fn solve_flags_override_config() {
	let args = parse(&[
		"scout",
		"-c",
		"scout.toml",
		"solve",
		"How do I adopt a pet?",
		"--max-steps",
		"2",
		"--max-concurrency",
		"1",
	]);
	let mut cfg = scout_testkit::test_config(4);

	scout::apply_overrides(&mut cfg, &args.command);

	match &args.command {
		Command::Solve(solve) => assert_eq!(solve.query, "How do I adopt a pet?"),
		other => panic!("Unexpected command: {other:?}"),
	}

	assert_eq!(cfg.agent.max_steps, 2);
	assert_eq!(cfg.browser.max_concurrency, 1);
}

#[test]
fn index_requires_an_endpoints_file() {
	assert!(Args::try_parse_from(["scout", "-c", "scout.toml", "index"]).is_err());

	let args = parse(&["scout", "-c", "scout.toml", "index", "--endpoints", "urls.json"]);
	let mut cfg = scout_testkit::test_config(4);

	scout::apply_overrides(&mut cfg, &args.command);

	assert_eq!(cfg.storage.index_path, PathBuf::from("index.json"));
}

#[test]
fn endpoints_file_is_deduplicated_after_canonicalization() {
	let endpoints = scout::read_endpoints(
		r#"["https://api.example.com/pets?b=2&a=1", "https://API.example.com/pets?a=1&b=2#x"]"#,
	)
	.expect("Failed to read endpoints.");

	assert_eq!(endpoints.len(), 1);
	assert_eq!(endpoints[0].as_str(), "https://api.example.com/pets?a=1&b=2");
}

#[test]
fn endpoints_file_must_be_a_url_array() {
	assert!(scout::read_endpoints(r#"{"urls": []}"#).is_err());
	assert!(scout::read_endpoints(r#"["ftp://example.com/file"]"#).is_err());
}
