//! Argument parsing tests

use super::*;
use super::run::cli_args;
use clap::Parser;
use evospec_engine::BumpKind;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("evospec").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn test_subcommands_present() {
    let cmd = build_cli();
    let names: Vec<_> = cmd.get_subcommands().map(|s| s.get_name().to_string()).collect();
    for expected in ["validate", "check", "init", "generate", "evolve"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["check", "shop.evospec.yaml", "-p", "ollama", "-m", "llama3", "-v"]);
    assert_eq!(cli.provider.as_deref(), Some("ollama"));
    assert_eq!(cli.model.as_deref(), Some("llama3"));
    assert!(cli.verbose);
}

#[test]
fn test_validate_options() {
    let cli = parse(&[
        "validate",
        "shop.evospec.yaml",
        "--phase",
        "1-3",
        "--strict",
        "--format",
        "json",
        "-q",
    ]);
    match cli.command {
        Commands::Validate {
            phase,
            strict,
            format,
            quiet,
            ..
        } => {
            assert_eq!(phase.as_deref(), Some("1-3"));
            assert!(strict);
            assert_eq!(format, OutputFormat::Json);
            assert!(quiet);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_evolve_requires_change() {
    let err = Cli::try_parse_from(["evospec", "evolve", "shop.evospec.yaml"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_bump_and_no_bump_conflict() {
    let err = Cli::try_parse_from([
        "evospec", "evolve", "-c", "x", "--bump", "major", "--no-bump",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn test_bump_resolution() {
    assert_eq!(args::bump_kind(None, false), BumpKind::Minor);
    assert_eq!(args::bump_kind(Some(BumpArg::Patch), false), BumpKind::Patch);
    assert_eq!(args::bump_kind(None, true), BumpKind::None);
}

#[test]
fn test_generate_flags_reach_configuration_layer() {
    let cli = parse(&[
        "generate",
        "A bookstore",
        "--max-retries",
        "5",
        "--temperature",
        "0.7",
        "--strict",
        "--request-timeout",
        "30",
    ]);
    let args = cli_args(&cli).unwrap();
    assert_eq!(args.max_retries, Some(5));
    assert_eq!(args.temperature, Some(0.7));
    assert_eq!(args.strict_validation, Some(true));
    assert_eq!(args.request_timeout, Some(30));
    assert_eq!(args.verbose, None);
}

#[test]
fn test_unset_flags_do_not_override_configuration() {
    let cli = parse(&["evolve", "-c", "Add refunds"]);
    let args = cli_args(&cli).unwrap();
    assert_eq!(args.max_retries, None);
    assert_eq!(args.temperature, None);
    assert_eq!(args.strict_validation, None);
    assert!(args.config_path.is_none());
}
