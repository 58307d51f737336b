use std::path::PathBuf;

use clap::Parser;

use kt::cli::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["kt"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[test]
fn parse_triage_text_and_limits() {
    let cli = parse(&["triage", "Back-off", "pulling", "image", "-k", "5", "--min-score", "1.5"]);
    match cli.command {
        Commands::Triage(args) => {
            assert_eq!(args.text, vec!["Back-off", "pulling", "image"]);
            assert_eq!(args.top_k, Some(5));
            assert_eq!(args.min_score, Some(1.5));
            assert!(!args.stdin);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_triage_stdin() {
    match parse(&["triage", "--stdin"]).command {
        Commands::Triage(args) => {
            assert!(args.stdin);
            assert!(args.text.is_empty());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn stdin_conflicts_with_text() {
    assert!(Cli::try_parse_from(["kt", "triage", "--stdin", "OOMKilled"]).is_err());
}

#[test]
fn parse_global_flags_after_subcommand() {
    let cli = parse(&[
        "index",
        "--robot",
        "-vv",
        "--corpus",
        "a.md",
        "--corpus",
        "kb/",
        "--separator",
        "---DOC---",
    ]);
    assert!(cli.robot);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.corpus, vec![PathBuf::from("a.md"), PathBuf::from("kb/")]);
    assert_eq!(cli.separator.as_deref(), Some("---DOC---"));
    assert!(matches!(cli.command, Commands::Index(_)));
}

#[test]
fn parse_show_id() {
    match parse(&["show", "7", "--raw"]).command {
        Commands::Show(args) => {
            assert_eq!(args.id, 7);
            assert!(args.raw);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn show_rejects_non_numeric_id() {
    assert!(Cli::try_parse_from(["kt", "show", "oom"]).is_err());
}

#[test]
fn parse_list_pagination() {
    match parse(&["list", "-n", "2", "--offset", "4", "--sparse"]).command {
        Commands::List(args) => {
            assert_eq!(args.limit, 2);
            assert_eq!(args.offset, 4);
            assert!(args.sparse);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_completions_shell() {
    assert!(matches!(
        parse(&["completions", "bash"]).command,
        Commands::Completions(_)
    ));
}
