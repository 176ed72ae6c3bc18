use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for fluxcell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, features, tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Check the storage crate under every protocol feature combination
    Features,
    /// Run all tests
    Test,
    /// Run the pool property tests with a larger case count
    Props {
        /// Number of proptest cases per property
        #[arg(long, default_value = "4096")]
        cases: u32,
    },
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

/// Protocol feature sets the storage crate must build under.
const FEATURE_SETS: &[&[&str]] = &[
    &["--no-default-features"],
    &["--no-default-features", "--features", "legacy"],
    &["--no-default-features", "--features", "extended"],
    &["--all-features"],
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_features()?;
            run_tests()?;
            run_deny()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Features => run_features()?,
        Commands::Test => run_tests()?,
        Commands::Props { cases } => run_props(cases)?,
        Commands::Deny => run_deny()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
    }

    Ok(())
}

fn cargo(label: &str, args: &[&str], envs: &[(&str, String)]) -> Result<()> {
    println!("==> Running cargo {label}");
    let status = Command::new("cargo")
        .args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo {label} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("fmt --check", &["fmt", "--all", "--", "--check"], &[])
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        &[],
    )
}

fn run_features() -> Result<()> {
    for set in FEATURE_SETS {
        let mut args = vec!["check", "-p", "fluxcell-storage", "--lib"];
        args.extend_from_slice(set);
        cargo(&format!("check {}", set.join(" ")), &args, &[])?;
    }
    Ok(())
}

fn run_tests() -> Result<()> {
    cargo("test", &["test", "--workspace"], &[])
}

fn run_props(cases: u32) -> Result<()> {
    cargo(
        "test (properties)",
        &["test", "-p", "fluxcell-storage", "--test", "pool_invariants"],
        &[("PROPTEST_CASES", cases.to_string())],
    )
}

fn run_deny() -> Result<()> {
    cargo(
        "deny check (licenses bans sources)",
        &["deny", "check", "licenses", "bans", "sources"],
        &[],
    )
}

fn run_doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"], &[])
}

fn run_build() -> Result<()> {
    cargo("build", &["build", "--workspace"], &[])
}
