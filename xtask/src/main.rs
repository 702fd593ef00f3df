use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;

const CORE: &str = "lit-msm-core";

/// Bare-metal targets the kernel must keep building for.
const EMBEDDED_TARGETS: &[&str] = &["thumbv7m-none-eabi", "riscv32imac-unknown-none-elf"];

/// Core feature sets that stay `no_std`.
const NO_STD_FEATURES: &[&str] = &["", "debug-log", "serde", "serde,debug-log"];

/// Core feature sets that only make sense on the host.
const HOST_FEATURES: &[&str] = &["std", "std,serde,debug-log", "std,test-probes"];

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Automation tasks for lit-msm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check, test and lint the workspace on the host
    Ci,
    /// Check lit-msm-core for bare-metal targets with every no_std feature set
    Embedded {
        /// Only this target triple (default: all of them)
        #[arg(long)]
        target: Option<String>,
    },
    /// Check lit-msm-core on the host with every feature set
    Features,
    /// Run the criterion benches
    Bench {
        /// Only make sure the benches compile
        #[arg(long)]
        smoke: bool,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci => run_ci(),
        Commands::Embedded { target } => match target {
            Some(target) => check_embedded(&target),
            None => EMBEDDED_TARGETS.iter().try_for_each(|t| check_embedded(t)),
        },
        Commands::Features => check_features(NO_STD_FEATURES.iter().chain(HOST_FEATURES), None),
        Commands::Bench { smoke: true } => cargo(&["check", "-p", "lit-msm-bench", "--benches"]),
        Commands::Bench { smoke: false } => cargo(&["bench", "-p", "lit-msm-bench"]),
    }
}

fn run_ci() -> Result<()> {
    cargo(&["check", "--workspace", "--all-targets"])?;
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    cargo(&["test", "-p", CORE, "--features", "std,test-probes"])?;
    cargo(&["test", "-p", "lit-msm-tests"])?;
    cargo(&["check", "-p", "lit-msm-bench", "--benches"])?;
    println!("✓ host checks pass");
    Ok(())
}

fn check_embedded(target: &str) -> Result<()> {
    check_features(NO_STD_FEATURES.iter(), Some(target))?;
    println!("✓ {CORE} builds for {target}");
    Ok(())
}

fn check_features<'a>(sets: impl Iterator<Item = &'a &'a str>, target: Option<&str>) -> Result<()> {
    for &features in sets {
        let mut args = vec!["check", "-p", CORE, "--no-default-features"];
        if !features.is_empty() {
            args.extend(["--features", features]);
        }
        if let Some(target) = target {
            args.extend(["--target", target]);
        }
        cargo(&args).with_context(|| format!("features [{features}]"))?;
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    println!("$ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .context("failed to spawn cargo")?;

    if !status.success() {
        anyhow::bail!("cargo {} failed with {status}", args.join(" "));
    }
    Ok(())
}
