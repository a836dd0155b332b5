//! sinkcheck - Manual conformance harness for media sink elements
//!
//! The `sinkcheck` command inspects a sink element, expands its advertised
//! capabilities into a bounded one-factor-at-a-time test matrix and walks a
//! person at the machine through it, one live pipeline per configuration.
//!
//! ## Commands
//!
//! - `plan`: Show the configuration sweep a sink would be tested with
//! - `run`: Drive the sweep interactively and record the verdicts

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use sinkcheck_caps::parse_caps;
use sinkcheck_core::{
    read_records, JsonResultStore, SessionError, SinkClass, SinkId, TestPlan, TestSession,
};
use sinkcheck_gst::{GstLaunchOptions, GstLaunchRuntime};

mod console;

use console::ConsoleVerdicts;

#[derive(Parser)]
#[command(name = "sinkcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manual conformance harness for media sink elements", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration sweep a sink would be tested with
    Plan {
        /// Sink element to plan for, e.g. pulsesink or xvimagesink
        sink: String,

        /// Caps string to expand instead of inspecting the element
        #[arg(long)]
        caps: Option<String>,

        /// File holding a caps string to expand instead of inspecting
        #[arg(long)]
        caps_file: Option<PathBuf>,

        /// Sink class when caps are supplied directly (audio or video)
        #[arg(long)]
        class: Option<String>,
    },

    /// Drive the sweep interactively and record the verdicts
    Run {
        /// Sink element to test
        sink: String,

        /// Results file, one JSON verdict per line (appended)
        #[arg(long, default_value = "sinkcheck-results.jsonl")]
        results: PathBuf,

        /// Milliseconds a pipeline gets to settle before it counts as playing
        #[arg(long, default_value = "800")]
        grace_ms: u64,

        /// Caps string to expand instead of inspecting the element
        #[arg(long)]
        caps: Option<String>,

        /// File holding a caps string to expand instead of inspecting
        #[arg(long)]
        caps_file: Option<PathBuf>,

        /// Sink class when caps are supplied directly (audio or video)
        #[arg(long)]
        class: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sinkcheck_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Plan {
            sink,
            caps,
            caps_file,
            class,
        } => {
            let runtime = GstLaunchRuntime::default();
            cmd_plan(
                &runtime,
                &sink,
                caps.as_deref(),
                caps_file.as_deref(),
                class.as_deref(),
            )
            .await
        }
        Commands::Run {
            sink,
            results,
            grace_ms,
            caps,
            caps_file,
            class,
        } => {
            let runtime = GstLaunchRuntime::new(GstLaunchOptions {
                startup_grace: Duration::from_millis(grace_ms),
                ..GstLaunchOptions::default()
            });
            cmd_run(
                runtime,
                &sink,
                &results,
                caps.as_deref(),
                caps_file.as_deref(),
                class.as_deref(),
            )
            .await
        }
    }
}

/// Resolve a test plan from an inspected element or a supplied caps string.
async fn resolve_plan(
    runtime: &GstLaunchRuntime,
    sink: &str,
    caps: Option<&str>,
    caps_file: Option<&Path>,
    class: Option<&str>,
) -> Result<TestPlan> {
    let sink = SinkId::from(sink);

    let supplied = match (caps, caps_file) {
        (Some(_), Some(_)) => {
            anyhow::bail!("--caps and --caps-file are mutually exclusive")
        }
        (Some(text), None) => Some(text.to_string()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read caps file {:?}", path))?,
        ),
        (None, None) => None,
    };

    match supplied {
        Some(text) => {
            let class = match class {
                Some("audio") => SinkClass::Audio,
                Some("video") => SinkClass::Video,
                Some(other) => {
                    anyhow::bail!("Unknown sink class: {} (expected audio or video)", other)
                }
                None => anyhow::bail!("--class is required when caps are supplied directly"),
            };
            let descriptors = parse_caps(&text).context("Failed to parse the supplied caps")?;
            TestPlan::from_caps(sink, class, &descriptors)
                .context("Supplied caps do not expand to a test matrix")
        }
        None => {
            if class.is_some() {
                anyhow::bail!("--class only applies together with --caps or --caps-file");
            }
            TestPlan::discover(runtime, &sink)
                .await
                .context("Capability discovery failed")
        }
    }
}

/// Print the sweep without starting anything.
async fn cmd_plan(
    runtime: &GstLaunchRuntime,
    sink: &str,
    caps: Option<&str>,
    caps_file: Option<&Path>,
    class: Option<&str>,
) -> Result<()> {
    let plan = resolve_plan(runtime, sink, caps, caps_file, class).await?;

    println!("Sink:           {} ({})", plan.sink, plan.class);
    println!("Plan digest:    {}", plan.digest());
    println!("Configurations: {}", plan.len());

    if plan.is_empty() {
        println!();
        println!("Nothing to test: the sink advertises no constrainable capabilities.");
        return Ok(());
    }

    println!();
    for (i, config) in plan.configurations.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, config);
    }
    Ok(())
}

/// Run the interactive session and record every verdict.
async fn cmd_run(
    runtime: GstLaunchRuntime,
    sink: &str,
    results: &Path,
    caps: Option<&str>,
    caps_file: Option<&Path>,
    class: Option<&str>,
) -> Result<()> {
    let plan = resolve_plan(&runtime, sink, caps, caps_file, class).await?;
    if plan.is_empty() {
        println!("Nothing to test: the sink advertises no constrainable capabilities.");
        return Ok(());
    }

    let store = Arc::new(
        JsonResultStore::open(results)
            .with_context(|| format!("Failed to open results file {:?}", results))?,
    );

    println!(
        "Testing {} ({} sink, {} configurations)",
        plan.sink,
        plan.class,
        plan.len()
    );
    println!("Results: {:?}", results);

    let mut session = TestSession::new(
        &plan,
        Arc::new(runtime),
        Arc::new(ConsoleVerdicts),
        store,
    );

    let report = match session.run().await {
        Ok(report) => report,
        Err(SessionError::VerdictLost(_)) => {
            println!();
            println!(
                "Input closed before the sweep finished; verdicts recorded so far are kept in {:?}.",
                results
            );
            anyhow::bail!("Session terminated early")
        }
        Err(e) => return Err(e).context("Session failed"),
    };

    // Print results
    println!();
    println!("Session: {}", report.session_id);
    let records = read_records(results).context("Failed to read back the results file")?;
    let recent = &records[records.len().saturating_sub(report.total)..];
    for (i, record) in recent.iter().enumerate() {
        let status = if record.passed { "✓" } else { "✗" };
        println!("  {} {:>3}. {}", status, i + 1, record.configuration);
    }

    println!();
    println!(
        "Summary: {}/{} configurations passed ({}ms)",
        report.passed, report.total, report.duration_ms
    );

    if report.failed == 0 {
        println!("\n✓ All configurations passed!");
        Ok(())
    } else {
        anyhow::bail!("{} configuration(s) failed", report.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Plan resolution without discovery is pure; a runtime with unreachable
    // binaries proves the inspector is never consulted.
    fn offline_runtime() -> GstLaunchRuntime {
        GstLaunchRuntime::new(GstLaunchOptions {
            launch_binary: "/nonexistent/gst-launch-1.0".to_string(),
            inspect_binary: "/nonexistent/gst-inspect-1.0".to_string(),
            ..GstLaunchOptions::default()
        })
    }

    #[tokio::test]
    async fn test_supplied_caps_bypass_discovery() {
        let plan = resolve_plan(
            &offline_runtime(),
            "fakesink",
            Some("video/x-raw, width=(int)[ 16, 1920 ], height=(int)[ 16, 1080 ]"),
            None,
            Some("video"),
        )
        .await
        .unwrap();
        assert_eq!(plan.class, SinkClass::Video);
        assert_eq!(plan.len(), 5);
    }

    #[tokio::test]
    async fn test_supplied_caps_require_a_class() {
        let err = resolve_plan(
            &offline_runtime(),
            "fakesink",
            Some("video/x-raw, width=(int)320"),
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("--class"), "got: {err}");
    }

    #[tokio::test]
    async fn test_caps_and_caps_file_are_mutually_exclusive() {
        let err = resolve_plan(
            &offline_runtime(),
            "fakesink",
            Some("video/x-raw"),
            Some(Path::new("caps.txt")),
            Some("video"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"), "got: {err}");
    }

    #[tokio::test]
    async fn test_class_alone_is_rejected() {
        let err = resolve_plan(&offline_runtime(), "fakesink", None, None, Some("audio"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--caps"), "got: {err}");
    }

    #[tokio::test]
    async fn test_caps_file_feeds_the_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.txt");
        std::fs::write(&path, "audio/x-raw, rate=(int)[ 4000, 96000 ]\n").unwrap();

        let plan = resolve_plan(
            &offline_runtime(),
            "pulsesink",
            None,
            Some(&path),
            Some("audio"),
        )
        .await
        .unwrap();
        assert_eq!(plan.class, SinkClass::Audio);
        assert_eq!(plan.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_class_is_rejected() {
        let err = resolve_plan(
            &offline_runtime(),
            "fakesink",
            Some("video/x-raw"),
            None,
            Some("midi"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Unknown sink class"), "got: {err}");
    }
}
