//! Process-backed pipeline runtime.
//!
//! Drives a system GStreamer install through its command line tools:
//! discovery via `gst-inspect-1.0`, playback via `gst-launch-1.0`. A start
//! spawns the launcher, waits out a startup grace period and then classifies
//! the attempt: a process that already exited refused the configuration, a
//! process still up counts as playing until `stop` kills it.

use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use sinkcheck_caps::Configuration;
use sinkcheck_core::{
    PipelineTicket, RuntimeError, RuntimeResult, SinkCapabilities, SinkClass, SinkId, SinkRuntime,
    StartOutcome, StartReport,
};

use crate::inspect::inspect_sink;
use crate::launch::launch_args;

/// Tunables for [`GstLaunchRuntime`].
#[derive(Debug, Clone)]
pub struct GstLaunchOptions {
    /// Launcher binary, resolved through `PATH` unless absolute
    pub launch_binary: String,
    /// Inspector binary, resolved through `PATH` unless absolute
    pub inspect_binary: String,
    /// How long a pipeline may take to settle before it counts as playing
    pub startup_grace: Duration,
    /// Upper bound on one inspector run
    pub inspect_timeout: Duration,
}

impl Default for GstLaunchOptions {
    fn default() -> Self {
        GstLaunchOptions {
            launch_binary: "gst-launch-1.0".to_string(),
            inspect_binary: "gst-inspect-1.0".to_string(),
            startup_grace: Duration::from_millis(800),
            inspect_timeout: Duration::from_secs(5),
        }
    }
}

/// [`SinkRuntime`] over the GStreamer command line tools.
///
/// Video windows are opened by the launched pipeline itself, so this runtime
/// never asks for a render surface. Sink classes are cached per element name
/// across starts to avoid re-running the inspector for every configuration.
pub struct GstLaunchRuntime {
    opts: GstLaunchOptions,
    classes: Mutex<HashMap<String, SinkClass>>,
    pipelines: Mutex<PipelineTable>,
}

#[derive(Default)]
struct PipelineTable {
    next_ticket: u64,
    children: HashMap<u64, Child>,
}

impl GstLaunchRuntime {
    pub fn new(opts: GstLaunchOptions) -> Self {
        GstLaunchRuntime {
            opts,
            classes: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(PipelineTable::default()),
        }
    }

    async fn class_of(&self, sink: &SinkId) -> RuntimeResult<SinkClass> {
        if let Some(class) = self.classes.lock().unwrap().get(sink.as_str()).copied() {
            return Ok(class);
        }
        Ok(self.list_capabilities(sink).await?.class)
    }
}

impl Default for GstLaunchRuntime {
    fn default() -> Self {
        GstLaunchRuntime::new(GstLaunchOptions::default())
    }
}

#[async_trait]
impl SinkRuntime for GstLaunchRuntime {
    async fn list_capabilities(&self, sink: &SinkId) -> RuntimeResult<SinkCapabilities> {
        let caps = inspect_sink(&self.opts.inspect_binary, sink, self.opts.inspect_timeout).await?;
        self.classes
            .lock()
            .unwrap()
            .insert(sink.as_str().to_string(), caps.class);
        Ok(caps)
    }

    async fn start(&self, sink: &SinkId, config: &Configuration) -> RuntimeResult<StartReport> {
        let class = self.class_of(sink).await?;
        let args = launch_args(class, sink, config);
        debug!(sink = %sink, pipeline = %args.join(" "), "launching pipeline");

        let mut child = Command::new(&self.opts.launch_binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RuntimeError::Launch(format!("failed to run {}: {e}", self.opts.launch_binary))
            })?;

        tokio::time::sleep(self.opts.startup_grace).await;

        let ticket = {
            let mut table = self.pipelines.lock().unwrap();
            table.next_ticket += 1;
            PipelineTicket(table.next_ticket)
        };

        match child.try_wait() {
            Err(e) => Err(RuntimeError::Launch(e.to_string())),
            Ok(Some(status)) => {
                let reason = startup_failure(&mut child, status).await;
                Ok(StartReport {
                    ticket,
                    outcome: StartOutcome::Failed(reason),
                })
            }
            Ok(None) => {
                // Keep draining stderr so a chatty pipeline cannot block on
                // a full pipe.
                if let Some(stderr) = child.stderr.take() {
                    tokio::spawn(async move {
                        let mut stderr = stderr;
                        let mut sink = tokio::io::sink();
                        let _ = tokio::io::copy(&mut stderr, &mut sink).await;
                    });
                }
                self.pipelines
                    .lock()
                    .unwrap()
                    .children
                    .insert(ticket.0, child);
                Ok(StartReport {
                    ticket,
                    outcome: StartOutcome::Playing,
                })
            }
        }
    }

    async fn stop(&self, ticket: PipelineTicket) -> RuntimeResult<()> {
        let child = self.pipelines.lock().unwrap().children.remove(&ticket.0);
        let Some(mut child) = child else {
            return Ok(());
        };
        // Kill may race a natural exit; only the reap result matters.
        if let Err(e) = child.start_kill() {
            debug!(ticket = %ticket, error = %e, "pipeline already exited");
        }
        match child.wait().await {
            Ok(status) => {
                debug!(ticket = %ticket, status = %status, "pipeline stopped");
                Ok(())
            }
            Err(e) => Err(RuntimeError::Teardown(e.to_string())),
        }
    }
}

/// Drains what the dead launcher wrote to stderr and condenses it into a
/// one-line refusal reason.
async fn startup_failure(child: &mut Child, status: ExitStatus) -> String {
    let mut detail = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let mut buf = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            warn!(error = %e, "could not read launcher stderr");
        }
        detail = String::from_utf8_lossy(&buf).trim().to_string();
    }
    match last_line(&detail) {
        Some(line) => format!("exited during startup ({status}): {line}"),
        None => format!("exited during startup ({status})"),
    }
}

fn last_line(detail: &str) -> Option<&str> {
    detail.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_point_at_the_gst_tools() {
        let opts = GstLaunchOptions::default();
        assert_eq!(opts.launch_binary, "gst-launch-1.0");
        assert_eq!(opts.inspect_binary, "gst-inspect-1.0");
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        const AUDIO_DUMP: &str = "\
  Klass                    Sink/Audio
Pad Templates:
  SINK template: 'sink'
    Availability: Always
    Capabilities:
      audio/x-raw
                   rate: [ 4000, 96000 ]
";

        fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
            let path = dir.path().join(name);
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh").unwrap();
            writeln!(file, "{body}").unwrap();
            drop(file);
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        fn runtime_with(
            dir: &tempfile::TempDir,
            launch_body: &str,
        ) -> GstLaunchRuntime {
            let inspect_body = format!("cat <<'EOF'\n{AUDIO_DUMP}EOF");
            let inspect = script(dir, "inspect", &inspect_body);
            let launch = script(dir, "launch", launch_body);
            GstLaunchRuntime::new(GstLaunchOptions {
                launch_binary: launch.to_str().unwrap().to_string(),
                inspect_binary: inspect.to_str().unwrap().to_string(),
                startup_grace: Duration::from_millis(150),
                inspect_timeout: Duration::from_secs(5),
            })
        }

        fn config() -> Configuration {
            Configuration::new(
                "audio/x-raw",
                vec![("rate".to_string(), sinkcheck_caps::Value::Int(44100))],
            )
        }

        /// Test: a launcher that stays up through the grace period reports
        /// playing, and stop is idempotent afterwards.
        #[tokio::test]
        async fn test_long_lived_launcher_is_playing() {
            let dir = tempfile::tempdir().unwrap();
            let runtime = runtime_with(&dir, "sleep 30");
            let sink = SinkId::from("fakesink");

            let report = runtime.start(&sink, &config()).await.unwrap();
            assert!(matches!(report.outcome, StartOutcome::Playing));

            runtime.stop(report.ticket).await.unwrap();
            runtime.stop(report.ticket).await.unwrap();
        }

        /// Test: a launcher that dies during the grace period reports a
        /// refusal carrying its final stderr line.
        #[tokio::test]
        async fn test_early_exit_is_a_refusal() {
            let dir = tempfile::tempdir().unwrap();
            let runtime = runtime_with(
                &dir,
                "echo 'ERROR: could not link elements' >&2; exit 1",
            );
            let sink = SinkId::from("fakesink");

            let report = runtime.start(&sink, &config()).await.unwrap();
            match report.outcome {
                StartOutcome::Failed(reason) => {
                    assert!(reason.contains("could not link"), "got: {reason}");
                }
                StartOutcome::Playing => panic!("expected a refusal"),
            }
            // The dead launcher holds no resources; stop is still a no-op.
            runtime.stop(report.ticket).await.unwrap();
        }

        /// Test: stopping a ticket that was never issued is a no-op.
        #[tokio::test]
        async fn test_unknown_ticket_stop_is_a_noop() {
            let dir = tempfile::tempdir().unwrap();
            let runtime = runtime_with(&dir, "sleep 30");
            runtime.stop(PipelineTicket(99)).await.unwrap();
        }

        /// Test: a missing launcher binary is a runtime error, not a refusal.
        #[tokio::test]
        async fn test_missing_launcher_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let inspect_body = format!("cat <<'EOF'\n{AUDIO_DUMP}EOF");
            let inspect = script(&dir, "inspect", &inspect_body);
            let runtime = GstLaunchRuntime::new(GstLaunchOptions {
                launch_binary: "/nonexistent/gst-launch-1.0".to_string(),
                inspect_binary: inspect.to_str().unwrap().to_string(),
                startup_grace: Duration::from_millis(50),
                inspect_timeout: Duration::from_secs(5),
            });

            let err = runtime
                .start(&SinkId::from("fakesink"), &config())
                .await
                .unwrap_err();
            assert!(matches!(err, RuntimeError::Launch(_)), "got: {err}");
        }

        /// Test: the sink class is cached after discovery, so starts do not
        /// re-run the inspector.
        #[tokio::test]
        async fn test_class_is_cached_across_starts() {
            let dir = tempfile::tempdir().unwrap();
            let counter = dir.path().join("count");
            let inspect_body = format!(
                "echo x >> {}\ncat <<'EOF'\n{AUDIO_DUMP}EOF",
                counter.display()
            );
            let inspect = script(&dir, "inspect", &inspect_body);
            let launch = script(&dir, "launch", "sleep 30");
            let runtime = GstLaunchRuntime::new(GstLaunchOptions {
                launch_binary: launch.to_str().unwrap().to_string(),
                inspect_binary: inspect.to_str().unwrap().to_string(),
                startup_grace: Duration::from_millis(100),
                inspect_timeout: Duration::from_secs(5),
            });
            let sink = SinkId::from("fakesink");

            runtime.list_capabilities(&sink).await.unwrap();
            let first = runtime.start(&sink, &config()).await.unwrap();
            runtime.stop(first.ticket).await.unwrap();
            let second = runtime.start(&sink, &config()).await.unwrap();
            runtime.stop(second.ticket).await.unwrap();

            let runs = std::fs::read_to_string(&counter).unwrap();
            assert_eq!(runs.lines().count(), 1);
        }
    }
}
