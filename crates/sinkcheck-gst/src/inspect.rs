//! Capability discovery via `gst-inspect-1.0`.
//!
//! The inspector dump is scraped line-wise: the factory `Klass` line decides
//! whether the element is a sink we can drive, and every SINK pad template's
//! `Capabilities:` block is re-read through the caps parser. SRC templates
//! and caps features are skipped.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use sinkcheck_caps::{parse_value, CapsStructure};
use sinkcheck_core::{RuntimeError, RuntimeResult, SinkCapabilities, SinkClass, SinkId};

/// Factory details pulled out of one inspector dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    /// Raw `Klass` line value, e.g. `Sink/Video`.
    pub klass: String,
    /// Descriptors advertised by SINK pad templates, in dump order.
    pub sink_caps: Vec<CapsStructure>,
}

/// Scrapes an inspector dump for the factory klass and SINK template caps.
///
/// Caps blocks are delimited by indentation: a line at or left of the
/// `Capabilities:` keyword ends the block. Structure lines carry a media
/// type (with a `/`), everything else inside a block is a `key: value`
/// field re-parsed as a raw value spec. `ANY` and `EMPTY` blocks advertise
/// no descriptors.
pub fn scrape_inspect(text: &str) -> Result<InspectReport, String> {
    let mut klass = None;
    let mut sink_caps = Vec::new();
    let mut in_sink_template = false;
    let mut caps_indent: Option<usize> = None;
    let mut current: Option<CapsStructure> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();

        if let Some(block) = caps_indent {
            if trimmed.is_empty() || indent <= block {
                // Block over; the line itself still gets normal handling.
                if let Some(done) = current.take() {
                    sink_caps.push(done);
                }
                caps_indent = None;
            } else {
                scrape_caps_line(trimmed, &mut current, &mut sink_caps)?;
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix("Klass") {
            if klass.is_none() {
                klass = Some(rest.trim().to_string());
            }
        } else if trimmed.starts_with("SINK template") {
            in_sink_template = true;
        } else if trimmed.starts_with("SRC template") {
            in_sink_template = false;
        } else if in_sink_template && trimmed == "Capabilities:" {
            caps_indent = Some(indent);
        }
    }
    if let Some(done) = current.take() {
        sink_caps.push(done);
    }

    let klass = klass.ok_or_else(|| "no Klass line in inspector output".to_string())?;
    Ok(InspectReport { klass, sink_caps })
}

fn scrape_caps_line(
    trimmed: &str,
    current: &mut Option<CapsStructure>,
    sink_caps: &mut Vec<CapsStructure>,
) -> Result<(), String> {
    if trimmed == "ANY" || trimmed == "EMPTY" {
        return Ok(());
    }
    // A `key:` prefix without a `/` is a field line; a media type always
    // carries one before any colon.
    if let Some((key, rest)) = trimmed.split_once(':') {
        if !key.contains('/') && !key.contains('(') {
            let name = key.trim();
            let spec = parse_value(rest.trim())
                .map_err(|e| format!("field '{name}': {e}"))?;
            match current.take() {
                Some(structure) => *current = Some(structure.with_field(name, spec)),
                None => return Err(format!("field '{name}' outside a structure")),
            }
            return Ok(());
        }
    }
    // Structure line; drop any caps-feature suffix such as `(memory:DMABuf)`.
    let name = trimmed.split('(').next().unwrap_or(trimmed).trim();
    if !name.contains('/') {
        return Err(format!("unrecognized caps line '{trimmed}'"));
    }
    if let Some(done) = current.take() {
        sink_caps.push(done);
    }
    *current = Some(CapsStructure::new(name));
    Ok(())
}

/// Runs the inspector against one element and scrapes the dump.
///
/// An inspector complaint about an unknown element maps to `SinkNotFound`;
/// everything else that keeps us from reading caps is `CapsUnavailable`.
/// A klass without a sink role is `NotASink`.
pub async fn inspect_sink(
    binary: &str,
    sink: &SinkId,
    timeout: Duration,
) -> RuntimeResult<SinkCapabilities> {
    let output = run_inspect(binary, sink, timeout).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        if stdout.contains("No such element") || stderr.contains("No such element") {
            return Err(RuntimeError::SinkNotFound(sink.clone()));
        }
        let reason = first_line(&stderr)
            .or_else(|| first_line(&stdout))
            .unwrap_or("inspector exited with an error")
            .to_string();
        return Err(RuntimeError::CapsUnavailable {
            sink: sink.clone(),
            reason,
        });
    }

    let report = scrape_inspect(&stdout).map_err(|reason| RuntimeError::CapsUnavailable {
        sink: sink.clone(),
        reason,
    })?;
    debug!(
        sink = %sink,
        klass = %report.klass,
        descriptors = report.sink_caps.len(),
        "inspected sink"
    );
    let class = SinkClass::from_klass(&report.klass).ok_or_else(|| RuntimeError::NotASink {
        sink: sink.clone(),
        klass: report.klass.clone(),
    })?;
    Ok(SinkCapabilities {
        class,
        descriptors: report.sink_caps,
    })
}

async fn run_inspect(
    binary: &str,
    sink: &SinkId,
    timeout: Duration,
) -> RuntimeResult<std::process::Output> {
    let unavailable = |reason: String| RuntimeError::CapsUnavailable {
        sink: sink.clone(),
        reason,
    };
    let child = Command::new(binary)
        .arg(sink.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| unavailable(format!("failed to run {binary}: {e}")))?;
    tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| unavailable(format!("{binary} timed out")))?
        .map_err(|e| unavailable(e.to_string()))
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}
