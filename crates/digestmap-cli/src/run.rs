//! Fingerprint command: digest a path and print the results

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use digestmap_core::{digest_root, PipelineConfig};
use tracing::{debug, info};

use crate::output::write_map;
use crate::profiler::Profiler;

/// Run the fingerprint command, writing results (or the run's error) to `out`.
///
/// Returns `false` when the run failed; nothing but the error message is
/// written in that case.
///
/// # Errors
/// Returns an error if the path cannot be made absolute or `out` cannot be
/// written.
pub async fn run<W: Write>(
    path: &Path,
    config: &PipelineConfig,
    profiling: bool,
    out: &mut W,
) -> Result<bool> {
    let root = std::path::absolute(path)
        .with_context(|| format!("cannot resolve {}", path.display()))?;
    info!("Fingerprinting {}", root.display());

    let mut profiler = Profiler::new();
    if profiling {
        profiler.start();
    }

    let outcome = digest_root(&root, config).await;
    let report = profiler.stop().await;

    let succeeded = match outcome {
        Ok(map) => {
            debug!("Printing {} entries", map.len());
            write_map(out, &map)?;
            true
        }
        Err(e) => {
            writeln!(out, "{e}")?;
            false
        }
    };

    if let Some(report) = report {
        writeln!(out, "{report}")?;
    }

    Ok(succeeded)
}
