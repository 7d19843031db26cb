use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use apex_core::OutcomeLog;
use apex_experiment::SessionSummary;

/// One flat row per trial, chronological.
pub fn write_csv(path: &Path, log: &OutcomeLog) -> Result<()> {
    let mut csv = String::from(
        "trial,kind,reward,lower,upper,tap_count,level_reached,start_ms,end_ms,\
         keys_released_early,key_tapped_early,success\n",
    );
    for (i, o) in log.iter().enumerate() {
        csv.push_str(&format!(
            "{i},{},{:.2},{:.3},{:.3},{},{:.3},{},{},{},{},{}\n",
            o.kind.label(),
            o.reward,
            o.bounds.lower,
            o.bounds.upper,
            o.tap_count,
            o.level_reached,
            o.start_ms,
            o.end_ms,
            o.keys_released_early,
            o.key_tapped_early,
            o.success,
        ));
    }
    write_file(path, &csv)
}

pub fn write_json(path: &Path, log: &OutcomeLog) -> Result<()> {
    let json = serde_json::to_string_pretty(log.records())
        .context("serialize trial records")?;
    write_file(path, &json)
}

pub fn write_summary(path: &Path, summary: &SessionSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("serialize summary")?;
    write_file(path, &json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
