//! JSON-lines record processing

use anyhow::{Context, Result};
use fieldguard_core::{record_from_json, record_to_json};
use fieldguard_policy::Pipeline;
use std::io::{BufRead, Write};
use tracing::debug;

/// Apply `pipeline` to every JSON object line of `input`, writing results to
/// `output`. Blank lines are skipped. Returns the number of records written.
///
/// Stops at the first bad line; records already written stay written.
pub fn apply_stream(pipeline: &Pipeline, input: impl BufRead, mut output: impl Write) -> Result<usize> {
    let mut written = 0;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("line {}: invalid JSON", line_no))?;
        let mut record = record_from_json(&value).with_context(|| format!("line {}", line_no))?;

        pipeline
            .apply(&mut record)
            .with_context(|| format!("line {}: pipeline failed", line_no))?;

        serde_json::to_writer(&mut output, &record_to_json(&record))
            .with_context(|| format!("line {}: failed to write record", line_no))?;
        output.write_all(b"\n")?;
        written += 1;
    }

    output.flush()?;
    debug!(records = written, "Finished processing input");
    Ok(written)
}
