use std::io::Write;

use crate::models::FetchOutcome;

/// Writes the extracted text exactly as extracted, with no framing.
pub fn write_text<W: Write>(out: &mut W, outcome: &FetchOutcome) -> std::io::Result<()> {
    out.write_all(outcome.text().as_bytes())?;
    out.flush()
}

/// Writes the structured outcome (route, overlay/scroll/selector results)
/// as pretty JSON. Used for `--report` on stderr.
pub fn write_report<W: Write>(out: &mut W, outcome: &FetchOutcome) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, outcome)?;
    writeln!(out)
}
