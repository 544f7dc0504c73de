use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::model::Value;

// ---------------------------------------------------------------------------
// CSV export of the current filtered view
// ---------------------------------------------------------------------------

/// Render a cell for export. Missing cells become empty fields; dates use
/// ISO `%Y-%m-%d`; floats keep full precision.
fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write the view as delimited rows: header row in the dataset's column
/// order, one row per surviving record, no index column.
pub fn write_csv<W: Write>(view: &FilteredView, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(view.columns())
        .context("writing CSV header")?;

    for rec in view.records() {
        let fields: Vec<String> = view
            .columns()
            .iter()
            .map(|col| csv_field(rec.get(col)))
            .collect();
        out.write_record(&fields).context("writing CSV row")?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export the view to a file at `path`.
pub fn export_csv(view: &FilteredView, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating export file {}", path.display()))?;
    write_csv(view, file)?;
    log::info!("exported {} filtered rows to {}", view.len(), path.display());
    Ok(())
}
