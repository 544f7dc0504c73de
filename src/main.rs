use std::env;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use claims_report::data::export::export_csv;
use claims_report::data::loader::load_or_empty;
use claims_report::report::ReportSummary;
use claims_report::state::ReportState;

/// Minimal presentation consumer of the pipeline: load the claims file,
/// apply the filters given on the command line, print the report, and
/// optionally export the filtered rows.
///
/// Usage: `claims-report [Claims.csv] [--claims "A1, A2"] [--export out.csv]`
fn main() -> Result<()> {
    env_logger::init();

    let mut input = PathBuf::from("Claims.csv");
    let mut claims_input: Option<String> = None;
    let mut export_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--claims" => claims_input = args.next(),
            "--export" => export_path = args.next().map(PathBuf::from),
            _ => input = PathBuf::from(arg),
        }
    }

    let dataset = load_or_empty(&input);
    if dataset.is_empty() {
        println!("No data available.");
        return Ok(());
    }
    let total = dataset.len();

    let mut session = ReportState::default();
    session.set_dataset(dataset);
    if let Some(text) = &claims_input {
        session.set_claim_number_input(text);
    }

    let Some(view) = session.current_view() else {
        return Ok(());
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "{total} claim records loaded, {} pass the current filters\n",
        view.len()
    )?;
    ReportSummary::build(&view).write_text(&mut stdout)?;

    if let Some(path) = export_path {
        export_csv(&view, &path)?;
    }
    Ok(())
}
