//! Shared "query pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> decode -> filter by year -> project to a plot-ready series
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::ApiClient;
use crate::domain::{Dataset, DerivedSeries};
use crate::error::AppError;

/// All computed outputs of a single query run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Records fetched before the year filter (for the summary line).
    pub records_fetched: usize,
    pub series: DerivedSeries,
}

/// Execute the full pipeline: one fetch, then a pure projection.
///
/// On a fetch failure the derived series is never computed.
pub fn run_query(client: &ApiClient, dataset: Dataset, year: i32) -> Result<RunOutput, AppError> {
    let records = client.fetch(dataset)?;
    let records_fetched = records.len();
    let series = crate::series::project(&records, dataset, year);
    Ok(RunOutput {
        records_fetched,
        series,
    })
}
