//! Insert command - places a row at an explicit position.

use crate::backend::{open_row, persist};
use crate::cli::{BackendArgs, InsertArgs, ListArgs};
use crate::output::OutputFormat;

/// Run the insert command
pub async fn run(
    backend: &BackendArgs,
    list_args: &ListArgs,
    args: &InsertArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (list, mut row) = open_row(backend, list_args, &args.row.id).await?;
    let before = list.engine().positions().get(&row)?;

    list.insert_at(&mut row, args.at).await?;
    persist(backend, list.backend()).await?;

    super::report_position(&list, &row, &args.row.id, before, format)
}
