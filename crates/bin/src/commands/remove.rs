//! Remove command - takes a row out of its list.

use crate::backend::{open_row, persist};
use crate::cli::{BackendArgs, ListArgs, RowArgs};
use crate::output::OutputFormat;

/// Run the remove command
pub async fn run(
    backend: &BackendArgs,
    list_args: &ListArgs,
    args: &RowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (list, mut row) = open_row(backend, list_args, &args.id).await?;
    let before = list.engine().positions().get(&row)?;

    list.remove_from_list(&mut row).await?;
    persist(backend, list.backend()).await?;

    super::report_position(&list, &row, &args.id, before, format)
}
