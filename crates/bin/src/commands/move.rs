//! Move command - reorders a row within its list.

use crate::backend::{open_row, persist};
use crate::cli::{BackendArgs, Direction, ListArgs, MoveArgs};
use crate::output::OutputFormat;

/// Run the move command
pub async fn run(
    backend: &BackendArgs,
    list_args: &ListArgs,
    args: &MoveArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (list, mut row) = open_row(backend, list_args, &args.row.id).await?;
    let before = list.engine().positions().get(&row)?;

    match args.to {
        Direction::Top => list.move_to_top(&mut row).await?,
        Direction::Bottom => list.move_to_bottom(&mut row).await?,
        Direction::Higher => list.move_higher(&mut row).await?,
        Direction::Lower => list.move_lower(&mut row).await?,
    }
    persist(backend, list.backend()).await?;

    super::report_position(&list, &row, &args.row.id, before, format)
}
