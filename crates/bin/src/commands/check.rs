//! Check command - reports gaps and duplicates in a row's list.

use crate::backend::open_row;
use crate::cli::{BackendArgs, ListArgs, RowArgs};
use crate::output::OutputFormat;

/// Run the check command. Fails when the list is not contiguous.
pub async fn run(
    backend: &BackendArgs,
    list_args: &ListArgs,
    args: &RowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (list, row) = open_row(backend, list_args, &args.id).await?;
    let report = list.check_contiguity(&row).await?;

    match format {
        OutputFormat::Human => {
            println!("Rows:        {}", report.positions.len());
            println!("Missing:     {:?}", report.missing);
            println!("Duplicates:  {:?}", report.duplicates);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "rows": report.positions.len(),
                "missing": report.missing,
                "duplicates": report.duplicates,
                "contiguous": report.is_contiguous(),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    if report.is_contiguous() {
        Ok(())
    } else {
        Err(format!("list of row {} is not contiguous", args.id).into())
    }
}
