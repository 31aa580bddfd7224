//! Show command - prints the list a row belongs to.

use crate::backend::open_row;
use crate::cli::{BackendArgs, ListArgs, RowArgs};
use crate::output::{OutputFormat, print_rows};

/// Run the show command
pub async fn run(
    backend: &BackendArgs,
    list_args: &ListArgs,
    args: &RowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (list, row) = open_row(backend, list_args, &args.id).await?;

    if list.is_unlisted(&row) {
        match format {
            OutputFormat::Human => println!("Row {} is not in a list.", args.id),
            OutputFormat::Json => {
                let value = serde_json::json!({ "row": row, "peers": [] });
                println!("{}", serde_json::to_string(&value)?);
            }
        }
        return Ok(());
    }

    let peers = list.peers(&row).await?;
    match format {
        OutputFormat::Human => print_rows(&peers),
        OutputFormat::Json => {
            let value = serde_json::json!({ "row": row, "peers": peers });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
