pub mod check;
pub mod insert;
pub mod r#move;
pub mod remove;
pub mod show;

use slotlist::{OrderedList, Row};

use crate::output::OutputFormat;

/// Print a row's position before and after a reordering command.
fn report_position(
    list: &OrderedList,
    row: &Row,
    id: &str,
    before: Option<i64>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let after = list.engine().positions().get(row)?;
    match format {
        OutputFormat::Human => {
            let show = |p: Option<i64>| p.map_or("unlisted".to_string(), |p| p.to_string());
            println!("Row {id}: {} -> {}", show(before), show(after));
        }
        OutputFormat::Json => {
            let value = serde_json::json!({ "id": id, "before": before, "after": after });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
