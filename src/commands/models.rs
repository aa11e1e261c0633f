//! Model listing command
//!
//! Prints the static model registry as a table or as JSON.

use crate::error::Result;
use crate::registry::{ModelEntry, ModelRegistry};
use prettytable::{row, Table};

/// List the selectable models
///
/// # Arguments
///
/// * `json` - Print JSON instead of a table
/// * `active` - Identifier to mark as currently selected, if any
///
/// # Examples
///
/// ```no_run
/// use tutorchat::commands::models::list_models;
///
/// list_models(false, Some("llama-3.1-8b-instant")).unwrap();
/// ```
pub fn list_models(json: bool, active: Option<&str>) -> Result<()> {
    tracing::debug!("models::list_models json: {}", json);

    if json {
        println!("{}", render_models_json()?);
    } else {
        build_models_table(ModelRegistry::entries(), active).printstd();
    }
    Ok(())
}

/// Registry entries as pretty-printed JSON
pub fn render_models_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(ModelRegistry::entries())?)
}

fn build_models_table(entries: &[ModelEntry], active: Option<&str>) -> Table {
    let mut table = Table::new();
    table.add_row(row![bFg => "#", "Model", "Identifier", "Description"]);

    for (i, entry) in entries.iter().enumerate() {
        let marker = if Some(entry.id) == active { "*" } else { "" };
        table.add_row(row![
            format!("{}{}", i + 1, marker),
            entry.label,
            entry.id,
            entry.description
        ]);
    }
    table
}
