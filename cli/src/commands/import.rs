use std::path::Path;

use anyhow::Result;

use foodbase_core::sr_import::{ImportOptions, import_into};

use super::helpers::json_error;

pub(crate) fn cmd_import(
    db_path: &Path,
    dir: &Path,
    preserve_spaces: bool,
    json: bool,
) -> Result<()> {
    let options = ImportOptions { preserve_spaces };

    let Some(summary) = import_into(db_path, dir, options)? else {
        if json {
            println!("{}", json_error("cannot create the database connection"));
        } else {
            eprintln!("Error! cannot create the database connection.");
        }
        return Ok(());
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "source_dir": dir.display().to_string(),
                "rows_read": summary.rows_read(),
                "rows_inserted": summary.rows_inserted(),
                "tables": summary.tables,
            })
        );
    } else {
        println!("Import complete.\n");
        for table in &summary.tables {
            println!(
                "  {:<12} {:>8} read {:>8} new",
                table.table, table.rows_read, table.rows_inserted
            );
        }
        println!(
            "  {:<12} {:>8} read {:>8} new",
            "total",
            summary.rows_read(),
            summary.rows_inserted()
        );
    }

    Ok(())
}
