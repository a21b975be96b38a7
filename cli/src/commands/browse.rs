use anyhow::Result;

use foodbase_core::db::Database;

use super::helpers::{print_food_summary_table, print_group_food_table, print_group_table};

pub(crate) fn cmd_groups(db: &Database, json: bool) -> Result<()> {
    let groups = db.list_food_groups()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else if groups.is_empty() {
        eprintln!("No food groups. Run `foodbase import` first.");
    } else {
        print_group_table(&groups);
    }

    Ok(())
}

pub(crate) fn cmd_show(db: &Database, group_id: i64, json: bool) -> Result<()> {
    let foods = db.group_foods(group_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else if foods.is_empty() {
        eprintln!("No foods in group {group_id}");
    } else {
        print_group_food_table(&foods);
    }

    Ok(())
}

pub(crate) fn cmd_list(db: &Database, page: u32, json: bool) -> Result<()> {
    let listing = db.food_page(page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.foods.is_empty() {
        eprintln!("No foods on page {page}");
    } else {
        print_food_summary_table(&listing.foods);
    }
    println!(
        "Page {}  (prev: {}, next: {})",
        listing.current_page, listing.prev_page, listing.next_page
    );

    Ok(())
}

pub(crate) fn cmd_search(db: &Database, query: &str, json: bool) -> Result<()> {
    let foods = db.search_foods(query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else if foods.is_empty() {
        eprintln!("No results found for '{query}'");
    } else {
        print_food_summary_table(&foods);
    }

    Ok(())
}
