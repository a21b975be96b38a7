use anyhow::Result;

use foodbase_core::db::Database;

use super::helpers::{print_nutrient_table, print_weight_table};

fn print_heading(db: &Database, food_id: i64) -> Result<()> {
    if let Some(food) = db.find_food(food_id)? {
        println!("{}: {}\n", food.id, food.long_desc);
    }
    Ok(())
}

pub(crate) fn cmd_nutrients(db: &Database, food_id: i64, json: bool) -> Result<()> {
    let facts = db.food_nutrients(food_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&facts)?);
    } else if facts.is_empty() {
        eprintln!("No nutrition facts for food {food_id}");
    } else {
        print_heading(db, food_id)?;
        print_nutrient_table(&facts);
    }

    Ok(())
}

pub(crate) fn cmd_weights(db: &Database, food_id: i64, json: bool) -> Result<()> {
    let weights = db.food_weights(food_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weights)?);
    } else if weights.is_empty() {
        eprintln!("No weights for food {food_id}");
    } else {
        print_heading(db, food_id)?;
        print_weight_table(&weights);
    }

    Ok(())
}
