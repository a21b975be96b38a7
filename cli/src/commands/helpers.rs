use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use foodbase_core::models::{FoodGroup, FoodSummary, GroupFood, NutrientFact, Weight};

pub(crate) fn print_group_table(groups: &[FoodGroup]) {
    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
    }

    let rows: Vec<GroupRow> = groups
        .iter()
        .map(|g| GroupRow {
            id: g.id,
            name: truncate(&g.name, 50),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_group_food_table(foods: &[GroupFood]) {
    #[derive(Tabled)]
    struct GroupFoodRow {
        #[tabled(rename = "Food")]
        short_desc: String,
        #[tabled(rename = "N factor")]
        nitrogen: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Calorie")]
        calorie: String,
    }

    let rows: Vec<GroupFoodRow> = foods
        .iter()
        .map(|f| GroupFoodRow {
            short_desc: truncate(&f.short_desc, 45),
            nitrogen: format!("{:.2}", f.nitrogen_factor),
            protein: format!("{:.2}", f.protein_factor),
            fat: format!("{:.2}", f.fat_factor),
            calorie: format!("{:.2}", f.calorie_factor),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_food_summary_table(foods: &[FoodSummary]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Short")]
        short_desc: String,
        #[tabled(rename = "Description")]
        long_desc: String,
        #[tabled(rename = "Manufacturer")]
        manufac_name: String,
        #[tabled(rename = "Scientific name")]
        sci_name: String,
        #[tabled(rename = "Group")]
        group_name: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            id: f.id,
            short_desc: truncate(&f.short_desc, 30),
            long_desc: truncate(&f.long_desc, 40),
            manufac_name: truncate(&f.manufac_name, 20),
            sci_name: truncate(&f.sci_name, 25),
            group_name: truncate(&f.group_name, 25),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_nutrient_table(facts: &[NutrientFact]) {
    #[derive(Tabled)]
    struct NutrientRow {
        #[tabled(rename = "Nutrient")]
        name: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Data pts")]
        num_data_points: i64,
        #[tabled(rename = "Deriv")]
        derivation_code: String,
        #[tabled(rename = "Min")]
        min: String,
        #[tabled(rename = "DF")]
        degrees_freedom: String,
    }

    let rows: Vec<NutrientRow> = facts
        .iter()
        .map(|f| NutrientRow {
            name: truncate(&f.name, 35),
            amount: format!("{} {}", f.amount, f.units),
            num_data_points: f.num_data_points,
            derivation_code: f.derivation_code.clone(),
            min: f.min.map_or("-".into(), |v| v.to_string()),
            degrees_freedom: f.degrees_freedom.map_or("-".into(), |v| v.to_string()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_weight_table(weights: &[Weight]) {
    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "Seq")]
        sequence_num: i64,
        #[tabled(rename = "Amount")]
        amount: f64,
        #[tabled(rename = "Measure")]
        description: String,
        #[tabled(rename = "Grams")]
        gm_weight: String,
        #[tabled(rename = "Data pts")]
        num_data_pts: String,
        #[tabled(rename = "Std dev")]
        std_dev: String,
    }

    let rows: Vec<WeightRow> = weights
        .iter()
        .map(|w| WeightRow {
            sequence_num: w.sequence_num,
            amount: w.amount,
            description: truncate(&w.description, 40),
            gm_weight: format!("{:.1}", w.gm_weight),
            num_data_pts: w.num_data_pts.map_or("-".into(), |v| v.to_string()),
            std_dev: w.std_dev.map_or("-".into(), |v| v.to_string()),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_json_error_escapes() {
        let json: serde_json::Value =
            serde_json::from_str(&json_error("bad \"quote\"")).unwrap();
        assert_eq!(json["error"], "bad \"quote\"");
    }
}
