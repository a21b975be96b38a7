use serde::Serialize;

/// Number of foods shown per page of the food listing.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodGroup {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Food {
    pub id: i64,
    pub food_group_id: i64,
    pub long_desc: String,
    pub short_desc: String,
    pub common_names: String,
    pub manufac_name: String,
    pub survey: String,
    pub ref_desc: String,
    pub refuse: i64,
    pub sci_name: String,
    pub nitrogen_factor: f64,
    pub protein_factor: f64,
    pub fat_factor: f64,
    pub calorie_factor: f64,
}

/// A food as listed under its group: description plus conversion factors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFood {
    pub short_desc: String,
    pub nitrogen_factor: f64,
    pub protein_factor: f64,
    pub fat_factor: f64,
    pub calorie_factor: f64,
}

/// One row of the paginated food listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodSummary {
    pub id: i64,
    pub short_desc: String,
    pub long_desc: String,
    pub manufac_name: String,
    pub sci_name: String,
    pub group_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodPage {
    pub current_page: u32,
    pub prev_page: u32,
    pub next_page: u32,
    pub foods: Vec<FoodSummary>,
    pub food_groups: Vec<FoodGroup>,
}

/// Previous and next page numbers for a listing page.
///
/// The previous page never goes below zero; the next page is not bounded by
/// the number of rows, so walking past the end just yields empty pages.
#[must_use]
pub fn page_links(page: u32) -> (u32, u32) {
    (page.saturating_sub(1), page.saturating_add(1))
}

/// A nutrient measurement for a single food, joined with the nutrient's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientFact {
    pub name: String,
    pub units: String,
    pub amount: f64,
    pub num_data_points: i64,
    pub derivation_code: String,
    pub min: Option<f64>,
    pub degrees_freedom: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weight {
    pub food_id: i64,
    pub sequence_num: i64,
    pub amount: f64,
    pub description: String,
    pub gm_weight: f64,
    pub num_data_pts: Option<i64>,
    pub std_dev: Option<f64>,
}

/// New descriptive fields for a food, with its group given by name.
#[derive(Debug, Clone)]
pub struct FoodEdit {
    pub id: i64,
    pub short_desc: String,
    pub long_desc: String,
    pub manufac_name: String,
    pub sci_name: String,
    pub group_name: String,
}

/// Per-table outcome of an import run.
#[derive(Debug, Clone, Serialize)]
pub struct TableImport {
    pub table: String,
    pub rows_read: usize,
    pub rows_inserted: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub tables: Vec<TableImport>,
}

impl ImportSummary {
    #[must_use]
    pub fn rows_read(&self) -> usize {
        self.tables.iter().map(|t| t.rows_read).sum()
    }

    #[must_use]
    pub fn rows_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_links_first_page() {
        assert_eq!(page_links(0), (0, 1));
    }

    #[test]
    fn test_page_links_later_page() {
        assert_eq!(page_links(1), (0, 2));
        assert_eq!(page_links(7), (6, 8));
    }

    #[test]
    fn test_page_links_prev_never_negative() {
        for page in 0..50 {
            let (prev, next) = page_links(page);
            assert!(prev <= page);
            assert_eq!(next, page + 1);
        }
    }

    #[test]
    fn test_import_summary_totals() {
        let summary = ImportSummary {
            tables: vec![
                TableImport {
                    table: "food_group".to_string(),
                    rows_read: 3,
                    rows_inserted: 2,
                },
                TableImport {
                    table: "food".to_string(),
                    rows_read: 5,
                    rows_inserted: 5,
                },
            ],
        };
        assert_eq!(summary.rows_read(), 8);
        assert_eq!(summary.rows_inserted(), 7);
    }
}
