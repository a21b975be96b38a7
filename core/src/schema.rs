//! Table definitions for the USDA nutrient dataset.
//!
//! Each table has its DDL plus a column layout describing how the matching
//! source file maps positionally onto it. Tables are listed in dependency
//! order: a table only references tables that appear before it.

/// How a source field is coerced before it is bound to its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number(Numeric),
    /// Optional foreign key; empty or unparsable text becomes NULL.
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    Integer,
    Float,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Column {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number(Numeric::Integer),
        }
    }

    const fn float(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number(Numeric::Float),
        }
    }

    const fn reference(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Reference,
        }
    }
}

#[derive(Debug)]
pub struct SourceTable {
    pub name: &'static str,
    pub source_file: &'static str,
    pub create_sql: &'static str,
    pub columns: &'static [Column],
}

impl SourceTable {
    /// `INSERT OR IGNORE` over every column, with positional parameters.
    #[must_use]
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let params: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            params.join(", ")
        )
    }
}

pub static FOOD_GROUP: SourceTable = SourceTable {
    name: "food_group",
    source_file: "FD_GROUP.txt",
    create_sql: "CREATE TABLE IF NOT EXISTS food_group (
        id int PRIMARY KEY NOT NULL,
        name text NOT NULL,
        UNIQUE (id)
    )",
    columns: &[Column::int("id"), Column::text("name")],
};

pub static FOOD: SourceTable = SourceTable {
    name: "food",
    source_file: "FOOD_DES.txt",
    create_sql: "CREATE TABLE IF NOT EXISTS food (
        id int PRIMARY KEY NOT NULL,
        food_group_id int REFERENCES food_group(id) NOT NULL,
        long_desc text NOT NULL DEFAULT '',
        short_desc text NOT NULL DEFAULT '',
        common_names text NOT NULL DEFAULT '',
        manufac_name text NOT NULL DEFAULT '',
        survey text NOT NULL DEFAULT '',
        ref_desc text NOT NULL DEFAULT '',
        refuse int NOT NULL,
        sci_name text NOT NULL DEFAULT '',
        nitrogen_factor float NOT NULL,
        protein_factor float NOT NULL,
        fat_factor float NOT NULL,
        calorie_factor float NOT NULL
    )",
    columns: &[
        Column::int("id"),
        Column::int("food_group_id"),
        Column::text("long_desc"),
        Column::text("short_desc"),
        Column::text("common_names"),
        Column::text("manufac_name"),
        Column::text("survey"),
        Column::text("ref_desc"),
        Column::int("refuse"),
        Column::text("sci_name"),
        Column::float("nitrogen_factor"),
        Column::float("protein_factor"),
        Column::float("fat_factor"),
        Column::float("calorie_factor"),
    ],
};

pub static NUTRIENT: SourceTable = SourceTable {
    name: "nutrient",
    source_file: "NUTR_DEF.txt",
    create_sql: "CREATE TABLE IF NOT EXISTS nutrient (
        id int PRIMARY KEY NOT NULL,
        units text NOT NULL DEFAULT '',
        tagname text NOT NULL DEFAULT '',
        name text NOT NULL DEFAULT '',
        num_decimal_places text NOT NULL DEFAULT '',
        sr_order int NOT NULL
    )",
    columns: &[
        Column::int("id"),
        Column::text("units"),
        Column::text("tagname"),
        Column::text("name"),
        Column::text("num_decimal_places"),
        Column::int("sr_order"),
    ],
};

pub static NUTRITION: SourceTable = SourceTable {
    name: "nutrition",
    source_file: "NUT_DATA.txt",
    create_sql: "CREATE TABLE IF NOT EXISTS nutrition (
        food_id int REFERENCES food(id) NOT NULL,
        nutrient_id int REFERENCES nutrient(id) NOT NULL,
        amount float NOT NULL,
        num_data_points int NOT NULL,
        std_error float,
        source_code text NOT NULL DEFAULT '',
        derivation_code text NOT NULL DEFAULT '',
        reference_food_id int REFERENCES food(id),
        added_nutrient_mark text NOT NULL DEFAULT '',
        num_studies int,
        min float,
        max float,
        degrees_freedom int,
        lower_error_bound float,
        upper_error_bound float,
        comments text NOT NULL DEFAULT '',
        modification_date text NOT NULL DEFAULT '',
        confidence_code text NOT NULL DEFAULT '',
        PRIMARY KEY (food_id, nutrient_id)
    )",
    columns: &[
        Column::int("food_id"),
        Column::int("nutrient_id"),
        Column::float("amount"),
        Column::int("num_data_points"),
        Column::float("std_error"),
        Column::text("source_code"),
        Column::text("derivation_code"),
        Column::reference("reference_food_id"),
        Column::text("added_nutrient_mark"),
        Column::int("num_studies"),
        Column::float("min"),
        Column::float("max"),
        Column::int("degrees_freedom"),
        Column::float("lower_error_bound"),
        Column::float("upper_error_bound"),
        Column::text("comments"),
        Column::text("modification_date"),
        Column::text("confidence_code"),
    ],
};

pub static WEIGHT: SourceTable = SourceTable {
    name: "weight",
    source_file: "WEIGHT.txt",
    create_sql: "CREATE TABLE IF NOT EXISTS weight (
        food_id int REFERENCES food(id) NOT NULL,
        sequence_num int NOT NULL,
        amount float NOT NULL,
        description text NOT NULL DEFAULT '',
        gm_weight float NOT NULL,
        num_data_pts int,
        std_dev float,
        PRIMARY KEY (food_id, sequence_num)
    )",
    columns: &[
        Column::int("food_id"),
        Column::int("sequence_num"),
        Column::float("amount"),
        Column::text("description"),
        Column::float("gm_weight"),
        Column::int("num_data_pts"),
        Column::float("std_dev"),
    ],
};

/// All source tables, parents before children.
pub static TABLES: [&SourceTable; 5] = [&FOOD_GROUP, &FOOD, &NUTRIENT, &NUTRITION, &WEIGHT];

/// Indexes backing description and nutrient-name lookups.
pub const INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS food_short_desc_search_index ON food(short_desc)",
    "CREATE INDEX IF NOT EXISTS food_long_desc_search_index ON food(long_desc)",
    "CREATE INDEX IF NOT EXISTS nutrient_name_search_index ON nutrient(name)",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_counts_match_source_files() {
        assert_eq!(FOOD_GROUP.columns.len(), 2);
        assert_eq!(FOOD.columns.len(), 14);
        assert_eq!(NUTRIENT.columns.len(), 6);
        assert_eq!(NUTRITION.columns.len(), 18);
        assert_eq!(WEIGHT.columns.len(), 7);
    }

    #[test]
    fn test_tables_in_dependency_order() {
        let names: Vec<&str> = TABLES.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            ["food_group", "food", "nutrient", "nutrition", "weight"]
        );
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            FOOD_GROUP.insert_sql(),
            "INSERT OR IGNORE INTO food_group (id, name) VALUES (?1, ?2)"
        );
        assert!(NUTRITION.insert_sql().ends_with("?17, ?18)"));
    }

    #[test]
    fn test_every_column_appears_in_ddl() {
        for table in TABLES {
            for column in table.columns {
                assert!(
                    table.create_sql.contains(&format!("\n        {} ", column.name)),
                    "{}.{} missing from DDL",
                    table.name,
                    column.name
                );
            }
        }
    }
}
