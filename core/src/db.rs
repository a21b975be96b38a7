use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::models::{
    Food, FoodEdit, FoodGroup, FoodPage, FoodSummary, GroupFood, NutrientFact, PAGE_SIZE,
    TableImport, Weight, page_links,
};
use crate::schema::{INDEXES, SourceTable, TABLES};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `path`, creating the file and schema if absent.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Self::connect(path)?;
        db.create_schema();
        Ok(db)
    }

    /// Open a plain connection without touching the schema.
    pub fn connect(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Ok(Database { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.create_schema();
        Ok(db)
    }

    /// Create every table and index that does not exist yet.
    ///
    /// Statements run one at a time; a failing statement is logged and
    /// skipped. Returns how many statements failed.
    pub fn create_schema(&self) -> usize {
        let statements = TABLES
            .iter()
            .map(|t| (t.name, t.create_sql))
            .chain(INDEXES.iter().map(|sql| ("index", *sql)));

        let mut failures = 0;
        for (name, sql) in statements {
            if let Err(e) = self.conn.execute(sql, []) {
                tracing::warn!(statement = name, error = %e, "schema statement failed");
                failures += 1;
            }
        }
        failures
    }

    // --- Import ---

    /// Insert rows into `table`, skipping rows whose primary key already exists.
    ///
    /// All rows go through one transaction. The first `Err` from `rows` (or
    /// from SQLite) aborts it, leaving the table as it was.
    pub fn insert_or_ignore<I>(&mut self, table: &SourceTable, rows: I) -> Result<TableImport>
    where
        I: IntoIterator<Item = Result<Vec<Value>>>,
    {
        let tx = self.conn.transaction()?;
        let mut rows_read = 0;
        let mut rows_inserted = 0;
        {
            let mut stmt = tx.prepare(&table.insert_sql())?;
            for row in rows {
                let row = row?;
                rows_inserted += stmt
                    .execute(params_from_iter(row))
                    .with_context(|| format!("Failed to insert into {}", table.name))?;
                rows_read += 1;
            }
        }
        tx.commit()
            .with_context(|| format!("Failed to commit {}", table.name))?;

        Ok(TableImport {
            table: table.name.to_string(),
            rows_read,
            rows_inserted,
        })
    }

    // --- Row mapping helpers ---

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            food_group_id: row.get(1)?,
            long_desc: row.get(2)?,
            short_desc: row.get(3)?,
            common_names: row.get(4)?,
            manufac_name: row.get(5)?,
            survey: row.get(6)?,
            ref_desc: row.get(7)?,
            refuse: row.get(8)?,
            sci_name: row.get(9)?,
            nitrogen_factor: row.get(10)?,
            protein_factor: row.get(11)?,
            fat_factor: row.get(12)?,
            calorie_factor: row.get(13)?,
        })
    }

    // Expects columns:
    // 0: f.id, 1: f.short_desc, 2: f.long_desc, 3: f.manufac_name,
    // 4: f.sci_name, 5: fg.name
    fn food_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodSummary> {
        Ok(FoodSummary {
            id: row.get(0)?,
            short_desc: row.get(1)?,
            long_desc: row.get(2)?,
            manufac_name: row.get(3)?,
            sci_name: row.get(4)?,
            group_name: row.get(5)?,
        })
    }

    // --- Food groups ---

    pub fn list_food_groups(&self) -> Result<Vec<FoodGroup>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM food_group ORDER BY rowid")?;
        let groups = stmt
            .query_map([], |row| {
                Ok(FoodGroup {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    pub fn group_id_by_name(&self, name: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT id FROM food_group WHERE name = ?1 ORDER BY rowid LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .with_context(|| format!("No food group named '{name}'"))
    }

    /// Foods belonging to `group_id`, in insertion order.
    pub fn group_foods(&self, group_id: i64) -> Result<Vec<GroupFood>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.short_desc, f.nitrogen_factor, f.protein_factor, f.fat_factor, f.calorie_factor
             FROM food AS f
             INNER JOIN food_group AS fg ON f.food_group_id = fg.id
             WHERE fg.id = ?1
             ORDER BY f.rowid",
        )?;
        let foods = stmt
            .query_map(params![group_id], |row| {
                Ok(GroupFood {
                    short_desc: row.get(0)?,
                    nitrogen_factor: row.get(1)?,
                    protein_factor: row.get(2)?,
                    fat_factor: row.get(3)?,
                    calorie_factor: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    // --- Foods ---

    pub fn find_food(&self, id: i64) -> Result<Option<Food>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, food_group_id, long_desc, short_desc, common_names, manufac_name, survey,
                    ref_desc, refuse, sci_name, nitrogen_factor, protein_factor, fat_factor,
                    calorie_factor
             FROM food WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::food_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// One page of the food listing together with every food group.
    pub fn food_page(&self, page: u32) -> Result<FoodPage> {
        let offset = i64::from(page) * i64::from(PAGE_SIZE);
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.short_desc, f.long_desc, f.manufac_name, f.sci_name, fg.name
             FROM food f
             INNER JOIN food_group fg ON f.food_group_id = fg.id
             ORDER BY f.rowid
             LIMIT ?1 OFFSET ?2",
        )?;
        let foods = stmt
            .query_map(params![PAGE_SIZE, offset], Self::food_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let (prev_page, next_page) = page_links(page);
        Ok(FoodPage {
            current_page: page,
            prev_page,
            next_page,
            foods,
            food_groups: self.list_food_groups()?,
        })
    }

    pub fn search_foods(&self, query: &str) -> Result<Vec<FoodSummary>> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.short_desc, f.long_desc, f.manufac_name, f.sci_name, fg.name
             FROM food f
             INNER JOIN food_group fg ON f.food_group_id = fg.id
             WHERE f.short_desc LIKE ?1 ESCAPE '\\' OR f.long_desc LIKE ?1 ESCAPE '\\'
             ORDER BY f.short_desc
             LIMIT 50",
        )?;
        let foods = stmt
            .query_map(params![pattern], Self::food_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    /// Rewrite a food's descriptive fields and move it to the named group.
    ///
    /// Fails when no group has that name. Returns the number of food rows
    /// changed, which is zero for an unknown food id.
    pub fn update_food(&self, edit: &FoodEdit) -> Result<usize> {
        let group_id = self.group_id_by_name(&edit.group_name)?;
        let rows = self.conn.execute(
            "UPDATE food SET food_group_id = ?1, short_desc = ?2, long_desc = ?3,
                             manufac_name = ?4, sci_name = ?5
             WHERE id = ?6",
            params![
                group_id,
                edit.short_desc,
                edit.long_desc,
                edit.manufac_name,
                edit.sci_name,
                edit.id,
            ],
        )?;
        tracing::debug!(food_id = edit.id, group_id, rows, "food updated");
        Ok(rows)
    }

    // --- Nutrition facts and weights ---

    pub fn food_nutrients(&self, food_id: i64) -> Result<Vec<NutrientFact>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.name, n.units, nu.amount, nu.num_data_points, nu.derivation_code,
                    nu.min, nu.degrees_freedom
             FROM nutrition nu
             INNER JOIN nutrient n ON nu.nutrient_id = n.id
             WHERE nu.food_id = ?1
             ORDER BY n.sr_order, n.id",
        )?;
        let facts = stmt
            .query_map(params![food_id], |row| {
                Ok(NutrientFact {
                    name: row.get(0)?,
                    units: row.get(1)?,
                    amount: row.get(2)?,
                    num_data_points: row.get(3)?,
                    derivation_code: row.get(4)?,
                    min: row.get(5)?,
                    degrees_freedom: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(facts)
    }

    pub fn food_weights(&self, food_id: i64) -> Result<Vec<Weight>> {
        let mut stmt = self.conn.prepare(
            "SELECT food_id, sequence_num, amount, description, gm_weight, num_data_pts, std_dev
             FROM weight
             WHERE food_id = ?1
             ORDER BY sequence_num",
        )?;
        let weights = stmt
            .query_map(params![food_id], |row| {
                Ok(Weight {
                    food_id: row.get(0)?,
                    sequence_num: row.get(1)?,
                    amount: row.get(2)?,
                    description: row.get(3)?,
                    gm_weight: row.get(4)?,
                    num_data_pts: row.get(5)?,
                    std_dev: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(weights)
    }
}
