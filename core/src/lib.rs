pub mod db;
pub mod models;
pub mod schema;
pub mod sr_import;
