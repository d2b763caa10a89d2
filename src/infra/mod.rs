pub mod csv_table_adapter;
pub mod sqlite_store_adapter;

pub use csv_table_adapter::CsvTableAdapter;
pub use sqlite_store_adapter::SqliteDatasetStore;
