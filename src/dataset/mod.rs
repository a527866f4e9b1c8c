pub mod export;
pub mod import;

pub use export::{to_json_string, write_csv, write_csv_file};
pub use import::{load_dataset, TIMESTAMP_COLUMN};
