pub mod wdbc;

pub use wdbc::{read_wdbc_csv, read_wdbc_csv_with_config, CsvReaderConfig};
