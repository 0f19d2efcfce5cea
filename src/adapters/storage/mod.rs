pub mod csv_file;
pub mod memory;

pub use csv_file::CsvFileStore;
pub use memory::InMemoryStore;
