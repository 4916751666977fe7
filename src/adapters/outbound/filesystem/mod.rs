/// Filesystem adapters for file I/O operations
mod csv_writer;
mod inventory_reader;
mod violation_store;

pub use csv_writer::TempCsvWriter;
pub use inventory_reader::InventoryReader;
pub use violation_store::JsonLinesViolationStore;
