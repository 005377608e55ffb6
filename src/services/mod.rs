pub mod sheet_store;

pub use sheet_store::{SheetDbClient, SheetStore, UpdateOutcome, UpdateStatus};
