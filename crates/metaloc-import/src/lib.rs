pub mod batch;
pub mod error;
pub mod importer;
pub mod outcome;
pub mod policy;
pub mod reader;
pub mod stats;

pub use batch::{effective_batch_size, partition, MAX_BATCH_SIZE};
pub use error::ImportError;
pub use importer::{classify_response, run_import, run_import_with, ImportOptions, ImportReport};
pub use outcome::{Accepted, BatchOutcome, BatchResult, Failure};
pub use policy::{AccountingPolicy, MissingResults, ShortResults, Tally};
pub use reader::{missing_headers, read_locations, read_locations_from, CsvLoad, SkippedRow, ESSENTIAL_HEADERS};
pub use stats::ImportStats;
