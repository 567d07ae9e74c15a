pub mod pool;
pub mod queries;
pub mod records;

pub use pool::{create_pool, pool_options};
pub use queries::*;
pub use records::{to_records, MappingRecord, UnmappedRecord};
