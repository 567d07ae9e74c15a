pub mod invoice;
pub mod result;
pub mod review;
pub mod value_record;

pub use invoice::{Invoice, InvoiceLineItem};
pub use result::{
    DocumentMapping, MappingResult, MappingSummary, MatchType, UnmappedDocuments,
    UnmappedInvoice, UnmappedValueRecord,
};
pub use review::{
    AggregatedTotals, MappedLine, MappingDetail, RecordCurrency, ReviewInput, ReviewReport,
    Scenario,
};
pub use value_record::{ValueRecord, ValueRecordLine};
