pub mod aggregate;
pub mod document_matcher;
pub mod pipeline;
pub mod review;
pub mod similarity;

pub use aggregate::{aggregate, aggregate_with_policy, first_line_currency};
pub use document_matcher::{map_documents, DocumentMatcher};
pub use pipeline::{DocumentExtractor, DocumentKind, ExtractionJob, ExtractionPipeline, PageRange, SourceDocument};
pub use review::{classify_scenario, collect_mapped_lines, mapping_details, review};
pub use similarity::{
    normalize_identifier, similarity, FnSimilarity, LevenshteinSimilarity, MatchThresholds,
    PositionalSimilarity, SimilarityKind, SimilarityStrategy,
};
