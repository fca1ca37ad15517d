pub mod use_cases;

pub use use_cases::quant_report::QuantReportUseCase;
pub use use_cases::review_analysis::{ReviewAnalysisUseCase, RunSummary};
pub use use_cases::review_tagging::{LlmReviewClassifier, ReviewClassifier};
