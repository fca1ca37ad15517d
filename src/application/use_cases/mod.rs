pub mod column_resolver;
pub mod dimension_aggregator;
pub mod quant_report;
pub mod report_renderer;
pub mod review_analysis;
pub mod review_tagging;
pub mod tag_validator;
pub mod word_frequency;
