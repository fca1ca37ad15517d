pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use application::{QuantReportUseCase, ReviewAnalysisUseCase, RunSummary};
pub use domain::error::{AppError, Result};
