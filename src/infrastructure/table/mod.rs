pub mod annotated_writer;
pub mod review_column;
pub mod table_reader;

pub use annotated_writer::AnnotatedWriter;
pub use review_column::{ColumnDetection, ReviewColumn, ReviewColumnDetector};
pub use table_reader::{decode_text, detect_delimiter, TableReader};
