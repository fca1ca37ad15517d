pub mod analysis;
pub mod app_config;
pub mod column_roles;
pub mod error;
pub mod llm_config;
pub mod taxonomy;

// Review table module
pub mod table;
