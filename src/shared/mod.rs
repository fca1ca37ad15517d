pub mod text_budget;
