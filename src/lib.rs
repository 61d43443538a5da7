pub mod analyze;
pub mod category_selector;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod scanner;
pub mod template;
