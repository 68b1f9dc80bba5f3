pub mod domain;
pub mod types;
