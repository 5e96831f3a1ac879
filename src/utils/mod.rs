pub mod fields;
pub mod file;
