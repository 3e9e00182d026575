pub mod bonds;
pub mod options;
