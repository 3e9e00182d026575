pub mod portfolio;
pub mod var;
