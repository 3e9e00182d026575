pub mod data;
pub mod math;
pub mod models;
pub mod prelude;
pub mod pricing;
pub mod risk;
pub mod utils;
