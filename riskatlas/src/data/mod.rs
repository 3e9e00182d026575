pub mod priceseries;
pub mod pricesource;
pub mod returns;
