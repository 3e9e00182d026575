pub mod black_scholes;
pub mod normal;
pub mod random;
pub mod statistics;
