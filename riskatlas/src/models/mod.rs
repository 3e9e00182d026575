pub mod gbm;
pub mod montecarlo;
pub mod ornsteinuhlenbeck;
pub mod parameters;
pub mod path;
pub mod traits;
pub mod vasicek;
pub mod wiener;
