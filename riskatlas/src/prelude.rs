pub use crate::{
    data::{priceseries::*, pricesource::*, returns::*},
    math::{black_scholes::*, normal::*, random::*, statistics::*},
    models::{
        gbm::*, montecarlo::*, ornsteinuhlenbeck::*, parameters::*, path::*, traits::*,
        vasicek::*, wiener::*,
    },
    pricing::{bonds::*, options::*},
    risk::{portfolio::*, var::*},
    utils::{cancel::*, config::*, errors::*},
};
