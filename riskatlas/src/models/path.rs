use serde::Serialize;

/// # Path
/// Time-indexed realisation `(t_0, x_0), ..., (t_N, x_N)` of a stochastic process.
/// Built once by a generator and read-only afterwards.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Path {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl Path {
    pub(crate) fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        debug_assert!(!values.is_empty());
        Self { times, values }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn initial(&self) -> f64 {
        self.values[0]
    }

    pub fn terminal(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}
