mod limits;

pub use limits::{LimitOverrides, Limits, LimitsError};
