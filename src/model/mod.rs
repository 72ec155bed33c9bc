pub mod point;
pub mod series;

pub use point::{DataPoint, PointStreamError, PointValue};
pub use series::{DataPoints, ResultGroup, Series, SeriesGroup, SeriesId};
