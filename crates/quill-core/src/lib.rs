mod clock;
mod model;

pub use clock::{Clock, FixedClock, SystemClock};
pub use model::*;
