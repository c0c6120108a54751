//! Track the current value of a gauge together with its minimum and maximum
//! over a trailing time window, in constant memory.

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{Error, Result};
pub use crate::number::Number;
pub use crate::peak::{Peak, PeakValue, MIN_PERIOD};

mod clock;
mod error;
mod number;
mod peak;
