//! Market data port.

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;

/// A finite, time-ordered sequence of valid bars, consumed once.
///
/// Successive bars have non-decreasing `time`. `Ok(None)` means exhausted;
/// an `Err` is fatal for the run.
pub trait BarSource {
    fn next_bar(&mut self) -> Result<Option<Bar>, ReplayError>;
}

impl<S: BarSource + ?Sized> BarSource for &mut S {
    fn next_bar(&mut self) -> Result<Option<Bar>, ReplayError> {
        (**self).next_bar()
    }
}

impl<S: BarSource + ?Sized> BarSource for Box<S> {
    fn next_bar(&mut self) -> Result<Option<Bar>, ReplayError> {
        (**self).next_bar()
    }
}
