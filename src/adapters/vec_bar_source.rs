//! In-memory bar source.

use std::collections::VecDeque;

use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::ports::bar_source::BarSource;

/// Replays a prepared list of bars in the order given. Never fails.
#[derive(Debug, Clone, Default)]
pub struct VecBarSource {
    bars: VecDeque<Bar>,
}

impl VecBarSource {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars: bars.into() }
    }

    pub fn remaining(&self) -> usize {
        self.bars.len()
    }
}

impl From<Vec<Bar>> for VecBarSource {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

impl FromIterator<Bar> for VecBarSource {
    fn from_iter<I: IntoIterator<Item = Bar>>(iter: I) -> Self {
        Self {
            bars: iter.into_iter().collect(),
        }
    }
}

impl BarSource for VecBarSource {
    fn next_bar(&mut self) -> Result<Option<Bar>, ReplayError> {
        Ok(self.bars.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_in_order_then_none() {
        let mut source: VecBarSource = (1..=3)
            .map(|t| Bar::flat("X", t, t as f64).unwrap())
            .collect();
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.next_bar().unwrap().unwrap().time(), 1);
        assert_eq!(source.next_bar().unwrap().unwrap().time(), 2);
        assert_eq!(source.next_bar().unwrap().unwrap().time(), 3);
        assert!(source.next_bar().unwrap().is_none());
        assert!(source.next_bar().unwrap().is_none());
    }

    #[test]
    fn empty_source() {
        let mut source = VecBarSource::default();
        assert!(source.next_bar().unwrap().is_none());
    }
}
