//! Non-fatal engine events.
//!
//! Each one describes an action the engine refused to execute. None of them
//! mutate the account or stop the run.

use std::fmt;

use crate::domain::strategy::StrategyAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SkippedInsufficientCash,
    SkippedNoPosition,
    InvariantViolation,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::SkippedInsufficientCash => "skipped_insufficient_cash",
            EventKind::SkippedNoPosition => "skipped_no_position",
            EventKind::InvariantViolation => "invariant_violation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// OpenLong could not be sized or paid for.
    SkippedInsufficientCash {
        time: i64,
        price: f64,
        cash: f64,
        quantity: u64,
    },
    /// CloseLong while the account is flat.
    SkippedNoPosition { time: i64 },
    /// The strategy's action contradicts the account state.
    InvariantViolation {
        time: i64,
        action: StrategyAction,
        position: u64,
    },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::SkippedInsufficientCash { .. } => EventKind::SkippedInsufficientCash,
            EngineEvent::SkippedNoPosition { .. } => EventKind::SkippedNoPosition,
            EngineEvent::InvariantViolation { .. } => EventKind::InvariantViolation,
        }
    }

    pub fn time(&self) -> i64 {
        match self {
            EngineEvent::SkippedInsufficientCash { time, .. }
            | EngineEvent::SkippedNoPosition { time }
            | EngineEvent::InvariantViolation { time, .. } => *time,
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::SkippedInsufficientCash {
                time,
                price,
                cash,
                quantity,
            } => write!(
                f,
                "t={time}: open skipped, {quantity} @ {price} exceeds cash {cash}"
            ),
            EngineEvent::SkippedNoPosition { time } => {
                write!(f, "t={time}: close skipped, no open position")
            }
            EngineEvent::InvariantViolation {
                time,
                action,
                position,
            } => write!(
                f,
                "t={time}: {action} rejected with position {position}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_time() {
        let e = EngineEvent::SkippedNoPosition { time: 9 };
        assert_eq!(e.kind(), EventKind::SkippedNoPosition);
        assert_eq!(e.time(), 9);

        let e = EngineEvent::InvariantViolation {
            time: 3,
            action: StrategyAction::OpenLong,
            position: 10,
        };
        assert_eq!(e.kind(), EventKind::InvariantViolation);
        assert_eq!(e.time(), 3);
    }

    #[test]
    fn display() {
        let e = EngineEvent::SkippedInsufficientCash {
            time: 1,
            price: 1000.0,
            cash: 500.0,
            quantity: 0,
        };
        assert_eq!(e.to_string(), "t=1: open skipped, 0 @ 1000 exceeds cash 500");
        assert_eq!(e.kind().to_string(), "skipped_insufficient_cash");

        let e = EngineEvent::InvariantViolation {
            time: 2,
            action: StrategyAction::OpenLong,
            position: 5,
        };
        assert_eq!(e.to_string(), "t=2: open_long rejected with position 5");
    }
}
