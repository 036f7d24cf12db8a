//! Stock-holding state of the wheel, reconstructed from assignment events.

use serde::Serialize;

use crate::types::{InstrumentType, TradeRecord};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub enum HoldingState {
    #[default]
    NotHolding,
    Holding,
}

impl HoldingState {
    /// State after `trade` is processed. A put assigned while flat picks up
    /// the stock; a call assigned while holding gives it away.
    pub fn next(self, trade: &TradeRecord) -> Self {
        match (self, trade.instrument_type, trade.in_the_money) {
            (HoldingState::NotHolding, InstrumentType::Put, true) => HoldingState::Holding,
            (HoldingState::Holding, InstrumentType::Call, true) => HoldingState::NotHolding,
            (state, _, _) => state,
        }
    }

    pub fn is_holding(self) -> bool {
        self == HoldingState::Holding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn holding_states(trades: &[TradeRecord]) -> Vec<HoldingState> {
        trades
            .iter()
            .scan(HoldingState::default(), |state, t| {
                *state = state.next(t);
                Some(*state)
            })
            .collect()
    }

    fn trade(day: u32, instrument_type: InstrumentType, itm: bool) -> TradeRecord {
        TradeRecord {
            expiry: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            instrument_type,
            strike: 100,
            premium: 1.0,
            profit: 10.0,
            in_the_money: itm,
        }
    }

    #[test]
    fn wheel_cycle_put_call_put() {
        use HoldingState::*;
        use InstrumentType::*;
        let trades = vec![
            trade(1, Put, true),
            trade(2, Call, true),
            trade(3, Put, false),
            trade(4, Put, true),
        ];
        assert_eq!(
            holding_states(&trades),
            vec![Holding, NotHolding, NotHolding, Holding]
        );
    }

    #[test]
    fn call_assignment_while_flat_is_ignored() {
        let trades = vec![trade(1, InstrumentType::Call, true)];
        assert_eq!(holding_states(&trades), vec![HoldingState::NotHolding]);
    }

    #[test]
    fn repeated_put_assignment_keeps_holding() {
        let trades = vec![
            trade(1, InstrumentType::Put, true),
            trade(2, InstrumentType::Put, true),
            trade(3, InstrumentType::Call, false),
        ];
        assert!(holding_states(&trades).iter().all(|s| s.is_holding()));
    }

    #[test]
    fn empty_sequence() {
        assert!(holding_states(&[]).is_empty());
    }
}
