//! Core domain types for report trades, the derived ledger and summary fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::holding::HoldingState;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum InstrumentType {
    Put,
    Call,
}

impl InstrumentType {
    /// Map a report token ("PE"/"CE") to the instrument type.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PE" => Some(InstrumentType::Put),
            "CE" => Some(InstrumentType::Call),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            InstrumentType::Put => "PE",
            InstrumentType::Call => "CE",
        }
    }
}

/// One option transaction at contract expiry, as printed in the trade table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeRecord {
    pub expiry: NaiveDate,
    pub instrument_type: InstrumentType,
    pub strike: u64,
    pub premium: f64,
    pub profit: f64,
    pub in_the_money: bool,
}

/// Calendar year-month used to group trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// Serialized as "YYYY-MM" so it can key JSON maps.
impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A trade after chronological sort, carrying its derived fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub trade: TradeRecord,
    pub cumulative_pnl: f64,
    pub holding_state: HoldingState,
    pub period: YearMonth,
}

/// Named summary metrics a report may print.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKey {
    Scrip,
    PeOtmPct,
    CeOtmPct,
    LotSize,
    BacktestPeriod,
    RealizedProfit,
    BondProfit,
    EquityMonths,
    TotalMonths,
    TotalCapital,
    CurrentStockMtm,
    CurrentSpotPrice,
    FinalProfit,
    TotalReturnPct,
}

/// How the value after a summary label is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Signed decimal; currency symbols, `%` and thousands commas are stripped.
    Number,
    /// A single word token (e.g. a ticker).
    Word,
    /// Rest of the line, trimmed.
    Line,
}

impl SummaryKey {
    pub const ALL: [SummaryKey; 14] = [
        SummaryKey::Scrip,
        SummaryKey::PeOtmPct,
        SummaryKey::CeOtmPct,
        SummaryKey::LotSize,
        SummaryKey::BacktestPeriod,
        SummaryKey::RealizedProfit,
        SummaryKey::BondProfit,
        SummaryKey::EquityMonths,
        SummaryKey::TotalMonths,
        SummaryKey::TotalCapital,
        SummaryKey::CurrentStockMtm,
        SummaryKey::CurrentSpotPrice,
        SummaryKey::FinalProfit,
        SummaryKey::TotalReturnPct,
    ];

    pub fn kind(self) -> ValueKind {
        match self {
            SummaryKey::Scrip => ValueKind::Word,
            SummaryKey::BacktestPeriod => ValueKind::Line,
            _ => ValueKind::Number,
        }
    }

    /// Labels tried when a profile does not override them.
    pub fn default_labels(self) -> &'static [&'static str] {
        match self {
            SummaryKey::Scrip => &["Scrip"],
            SummaryKey::PeOtmPct => &["PE OTM %"],
            SummaryKey::CeOtmPct => &["CE OTM %"],
            SummaryKey::LotSize => &["Lot Size"],
            SummaryKey::BacktestPeriod => &["Backtest Period"],
            SummaryKey::RealizedProfit => &["REALIZED PROFIT", "OPTION PROFIT"],
            SummaryKey::BondProfit => &["BOND PROFIT"],
            SummaryKey::EquityMonths => &["EQUITY MONTHS"],
            SummaryKey::TotalMonths => &["TOTAL MONTHS"],
            SummaryKey::TotalCapital => &["TOTAL CAPITAL"],
            SummaryKey::CurrentStockMtm => &["CURRENT STOCK MTM"],
            SummaryKey::CurrentSpotPrice => &["CURRENT SPOT PRICE"],
            SummaryKey::FinalProfit => &["FINAL PROFIT"],
            SummaryKey::TotalReturnPct => &["TOTAL RETURN %"],
        }
    }

    /// Whether free text may sit between the label and its colon,
    /// e.g. `FINAL PROFIT (Incl. MTM & Bond):`.
    pub fn allows_label_suffix(self) -> bool {
        matches!(self, SummaryKey::FinalProfit)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SummaryValue {
    Number(f64),
    Text(String),
}

/// Sparse map of summary metrics found in a report. Absent keys are simply missing.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SummaryFields(BTreeMap<SummaryKey, SummaryValue>);

impl SummaryFields {
    pub fn insert(&mut self, key: SummaryKey, value: SummaryValue) {
        self.0.insert(key, value);
    }

    pub fn number(&self, key: SummaryKey) -> Option<f64> {
        match self.0.get(&key) {
            Some(SummaryValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, key: SummaryKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(SummaryValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
