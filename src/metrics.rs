//! Derive the enriched ledger, P&L aggregates and display scalars from parsed
//! report data. Every function here is total: a missing summary field falls
//! back to a documented default and the fallback is recorded.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::holding::HoldingState;
use crate::profile::{AvgMonthlyBasis, ReportProfile, ReturnPolicy};
use crate::types::{LedgerEntry, SummaryFields, SummaryKey, TradeRecord, YearMonth};
use crate::utils::percent;

/// Marker for text metrics the report did not print.
pub const EMPTY_TEXT: &str = "N/A";

/// A metric that was not taken verbatim from the report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Fallback {
    pub metric: &'static str,
    pub used: &'static str,
}

/// Scalars for the summary cards. Every key is always present.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedSummary {
    pub scrip: String,
    pub pe_otm_pct: f64,
    pub ce_otm_pct: f64,
    pub lot_size: u32,
    pub backtest_period: String,
    pub realized_profit: f64,
    pub bond_profit: f64,
    pub equity_months: u32,
    pub total_months: u32,
    pub total_capital: f64,
    pub current_stock_mtm: f64,
    pub current_spot_price: f64,
    pub final_profit: f64,
    pub total_return_pct: f64,
    pub avg_monthly_profit: f64,
    pub avg_monthly_profit_pct: f64,
    pub drawdown_text: String,
    pub trade_count: usize,
    pub assignment_count: usize,
    pub holding_at_end: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Metrics {
    pub ledger: Vec<LedgerEntry>,
    pub monthly: BTreeMap<YearMonth, f64>,
    pub yearly: BTreeMap<i32, f64>,
    pub summary: ResolvedSummary,
    pub fallbacks: Vec<Fallback>,
}

/// Sort by expiry (stable, so same-day rows keep source order), then fold
/// cumulative P&L and holding state in one pass.
pub fn build_ledger(mut trades: Vec<TradeRecord>) -> Vec<LedgerEntry> {
    trades.sort_by_key(|t| t.expiry);
    let mut cumulative = 0.0;
    let mut state = HoldingState::default();
    trades
        .into_iter()
        .map(|trade| {
            cumulative += trade.profit;
            state = state.next(&trade);
            LedgerEntry {
                period: YearMonth::of(trade.expiry),
                cumulative_pnl: cumulative,
                holding_state: state,
                trade,
            }
        })
        .collect()
}

pub fn monthly_pnl(ledger: &[LedgerEntry]) -> BTreeMap<YearMonth, f64> {
    ledger.iter().fold(BTreeMap::new(), |mut acc, e| {
        *acc.entry(e.period).or_insert(0.0) += e.trade.profit;
        acc
    })
}

pub fn yearly_pnl(monthly: &BTreeMap<YearMonth, f64>) -> BTreeMap<i32, f64> {
    monthly.iter().fold(BTreeMap::new(), |mut acc, (period, pnl)| {
        *acc.entry(period.year).or_insert(0.0) += pnl;
        acc
    })
}

fn pct(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator * 100.0)
}

fn whole(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round() as u32
    } else {
        0
    }
}

struct Resolver<'a> {
    fields: &'a SummaryFields,
    fallbacks: Vec<Fallback>,
}

impl Resolver<'_> {
    fn note(&mut self, metric: &'static str, used: &'static str) {
        debug!("metric {} resolved by fallback: {}", metric, used);
        self.fallbacks.push(Fallback { metric, used });
    }

    fn number(&mut self, key: SummaryKey, metric: &'static str) -> f64 {
        match self.fields.number(key) {
            Some(v) => v,
            None => {
                self.note(metric, "0");
                0.0
            }
        }
    }

    fn text(&mut self, key: SummaryKey, metric: &'static str) -> String {
        match self.fields.text(key) {
            Some(v) => v.to_string(),
            None => {
                self.note(metric, EMPTY_TEXT);
                EMPTY_TEXT.to_string()
            }
        }
    }
}

/// Full derivation: ledger, aggregates and resolved scalars.
pub fn derive(trades: Vec<TradeRecord>, fields: &SummaryFields, profile: &ReportProfile) -> Metrics {
    let ledger = build_ledger(trades);
    let monthly = monthly_pnl(&ledger);
    let yearly = yearly_pnl(&monthly);

    let mut r = Resolver {
        fields,
        fallbacks: Vec::new(),
    };

    let scrip = r.text(SummaryKey::Scrip, "scrip");
    let backtest_period = r.text(SummaryKey::BacktestPeriod, "backtest_period");
    let pe_otm = fields.number(SummaryKey::PeOtmPct);
    let pe_otm_pct = r.number(SummaryKey::PeOtmPct, "pe_otm_pct");
    let ce_otm_pct = r.number(SummaryKey::CeOtmPct, "ce_otm_pct");
    let lot_size = whole(r.number(SummaryKey::LotSize, "lot_size"));
    let bond_profit = r.number(SummaryKey::BondProfit, "bond_profit");
    let equity_months = whole(r.number(SummaryKey::EquityMonths, "equity_months"));
    let total_capital = r.number(SummaryKey::TotalCapital, "total_capital");
    let current_stock_mtm = r.number(SummaryKey::CurrentStockMtm, "current_stock_mtm");
    let current_spot_price = r.number(SummaryKey::CurrentSpotPrice, "current_spot_price");
    let final_profit = r.number(SummaryKey::FinalProfit, "final_profit");

    let realized_profit = match fields.number(SummaryKey::RealizedProfit) {
        Some(v) => v,
        None => {
            r.note("realized_profit", "sum of ledger profit");
            ledger.iter().map(|e| e.trade.profit).sum()
        }
    };

    let computed_return = pct(realized_profit, total_capital);
    let printed_return = fields.number(SummaryKey::TotalReturnPct);
    let total_return_pct = match (profile.total_return, printed_return, computed_return) {
        (ReturnPolicy::PreferParsed, Some(v), _) => v,
        // Computing is the policy here, not a fallback.
        (ReturnPolicy::Computed, Some(_), Some(v)) => v,
        (_, None, Some(v)) => {
            r.note("total_return_pct", "realized_profit / total_capital");
            v
        }
        (_, _, None) => {
            r.note("total_return_pct", "0");
            0.0
        }
    };

    // A month count is only usable as a positive whole number; the same value
    // is shown and divided by.
    let total_months = match fields.number(SummaryKey::TotalMonths) {
        Some(m) if m.is_finite() && m >= 1.0 && m.fract() == 0.0 && m <= u32::MAX as f64 => {
            m as u32
        }
        Some(m) => {
            debug!("ignoring total months {}: not a positive whole number", m);
            r.note("total_months", "0");
            0
        }
        None => {
            r.note("total_months", "0");
            0
        }
    };
    let basis = match profile.avg_monthly_basis {
        AvgMonthlyBasis::FinalProfit => final_profit,
        AvgMonthlyBasis::RealizedProfit => realized_profit,
    };
    let avg_monthly_profit = if total_months > 0 {
        basis / f64::from(total_months)
    } else {
        r.note("avg_monthly_profit", "0");
        0.0
    };
    let avg_monthly_profit_pct = match pct(avg_monthly_profit, total_capital) {
        Some(v) => v,
        None => {
            r.note("avg_monthly_profit_pct", "0");
            0.0
        }
    };

    let drawdown_text = format!(
        "Same as {} - {}",
        scrip,
        pe_otm.map(percent).unwrap_or_else(|| format!("{}%", EMPTY_TEXT))
    );

    let summary = ResolvedSummary {
        scrip,
        pe_otm_pct,
        ce_otm_pct,
        lot_size,
        backtest_period,
        realized_profit,
        bond_profit,
        equity_months,
        total_months,
        total_capital,
        current_stock_mtm,
        current_spot_price,
        final_profit,
        total_return_pct,
        avg_monthly_profit,
        avg_monthly_profit_pct,
        drawdown_text,
        trade_count: ledger.len(),
        assignment_count: ledger.iter().filter(|e| e.trade.in_the_money).count(),
        holding_at_end: ledger
            .last()
            .map(|e| e.holding_state.is_holding())
            .unwrap_or(false),
    };

    Metrics {
        ledger,
        monthly,
        yearly,
        summary,
        fallbacks: r.fallbacks,
    }
}
