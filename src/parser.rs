//! Extract the trade table and labelled summary fields from a backtest report.
//! Input may be pasted text or OCR output, so every pattern is scanned over
//! the whole blob and anything that does not match is skipped.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::profile::ReportProfile;
use crate::types::{InstrumentType, SummaryFields, SummaryKey, SummaryValue, TradeRecord, ValueKind};

// Horizontal whitespace: a row never continues onto the next line.
const HSPACE: &str = r"[^\S\r\n]+";
const HSPACE_OPT: &str = r"[^\S\r\n]*";
// OCR output drops digits on either side of the point: `206.`, `.5`.
const DECIMAL: &str = r"\d*\.?\d+|\d+\.";

fn trade_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // [idx] date type strike premium profit itm
        let pattern = format!(
            r"(?:\d+{h})?(\d{{4}}-\d{{2}}-\d{{2}}){h}(PE|CE){h}(\d+){h}({num}){h}(-?(?:{num})){h}(True|False)\b",
            h = HSPACE,
            num = DECIMAL
        );
        Regex::new(&pattern).expect("trade row pattern is valid")
    })
}

/// All trade rows in `text`, in source order. Rows with a missing token or an
/// impossible date produce nothing.
pub fn parse_trades(text: &str) -> Vec<TradeRecord> {
    trade_row_re()
        .captures_iter(text)
        .filter_map(|c| {
            let expiry = NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok()?;
            Some(TradeRecord {
                expiry,
                instrument_type: InstrumentType::from_token(&c[2])?,
                strike: c[3].parse().ok()?,
                premium: c[4].parse().ok()?,
                profit: c[5].parse().ok()?,
                in_the_money: &c[6] == "True",
            })
        })
        .collect()
}

/// Compiled label patterns for one profile.
pub struct SummaryPatterns {
    patterns: Vec<(SummaryKey, Vec<Regex>)>,
}

impl SummaryPatterns {
    pub fn compile(profile: &ReportProfile) -> Self {
        let patterns = SummaryKey::ALL
            .iter()
            .map(|&key| {
                let res = profile
                    .labels_for(key)
                    .into_iter()
                    .filter_map(|label| label_regex(label, key))
                    .collect();
                (key, res)
            })
            .collect();
        Self { patterns }
    }

    /// First match per key across the whole text; aliases are tried in order.
    pub fn extract(&self, text: &str) -> SummaryFields {
        let mut fields = SummaryFields::default();
        for (key, res) in &self.patterns {
            let found = res
                .iter()
                .find_map(|re| re.captures(text).and_then(|c| capture_value(*key, &c[1])));
            match found {
                Some(v) => fields.insert(*key, v),
                None => debug!("summary field {:?} not found", key),
            }
        }
        fields
    }
}

fn label_regex(label: &str, key: SummaryKey) -> Option<Regex> {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    let starts_word = label
        .chars()
        .next()
        .map(|c| c.is_alphanumeric())
        .unwrap_or(false);
    let boundary = if starts_word { r"\b" } else { "" };
    let suffix = if key.allows_label_suffix() {
        r"[^:\r\n]*"
    } else {
        ""
    };
    let value = match key.kind() {
        ValueKind::Number => r"(?:[₹$€£]|Rs\.?)?[^\S\r\n]*([-+]?\d[\d,]*(?:\.\d+)?)",
        ValueKind::Word => r"(\w+)",
        ValueKind::Line => r"([^\r\n]+)",
    };
    let pattern = format!(
        "{boundary}{label}{suffix}{sp}:{sp}{value}",
        label = words.join(HSPACE),
        sp = HSPACE_OPT,
    );
    Regex::new(&pattern).ok()
}

fn capture_value(key: SummaryKey, raw: &str) -> Option<SummaryValue> {
    match key.kind() {
        ValueKind::Number => raw
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .map(SummaryValue::Number),
        ValueKind::Word | ValueKind::Line => {
            let t = raw.trim();
            (!t.is_empty()).then(|| SummaryValue::Text(t.to_string()))
        }
    }
}

/// Parse a whole report into its trade rows and summary fields.
pub fn parse_report(text: &str, profile: &ReportProfile) -> (Vec<TradeRecord>, SummaryFields) {
    let trades = parse_trades(text);
    let summary = SummaryPatterns::compile(profile).extract(text);
    debug!(
        "parsed {} trade rows and {} summary fields (profile={})",
        trades.len(),
        summary.len(),
        profile.name
    );
    (trades, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../reports/nifty_wheel.txt");

    fn must_parse_one(s: &str) -> TradeRecord {
        let mut trades = parse_trades(s);
        assert_eq!(trades.len(), 1, "expected exactly one row in: {s}");
        trades.remove(0)
    }

    fn summary(s: &str) -> SummaryFields {
        parse_report(s, &ReportProfile::standard()).1
    }

    // ---------- Trade rows ----------

    #[test]
    fn row_with_index() {
        let t = must_parse_one("0 2024-01-25 PE 21600 206.95 13451.75 True");
        assert_eq!(t.expiry, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
        assert_eq!(t.instrument_type, InstrumentType::Put);
        assert_eq!(t.strike, 21600);
        assert_eq!(t.premium, 206.95);
        assert_eq!(t.profit, 13451.75);
        assert!(t.in_the_money);
    }

    #[test]
    fn row_without_index_and_negative_profit() {
        let t = must_parse_one("2024-02-29   CE  22500   88.5   -4210.25   False");
        assert_eq!(t.instrument_type, InstrumentType::Call);
        assert_eq!(t.profit, -4210.25);
        assert!(!t.in_the_money);
    }

    #[test]
    fn bare_decimal_points_accepted() {
        let t = must_parse_one("7 2024-05-30 CE 23000 206. .5 True");
        assert_eq!(t.premium, 206.0);
        assert_eq!(t.profit, 0.5);
        let t = must_parse_one("2024-05-30 PE 23000 .75 -12. False");
        assert_eq!(t.premium, 0.75);
        assert_eq!(t.profit, -12.0);
    }

    #[test]
    fn truncated_row_yields_nothing() {
        let text = "3 2024-03-28 PE 21900 150.10\n4 2024-04-25 CE 22800 95.00 6175.00 False";
        let trades = parse_trades(text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].strike, 22800);
    }

    #[test]
    fn impossible_date_dropped() {
        assert!(parse_trades("1 2024-13-45 PE 21600 206.95 100.0 True").is_empty());
    }

    #[test]
    fn unknown_type_or_flag_dropped() {
        assert!(parse_trades("1 2024-01-25 FUT 21600 206.95 100.0 True").is_empty());
        assert!(parse_trades("1 2024-01-25 PE 21600 206.95 100.0 Maybe").is_empty());
    }

    #[test]
    fn noise_between_rows_does_not_change_rows() {
        let clean = "0 2024-01-25 PE 21600 206.95 13451.75 True\n1 2024-02-29 CE 22500 88.50 5752.50 True\n";
        let noisy = "📈 Trades below!!\n   idx  Expiry  Type\n\n0   2024-01-25\tPE  21600   206.95 13451.75   True   \n\n🚀 ~~ ocr junk ~~ |||\n  1 2024-02-29 CE 22500 88.50 5752.50 True\n-- end --";
        assert_eq!(parse_trades(clean), parse_trades(noisy));
    }

    #[test]
    fn parsing_twice_is_identical() {
        assert_eq!(parse_trades(SAMPLE), parse_trades(SAMPLE));
    }

    #[test]
    fn random_text_has_no_rows() {
        assert!(parse_trades("").is_empty());
        assert!(parse_trades("hello world 2024 PE True").is_empty());
    }

    // ---------- Summary fields ----------

    #[test]
    fn header_fields() {
        let s = summary(SAMPLE);
        assert_eq!(s.text(SummaryKey::Scrip), Some("NIFTY"));
        assert_eq!(s.number(SummaryKey::PeOtmPct), Some(2.0));
        assert_eq!(s.number(SummaryKey::CeOtmPct), Some(3.0));
        assert_eq!(s.number(SummaryKey::LotSize), Some(50.0));
        assert_eq!(
            s.text(SummaryKey::BacktestPeriod),
            Some("2024-01-01 to 2024-06-30")
        );
    }

    #[test]
    fn summary_lines() {
        let s = summary(SAMPLE);
        assert_eq!(s.number(SummaryKey::RealizedProfit), Some(21397.75));
        assert_eq!(s.number(SummaryKey::BondProfit), Some(8400.0));
        assert_eq!(s.number(SummaryKey::EquityMonths), Some(4.0));
        assert_eq!(s.number(SummaryKey::TotalMonths), Some(6.0));
        assert_eq!(s.number(SummaryKey::TotalCapital), Some(1200000.0));
        assert_eq!(s.number(SummaryKey::CurrentStockMtm), Some(-3150.0));
        assert_eq!(s.number(SummaryKey::CurrentSpotPrice), Some(23450.5));
        assert_eq!(s.number(SummaryKey::FinalProfit), Some(26647.75));
        assert_eq!(s.number(SummaryKey::TotalReturnPct), Some(2.22));
    }

    #[test]
    fn final_profit_label_suffix_varies() {
        let s = summary("FINAL PROFIT (Incl. MTM & Bond): 1,25,000.50");
        assert_eq!(s.number(SummaryKey::FinalProfit), Some(125000.5));
        let s = summary("FINAL PROFIT: 10");
        assert_eq!(s.number(SummaryKey::FinalProfit), Some(10.0));
    }

    #[test]
    fn currency_symbol_stripped() {
        let s = summary("TOTAL CAPITAL: ₹ 500000\nBOND PROFIT: $1,200");
        assert_eq!(s.number(SummaryKey::TotalCapital), Some(500000.0));
        assert_eq!(s.number(SummaryKey::BondProfit), Some(1200.0));
    }

    #[test]
    fn option_profit_alias() {
        let s = summary("OPTION PROFIT: 9000");
        assert_eq!(s.number(SummaryKey::RealizedProfit), Some(9000.0));
    }

    #[test]
    fn first_alias_wins() {
        let text = "OPTION PROFIT: 1\nREALIZED PROFIT: 2";
        assert_eq!(summary(text).number(SummaryKey::RealizedProfit), Some(2.0));
        let (_, s) = parse_report(text, &ReportProfile::option_profit());
        assert_eq!(s.number(SummaryKey::RealizedProfit), Some(1.0));
    }

    #[test]
    fn label_inside_longer_word_ignored() {
        let s = summary("UNREALIZED PROFIT: 500");
        assert_eq!(s.number(SummaryKey::RealizedProfit), None);
    }

    #[test]
    fn missing_fields_are_absent() {
        let s = summary("0 2024-01-25 PE 21600 206.95 13451.75 True");
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn non_numeric_value_is_absent() {
        let s = summary("TOTAL MONTHS: n/a");
        assert_eq!(s.number(SummaryKey::TotalMonths), None);
    }
}
