//! Raw text in, metrics out.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::metrics::{derive, Metrics};
use crate::parser::parse_report;
use crate::profile::ReportProfile;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analysis {
    pub profile: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// One complete parse-and-derive pass. An empty trade table is the only
/// outcome that stops the pipeline.
pub fn analyze(raw_text: &str, profile: &ReportProfile) -> Result<Analysis, ReportError> {
    let (trades, fields) = parse_report(raw_text, profile);
    if trades.is_empty() {
        warn!("no trade rows found in {} bytes of input", raw_text.len());
        return Err(ReportError::NoData);
    }
    let metrics = derive(trades, &fields, profile);
    info!(
        "analyzed {} trades, {} months, {} fallbacks",
        metrics.ledger.len(),
        metrics.monthly.len(),
        metrics.fallbacks.len()
    );
    Ok(Analysis {
        profile: profile.name.clone(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_no_data() {
        let p = ReportProfile::standard();
        assert!(matches!(analyze("", &p), Err(ReportError::NoData)));
        assert!(matches!(
            analyze("REALIZED PROFIT: 100\nTOTAL MONTHS: 3", &p),
            Err(ReportError::NoData)
        ));
    }

    #[test]
    fn one_row_analysis() {
        let a = analyze(
            "0 2024-01-25 PE 21600 206.95 13451.75 True",
            &ReportProfile::standard(),
        )
        .expect("one trade");
        assert_eq!(a.profile, "standard");
        assert_eq!(a.metrics.summary.realized_profit, 13451.75);
    }

    #[test]
    fn serializes_to_flat_json() {
        let a = analyze(
            include_str!("../reports/nifty_wheel.txt"),
            &ReportProfile::standard(),
        )
        .unwrap();
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["profile"], "standard");
        assert_eq!(v["ledger"][0]["expiry"], "2024-01-25");
        assert_eq!(v["ledger"][0]["instrument_type"], "Put");
        assert_eq!(v["ledger"][0]["period"], "2024-01");
        assert_eq!(v["ledger"][0]["holding_state"], "Holding");
        assert_eq!(v["monthly"]["2024-03"], -9756.5);
        assert_eq!(v["yearly"]["2024"], 21397.75);
        assert_eq!(v["summary"]["scrip"], "NIFTY");
    }
}
