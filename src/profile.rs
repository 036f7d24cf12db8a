//! Report profiles: which labels a report family prints and which
//! formulas apply when a summary metric has to be derived.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::SummaryKey;

/// Source of `total_return_pct`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReturnPolicy {
    /// Use the printed `TOTAL RETURN %`; compute only when it is absent.
    #[default]
    PreferParsed,
    /// Always `realized_profit / total_capital * 100`.
    Computed,
}

/// Numerator of `avg_monthly_profit`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvgMonthlyBasis {
    #[default]
    FinalProfit,
    RealizedProfit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportProfile {
    pub name: String,
    /// Label aliases per key, tried in order. Keys not listed use the defaults.
    #[serde(default)]
    pub labels: HashMap<SummaryKey, Vec<String>>,
    #[serde(default)]
    pub total_return: ReturnPolicy,
    #[serde(default)]
    pub avg_monthly_basis: AvgMonthlyBasis,
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReportProfile {
    pub const STANDARD: &'static str = "standard";
    pub const OPTION_PROFIT: &'static str = "option-profit";

    pub fn standard() -> Self {
        Self {
            name: Self::STANDARD.to_string(),
            labels: HashMap::new(),
            total_return: ReturnPolicy::PreferParsed,
            avg_monthly_basis: AvgMonthlyBasis::FinalProfit,
        }
    }

    /// Reports that print `OPTION PROFIT` and no usable return figure.
    pub fn option_profit() -> Self {
        let mut labels = HashMap::new();
        labels.insert(
            SummaryKey::RealizedProfit,
            vec!["OPTION PROFIT".to_string(), "REALIZED PROFIT".to_string()],
        );
        Self {
            name: Self::OPTION_PROFIT.to_string(),
            labels,
            total_return: ReturnPolicy::Computed,
            avg_monthly_basis: AvgMonthlyBasis::FinalProfit,
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            Self::STANDARD => Some(Self::standard()),
            Self::OPTION_PROFIT => Some(Self::option_profit()),
            _ => None,
        }
    }

    pub fn labels_for(&self, key: SummaryKey) -> Vec<&str> {
        match self.labels.get(&key) {
            Some(custom) if !custom.is_empty() => custom.iter().map(String::as_str).collect(),
            _ => key.default_labels().to_vec(),
        }
    }
}
