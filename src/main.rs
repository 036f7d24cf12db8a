//! Entry point. Wires report store -> session -> parser -> metrics -> output.

mod config;
mod error;
mod holding;
mod metrics;
mod parser;
mod profile;
mod report;
mod source;
mod state;
mod types;
mod utils;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, DisplayCfg};
use crate::error::ReportError;
use crate::report::Analysis;
use crate::source::{DirSource, MemorySource, ReportSource};
use crate::state::Session;
use crate::utils::{money, percent};

#[derive(Parser, Debug)]
#[command(name = "wheel-report")]
#[command(about = "Parse option wheel backtest reports and derive performance metrics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: $WHEEL_REPORT_CONFIG or ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report profile (overrides config)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Print the analysis as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Use the reports bundled with the binary instead of the report directory
    #[arg(long, global = true)]
    bundled: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored reports
    List,
    /// Analyze a stored report by name
    Show { name: String },
    /// Analyze a file, or stdin when no file is given
    Parse { file: Option<PathBuf> },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("WHEEL_REPORT_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let cfg = AppConfig::load_or_default(&cfg_path)
        .with_context(|| format!("load config {}", cfg_path.display()))?;
    let profile_name = cli.profile.clone().unwrap_or_else(|| cfg.profile.clone());
    let profile = cfg.resolve_profile(&profile_name)?;

    let source: Box<dyn ReportSource> = if cli.bundled {
        Box::new(MemorySource::bundled())
    } else {
        let dir = DirSource::new(cfg.reports_dir(), cfg.extension());
        info!("report dir: {}", dir.dir().display());
        Box::new(dir)
    };

    let mut session = Session::default();
    match cli.command {
        Command::List => {
            let mut out = io::stdout().lock();
            for name in source.list_names() {
                writeln!(out, "{}", name)?;
            }
            return Ok(());
        }
        Command::Show { name } => session.select(source.as_ref(), &name)?,
        Command::Parse { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf).context("read stdin")?;
                    buf
                }
            };
            session.paste(text);
        }
    }

    info!(
        "analyzing {} bytes with profile {}",
        session.raw_text().len(),
        profile.name
    );
    let analysis = match session.analyze(&profile) {
        Ok(a) => a,
        Err(ReportError::NoData) => {
            eprintln!("{}", ReportError::NoData);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &analysis).context("write json")?;
        writeln!(out)?;
    } else {
        print_analysis(&mut out, &analysis, &cfg.display)?;
    }
    Ok(())
}

/// `RUST_LOG` when set and valid, otherwise `info`.
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn print_analysis(out: &mut impl Write, a: &Analysis, display: &DisplayCfg) -> io::Result<()> {
    let s = &a.metrics.summary;
    let cur = display.currency_symbol.as_str();

    writeln!(out, "Strategy Details")?;
    writeln!(out, "  {:<24}{}", "Scrip", s.scrip)?;
    writeln!(out, "  {:<24}{}%", "PE OTM %", s.pe_otm_pct)?;
    writeln!(out, "  {:<24}{}%", "CE OTM %", s.ce_otm_pct)?;
    writeln!(out, "  {:<24}{}", "Lot Size", s.lot_size)?;
    writeln!(out, "  {:<24}{}", "Backtest Period", s.backtest_period)?;
    writeln!(out)?;

    writeln!(out, "Performance Summary")?;
    let rows = [
        ("Realised Profit", money(cur, s.realized_profit)),
        ("Bond Profit", money(cur, s.bond_profit)),
        ("Equity Holding Months", s.equity_months.to_string()),
        ("Current Stock MTM", money(cur, s.current_stock_mtm)),
        ("Current Spot Price", money(cur, s.current_spot_price)),
        ("Total Return", percent(s.total_return_pct)),
        ("Total Capital", money(cur, s.total_capital)),
        ("Final Profit", money(cur, s.final_profit)),
        ("Avg Monthly Profit", money(cur, s.avg_monthly_profit)),
        ("Avg Monthly Profit %", percent(s.avg_monthly_profit_pct)),
        ("Drawdown", s.drawdown_text.clone()),
        ("Trades / Assigned", format!("{} / {}", s.trade_count, s.assignment_count)),
        ("Holding Stock Now", if s.holding_at_end { "yes" } else { "no" }.to_string()),
    ];
    for (title, value) in rows {
        writeln!(out, "  {:<24}{}", title, value)?;
    }
    writeln!(out)?;

    writeln!(out, "Yearly P&L")?;
    for (year, pnl) in &a.metrics.yearly {
        writeln!(out, "  {:<10}{:>16}", year, money(cur, *pnl))?;
    }
    writeln!(out)?;

    writeln!(out, "Monthly P&L")?;
    for (period, pnl) in &a.metrics.monthly {
        writeln!(out, "  {:<10}{:>16}", period.to_string(), money(cur, *pnl))?;
    }
    writeln!(out)?;

    writeln!(out, "Trade Log")?;
    writeln!(
        out,
        "  {:<12}{:<6}{:>8}{:>10}{:>12}{:>7}{:>14}  Holding",
        "Expiry", "Type", "Strike", "Premium", "Profit", "ITM", "Cum P&L"
    )?;
    for e in &a.metrics.ledger {
        let t = &e.trade;
        writeln!(
            out,
            "  {:<12}{:<6}{:>8}{:>10.2}{:>12.2}{:>7}{:>14.2}  {}",
            t.expiry.to_string(),
            t.instrument_type.token(),
            t.strike,
            t.premium,
            t.profit,
            t.in_the_money,
            e.cumulative_pnl,
            if e.holding_state.is_holding() { "yes" } else { "no" }
        )?;
    }

    if !a.metrics.fallbacks.is_empty() {
        writeln!(out)?;
        writeln!(out, "Fallbacks")?;
        for f in &a.metrics.fallbacks {
            writeln!(out, "  {:<24}{}", f.metric, f.used)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ReportProfile;

    #[test]
    fn text_output_contains_cards_and_rows() {
        let a = report::analyze(
            include_str!("../reports/nifty_wheel.txt"),
            &ReportProfile::standard(),
        )
        .unwrap();
        let mut buf = Vec::new();
        print_analysis(&mut buf, &a, &DisplayCfg::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Realised Profit         ₹21,398"));
        assert!(text.contains("Drawdown                Same as NIFTY - 2.00%"));
        assert!(text.contains("2024-03"));
        assert!(!text.contains("Fallbacks"));
    }

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(log_filter(Some("debug".into())).to_string(), "debug");
        assert_eq!(log_filter(None).to_string(), "info");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["wheel-report", "--json", "show", "nifty_wheel.txt"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Show { ref name } if name == "nifty_wheel.txt"));
        let cli = Cli::try_parse_from(["wheel-report", "parse", "--profile", "option-profit"]).unwrap();
        assert_eq!(cli.profile.as_deref(), Some("option-profit"));
    }
}
