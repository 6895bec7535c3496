//! Fundamentals checklist (F-score).
//!
//! Nine binary checks in three groups. Annual statement lines end with a
//! trailing twelve-month column, so profit-and-loss figures for the latest
//! full year are read one entry from the end. Balance-sheet and cash-flow
//! lines have no such column. A check whose lines are too short, or whose
//! ratio has a zero denominator, scores 0.

use scorecard_core::{CanonicalRecord, SectionKind, TimeSeriesSection, to_float};
use serde::{Deserialize, Serialize};

const NET_PROFIT: &str = "Net Profit +";
const SALES: &str = "Sales +";
const OPM: &str = "OPM %";
const TOTAL_ASSETS: &str = "Total Assets";
const BORROWINGS: &str = "Borrowings +";
const OTHER_ASSETS: &str = "Other Assets +";
const OTHER_LIABILITIES: &str = "Other Liabilities +";
const EQUITY_CAPITAL: &str = "Equity Capital";
const OPERATING_CASH: &str = "Cash from Operating Activity +";

/// Parsed line addressed from its most recent entry.
struct Line(Vec<f64>);

impl Line {
    fn read(section: &TimeSeriesSection, label: &str) -> Self {
        Self(section.line(label).iter().map(|raw| to_float(raw)).collect())
    }

    /// Value `back` entries before the last one (0 is the last).
    fn back(&self, back: usize) -> Option<f64> {
        self.0.len().checked_sub(back + 1).and_then(|i| self.0.get(i).copied())
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn check(passed: Option<bool>) -> u8 {
    u8::from(passed.unwrap_or(false))
}

/// F-score broken into its groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FScore {
    /// Profitability checks, 0 to 4.
    pub profitability: u8,
    /// Leverage and liquidity checks, 0 to 3.
    pub leverage: u8,
    /// Operating efficiency checks, 0 to 2.
    pub efficiency: u8,
}

impl FScore {
    /// Maximum total.
    pub const MAX: u8 = 9;

    /// Computes all checks for a record.
    #[must_use]
    pub fn compute(record: &CanonicalRecord) -> Self {
        let profit_loss = record.section(SectionKind::ProfitLoss);
        let balance_sheet = record.section(SectionKind::BalanceSheet);
        let cash_flows = record.section(SectionKind::CashFlows);

        let net_profit = Line::read(profit_loss, NET_PROFIT);
        let sales = Line::read(profit_loss, SALES);
        let opm = Line::read(profit_loss, OPM);
        let total_assets = Line::read(balance_sheet, TOTAL_ASSETS);
        let borrowings = Line::read(balance_sheet, BORROWINGS);
        let other_assets = Line::read(balance_sheet, OTHER_ASSETS);
        let other_liabilities = Line::read(balance_sheet, OTHER_LIABILITIES);
        let equity = Line::read(balance_sheet, EQUITY_CAPITAL);
        let cash = Line::read(cash_flows, OPERATING_CASH);

        Self {
            profitability: profitability(&net_profit, &total_assets, &cash),
            leverage: leverage(&borrowings, &total_assets, &other_assets, &other_liabilities, &equity),
            efficiency: efficiency(&opm, &sales, &total_assets),
        }
    }

    /// Sum of the three groups.
    #[must_use]
    pub const fn total(&self) -> u8 {
        self.profitability + self.leverage + self.efficiency
    }
}

fn profitability(net_profit: &Line, total_assets: &Line, cash: &Line) -> u8 {
    let roa_latest = ratio(net_profit.back(1), total_assets.back(0));
    let roa_previous = ratio(net_profit.back(2), total_assets.back(1));

    let positive_roa = roa_latest.map(|roa| roa > 0.0);
    let cash_growth = cash.back(0).zip(cash.back(1)).map(|(now, before)| now > before);
    let roa_growth = roa_latest.zip(roa_previous).map(|(now, before)| now > before);
    let accruals = cash.back(0).zip(net_profit.back(1)).map(|(cash, profit)| cash > profit);

    check(positive_roa) + check(cash_growth) + check(roa_growth) + check(accruals)
}

fn leverage(
    borrowings: &Line,
    total_assets: &Line,
    other_assets: &Line,
    other_liabilities: &Line,
    equity: &Line,
) -> u8 {
    let debt_now = ratio(borrowings.back(0), total_assets.back(0));
    let debt_before = ratio(borrowings.back(1), total_assets.back(1));
    let current_now = ratio(other_assets.back(0), other_liabilities.back(0));
    let current_before = ratio(other_assets.back(1), other_liabilities.back(1));

    let debt_not_up = debt_now.zip(debt_before).map(|(now, before)| now <= before);
    let liquidity_up = current_now.zip(current_before).map(|(now, before)| now > before);
    let no_dilution = equity.back(0).zip(equity.back(1)).map(|(now, before)| now <= before);

    check(debt_not_up) + check(liquidity_up) + check(no_dilution)
}

fn efficiency(opm: &Line, sales: &Line, total_assets: &Line) -> u8 {
    let margin_up = opm.back(1).zip(opm.back(2)).map(|(now, before)| now > before);
    let turnover_now = ratio(sales.back(1), total_assets.back(0));
    let turnover_before = ratio(sales.back(2), total_assets.back(1));
    let turnover_up = turnover_now.zip(turnover_before).map(|(now, before)| now > before);

    check(margin_up) + check(turnover_up)
}

/// Computes the F-score total for a record, in `0..=9`.
#[must_use]
pub fn f_score(record: &CanonicalRecord) -> u8 {
    FScore::compute(record).total()
}
