//! Capital-expenditure ratio engine
//!
//! Joins quarterly cash-flow and income statements per company, normalizes
//! capex to its positive magnitude (providers report outflows negative),
//! and derives capex/revenue ratios plus quarter-over-quarter growth.
//! The aggregate trend is a majority vote over each company's latest QoQ
//! direction.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CashFlowQuarter, IncomeQuarter};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CapexParams {
    /// Max quarters retained per company, newest kept
    pub max_quarters: usize,
}

impl Default for CapexParams {
    fn default() -> Self {
        Self { max_quarters: 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapexTrend {
    Increasing,
    Decreasing,
    Mixed,
}

/// One joined quarter for a single company, oldest first in the series.
#[derive(Debug, Clone, Serialize)]
pub struct CapexQuarter {
    pub date: NaiveDate,
    pub period: String,
    pub calendar_year: String,
    /// Positive magnitude regardless of source sign convention
    pub capex: f64,
    pub revenue: f64,
    /// capex / revenue
    pub ratio: f64,
    /// (capexₜ − capexₜ₋₁) / capexₜ₋₁; None for the first quarter or when
    /// the prior quarter's capex is zero
    pub qoq_growth: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyCapex {
    pub symbol: String,
    pub quarters: Vec<CapexQuarter>,
    pub latest_ratio: Option<f64>,
    pub latest_qoq_growth: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapexReport {
    pub companies: Vec<CompanyCapex>,
    pub aggregate_trend: CapexTrend,
    pub last_updated: DateTime<Utc>,
}

/// Build one company's joined quarterly series.
///
/// Cash-flow and income rows are matched on statement date; rows without a
/// counterpart or with zero revenue are skipped. Output is ascending by date.
pub fn company_series(
    symbol: &str,
    cash_flow: &[CashFlowQuarter],
    income: &[IncomeQuarter],
    params: &CapexParams,
) -> CompanyCapex {
    let revenue_by_date: HashMap<NaiveDate, f64> =
        income.iter().map(|q| (q.date, q.revenue)).collect();

    let mut quarters: Vec<CapexQuarter> = cash_flow
        .iter()
        .filter_map(|cf| {
            let revenue = *revenue_by_date.get(&cf.date)?;
            if revenue == 0.0 {
                debug!(symbol, date = %cf.date, "zero revenue, quarter skipped");
                return None;
            }
            let capex = cf.capital_expenditure.abs();
            Some(CapexQuarter {
                date: cf.date,
                period: cf.period.clone(),
                calendar_year: cf.calendar_year.clone(),
                capex,
                revenue,
                ratio: capex / revenue,
                qoq_growth: None,
            })
        })
        .collect();

    quarters.sort_by_key(|q| q.date);
    if quarters.len() > params.max_quarters {
        let excess = quarters.len() - params.max_quarters;
        quarters.drain(..excess);
    }

    for i in 1..quarters.len() {
        let prior = quarters[i - 1].capex;
        quarters[i].qoq_growth = if prior != 0.0 {
            Some((quarters[i].capex - prior) / prior)
        } else {
            None
        };
    }

    let latest = quarters.last();
    CompanyCapex {
        symbol: symbol.to_string(),
        latest_ratio: latest.map(|q| q.ratio),
        latest_qoq_growth: latest.and_then(|q| q.qoq_growth),
        quarters,
    }
}

/// Majority vote over each company's latest QoQ direction. Companies without
/// a valid latest growth figure abstain; no strict majority yields `Mixed`.
fn aggregate_trend(companies: &[CompanyCapex]) -> CapexTrend {
    let mut increasing = 0usize;
    let mut decreasing = 0usize;
    for company in companies {
        match company.latest_qoq_growth {
            Some(g) if g > 0.0 => increasing += 1,
            Some(g) if g < 0.0 => decreasing += 1,
            _ => {}
        }
    }
    if increasing > decreasing {
        CapexTrend::Increasing
    } else if decreasing > increasing {
        CapexTrend::Decreasing
    } else {
        CapexTrend::Mixed
    }
}

/// Assemble the cross-company report. Input order is preserved.
pub fn build_report(companies: Vec<CompanyCapex>, as_of: DateTime<Utc>) -> CapexReport {
    let trend = aggregate_trend(&companies);
    info!(
        companies = companies.len(),
        trend = ?trend,
        "capex report assembled"
    );
    CapexReport {
        companies,
        aggregate_trend: trend,
        last_updated: as_of,
    }
}
