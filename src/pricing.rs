//! The pricing engine.
//!
//! [`compute`] turns one [`EstimateInputs`] snapshot into a complete
//! [`Breakdown`]. It is pure and total: bad numbers read as zero, missing
//! catalog entries fall back to documented constants, and nothing is cached
//! between calls.

use crate::inputs::{EstimateInputs, ExpenseInputs, TravelEntry, finite_or_zero};
use crate::money::{ceil_to_quarter, marked_up, round_to_quarter};
use crate::rates::RateCatalog;
use crate::scope::ScopeItem;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// At or below this many SOW hours there is no PM or engineering overhead.
pub const OVERHEAD_THRESHOLD_HOURS: f64 = 8.0;
/// Above this many SOW hours the larger phase ratio applies.
pub const LARGE_PROJECT_HOURS: f64 = 24.0;
pub const LARGE_PROJECT_PHASE_RATIO: f64 = 0.05;
pub const SMALL_PROJECT_PHASE_RATIO: f64 = 0.0375;
pub const PHASE_HOURS_MIN: f64 = 0.5;
pub const PHASE_HOURS_MAX: f64 = 1.0;
/// Share of SOW hours budgeted for coordination, phases included.
pub const COORDINATION_RATIO: f64 = 0.1;

/// Every derived quantity for one set of inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    // Hours
    pub total_sow_hours: f64,
    pub pm_iko: f64,
    pub pm_eko: f64,
    pub pm_coord: f64,
    pub pm_closeout: f64,
    pub pm_3rd: f64,
    pub total_pm_hours: f64,
    pub eng_iko: f64,
    pub eng_eko: f64,
    pub eng_coord: f64,
    pub eng_closeout: f64,
    pub eng_3rd: f64,
    pub eng_add_sync: f64,
    pub eng_day2: f64,
    pub total_eng_hours: f64,
    pub total_hours: f64,

    // Labor
    pub pm_cost: f64,
    pub pm_sell: f64,
    pub sow_cost: f64,
    pub sow_sell: f64,
    pub eng_cost: f64,
    pub eng_sell: f64,
    pub labor_cost_total: f64,
    pub labor_sell_total: f64,
    pub labor_sell_with_risk: f64,

    // Expenses
    pub hotel_cost: f64,
    pub hotel_sell: f64,
    pub per_diem_cost: f64,
    pub per_diem_sell: f64,
    pub travel1_cost: f64,
    pub travel1_sell: f64,
    pub travel2_cost: f64,
    pub travel2_sell: f64,
    pub misc_cost_total: f64,
    pub misc_sell_total: f64,

    // Subcontractors
    pub sub_cost_total: f64,
    pub sub_sell_total: f64,

    // Totals
    pub risk_amount: f64,
    pub fmu: f64,
    pub grand_total: f64,
    pub discount_amount: f64,
    pub final_total: f64,
    pub total_cost: f64,
    pub est_profit: f64,
    pub profit_margin: f64,
}

/// Booked hours, with blank, negative and non-finite entries read as 0.
fn booked_hours(item: &ScopeItem) -> f64 {
    let hours = finite_or_zero(item.hours);
    if hours > 0.0 { hours } else { 0.0 }
}

pub fn total_sow_hours(items: &[ScopeItem]) -> f64 {
    items.iter().map(booked_hours).sum()
}

/// Hours for each of the kickoff (internal and external) and closeout phases.
pub fn phase_hours(total_sow_hours: f64) -> f64 {
    if total_sow_hours <= OVERHEAD_THRESHOLD_HOURS {
        return 0.0;
    }
    let ratio = if total_sow_hours > LARGE_PROJECT_HOURS {
        LARGE_PROJECT_PHASE_RATIO
    } else {
        SMALL_PROJECT_PHASE_RATIO
    };
    round_to_quarter(total_sow_hours * ratio).clamp(PHASE_HOURS_MIN, PHASE_HOURS_MAX)
}

/// Coordination hours left in the 10% budget once the three phases are paid
/// for. Never negative.
pub fn coordination_hours(total_sow_hours: f64, iko: f64, eko: f64, closeout: f64) -> f64 {
    if total_sow_hours <= OVERHEAD_THRESHOLD_HOURS {
        return 0.0;
    }
    let rounded = round_to_quarter(total_sow_hours * COORDINATION_RATIO - iko - eko - closeout);
    if rounded > 0.0 { rounded } else { 0.0 }
}

struct LineTotals {
    cost: f64,
    sell: f64,
}

fn scope_labor(items: &[ScopeItem], catalog: &RateCatalog) -> LineTotals {
    let mut totals = LineTotals {
        cost: 0.0,
        sell: 0.0,
    };
    for item in items {
        let hours = booked_hours(item);
        if hours <= 0.0 {
            continue;
        }
        let Some(rate) = catalog.lookup(item.work_role) else {
            tracing::warn!(
                item = item.id,
                role = %item.work_role,
                "scope item role missing from rate catalog, line skipped"
            );
            continue;
        };
        totals.cost += hours * rate.weighted_cost;
        totals.sell += hours * catalog.sell_rate(item.work_role, item.work_type, 0.0);
    }
    totals
}

fn pass_through(rate: f64, quantity: f64) -> LineTotals {
    let cost = finite_or_zero(rate) * finite_or_zero(quantity);
    LineTotals {
        cost,
        sell: marked_up(cost),
    }
}

fn travel(entry: &TravelEntry, catalog: &RateCatalog) -> LineTotals {
    let trips = finite_or_zero(entry.trips);
    LineTotals {
        cost: catalog.travel_cost(entry.role) * trips,
        sell: catalog.travel_rate(entry.role) * trips,
    }
}

struct ExpenseTotals {
    hotel: LineTotals,
    per_diem: LineTotals,
    travel1: LineTotals,
    travel2: LineTotals,
}

fn expenses(expenses: &ExpenseInputs, catalog: &RateCatalog) -> ExpenseTotals {
    ExpenseTotals {
        hotel: pass_through(expenses.hotel_rate, expenses.hotel_nights),
        per_diem: pass_through(expenses.per_diem_rate, expenses.per_diem_days),
        travel1: travel(&expenses.travel1, catalog),
        travel2: travel(&expenses.travel2, catalog),
    }
}

/// Recomputes the full breakdown for `inputs` against `catalog`.
pub fn compute(inputs: &EstimateInputs, catalog: &RateCatalog) -> Breakdown {
    let project = &inputs.project;
    let overrides = &inputs.overrides;

    let total_sow_hours = total_sow_hours(&inputs.scope_items);

    let pm_iko = phase_hours(total_sow_hours);
    let pm_eko = pm_iko;
    let pm_closeout = pm_iko;
    let pm_coord = coordination_hours(total_sow_hours, pm_iko, pm_eko, pm_closeout);
    let pm_3rd = finite_or_zero(overrides.third_party_coord);
    let total_pm_hours = pm_iko + pm_eko + pm_coord + pm_closeout + pm_3rd;

    let eng_iko = pm_iko;
    let eng_eko = pm_eko;
    let eng_closeout = pm_closeout;
    let eng_coord = coordination_hours(total_sow_hours, pm_iko, pm_eko, pm_closeout);
    // Same override as pm_3rd.
    let eng_3rd = finite_or_zero(overrides.third_party_coord);
    let eng_add_sync = finite_or_zero(overrides.additional_sync);
    let eng_day2 = finite_or_zero(overrides.day2_standby);
    let total_eng_hours =
        eng_iko + eng_eko + eng_coord + eng_closeout + eng_3rd + eng_add_sync + eng_day2;

    let pm_cost = total_pm_hours * catalog.pm_weighted_cost();
    let pm_sell = total_pm_hours * catalog.pm_base_rate();

    let sow = scope_labor(&inputs.scope_items, catalog);

    let eng_cost = total_eng_hours * catalog.overhead_engineer_weighted_cost();
    let eng_sell = total_eng_hours * catalog.overhead_engineer_base_rate();

    let labor_cost_total = pm_cost + sow.cost + eng_cost;
    let labor_sell_total = pm_sell + sow.sell + eng_sell;

    let misc = expenses(&inputs.expenses, catalog);
    let misc_cost_total = misc.hotel.cost + misc.per_diem.cost + misc.travel1.cost + misc.travel2.cost;
    let misc_sell_total = misc.hotel.sell + misc.per_diem.sell + misc.travel1.sell + misc.travel2.sell;

    let sub_cost_total: f64 = inputs
        .subcontractors
        .iter()
        .map(|sub| finite_or_zero(sub.cost))
        .sum();
    let sub_sell_total = marked_up(sub_cost_total);

    // Risk applies to labor only.
    let risk_amount = labor_sell_total * project.risk_factor.multiplier();
    let labor_sell_with_risk = labor_sell_total + risk_amount;

    let fmu = finite_or_zero(project.fair_market_uplift);
    let grand_total =
        ceil_to_quarter(labor_sell_with_risk + misc_sell_total + sub_sell_total + fmu);

    let discount_amount = grand_total * (finite_or_zero(project.discount_rate) / 100.0);
    let final_total = grand_total - discount_amount;

    let total_cost = labor_cost_total + misc_cost_total + sub_cost_total;
    let est_profit = final_total - total_cost;
    let profit_margin = if final_total > 0.0 {
        est_profit / final_total * 100.0
    } else {
        0.0
    };

    let breakdown = Breakdown {
        total_sow_hours,
        pm_iko,
        pm_eko,
        pm_coord,
        pm_closeout,
        pm_3rd,
        total_pm_hours,
        eng_iko,
        eng_eko,
        eng_coord,
        eng_closeout,
        eng_3rd,
        eng_add_sync,
        eng_day2,
        total_eng_hours,
        total_hours: total_sow_hours + total_pm_hours + total_eng_hours,
        pm_cost,
        pm_sell,
        sow_cost: sow.cost,
        sow_sell: sow.sell,
        eng_cost,
        eng_sell,
        labor_cost_total,
        labor_sell_total,
        labor_sell_with_risk,
        hotel_cost: misc.hotel.cost,
        hotel_sell: misc.hotel.sell,
        per_diem_cost: misc.per_diem.cost,
        per_diem_sell: misc.per_diem.sell,
        travel1_cost: misc.travel1.cost,
        travel1_sell: misc.travel1.sell,
        travel2_cost: misc.travel2.cost,
        travel2_sell: misc.travel2.sell,
        misc_cost_total,
        misc_sell_total,
        sub_cost_total,
        sub_sell_total,
        risk_amount,
        fmu,
        grand_total,
        discount_amount,
        final_total,
        total_cost,
        est_profit,
        profit_margin,
    };

    tracing::debug!(
        total_hours = breakdown.total_hours,
        grand_total = breakdown.grand_total,
        final_total = breakdown.final_total,
        "estimate breakdown recomputed"
    );
    breakdown
}

/// One row of the cost summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub section: &'static str,
    pub line: &'static str,
    pub hours: Option<f64>,
    pub cost: Option<f64>,
    pub sell: Option<f64>,
}

impl SummaryLine {
    fn new(
        section: &'static str,
        line: &'static str,
        hours: Option<f64>,
        cost: Option<f64>,
        sell: Option<f64>,
    ) -> Self {
        Self {
            section,
            line,
            hours,
            cost,
            sell,
        }
    }
}

impl Breakdown {
    /// Cost summary in display order: labor, expenses, subcontractors,
    /// totals. The discount row only appears when a discount applies.
    pub fn summary_lines(&self) -> Vec<SummaryLine> {
        let mut lines = vec![
            SummaryLine::new("Labor", "Project Management", Some(self.total_pm_hours), Some(self.pm_cost), Some(self.pm_sell)),
            SummaryLine::new("Labor", "Scope of Work", Some(self.total_sow_hours), Some(self.sow_cost), Some(self.sow_sell)),
            SummaryLine::new("Labor", "Engineering Overhead", Some(self.total_eng_hours), Some(self.eng_cost), Some(self.eng_sell)),
            SummaryLine::new("Labor", "Risk Buffer", None, None, Some(self.risk_amount)),
            SummaryLine::new("Labor", "Labor Total (with risk)", Some(self.total_hours), Some(self.labor_cost_total), Some(self.labor_sell_with_risk)),
            SummaryLine::new("Expenses", "Hotel", None, Some(self.hotel_cost), Some(self.hotel_sell)),
            SummaryLine::new("Expenses", "Per Diem", None, Some(self.per_diem_cost), Some(self.per_diem_sell)),
            SummaryLine::new("Expenses", "Travel 1", None, Some(self.travel1_cost), Some(self.travel1_sell)),
            SummaryLine::new("Expenses", "Travel 2", None, Some(self.travel2_cost), Some(self.travel2_sell)),
            SummaryLine::new("Expenses", "Expenses Total", None, Some(self.misc_cost_total), Some(self.misc_sell_total)),
            SummaryLine::new("Subcontractors", "Subcontractors Total", None, Some(self.sub_cost_total), Some(self.sub_sell_total)),
            SummaryLine::new("Totals", "Fair Market Uplift", None, None, Some(self.fmu)),
            SummaryLine::new("Totals", "Grand Total", None, None, Some(self.grand_total)),
        ];
        if self.discount_amount > 0.0 {
            lines.push(SummaryLine::new("Totals", "Discount", None, None, Some(-self.discount_amount)));
        }
        lines.push(SummaryLine::new("Totals", "Final Total", None, Some(self.total_cost), Some(self.final_total)));
        lines.push(SummaryLine::new("Totals", "Estimated Profit", None, None, Some(self.est_profit)));
        lines
    }

    /// Summary lines as a table with `section`, `line`, `hours`, `cost` and
    /// `sell` columns. Blank cells are nulls.
    pub fn summary_dataframe(&self) -> PolarsResult<DataFrame> {
        let lines = self.summary_lines();
        let sections: Vec<&str> = lines.iter().map(|l| l.section).collect();
        let labels: Vec<&str> = lines.iter().map(|l| l.line).collect();
        let hours: Vec<Option<f64>> = lines.iter().map(|l| l.hours).collect();
        let cost: Vec<Option<f64>> = lines.iter().map(|l| l.cost).collect();
        let sell: Vec<Option<f64>> = lines.iter().map(|l| l.sell).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("section"), sections).into_column(),
            Series::new(PlSmallStr::from_static("line"), labels).into_column(),
            Series::new(PlSmallStr::from_static("hours"), hours).into_column(),
            Series::new(PlSmallStr::from_static("cost"), cost).into_column(),
            Series::new(PlSmallStr::from_static("sell"), sell).into_column(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_hours_follow_tiers() {
        assert_eq!(phase_hours(0.0), 0.0);
        assert_eq!(phase_hours(8.0), 0.0);
        assert_eq!(phase_hours(9.0), 0.5);
        assert_eq!(phase_hours(20.0), 0.75);
        assert_eq!(phase_hours(24.0), 1.0);
        assert_eq!(phase_hours(100.0), 1.0);
    }

    #[test]
    fn coordination_never_goes_negative() {
        assert_eq!(coordination_hours(10.0, 0.5, 0.5, 0.5), 0.0);
        assert_eq!(coordination_hours(40.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(coordination_hours(100.0, 1.0, 1.0, 1.0), 7.0);
        assert_eq!(coordination_hours(8.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn blank_inputs_only_carry_the_uplift() {
        let inputs = EstimateInputs::default();
        let breakdown = compute(&inputs, &RateCatalog::builtin());
        assert_eq!(breakdown.total_hours, 0.0);
        assert_eq!(breakdown.labor_sell_total, 0.0);
        assert_eq!(breakdown.grand_total, inputs.project.fair_market_uplift);
        assert_eq!(breakdown.total_cost, 0.0);
    }

    #[test]
    fn summary_omits_discount_row_without_discount() {
        let breakdown = Breakdown {
            grand_total: 100.0,
            final_total: 100.0,
            ..Breakdown::default()
        };
        assert!(breakdown.summary_lines().iter().all(|l| l.line != "Discount"));

        let discounted = Breakdown {
            discount_amount: 10.0,
            ..breakdown
        };
        assert!(discounted.summary_lines().iter().any(|l| l.line == "Discount"));
        let df = discounted.summary_dataframe().unwrap();
        assert_eq!(df.height(), discounted.summary_lines().len());
        assert_eq!(df.get_column_names().len(), 5);
    }
}
