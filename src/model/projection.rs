// src/model/projection.rs
//
// The two statement layouts are pure projections of the same MonthlyModel
// record. Rendering code only ever sees these rows, so the layouts cannot
// drift apart.

use std::collections::{BTreeMap, BTreeSet};

use super::MonthlyModel;

/// Schedule III (indirect method) cash-flow row for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectRow {
    pub month: String,
    pub operating_profit_bwc: f64,
    /// Increase in receivables, shown as an outflow.
    pub receivables_delta: f64,
    /// Increase in payables, shown as an inflow.
    pub payables_delta: f64,
    pub cash_from_operations: f64,
    pub taxes_paid: f64,
    pub is_tax_quarter: bool,
    pub net_cash_operating: f64,
    pub net_cash_investing: f64,
    pub net_cash_financing: f64,
    pub net_cash_flow: f64,
    pub ending_cash: f64,
}

/// Management (direct method) cash-flow row for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectRow<'a> {
    pub month: &'a str,
    pub revenue: f64,
    pub cogs: f64,
    pub payroll: f64,
    pub opex_total: f64,
    pub line_items: &'a BTreeMap<String, f64>,
    pub debt_service: f64,
    pub capex: f64,
    pub net_cash_flow: f64,
    pub ending_cash: f64,
}

impl MonthlyModel {
    pub fn indirect_row(&self) -> IndirectRow {
        IndirectRow {
            month: self.month.clone(),
            operating_profit_bwc: self.operating_profit_bwc,
            receivables_delta: -self.delta_ar,
            payables_delta: self.delta_ap,
            cash_from_operations: self.cash_from_operations,
            taxes_paid: self.tax_liability,
            is_tax_quarter: self.is_tax_quarter,
            net_cash_operating: self.net_cash_operating,
            net_cash_investing: self.net_cash_investing,
            net_cash_financing: self.net_cash_financing,
            net_cash_flow: self.net_cash_flow,
            ending_cash: self.ending_cash,
        }
    }

    pub fn direct_row(&self) -> DirectRow<'_> {
        DirectRow {
            month: &self.month,
            revenue: self.revenue,
            cogs: self.cogs,
            payroll: self.payroll,
            opex_total: self.opex,
            line_items: &self.line_items,
            debt_service: self.debt,
            capex: self.capex,
            net_cash_flow: self.net_cash_flow,
            ending_cash: self.ending_cash,
        }
    }
}

/// Sorted union of opex line-item names across all forecast months. These
/// become the expandable rows under "Total Operating Expenses".
pub fn opex_line_names(months: &[MonthlyModel]) -> Vec<String> {
    let names: BTreeSet<&str> = months
        .iter()
        .flat_map(|m| m.line_items.keys().map(String::as_str))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_month() -> MonthlyModel {
        MonthlyModel {
            month: "Apr".to_string(),
            revenue: 100_000.0,
            cogs: 40_000.0,
            opex: 20_000.0,
            payroll: 10_000.0,
            capex: 5_000.0,
            debt: 3_000.0,
            ebitda: 30_000.0,
            net_profit: 22_000.0,
            line_items: BTreeMap::from([
                ("Rent".to_string(), 50_000.0),
                ("Utilities".to_string(), 12_000.0),
            ]),
            operating_profit_bwc: 30_000.0,
            delta_ar: 1_500.0,
            delta_ap: 800.0,
            cash_from_operations: 29_300.0,
            tax_liability: 0.0,
            is_tax_quarter: false,
            net_cash_operating: 29_300.0,
            net_cash_investing: -5_000.0,
            net_cash_financing: -3_000.0,
            net_cash_flow: 21_300.0,
            ending_cash: 121_300.0,
        }
    }

    #[test]
    fn projections_agree_on_shared_totals() {
        let month = sample_month();
        let indirect = month.indirect_row();
        let direct = month.direct_row();
        assert_eq!(indirect.net_cash_flow, direct.net_cash_flow);
        assert_eq!(indirect.ending_cash, direct.ending_cash);
    }

    #[test]
    fn receivable_growth_is_an_outflow() {
        let indirect = sample_month().indirect_row();
        assert_eq!(indirect.receivables_delta, -1_500.0);
        assert_eq!(indirect.payables_delta, 800.0);
    }

    #[test]
    fn opex_names_are_stable_and_deduplicated() {
        let mut other = sample_month();
        other.month = "May".to_string();
        other
            .line_items
            .insert("Insurance".to_string(), 2_000.0);
        let names = opex_line_names(&[sample_month(), other]);
        assert_eq!(names, vec!["Insurance", "Rent", "Utilities"]);
    }

    #[test]
    fn two_line_items_project_to_two_rows() {
        let month = sample_month();
        let names = opex_line_names(std::slice::from_ref(&month));
        assert_eq!(names.len(), 2);
        for name in &names {
            assert!(month.direct_row().line_items.contains_key(name));
        }
    }
}
