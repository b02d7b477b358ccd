// src/model/mod.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod projection;

/// One ledger file held for the duration of an analysis cycle.
/// Bytes are forwarded to the backend opaquely; no parsing happens here.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// User-editable overrides sent with every analysis request.
///
/// Fields are transmitted as strings; an empty string means "no override"
/// and lets the backend fall back to its own estimate.
#[derive(Debug, Clone, Serialize)]
pub struct AssumptionSet {
    pub revenue_growth: String,
    pub tax_rate: String,
    pub new_capex: String,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            revenue_growth: String::new(),
            tax_rate: "15".to_string(),
            new_capex: String::new(),
        }
    }
}

/// Full backend response for one analysis run. Held immutable until the
/// next successful run replaces it.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResult {
    pub kpis: Kpis,
    pub charts: Charts,
    pub three_way_model: Vec<MonthlyModel>,
    #[serde(default)]
    pub tax_metadata: Option<TaxMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Kpis {
    pub projected_12m: f64,
    pub geo_growth_rate: f64,
    pub calculated_dso: f64,
    pub calculated_dpo: f64,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub ebitda: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charts {
    #[serde(rename = "areaData")]
    pub area_data: Vec<AreaPoint>,
    #[serde(rename = "waterfallData")]
    pub waterfall_data: Vec<WaterfallBar>,
}

/// Forecast point with its confidence cone bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaPoint {
    pub month: String,
    pub baseline: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaterfallBar {
    pub name: String,
    pub value: f64,
    #[serde(rename = "isTotal")]
    pub is_total: bool,
}

/// One forecast month. Carries fields for both statement layouts so the
/// management and Schedule III views are projections of the same record,
/// never fetched separately.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyModel {
    pub month: String,

    // Direct method fields
    pub revenue: f64,
    pub cogs: f64,
    pub opex: f64,
    pub payroll: f64,
    pub capex: f64,
    pub debt: f64,
    pub ebitda: f64,
    pub net_profit: f64,
    #[serde(default)]
    pub line_items: BTreeMap<String, f64>,

    // Indirect method (Schedule III) fields
    pub operating_profit_bwc: f64,
    pub delta_ar: f64,
    pub delta_ap: f64,
    pub cash_from_operations: f64,
    pub tax_liability: f64,
    pub is_tax_quarter: bool,
    pub net_cash_operating: f64,
    pub net_cash_investing: f64,
    pub net_cash_financing: f64,

    pub net_cash_flow: f64,
    pub ending_cash: f64,
}

/// Advance-tax schedule details. Absent when the backend has nothing to
/// report, in which case the compliance banner and cover tax line are
/// omitted entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxMetadata {
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub installments: BTreeMap<String, String>,
    pub estimated_annual_tax: f64,
    #[serde(default)]
    pub advance_tax_exempt: bool,
    #[serde(default)]
    pub exempt_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "status": "success",
        "kpis": {
            "projected_12m": 1200000,
            "geo_growth_rate": 4.2,
            "calculated_dso": 42,
            "calculated_dpo": 30,
            "gross_margin": 55.0,
            "net_margin": 18.5,
            "ebitda": 300000
        },
        "charts": {
            "areaData": [
                {"month": "Apr", "baseline": 100000, "lower": 92000, "upper": 108000}
            ],
            "waterfallData": [
                {"name": "Start Cash", "value": 100000, "isTotal": true},
                {"name": "Revenue", "value": 90000, "isTotal": false},
                {"name": "End Cash", "value": 130000, "isTotal": true}
            ]
        },
        "three_way_model": [{
            "month": "Apr",
            "revenue": 100000,
            "cogs": 40000,
            "opex": 20000,
            "payroll": 10000,
            "capex": 5000,
            "debt": 3000,
            "ebitda": 30000,
            "net_profit": 22000,
            "tax_liability": 0,
            "operating_profit_bwc": 30000,
            "delta_ar": 1500,
            "delta_ap": 800,
            "cash_from_operations": 29300,
            "net_cash_operating": 29300,
            "net_cash_investing": -5000,
            "net_cash_financing": -3000,
            "net_cash_flow": 21300,
            "ending_cash": 121300,
            "is_tax_quarter": false,
            "line_items": {"Rent": 50000, "Utilities": 12000}
        }],
        "tax_metadata": {
            "schedule": "Section 211 - Indian Income Tax Act",
            "installments": {"Q1_Jun15": "15% of estimated annual liability"},
            "estimated_annual_tax": 39600,
            "advance_tax_exempt": false,
            "exempt_note": null
        }
    }"#;

    #[test]
    fn decodes_full_backend_payload() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(result.kpis.projected_12m, 1_200_000.0);
        assert_eq!(result.charts.area_data.len(), 1);
        assert_eq!(result.charts.waterfall_data[0].name, "Start Cash");
        assert!(result.charts.waterfall_data[0].is_total);
        assert_eq!(result.three_way_model.len(), 1);
        let month = &result.three_way_model[0];
        assert_eq!(month.line_items.get("Rent"), Some(&50_000.0));
        assert_eq!(
            result.tax_metadata.as_ref().unwrap().estimated_annual_tax,
            39_600.0
        );
    }

    #[test]
    fn tax_metadata_is_optional() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value.as_object_mut().unwrap().remove("tax_metadata");
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert!(result.tax_metadata.is_none());
    }

    #[test]
    fn missing_line_items_default_to_empty() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value["three_way_model"][0]
            .as_object_mut()
            .unwrap()
            .remove("line_items");
        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert!(result.three_way_model[0].line_items.is_empty());
    }

    #[test]
    fn assumptions_serialize_as_strings() {
        let assumptions = AssumptionSet {
            revenue_growth: "5".to_string(),
            ..AssumptionSet::default()
        };
        let json = serde_json::to_value(&assumptions).unwrap();
        assert_eq!(json["revenue_growth"], "5");
        assert_eq!(json["tax_rate"], "15");
        assert_eq!(json["new_capex"], "");
    }
}
