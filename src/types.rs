use crate::config::LoadMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row of the raw sales export, exactly as it appears in the file.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Row ID")]
    pub row_id: String,
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Order Date")]
    pub order_date: String,
    #[serde(rename = "Ship Date")]
    pub ship_date: String,
    #[serde(rename = "Ship Mode")]
    pub ship_mode: String,
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Postal Code")]
    pub postal_code: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Sales")]
    pub sales: String,
}

/// A cleaned row: dates parsed, postal code filled, everything else kept
/// verbatim. Field order is the column order of the cleaned file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Tabled)]
pub struct SalesRecord {
    #[serde(rename = "Row ID")]
    #[tabled(rename = "Row ID")]
    pub row_id: String,
    #[serde(rename = "Order ID")]
    #[tabled(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Order Date")]
    #[tabled(rename = "Order Date")]
    pub order_date: NaiveDate,
    #[serde(rename = "Ship Date")]
    #[tabled(rename = "Ship Date")]
    pub ship_date: NaiveDate,
    #[serde(rename = "Ship Mode")]
    #[tabled(rename = "Ship Mode")]
    pub ship_mode: String,
    #[serde(rename = "Customer ID")]
    #[tabled(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Customer Name")]
    #[tabled(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Segment")]
    #[tabled(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "City")]
    #[tabled(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "Postal Code")]
    #[tabled(rename = "Postal Code")]
    pub postal_code: i64,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Product ID")]
    #[tabled(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    #[tabled(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Product Name")]
    #[tabled(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub sales: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub rows_read: usize,
    pub postal_codes_filled: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub mode: LoadMode,
    pub rows_inserted: u64,
    pub batches: usize,
}

/// What a run did, written by `--report`. `load` is null when the load
/// stage was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub clean: CleanReport,
    pub load: Option<LoadReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_both_stages() {
        let summary = RunSummary {
            clean: CleanReport {
                rows_read: 5,
                postal_codes_filled: 1,
                duplicates_removed: 1,
                rows_written: 4,
            },
            load: Some(LoadReport {
                table: "sales_data".into(),
                mode: LoadMode::Replace,
                rows_inserted: 4,
                batches: 1,
            }),
        };
        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["clean"]["duplicates_removed"], 1);
        assert_eq!(json["load"]["mode"], "replace");
        assert_eq!(json["load"]["rows_inserted"], 4);
    }

    #[test]
    fn skipped_load_is_null() {
        let summary = RunSummary {
            clean: CleanReport::default(),
            load: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["load"].is_null());
    }
}
