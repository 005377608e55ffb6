use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Current version of the collection shape returned by `GET /api/vendors`.
pub const COLLECTION_VERSION: u32 = 1;

/// Column that identifies a row when updating it.
pub const KEY_COLUMN: &str = "Supplier / Brand";

/// One spreadsheet row: column name to cell text.
pub type RowRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<RowRecord>,
}

/// Every configured sheet, in configured order, rows in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCollection {
    pub version: u32,
    pub sheets: Vec<Sheet>,
}

impl SheetCollection {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            version: COLLECTION_VERSION,
            sheets,
        }
    }

    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows.len()).sum()
    }
}

/// Body of a `PATCH /api/vendors` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub original_supplier: String,
    pub update_data: RowRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl UpdateRequest {
    /// Presence check on a raw PATCH body. Scalars inside `updateData` are
    /// coerced to text the same way upstream cells are.
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        let missing = || AppError::BadRequest("Missing required data".to_string());

        let original_supplier = body
            .get("originalSupplier")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(missing)?;

        let update_data = body
            .get("updateData")
            .and_then(Value::as_object)
            .ok_or_else(missing)?;

        let sheet_name = body
            .get("sheetName")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        Ok(UpdateRequest {
            original_supplier: original_supplier.to_string(),
            update_data: update_data
                .iter()
                .map(|(column, value)| (column.clone(), cell_text(value)))
                .collect(),
            sheet_name,
        })
    }
}

/// Text form of a cell as the upstream store sends it.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Converts a JSON object into a row; anything else is not a row.
pub fn row_from_value(value: &Value) -> Option<RowRecord> {
    value.as_object().map(|object| {
        object
            .iter()
            .map(|(column, cell)| (column.clone(), cell_text(cell)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_request_requires_supplier_and_data() {
        let body = json!({"updateData": {"GSM": "250"}});
        assert!(matches!(UpdateRequest::from_body(&body), Err(AppError::BadRequest(_))));

        let body = json!({"originalSupplier": "Acme"});
        assert!(matches!(UpdateRequest::from_body(&body), Err(AppError::BadRequest(_))));

        let body = json!({"originalSupplier": "", "updateData": {}});
        assert!(matches!(UpdateRequest::from_body(&body), Err(AppError::BadRequest(_))));

        let body = json!({"originalSupplier": "Acme", "updateData": "GSM=250"});
        assert!(matches!(UpdateRequest::from_body(&body), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn update_request_coerces_scalars() {
        let body = json!({
            "originalSupplier": "Acme",
            "updateData": {"GSM": 250, "MOQ": null, "USP": "Fast"},
            "sheetName": "Sheet2"
        });
        let request = UpdateRequest::from_body(&body).unwrap();
        assert_eq!(request.original_supplier, "Acme");
        assert_eq!(request.update_data["GSM"], "250");
        assert_eq!(request.update_data["MOQ"], "");
        assert_eq!(request.update_data["USP"], "Fast");
        assert_eq!(request.sheet_name.as_deref(), Some("Sheet2"));
    }

    #[test]
    fn update_request_serializes_camel_case() {
        let request = UpdateRequest {
            original_supplier: "Acme".into(),
            update_data: RowRecord::from([("GSM".to_string(), "250".to_string())]),
            sheet_name: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"originalSupplier": "Acme", "updateData": {"GSM": "250"}}));
    }

    #[test]
    fn non_objects_are_not_rows() {
        assert!(row_from_value(&json!("Acme")).is_none());
        let row = row_from_value(&json!({"Supplier / Brand": "Acme", "GSM": 200})).unwrap();
        assert_eq!(row["GSM"], "200");
    }
}
