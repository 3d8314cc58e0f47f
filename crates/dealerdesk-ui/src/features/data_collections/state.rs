//! Data collection forms, the import dialog, and entry display helpers.
//!
//! # Design
//! - Imports come from a remote API (JSON body) or a CSV file (multipart).
//! - Header rows left completely empty are ignored; a half-filled row fails.
//! - Entries are free-form JSON; the table reads the vehicle-listing fields
//!   dealers import and falls back to raw JSON for anything else.

use chrono::DateTime;
use dealerdesk_api_models::{ApiImportRequest, DataCollection, DataCollectionInput, ImportHeader};
use serde_json::{Map, Value};

use crate::core::http::{MultipartField, Upload};
use crate::core::validation::{FieldErrors, is_blank, is_url, split_list};

/// Editable collection fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataCollectionForm {
    /// Display name.
    pub name: String,
    /// Comma separated tags.
    pub tags: String,
}

impl DataCollectionForm {
    /// Prefill from a saved collection.
    #[must_use]
    pub fn from_collection(collection: &DataCollection) -> Self {
        Self {
            name: collection.name.clone(),
            tags: collection.tags.join(", "),
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<DataCollectionInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(is_blank(&self.name), "name", "Name is required");
        errors.finish(|| DataCollectionInput {
            name: self.name.trim().to_string(),
            tags: split_list(&self.tags),
        })
    }
}

/// Import source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportKind {
    /// Pull rows from a remote HTTP endpoint.
    #[default]
    Api,
    /// Upload a CSV file.
    File,
}

/// Import dialog state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportForm {
    /// Selected source.
    pub kind: ImportKind,
    /// Remote endpoint.
    pub url: String,
    /// Remote HTTP method.
    pub method: String,
    /// Headers forwarded to the remote endpoint.
    pub headers: Vec<ImportHeader>,
    /// Property of the remote payload holding the rows.
    pub payload_property: String,
    /// Picked CSV file.
    pub file: Option<Upload>,
}

impl Default for ImportForm {
    fn default() -> Self {
        Self {
            kind: ImportKind::Api,
            url: String::new(),
            method: "GET".to_string(),
            headers: vec![blank_header()],
            payload_property: String::new(),
            file: None,
        }
    }
}

fn blank_header() -> ImportHeader {
    ImportHeader {
        key: String::new(),
        value: String::new(),
    }
}

/// Validated import request.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportPlan {
    /// JSON body for an API import.
    Api(ApiImportRequest),
    /// Multipart fields for a CSV import.
    File(Vec<MultipartField>),
}

impl ImportForm {
    /// Append an empty header row.
    pub fn add_header(&mut self) {
        self.headers.push(blank_header());
    }

    /// Remove a header row, keeping at least one.
    pub fn remove_header(&mut self, index: usize) {
        if index < self.headers.len() {
            self.headers.remove(index);
        }
        if self.headers.is_empty() {
            self.headers.push(blank_header());
        }
    }

    /// Per-row `(key error, value error)` for half-filled header rows.
    #[must_use]
    pub fn header_errors(&self) -> Vec<(Option<&'static str>, Option<&'static str>)> {
        self.headers
            .iter()
            .map(|header| {
                let key_blank = is_blank(&header.key);
                let value_blank = is_blank(&header.value);
                if key_blank && value_blank {
                    return (None, None);
                }
                (
                    key_blank.then_some("Key required"),
                    value_blank.then_some("Value required"),
                )
            })
            .collect()
    }

    /// Validate and build the request.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails; header rows report
    /// under `headers` (see [`ImportForm::header_errors`] for the rows).
    pub fn validate(&self) -> Result<ImportPlan, FieldErrors> {
        let mut errors = FieldErrors::default();
        match self.kind {
            ImportKind::Api => {
                errors.check(is_blank(&self.url), "url", "URL is required");
                errors.check(!is_url(&self.url), "url", "Invalid URL");
                errors.check(is_blank(&self.method), "method", "Method is required");
                for (key_error, value_error) in self.header_errors() {
                    if let Some(message) = key_error.or(value_error) {
                        errors.insert("headers", message);
                    }
                }
                let mut headers = Map::new();
                for header in self.headers.iter().filter(|header| !is_blank(&header.key)) {
                    headers.insert(
                        header.key.trim().to_string(),
                        Value::String(header.value.trim().to_string()),
                    );
                }
                errors.finish(|| {
                    ImportPlan::Api(ApiImportRequest {
                        kind: "api",
                        url: self.url.trim().to_string(),
                        method: self.method.trim().to_uppercase(),
                        headers: vec![headers],
                        payload_property: self.payload_property.trim().to_string(),
                    })
                })
            }
            ImportKind::File => match &self.file {
                Some(file) => Ok(ImportPlan::File(vec![
                    MultipartField::Text {
                        name: "type".to_string(),
                        value: "csv".to_string(),
                    },
                    file.clone().into_field("file"),
                ])),
                None => {
                    errors.insert("file", "File is required");
                    Err(errors)
                }
            },
        }
    }
}

/// Raw JSON entry typed in the add-entry dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryForm {
    /// JSON object text.
    pub json: String,
}

impl EntryForm {
    /// Parse the entry body.
    ///
    /// # Errors
    ///
    /// Returns a `json` message unless the text is a JSON object.
    pub fn validate(&self) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::default();
        match serde_json::from_str::<Value>(self.json.trim()) {
            Ok(value @ Value::Object(_)) => Ok(value),
            _ => {
                errors.insert("json", "Entry must be a JSON object");
                Err(errors)
            }
        }
    }
}

/// Table row extracted from a vehicle-listing entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryRow {
    /// Thumbnail URL.
    pub photo: Option<String>,
    /// Model.
    pub model: String,
    /// Make.
    pub make: String,
    /// Body type.
    pub body_type: String,
    /// Mileage.
    pub mileage: String,
    /// Fuel wording.
    pub fuel: String,
    /// Engine power.
    pub power: String,
    /// Previous owners.
    pub previous_owners: String,
    /// Retail price, else gross price.
    pub price: String,
    /// Category.
    pub category: String,
}

impl EntryRow {
    /// Extract the listing columns from an entry payload.
    #[must_use]
    pub fn from_data(data: &Value) -> Self {
        let text = |field: &str| data.get(field).map(cell).unwrap_or_default();
        let retail = data
            .get("prices")
            .and_then(Value::as_array)
            .and_then(|prices| {
                prices
                    .iter()
                    .find(|price| price.get("type").and_then(Value::as_str) == Some("retail"))
            })
            .and_then(|price| price.get("value"))
            .filter(|value| !value.is_null());
        Self {
            photo: data
                .pointer("/previewPhoto/thumbnailUrl")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            model: text("model"),
            make: text("make"),
            body_type: text("bodyType"),
            mileage: text("mileage"),
            fuel: data
                .pointer("/fuel/wording")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            power: text("power"),
            previous_owners: text("previousOwners"),
            price: retail.or_else(|| data.get("priceGross")).map(cell).unwrap_or_default(),
            category: text("category"),
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Human label for a payload key: `previousOwners` becomes `Previous Owners`.
#[must_use]
pub fn format_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
            spaced.push(ch);
        } else if ch == '_' {
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }
    spaced
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display text for a payload value in the entry details panel.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::Bool(flag) => if *flag { "Yes" } else { "No" }.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => DateTime::parse_from_rfc3339(text).map_or_else(
            |_| text.clone(),
            |date| date.format("%Y-%m-%d %H:%M").to_string(),
        ),
        Value::Object(object) => ["wording", "name", "label", "title", "value"]
            .iter()
            .find_map(|field| object.get(*field).filter(|value| !value.is_null()))
            .map_or_else(|| value.to_string(), cell),
        Value::Array(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_are_split_and_deduplicated() {
        let form = DataCollectionForm {
            name: "Stock".into(),
            tags: "cars, used,, cars ".into(),
        };
        let input = form.validate().expect("valid");
        assert_eq!(input.tags, vec!["cars".to_string(), "used".to_string()]);
    }

    #[test]
    fn api_import_collapses_headers_into_one_object() {
        let form = ImportForm {
            url: "https://feed.example/listings".into(),
            method: "get".into(),
            headers: vec![
                ImportHeader {
                    key: "X-Key".into(),
                    value: "abc".into(),
                },
                blank_header(),
            ],
            payload_property: "items".into(),
            ..ImportForm::default()
        };
        let ImportPlan::Api(request) = form.validate().expect("valid") else {
            panic!("expected api import");
        };
        assert_eq!(request.method, "GET");
        assert_eq!(
            serde_json::to_value(&request).expect("encode"),
            json!({
                "type": "api",
                "url": "https://feed.example/listings",
                "method": "GET",
                "headers": [{"X-Key": "abc"}],
                "payloadProperty": "items"
            })
        );
    }

    #[test]
    fn api_import_rules() {
        let mut form = ImportForm {
            url: "feed".into(),
            headers: vec![ImportHeader {
                key: "X-Key".into(),
                value: String::new(),
            }],
            ..ImportForm::default()
        };
        let errors = form.validate().expect_err("invalid");
        assert_eq!(errors.get("url"), Some("Invalid URL"));
        assert_eq!(errors.get("headers"), Some("Value required"));
        assert_eq!(form.header_errors(), vec![(None, Some("Value required"))]);

        form.url.clear();
        form.method.clear();
        let errors = form.validate().expect_err("invalid");
        assert_eq!(errors.get("url"), Some("URL is required"));
        assert_eq!(errors.get("method"), Some("Method is required"));
    }

    #[test]
    fn file_import_needs_a_file() {
        let mut form = ImportForm {
            kind: ImportKind::File,
            ..ImportForm::default()
        };
        assert_eq!(
            form.validate().expect_err("missing").get("file"),
            Some("File is required")
        );
        form.file = Some(Upload {
            file_name: "stock.csv".into(),
            mime: "text/csv".into(),
            bytes: b"make,model\n".to_vec(),
        });
        let ImportPlan::File(fields) = form.validate().expect("valid") else {
            panic!("expected file import");
        };
        assert_eq!(
            fields[0],
            MultipartField::Text {
                name: "type".into(),
                value: "csv".into()
            }
        );
    }

    #[test]
    fn removing_the_last_header_keeps_an_empty_row() {
        let mut form = ImportForm::default();
        form.remove_header(0);
        assert_eq!(form.headers, vec![blank_header()]);
    }

    #[test]
    fn entry_rows_prefer_the_retail_price() {
        let row = EntryRow::from_data(&json!({
            "make": "Skoda",
            "model": "Octavia",
            "mileage": 120_000,
            "fuel": {"wording": "Diesel"},
            "priceGross": 15000,
            "prices": [{"type": "dealer", "value": 13000}, {"type": "retail", "value": 14500}],
            "previewPhoto": {"thumbnailUrl": "https://cdn/p.jpg"}
        }));
        assert_eq!(row.make, "Skoda");
        assert_eq!(row.mileage, "120000");
        assert_eq!(row.fuel, "Diesel");
        assert_eq!(row.price, "14500");
        assert_eq!(row.photo.as_deref(), Some("https://cdn/p.jpg"));

        let row = EntryRow::from_data(&json!({"priceGross": 9900}));
        assert_eq!(row.price, "9900");
    }

    #[test]
    fn keys_and_values_are_humanized() {
        assert_eq!(format_key("previousOwners"), "Previous Owners");
        assert_eq!(format_key("body_type"), "Body Type");
        assert_eq!(format_value(&json!(true)), "Yes");
        assert_eq!(format_value(&Value::Null), "—");
        assert_eq!(format_value(&json!("2025-03-01T10:30:00Z")), "2025-03-01 10:30");
        assert_eq!(format_value(&json!({"wording": "Petrol"})), "Petrol");
        assert_eq!(format_value(&json!("Octavia")), "Octavia");
    }

    #[test]
    fn entries_must_be_objects() {
        let form = EntryForm { json: "[1, 2]".into() };
        assert!(form.validate().expect_err("array").has("json"));
        let form = EntryForm {
            json: r#"{"make": "Skoda"}"#.into(),
        };
        assert_eq!(form.validate().expect("valid"), json!({"make": "Skoda"}));
    }
}
