//! Inventory records, snapshots and the sources they are loaded from.

pub mod cache;
pub mod render;
pub mod source;

pub use cache::CachedInventorySource;
pub use source::{CsvInventorySource, InventorySource, MemoryInventorySource};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{InventoryError, Result};

/// Canonical column order used when a snapshot is built from records.
pub const CANONICAL_COLUMNS: [&str; 4] = ["material_name", "location", "quantity", "unit"];

/// Quantity cell of a record.
///
/// Cells that are not numbers are kept verbatim rather than rejected, so one
/// bad cell never hides the rest of the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Count(f64),
    Text(String),
}

impl Quantity {
    /// Numeric when the cell parses (thousands separators allowed), text otherwise.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.replace(',', "").parse::<f64>() {
            Ok(count) if !raw.is_empty() && count.is_finite() => Self::Count(count),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Count(count) => Some(*count),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for Quantity {
    fn from(count: f64) -> Self {
        Self::Count(count)
    }
}

/// Whole numbers print without a fractional part; text prints as written.
impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(count) if count.fract() == 0.0 && count.abs() < 1e15 => write!(f, "{}", *count as i64),
            Self::Count(count) => write!(f, "{count}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One row of the inventory source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub material_name: String,
    pub location: String,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl InventoryRecord {
    pub fn new(material_name: impl Into<String>, location: impl Into<String>, quantity: impl Into<Quantity>) -> Self {
        Self {
            material_name: material_name.into(),
            location: location.into(),
            quantity: quantity.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.unit = if unit.trim().is_empty() { None } else { Some(unit) };
        self
    }

    /// Quantity as shown in answers; a blank cell reads as "unknown".
    pub fn quantity_display(&self) -> String {
        match &self.quantity {
            Quantity::Text(text) if text.is_empty() => "unknown".to_string(),
            quantity => quantity.to_string(),
        }
    }
}

/// Ordered record set produced by one load of the inventory source.
///
/// The source header and raw rows are kept alongside the typed records so an
/// export reproduces the file in its original column order, extra columns
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySnapshot {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    records: Vec<InventoryRecord>,
}

/// Positions of the recognized columns within a source header.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    material: usize,
    location: usize,
    quantity: usize,
    unit: Option<usize>,
}

impl ColumnMap {
    fn resolve(columns: &[String]) -> Result<Self> {
        let find = |aliases: &[&str]| {
            columns
                .iter()
                .position(|c| aliases.contains(&normalize_header(c).as_str()))
        };
        let missing = |name: &str| InventoryError::DataUnavailable(format!("missing column '{name}'"));

        Ok(Self {
            material: find(&["material_name", "material", "item", "item_name", "name"])
                .ok_or_else(|| missing("material_name"))?,
            location: find(&["location", "place"]).ok_or_else(|| missing("location"))?,
            quantity: find(&["quantity", "qty", "count"]).ok_or_else(|| missing("quantity"))?,
            unit: find(&["unit", "units", "uom"]),
        })
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

impl InventorySnapshot {
    /// Parse delimited text with a header row.
    pub fn parse_csv(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse from any reader producing delimited text with a header row.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| InventoryError::DataUnavailable(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let map = ColumnMap::resolve(&columns)?;

        let mut rows = Vec::new();
        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| InventoryError::DataUnavailable(e.to_string()))?;
            let fields: Vec<String> = row.iter().map(str::to_string).collect();
            records.push(record_from_fields(&map, &fields, index + 2));
            rows.push(fields);
        }

        Ok(Self {
            columns,
            rows,
            records,
        })
    }

    /// Build a snapshot from typed records using the canonical columns.
    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    r.material_name.clone(),
                    r.location.clone(),
                    r.quantity.to_string(),
                    r.unit.clone().unwrap_or_default(),
                ]
            })
            .collect();
        Self {
            columns: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
            records,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct locations in order of first appearance.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.iter().any(|l| l.eq_ignore_ascii_case(&record.location)) {
                seen.push(&record.location);
            }
        }
        seen
    }

    /// Records whose location equals `location`, ignoring case.
    pub fn at_location<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a InventoryRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.location.trim().eq_ignore_ascii_case(location.trim()))
    }

    /// One line per record in a fixed field order.
    pub fn render(&self) -> String {
        render::render_records(&self.records)
    }

    /// Serialize back to delimited text in source column order.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| InventoryError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| InventoryError::Export(e.to_string()))
    }
}

fn record_from_fields(map: &ColumnMap, fields: &[String], line: usize) -> InventoryRecord {
    let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");
    let quantity = Quantity::parse(field(map.quantity));
    if let Quantity::Text(raw) = &quantity {
        warn!(line, quantity = %raw, "non-numeric quantity kept as text");
    }

    let record = InventoryRecord::new(field(map.material), field(map.location), quantity);
    match map.unit {
        Some(idx) => record.with_unit(field(idx)),
        None => record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Material Name,Location,Quantity,Unit,Notes
Round table,Hallway,12,pcs,folding
Cold pack,Shelf-1,6,box,
Flashlight,Shelf-1,4,,LED
";

    #[test]
    fn parses_aliased_headers_and_optional_unit() {
        let snapshot = InventorySnapshot::parse_csv(SAMPLE).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.records()[0].material_name, "Round table");
        assert_eq!(snapshot.records()[0].unit.as_deref(), Some("pcs"));
        assert_eq!(snapshot.records()[2].unit, None);
        assert_eq!(snapshot.columns().len(), 5);
    }

    #[test]
    fn missing_required_column_is_data_unavailable() {
        let err = InventorySnapshot::parse_csv("material_name,location\nTable,Hall\n").unwrap_err();
        assert!(matches!(err, InventoryError::DataUnavailable(ref m) if m.contains("quantity")));
    }

    #[test]
    fn blank_or_non_numeric_quantity_keeps_the_row() {
        let snapshot = InventorySnapshot::parse_csv(
            "material_name,location,quantity,unit\nChairs,Hallway,30,pcs\nTape,Shelf-1,,roll\nRope,Basement,lots\n",
        )
        .unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.records()[0].quantity.as_f64(), Some(30.0));
        assert_eq!(snapshot.records()[1].quantity, Quantity::Text(String::new()));
        assert_eq!(snapshot.records()[1].quantity_display(), "unknown");
        assert_eq!(snapshot.records()[2].quantity_display(), "lots");
        assert_eq!(snapshot.rows()[2], vec!["Rope", "Basement", "lots"]);
    }

    #[test]
    fn thousands_separators_parse_as_numbers() {
        assert_eq!(Quantity::parse("1,200"), Quantity::Count(1200.0));
        assert_eq!(Quantity::parse(" 7 "), Quantity::Count(7.0));
    }

    #[test]
    fn csv_round_trip_preserves_columns_and_values() {
        let snapshot = InventorySnapshot::parse_csv(SAMPLE).unwrap();
        let reparsed = InventorySnapshot::parse_csv(&snapshot.to_csv().unwrap()).unwrap();
        assert_eq!(reparsed, snapshot);
    }

    #[test]
    fn locations_are_distinct_in_first_seen_order() {
        let snapshot = InventorySnapshot::parse_csv(SAMPLE).unwrap();
        assert_eq!(snapshot.locations(), vec!["Hallway", "Shelf-1"]);
        assert_eq!(snapshot.at_location("shelf-1").count(), 2);
    }

    #[test]
    fn whole_quantities_print_without_fraction() {
        assert_eq!(InventoryRecord::new("Rope", "Basement", 3.0).quantity_display(), "3");
        assert_eq!(InventoryRecord::new("Paint", "Basement", 2.5).quantity_display(), "2.5");
    }
}
