//! Text rendering of records for the reasoning layer.
//!
//! Each record becomes one line with a fixed field order:
//!
//! ```text
//! material_name: Cold pack | location: Shelf-1 | quantity: 6 | unit: box
//! ```
//!
//! The unit segment is left out when the record has none. [`parse_line`] is
//! the inverse and is what the local reasoner reads tool output with.

use super::{InventoryRecord, Quantity};

const SEPARATOR: &str = " | ";

/// Render a single record as one line.
pub fn render_record(record: &InventoryRecord) -> String {
    let mut line = format!(
        "material_name: {}{SEPARATOR}location: {}{SEPARATOR}quantity: {}",
        record.material_name,
        record.location,
        record.quantity_display()
    );
    if let Some(unit) = &record.unit {
        line.push_str(SEPARATOR);
        line.push_str("unit: ");
        line.push_str(unit);
    }
    line
}

/// Render all records, one per line.
pub fn render_records(records: &[InventoryRecord]) -> String {
    records
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse one rendered line back into a record.
pub fn parse_line(line: &str) -> Option<InventoryRecord> {
    let mut material = None;
    let mut location = None;
    let mut quantity = None;
    let mut unit = None;

    for segment in line.trim().split(SEPARATOR) {
        let (key, value) = segment.split_once(": ")?;
        match key.trim() {
            "material_name" => material = Some(value.to_string()),
            "location" => location = Some(value.to_string()),
            "quantity" => quantity = Some(Quantity::parse(value)),
            "unit" => unit = Some(value.to_string()),
            _ => {}
        }
    }

    let record = InventoryRecord::new(material?, location?, quantity?);
    Some(match unit {
        Some(u) => record.with_unit(u),
        None => record,
    })
}

/// Parse every well-formed line of a rendering, skipping anything else.
pub fn parse_rendered(text: &str) -> Vec<InventoryRecord> {
    text.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fields_in_fixed_order() {
        let record = InventoryRecord::new("Cold pack", "Shelf-1", 6.0).with_unit("box");
        assert_eq!(
            render_record(&record),
            "material_name: Cold pack | location: Shelf-1 | quantity: 6 | unit: box"
        );
    }

    #[test]
    fn omits_absent_unit() {
        let record = InventoryRecord::new("Flashlight", "Shelf-1", 4.0);
        assert_eq!(
            render_record(&record),
            "material_name: Flashlight | location: Shelf-1 | quantity: 4"
        );
    }

    #[test]
    fn unknown_quantity_survives_rendering() {
        let record = InventoryRecord::new("Tape", "Shelf-1", Quantity::Text(String::new())).with_unit("roll");
        let line = render_record(&record);
        assert_eq!(line, "material_name: Tape | location: Shelf-1 | quantity: unknown | unit: roll");
        assert_eq!(parse_line(&line).map(|r| r.quantity_display()), Some("unknown".to_string()));
    }

    #[test]
    fn parse_skips_noise_lines() {
        let text = "material_name: Rope | location: Basement | quantity: 3\nnot a record\n";
        let records = parse_rendered(text);
        assert_eq!(records, vec![InventoryRecord::new("Rope", "Basement", 3.0)]);
    }
}
