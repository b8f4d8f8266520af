//! Answer formatting helpers.

use std::sync::OnceLock;

use regex::Regex;

use crate::inventory::InventoryRecord;

const BULLET: char = '\u{2022}';

/// `• Material -- Quantity -- Unit`, unit left out when absent.
pub fn format_bullet(record: &InventoryRecord) -> String {
    let mut line = format!("{BULLET} {} -- {}", record.material_name, record.quantity_display());
    if let Some(unit) = &record.unit {
        line.push_str(" -- ");
        line.push_str(unit);
    }
    line
}

/// Bullet followed by a short explanatory clause.
pub fn format_bullet_with_reason(record: &InventoryRecord, reason: &str) -> String {
    format!("{}: {reason}", format_bullet(record))
}

/// Replace literal `\n` escape sequences with real line breaks.
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Whether the user asked for the reason each item is listed.
pub fn wants_justification(query: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)\b(why|explain\w*|explanation|usefulness|justif\w*|reasons?)\b")
                .expect("built-in justification pattern is valid")
        })
        .is_match(query)
}
