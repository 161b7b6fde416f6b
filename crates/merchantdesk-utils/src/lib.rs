//! Utility functions and helpers

use uuid::Uuid;

/// Generate an external merchant code: "MRC" followed by 8 uppercase hex digits
/// taken from a random v4 UUID.
pub fn generate_merchant_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("MRC{}", uuid[..8].to_uppercase())
}

/// Wrap a value in double quotes for CSV output, doubling embedded quotes
pub fn quote_csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// "Showing X to Y of Z results" for a 1-indexed page
pub fn page_range_label(current_page: usize, page_size: usize, total: usize) -> String {
    if total == 0 || page_size == 0 || current_page == 0 {
        return format!("Showing 0 of {} results", total);
    }
    let start = (current_page - 1).saturating_mul(page_size) + 1;
    if start > total {
        return format!("Showing 0 of {} results", total);
    }
    let end = (current_page.saturating_mul(page_size)).min(total);
    format!("Showing {} to {} of {} results", start, end, total)
}
