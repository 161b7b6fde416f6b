//! CSV export of a merchant's transaction history

use merchantdesk_utils::quote_csv_field;

use super::models::{Merchant, Transaction};

pub const CSV_COLUMNS: [&str; 9] = [
    "txnId",
    "timestamp",
    "amount",
    "currency",
    "status",
    "cardType",
    "cardLast4",
    "acquirer",
    "issuer",
];

/// Header line plus one quoted row per transaction, joined by `\n`
pub fn transactions_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_COLUMNS.join(","));

    for txn in transactions {
        let amount = txn.amount.to_string();
        let row = [
            txn.txn_id.as_str(),
            txn.timestamp.as_str(),
            amount.as_str(),
            txn.currency.as_str(),
            txn.status.as_str(),
            txn.card_type.as_deref().unwrap_or_default(),
            txn.card_last4.as_deref().unwrap_or_default(),
            txn.acquirer.as_deref().unwrap_or_default(),
            txn.issuer.as_deref().unwrap_or_default(),
        ];
        lines.push(
            row.iter()
                .map(|value| quote_csv_field(value))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

/// `<merchant name>-transactions.csv`, with control characters, quotes and
/// path separators replaced
pub fn export_filename(merchant: &Merchant) -> String {
    let name: String = merchant
        .display_name()
        .chars()
        .map(|c| match c {
            '"' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}-transactions.csv", name)
}

/// `Content-Disposition` value for an attachment. Non-ASCII names get an
/// ASCII `filename` fallback plus an RFC 5987 `filename*` parameter.
pub fn attachment_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
