//! List views over an in-memory merchant collection
//!
//! A view is always computed in the same order: filter, then sort, then
//! page. Nothing here performs I/O.

use chrono::NaiveDate;
use merchantdesk_config::{SortField, SortOrder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::models::Merchant;
use super::time::DateRange;
use super::types::StatusFilter;

/// Declarative filter/sort/page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSpec {
    /// Free-text search over name, merchant id and email
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// 1-indexed page number
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

impl Default for ViewSpec {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            from_date: None,
            to_date: None,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl ViewSpec {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.from_date, self.to_date)
    }

    /// Does a record pass every filter predicate
    pub fn matches(&self, merchant: &Merchant) -> bool {
        matches_search(merchant, &self.search)
            && self.status.matches(merchant.status)
            && self.date_range().contains(merchant.created_at_utc())
    }
}

/// One page of a view plus its pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResult {
    pub page: Vec<Merchant>,
    /// Number of records that passed the filter
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Compute the visible page of `collection` for `spec`.
///
/// Pages past the end (and page 0) come back empty; the caller decides
/// whether to reset. A page size of 0 is treated as 1.
pub fn view(collection: &[Merchant], spec: &ViewSpec) -> ViewResult {
    let mut filtered: Vec<&Merchant> = collection.iter().filter(|m| spec.matches(m)).collect();

    // stable: ties keep collection order
    filtered.sort_by(|a, b| {
        let ordering = compare_by(a, b, spec.sort_field);
        match spec.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let page_size = spec.page_size.max(1);
    let total = filtered.len();
    let total_pages = total.div_ceil(page_size);

    let page = if spec.page == 0 {
        Vec::new()
    } else {
        let start = (spec.page - 1).saturating_mul(page_size);
        filtered
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect()
    };

    ViewResult {
        page,
        total,
        total_pages,
        current_page: spec.page,
    }
}

/// Case-insensitive substring match against name, merchant id and email.
/// The term is matched as given; only the empty term matches everything.
pub fn matches_search(merchant: &Merchant, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    [&merchant.name, &merchant.merchant_id, &merchant.email]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Ascending comparison of two records on one field
pub fn compare_by(a: &Merchant, b: &Merchant, field: SortField) -> Ordering {
    match field {
        SortField::Name => locale_cmp(&a.name, &b.name),
        SortField::MerchantId => locale_cmp(&a.merchant_id, &b.merchant_id),
        SortField::Email => locale_cmp(&a.email, &b.email),
        SortField::Status => compare_missing_first(
            a.status.map(|s| s.as_str()),
            b.status.map(|s| s.as_str()),
            locale_cmp,
        ),
        SortField::CreatedAt => {
            compare_missing_first(a.created_at_utc(), b.created_at_utc(), |x, y| x.cmp(&y))
        }
    }
}

/// Dictionary-style string ordering: letters compare case-insensitively,
/// and on a case-only difference lowercase sorts first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

fn compare_missing_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x, y),
    }
}
