//! Stateful list session driven by the dashboard
//!
//! Holds the current filter, sort and page of a merchant list and recomputes
//! the visible page whenever a load finishes. Loads are ticketed: finishing a
//! load with an older ticket than the latest one, or after the session was
//! closed, discards the result.

use chrono::NaiveDate;
use merchantdesk_config::{Config, SortField, SortOrder};
use merchantdesk_utils::page_range_label;

use super::models::Merchant;
use super::store::ResilientStore;
use super::types::StatusFilter;
use super::view::{view, ViewResult, ViewSpec};

/// Filter part of a view, as submitted by the filter bar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub status: StatusFilter,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Handle for one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct MerchantBrowser {
    spec: ViewSpec,
    page_size_options: Vec<usize>,
    latest_ticket: u64,
    loading: bool,
    closed: bool,
    current: Option<ViewResult>,
}

impl Default for MerchantBrowser {
    fn default() -> Self {
        Self::with_spec(ViewSpec::default(), vec![5, 10, 25, 50])
    }
}

impl MerchantBrowser {
    /// Session with the configured default sort and page size
    pub fn new(config: &Config) -> Self {
        let spec = ViewSpec {
            sort_field: config.view.default_sort_field,
            sort_order: config.view.default_sort_order,
            page_size: config.pagination.default_page_size,
            ..Default::default()
        };
        Self::with_spec(spec, config.pagination.page_size_options.clone())
    }

    pub fn with_spec(spec: ViewSpec, page_size_options: Vec<usize>) -> Self {
        Self {
            spec,
            page_size_options,
            latest_ticket: 0,
            loading: false,
            closed: false,
            current: None,
        }
    }

    pub fn spec(&self) -> &ViewSpec {
        &self.spec
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Replace the filter and go back to page 1
    pub fn apply_filter(&mut self, criteria: FilterCriteria) {
        self.spec.search = criteria.search.trim().to_string();
        self.spec.status = criteria.status;
        self.spec.from_date = criteria.from_date;
        self.spec.to_date = criteria.to_date;
        self.spec.page = 1;
    }

    /// Clear every filter and go back to page 1
    pub fn reset_filter(&mut self) {
        self.apply_filter(FilterCriteria::default());
    }

    /// Clicking the active column flips its order; another column sorts
    /// ascending. Either way the list goes back to page 1.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.spec.sort_field == field {
            self.spec.sort_order = self.spec.sort_order.flipped();
        } else {
            self.spec.sort_field = field;
            self.spec.sort_order = SortOrder::Asc;
        }
        self.spec.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.spec.page = page;
    }

    /// Change the page size and go back to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.spec.page_size = page_size.max(1);
        self.spec.page = 1;
    }

    /// Start a load; only the newest ticket may deliver a result
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.loading = true;
        LoadTicket(self.latest_ticket)
    }

    /// Deliver a loaded collection. Returns `false` when the result was
    /// discarded because a newer load started or the session was closed.
    pub fn finish_load(&mut self, ticket: LoadTicket, collection: &[Merchant]) -> bool {
        if self.closed || ticket.0 != self.latest_ticket {
            log::debug!("Discarding stale merchant load {}", ticket.0);
            return false;
        }
        self.current = Some(view(collection, &self.spec));
        self.loading = false;
        true
    }

    /// Recompute the page from a collection already at hand
    pub fn refresh(&mut self, collection: &[Merchant]) -> Option<&ViewResult> {
        let ticket = self.begin_load();
        self.finish_load(ticket, collection);
        self.current.as_ref()
    }

    /// Fetch from the store and recompute the page
    pub async fn load(&mut self, store: &ResilientStore) -> Option<&ViewResult> {
        let ticket = self.begin_load();
        let collection = store.fetch_all().await;
        self.finish_load(ticket, &collection);
        self.current.as_ref()
    }

    /// Stop accepting results
    pub fn close(&mut self) {
        self.closed = true;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current(&self) -> Option<&ViewResult> {
        self.current.as_ref()
    }

    /// "Showing X to Y of Z results" for the current page
    pub fn range_label(&self) -> String {
        let total = self.current.as_ref().map_or(0, |r| r.total);
        page_range_label(self.spec.page, self.spec.page_size, total)
    }
}
