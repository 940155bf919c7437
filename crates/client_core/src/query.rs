//! Query state owned by the asset list controller.

use std::collections::BTreeSet;

use shared::{
    domain::{AssetState, CategoryId, SortField, SortOrder},
    protocol::AssetListQuery,
};

/// Rows requested per page. Matches the backend's default page size.
pub const PAGE_SIZE: u32 = 10;

/// Pagination, search, filter, and sort state for the asset list.
///
/// A filter or search mutation invalidates the meaning of the current page,
/// so those operations reset `page` to 1. Sort changes keep the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    search_text: String,
    selected_states: BTreeSet<AssetState>,
    selected_category_ids: BTreeSet<CategoryId>,
    sort_field: SortField,
    sort_order: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            search_text: String::new(),
            selected_states: BTreeSet::new(),
            selected_category_ids: BTreeSet::new(),
            sort_field: SortField::AssetCode,
            sort_order: SortOrder::Asc,
        }
    }
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected_states(&self) -> &BTreeSet<AssetState> {
        &self.selected_states
    }

    pub fn selected_category_ids(&self) -> &BTreeSet<CategoryId> {
        &self.selected_category_ids
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Moves to another page of the current result set. No other field is
    /// touched. Callers validate `page >= 1`.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    /// Stores the raw search text and resets pagination. The debounced value
    /// derived from this text is what feeds the fetch.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page = 1;
    }

    /// Replaces the state filter set and resets pagination.
    pub fn set_selected_states(&mut self, states: BTreeSet<AssetState>) {
        self.selected_states = states;
        self.page = 1;
    }

    /// Replaces the category filter set and resets pagination.
    pub fn set_selected_category_ids(&mut self, category_ids: BTreeSet<CategoryId>) {
        self.selected_category_ids = category_ids;
        self.page = 1;
    }

    /// Repeated clicks on the current sort column flip the direction; a new
    /// column starts ascending. Pagination is kept.
    pub fn toggle_sort(&mut self, field: SortField) {
        if field == self.sort_field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Asc;
        }
    }

    /// Derives the fetch parameter tuple, substituting the debounced search
    /// value for the raw text.
    pub fn to_list_query(&self, debounced_search: &str) -> AssetListQuery {
        AssetListQuery {
            page: self.page,
            take: PAGE_SIZE,
            search: debounced_search.to_string(),
            states: self.selected_states.iter().copied().collect(),
            category_ids: self.selected_category_ids.iter().copied().collect(),
            sort_field: self.sort_field,
            sort_order: self.sort_order,
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
