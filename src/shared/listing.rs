//! Paged listing state — app-owned, SDK-provided update logic.

use super::{ListQuery, Page, SortOrder};

/// One page of records plus the pagination cursor that produced it.
///
/// The app owns instances of this type (one per table) and feeds it pages
/// fetched through the sub-clients. Deletes are applied optimistically with
/// [`Listing::remove_where`] so the row disappears before the next reload.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    items: Vec<T>,
    query: ListQuery,
    total: u64,
}

impl<T> Listing<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            query: ListQuery::default().limit(page_size),
            total: 0,
        }
    }

    /// Replace the current rows with a freshly fetched page.
    pub fn apply(&mut self, page_number: u32, page: Page<T>) {
        self.query.page = page_number.max(1);
        self.total = page.total;
        self.items = page.data;
    }

    /// Remove all rows matching `predicate`, returning how many were removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        let removed = before - self.items.len();
        self.total = self.total.saturating_sub(removed as u64);
        removed
    }

    /// Replace the first row matching `predicate`. Returns `false` if none matched.
    pub fn replace_where(&mut self, predicate: impl Fn(&T) -> bool, item: T) -> bool {
        match self.items.iter_mut().find(|existing| predicate(existing)) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Change the sort and go back to the first page.
    pub fn sort_by(&mut self, field: &str, order: SortOrder) {
        self.query = self.query.clone().page(1).sort(field, order);
    }

    /// Query to fetch `page_number` with the current size and sort.
    pub fn query_for(&self, page_number: u32) -> ListQuery {
        self.query.clone().page(page_number)
    }

    /// Query that reloads the page currently shown.
    pub fn query(&self) -> ListQuery {
        self.query.clone()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.query.page
    }

    pub fn page_size(&self) -> u32 {
        self.query.limit
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = 0;
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::new(10)
    }
}
