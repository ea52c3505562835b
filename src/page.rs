use crate::{
    filtered_list::{Column, FilteredList, ListItem, MergeFilter, Predicate, SortState},
    viewport::Viewport,
};
use std::{fmt::Display, ops::Range};

/// State a list page owns: the derived list, the row cursor, the item opened
/// in the detail view, and the status of the last refresh.
pub struct ListPage<T: ListItem, F: MergeFilter> {
    list: FilteredList<T, F>,
    viewport: Viewport,
    selected_id: Option<String>,
    is_loading: bool,
    error: Option<String>,
}

impl<T: ListItem, F: MergeFilter> ListPage<T, F> {
    pub fn new(columns: Vec<Column<T>>, predicate: Predicate<T, F>, initial_filter: F) -> Self {
        Self {
            list: FilteredList::new(columns, Vec::new(), predicate, initial_filter),
            viewport: Viewport::default(),
            selected_id: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn list(&self) -> &FilteredList<T, F> {
        &self.list
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn filter(&self) -> &F {
        self.list.filter()
    }

    pub fn sort(&self) -> Option<SortState<T::Column>> {
        self.list.sort()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_sort(&mut self, column: T::Column) {
        let cursor_id = self.cursor_id();
        self.list.set_sort(column);
        self.reselect(cursor_id);
    }

    pub fn clear_sort(&mut self) {
        let cursor_id = self.cursor_id();
        self.list.clear_sort();
        self.reselect(cursor_id);
    }

    pub fn set_filter(&mut self, patch: F::Patch) {
        let cursor_id = self.cursor_id();
        self.list.set_filter(patch);
        self.reselect(cursor_id);
    }

    pub fn reset_filter(&mut self) {
        let cursor_id = self.cursor_id();
        self.list.reset_filter();
        self.reselect(cursor_id);
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        let cursor_id = self.cursor_id();
        self.list.set_items(items);
        self.reselect(cursor_id);
    }

    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_height(height, self.list.len());
    }

    pub fn move_cursor(&mut self, delta: isize) {
        self.viewport.move_by(delta, self.list.len());
    }

    pub fn page_down(&mut self) {
        self.viewport.page_down(self.list.len());
    }

    pub fn page_up(&mut self) {
        self.viewport.page_up(self.list.len());
    }

    pub fn jump_to_page(&mut self, page: usize) {
        self.viewport.jump_to_page(page, self.list.len());
    }

    pub fn cursor_item(&self) -> Option<&T> {
        self.list.get(self.viewport.cursor())
    }

    /// Moves the cursor onto `id` if it is visible.
    pub fn focus(&mut self, id: &str) -> bool {
        let position = self.list.position_of(id);
        self.viewport.reselect(position, self.list.len());
        position.is_some()
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.viewport.visible_range(self.list.len())
    }

    /// Rows inside the viewport window, in visible order.
    pub fn rows(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible_range()
            .filter_map(move |position| self.list.get(position))
    }

    /// Row click: opens `id` in the detail view.
    pub fn select(&mut self, id: &str) {
        self.selected_id = Some(id.to_string());
    }

    pub fn select_cursor(&mut self) -> bool {
        match self.cursor_id() {
            Some(id) => {
                self.selected_id = Some(id);
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The selected item as found in the current source collection.
    pub fn selected(&self) -> Option<&T> {
        let id = self.selected_id.as_deref()?;
        self.list.find(id)
    }

    pub fn begin_refresh(&mut self) {
        self.is_loading = true;
    }

    /// Applies the result of a fetch. A failed fetch keeps the previous items.
    pub fn finish_refresh<E: Display>(&mut self, result: Result<Vec<T>, E>) -> bool {
        self.is_loading = false;
        match result {
            Ok(items) => {
                self.error = None;
                self.set_items(items);
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn refresh_with<E: Display>(&mut self, fetch: impl FnOnce() -> Result<Vec<T>, E>) -> bool {
        self.begin_refresh();
        let result = fetch();
        self.finish_refresh(result)
    }

    fn cursor_id(&self) -> Option<String> {
        self.cursor_item().map(|item| item.id().to_string())
    }

    fn reselect(&mut self, id: Option<String>) {
        let position = id.as_deref().and_then(|id| self.list.position_of(id));
        self.viewport.reselect(position, self.list.len());
    }
}
