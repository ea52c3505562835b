use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub column: K,
    pub direction: SortDirection,
}

/// Field value used by the default column comparison.
#[derive(Debug, Clone, Copy)]
pub enum SortValue<'a> {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Bool(_) => 1,
            SortValue::Int(_) | SortValue::Float(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

impl Ord for SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Bool(a), SortValue::Bool(b)) => u8::from(*a).cmp(&u8::from(*b)),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Int(a), SortValue::Float(b)) => (*a as f64).total_cmp(b),
            (SortValue::Float(a), SortValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (SortValue::Text(a), SortValue::Text(b)) => compare_text(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue<'_> {}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// A record the list engine can key, select and sort.
pub trait ListItem {
    type Column: Copy + Eq;

    fn id(&self) -> &str;

    fn sort_value(&self, column: Self::Column) -> SortValue<'_>;
}

/// Filter state that accepts partial updates.
///
/// Each field of the patch that is set overwrites the matching field of the
/// filter; unset fields keep their prior value.
pub trait MergeFilter: Clone {
    type Patch;

    fn merge(&mut self, patch: Self::Patch);
}

pub type CustomSort<T> = fn(&T, &T) -> Ordering;

pub struct Column<T: ListItem> {
    pub id: T::Column,
    pub label: &'static str,
    pub width: Option<u16>,
    pub center: bool,
    pub custom_sort: Option<CustomSort<T>>,
}

impl<T: ListItem> Column<T> {
    pub fn new(id: T::Column, label: &'static str) -> Self {
        Self {
            id,
            label,
            width: None,
            center: false,
            custom_sort: None,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn centered(mut self) -> Self {
        self.center = true;
        self
    }

    pub fn custom_sort(mut self, compare: CustomSort<T>) -> Self {
        self.custom_sort = Some(compare);
        self
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self.custom_sort {
            Some(compare) => compare(a, b),
            None => a.sort_value(self.id).cmp(&b.sort_value(self.id)),
        }
    }
}

impl<T: ListItem> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            label: self.label,
            width: self.width,
            center: self.center,
            custom_sort: self.custom_sort,
        }
    }
}

pub type Predicate<T, F> = fn(&T, &F) -> bool;

/// Source collection plus the filter and sort state that derive its visible rows.
///
/// The visible order is recomputed on every mutation and held until the next
/// one, so repeated reads return the same sequence.
pub struct FilteredList<T: ListItem, F: MergeFilter> {
    columns: Vec<Column<T>>,
    items: Vec<T>,
    predicate: Predicate<T, F>,
    initial_filter: F,
    filter: F,
    sort: Option<SortState<T::Column>>,
    visible: Vec<usize>,
}

impl<T: ListItem, F: MergeFilter> FilteredList<T, F> {
    pub fn new(
        columns: Vec<Column<T>>,
        items: Vec<T>,
        predicate: Predicate<T, F>,
        initial_filter: F,
    ) -> Self {
        let mut list = Self {
            columns,
            items,
            predicate,
            filter: initial_filter.clone(),
            initial_filter,
            sort: None,
            visible: Vec::new(),
        };
        list.derive();
        list
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortState<T::Column>> {
        self.sort
    }

    /// Indices into `items()` in visible order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().map(move |index| &self.items[*index])
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.visible
            .get(position)
            .and_then(|index| self.items.get(*index))
    }

    /// Position of `id` in the visible order.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.visible
            .iter()
            .position(|index| self.items[*index].id() == id)
    }

    /// Looks `id` up in the full source collection, visible or not.
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Header click: unset or another column starts ascending, the same column flips.
    pub fn set_sort(&mut self, column: T::Column) {
        self.sort = Some(match self.sort {
            Some(current) if current.column == column => SortState {
                column,
                direction: current.direction.toggle(),
            },
            _ => SortState {
                column,
                direction: SortDirection::Asc,
            },
        });
        self.derive();
    }

    pub fn clear_sort(&mut self) {
        if self.sort.take().is_some() {
            self.derive();
        }
    }

    pub fn set_filter(&mut self, patch: F::Patch) {
        self.filter.merge(patch);
        self.derive();
    }

    pub fn reset_filter(&mut self) {
        self.filter = self.initial_filter.clone();
        self.derive();
    }

    /// Replaces the whole source collection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.derive();
    }

    fn derive(&mut self) {
        let mut visible: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| (self.predicate)(item, &self.filter))
            .map(|(index, _)| index)
            .collect();

        if let Some(sort) = self.sort {
            if let Some(column) = self.columns.iter().find(|column| column.id == sort.column) {
                sort_indices(&mut visible, &self.items, column, sort.direction);
            }
        }

        self.visible = visible;
    }
}

fn sort_indices<T: ListItem>(
    indices: &mut [usize],
    items: &[T],
    column: &Column<T>,
    direction: SortDirection,
) {
    if indices.len() < 2 {
        return;
    }
    // `sort_by` is stable, and reversing an Equal ordering keeps it Equal.
    indices.sort_by(|a, b| direction.apply(column.compare(&items[*a], &items[*b])));
}
