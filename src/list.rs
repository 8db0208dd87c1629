use crate::entities::{Identified, Named};
use crate::error::ListError;
use crate::paths::EntityId;
use crate::util::unique_name;

/// Index-based selection state of one list, the way a list view would hold it.
///
/// `selected` keeps click order. Indices are only meaningful until the next mutation of
/// the list; anything that must survive a rebuild goes through identities instead
/// (see `selection.rs`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    current: Option<usize>,
    selected: Vec<usize>,
}

/// An ordered, user-arranged list of entries plus its selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntityList<T> {
    items: Vec<T>,
    selection: Selection,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        EntityList {
            items: Vec::new(),
            selection: Selection::default(),
        }
    }
}

impl<T> EntityList<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    // current item

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.selection.current
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.selection.current.and_then(|i| self.items.get(i))
    }

    pub(crate) fn set_current(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selection.current = Some(index);
            true
        } else {
            false
        }
    }

    pub(crate) fn unset_current(&mut self) {
        self.selection.current = None;
    }

    // selected items

    pub(crate) fn selected_indices(&self) -> &[usize] {
        &self.selection.selected
    }

    pub(crate) fn is_selected(&self, index: usize) -> bool {
        self.selection.selected.contains(&index)
    }

    pub(crate) fn is_something_selected(&self) -> bool {
        !self.selection.selected.is_empty()
    }

    /// The single selected index. Fails when nothing or more than one item is selected.
    pub(crate) fn selected_index(&self) -> Result<usize, ListError> {
        match self.selection.selected.as_slice() {
            [] => Err(ListError::NothingSelected),
            [index] => Ok(*index),
            _ => Err(ListError::MultipleSelected),
        }
    }

    pub(crate) fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if !self.selection.selected.contains(&index) {
            self.selection.selected.push(index);
        }
        true
    }

    pub(crate) fn deselect(&mut self, index: usize) {
        self.selection.selected.retain(|&i| i != index);
    }

    // high-level control

    pub(crate) fn select_and_set_current(&mut self, index: usize) {
        if self.select(index) {
            self.selection.current = Some(index);
        }
    }

    pub(crate) fn deselect_all_and_unset_current(&mut self) {
        self.selection = Selection::default();
    }

    /// Deselects everything, selects the item and makes it current, like a left click.
    pub(crate) fn choose_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.deselect_all_and_unset_current();
        self.select_and_set_current(index);
        true
    }
}

impl<T: Identified> EntityList<T> {
    /// Builds a list, dropping entries whose identity already appeared earlier.
    pub(crate) fn from_items(items: Vec<T>) -> Self {
        let mut list = EntityList::new();
        list.replace_all(items);
        list
    }

    /// Replaces the whole content. Selection is cleared; restoring it is the caller's job.
    pub(crate) fn replace_all(&mut self, items: Vec<T>) {
        self.deselect_all_and_unset_current();
        self.items.clear();
        for item in items {
            if !self.contains_id(&item.id()) {
                self.items.push(item);
            }
        }
    }

    pub(crate) fn find_by_id(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| &item.id() == id)
    }

    pub(crate) fn contains_id(&self, id: &EntityId) -> bool {
        self.find_by_id(id).is_some()
    }

    fn ensure_unique(&self, item: &T) -> Result<(), ListError> {
        let id = item.id();
        if self.contains_id(&id) {
            return Err(ListError::DuplicateName(id.to_string()));
        }
        Ok(())
    }

    /// Adds an item to the end of the list and selects it.
    pub(crate) fn append(&mut self, item: T) -> Result<usize, ListError> {
        let len = self.items.len();
        self.insert(len, item)
    }

    /// Adds an item to the beginning of the list and selects it.
    pub(crate) fn prepend(&mut self, item: T) -> Result<usize, ListError> {
        self.insert(0, item)
    }

    /// Adds an item at `index` and selects it.
    pub(crate) fn insert(&mut self, index: usize, item: T) -> Result<usize, ListError> {
        if index > self.items.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.ensure_unique(&item)?;
        self.deselect_all_and_unset_current();
        self.items.insert(index, item);
        self.select_and_set_current(index);
        Ok(index)
    }

    /// Deletes the selected item and selects the one that took its place, so that repeated
    /// deletes walk through the list.
    pub(crate) fn delete_selected_item(&mut self) -> Result<usize, ListError> {
        let selected_idx = self.selected_index()?;

        self.deselect_all_and_unset_current();
        self.items.remove(selected_idx);

        if selected_idx < self.items.len() {
            self.select_and_set_current(selected_idx);
        } else if selected_idx > 0 {
            self.select_and_set_current(selected_idx - 1);
        }
        Ok(selected_idx)
    }

    /// Deletes all selected items. Returns the deleted indices in ascending order.
    pub(crate) fn delete_selected_items(&mut self) -> Result<Vec<usize>, ListError> {
        let indices = self.selection.selected.clone();
        self.delete_items(&indices)
    }

    /// Deletes the items at `indices`, given in any order.
    ///
    /// Indices are normalised to ascending order without duplicates before deleting,
    /// and any out-of-range index rejects the whole operation.
    pub(crate) fn delete_items(&mut self, indices: &[usize]) -> Result<Vec<usize>, ListError> {
        if indices.is_empty() {
            return Err(ListError::NothingSelected);
        }
        let mut ascending = indices.to_vec();
        ascending.sort_unstable();
        ascending.dedup();
        if let Some(&last) = ascending.last()
            && last >= self.items.len()
        {
            return Err(ListError::IndexOutOfRange {
                index: last,
                len: self.items.len(),
            });
        }

        let first_selected_idx = ascending[0];
        self.deselect_all_and_unset_current();

        for (deleted_cnt, &selected_idx) in ascending.iter().enumerate() {
            self.items.remove(selected_idx - deleted_cnt);
        }

        if first_selected_idx < self.items.len() {
            self.select_and_set_current(first_selected_idx);
        } else if !self.items.is_empty() {
            self.select_and_set_current(self.items.len() - 1);
        }
        Ok(ascending)
    }

    /// Moves the selected item one position up. No-op at the top.
    pub(crate) fn move_up_selected_item(&mut self) -> Result<usize, ListError> {
        let selected_idx = self.selected_index()?;
        if selected_idx == 0 {
            return Ok(selected_idx);
        }

        let current_idx = self.selection.current;
        self.unset_current();
        self.deselect(selected_idx);

        self.items.swap(selected_idx, selected_idx - 1);

        self.select_and_set_current(selected_idx - 1);
        if let Some(current_idx) = current_idx {
            self.selection.current = Some(current_idx.saturating_sub(1));
        }
        Ok(selected_idx)
    }

    /// Moves the selected item one position down. No-op at the bottom.
    pub(crate) fn move_down_selected_item(&mut self) -> Result<usize, ListError> {
        let selected_idx = self.selected_index()?;
        let last_idx = self.items.len() - 1;
        if selected_idx == last_idx {
            return Ok(selected_idx);
        }

        let current_idx = self.selection.current;
        self.unset_current();
        self.deselect(selected_idx);

        self.items.swap(selected_idx, selected_idx + 1);

        self.select_and_set_current(selected_idx + 1);
        if let Some(current_idx) = current_idx {
            self.selection.current = Some(if current_idx < last_idx {
                current_idx + 1
            } else {
                last_idx
            });
        }
        Ok(selected_idx)
    }

    /// Moves all selected items one position up, as a block.
    ///
    /// Returns the original indices in ascending order, or nothing when the block
    /// already touches the top.
    pub(crate) fn move_up_selected_items(&mut self) -> Result<Vec<usize>, ListError> {
        if self.selection.selected.is_empty() {
            return Err(ListError::NothingSelected);
        }
        let mut ascending = self.selection.selected.clone();
        ascending.sort_unstable();
        ascending.dedup();

        if ascending[0] == 0 {
            return Ok(Vec::new());
        }

        let current_idx = self.selection.current;
        self.deselect_all_and_unset_current();

        for &selected_idx in &ascending {
            self.items.swap(selected_idx, selected_idx - 1);
            self.select(selected_idx - 1);
        }

        self.selection.current = current_idx.map(|idx| idx.saturating_sub(1));
        Ok(ascending)
    }

    /// Moves all selected items one position down, as a block.
    ///
    /// Returns the original indices in descending order, or nothing when the block
    /// already touches the bottom.
    pub(crate) fn move_down_selected_items(&mut self) -> Result<Vec<usize>, ListError> {
        if self.selection.selected.is_empty() {
            return Err(ListError::NothingSelected);
        }
        let mut descending = self.selection.selected.clone();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        descending.dedup();

        let last_idx = self.items.len() - 1;
        if descending[0] == last_idx {
            return Ok(Vec::new());
        }

        let current_idx = self.selection.current;
        self.deselect_all_and_unset_current();

        for &selected_idx in &descending {
            self.items.swap(selected_idx, selected_idx + 1);
            self.select(selected_idx + 1);
        }

        self.selection.current =
            current_idx.map(|idx| if idx < last_idx { idx + 1 } else { last_idx });
        Ok(descending)
    }
}

impl<T: Identified + Named + Clone> EntityList<T> {
    /// Appends a copy of the selected item with " - clone" added to its name and selects it.
    /// A name that is already taken gets a number appended.
    pub(crate) fn clone_selected_item(&mut self) -> Result<usize, ListError> {
        let selected_idx = self.selected_index()?;
        let mut copy = self.items[selected_idx].clone();
        let new_name = unique_name(&format!("{} - clone", copy.name()), |n| {
            self.items.iter().any(|item| item.name() == n)
        });
        copy.set_name(new_name);
        self.append(copy)
    }
}
