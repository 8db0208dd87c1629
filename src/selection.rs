//! Identity-based view of list selection.
//!
//! List indices are invalidated by every mutation. These helpers translate the current and
//! selected items into identities before a mutation and back into indices after it, so the
//! same entries stay selected across reorders, insertions, deletions and full reloads.

use crate::entities::Identified;
use crate::list::EntityList;
use crate::paths::EntityId;

pub(crate) fn current_id<T: Identified>(list: &EntityList<T>) -> Option<EntityId> {
    list.current().map(Identified::id)
}

/// Identities of the selected items, in the order they were selected.
pub(crate) fn selected_ids<T: Identified>(list: &EntityList<T>) -> Vec<EntityId> {
    list.selected_indices()
        .iter()
        .filter_map(|&i| list.get(i))
        .map(Identified::id)
        .collect()
}

/// Makes the item with this identity current. Returns false when no such item exists.
pub(crate) fn restore_current<T: Identified>(list: &mut EntityList<T>, id: &EntityId) -> bool {
    match list.find_by_id(id) {
        Some(index) => list.set_current(index),
        None => false,
    }
}

/// Selects every item whose identity is still present; missing ones are skipped.
pub(crate) fn restore_selected<T: Identified>(list: &mut EntityList<T>, ids: &[EntityId]) {
    for id in ids {
        if let Some(index) = list.find_by_id(id) {
            list.select(index);
        }
    }
}

/// Compares two selections regardless of the order the items were clicked in.
pub(crate) fn are_selections_equal(a: &[EntityId], b: &[EntityId]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Selection of one list captured as identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectionSnapshot {
    pub(crate) current: Option<EntityId>,
    pub(crate) selected: Vec<EntityId>,
}

impl SelectionSnapshot {
    pub(crate) fn capture<T: Identified>(list: &EntityList<T>) -> Self {
        SelectionSnapshot {
            current: current_id(list),
            selected: selected_ids(list),
        }
    }

    /// Re-applies the snapshot onto a list whose selection was cleared.
    ///
    /// A current identity that no longer exists leaves the current item unset; there is no
    /// fallback to another item.
    pub(crate) fn restore<T: Identified>(&self, list: &mut EntityList<T>) {
        list.deselect_all_and_unset_current();
        restore_selected(list, &self.selected);
        if let Some(id) = &self.current {
            restore_current(list, id);
        }
    }

    pub(crate) fn same_selection(&self, other: &SelectionSnapshot) -> bool {
        self.current == other.current && are_selections_equal(&self.selected, &other.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::tests::{Item, list_of};

    fn id(name: &str) -> EntityId {
        EntityId::from_name(name)
    }

    #[test]
    fn restore_tolerates_missing_identities() {
        let mut list = list_of(&["A", "B", "C"]);
        assert!(!restore_current(&mut list, &id("Z")));
        assert_eq!(list.current_index(), None);

        restore_selected(&mut list, &[id("Z"), id("C")]);
        assert_eq!(list.selected_indices(), &[2]);
    }

    #[test]
    fn snapshot_survives_reordering() {
        let mut list = list_of(&["A", "B", "C"]);
        list.select(2);
        list.select(0);
        list.set_current(2);
        let snapshot = SelectionSnapshot::capture(&list);

        list.replace_all(vec![
            Item("C".to_string()),
            Item("X".to_string()),
            Item("A".to_string()),
        ]);
        assert!(list.current_index().is_none());
        snapshot.restore(&mut list);

        assert_eq!(list.current_index(), Some(0));
        let mut selected = list.selected_indices().to_vec();
        selected.sort_unstable();
        assert_eq!(selected, vec![0, 2]);
        assert!(SelectionSnapshot::capture(&list).same_selection(&snapshot));
    }

    #[test]
    fn current_becomes_unset_when_its_item_disappears() {
        let mut list = list_of(&["A", "B"]);
        list.choose_item(1);
        let snapshot = SelectionSnapshot::capture(&list);

        list.replace_all(vec![Item("A".to_string())]);
        snapshot.restore(&mut list);
        assert_eq!(list.current_index(), None);
        assert!(!list.is_something_selected());
    }

    #[test]
    fn selection_equality_ignores_click_order() {
        assert!(are_selections_equal(&[id("b"), id("a")], &[id("a"), id("b")]));
        assert!(!are_selections_equal(&[id("a")], &[id("a"), id("b")]));
    }
}
