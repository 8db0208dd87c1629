use crate::debuglog::debug_log_line;
use crate::entities::Identified;
use crate::error::ScanError;
use crate::fs_scan::{DirScanner, EntryTypes, ScannedEntry};
use crate::list::EntityList;
use crate::map_tree::MapTree;
use crate::selection::SelectionSnapshot;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReloadSummary {
    pub(crate) entries: usize,
    pub(crate) current_restored: bool,
    /// Current item and selection came back exactly as before the reload.
    pub(crate) selection_kept: bool,
}

/// Rebuilds a list from the current content of a directory.
///
/// The list is cleared and filled again from scratch rather than diffed, then the previous
/// selection is re-applied by identity. `make_item` decides which entries belong in the
/// list. When the scan fails the list and its selection are left exactly as they were.
pub(crate) fn update_list_from_dir<T, S, F>(
    list: &mut EntityList<T>,
    scanner: &S,
    dir: &Path,
    recursive: bool,
    make_item: F,
) -> Result<ReloadSummary, ScanError>
where
    T: Identified,
    S: DirScanner + ?Sized,
    F: Fn(&ScannedEntry) -> Option<T>,
{
    let snapshot = SelectionSnapshot::capture(list);

    let entries = scanner.scan(dir, recursive, EntryTypes::Files)?;
    let items: Vec<T> = entries.iter().filter_map(&make_item).collect();

    list.replace_all(items);
    snapshot.restore(list);

    let summary = ReloadSummary {
        entries: list.len(),
        current_restored: snapshot.current.is_none() || list.current_index().is_some(),
        selection_kept: SelectionSnapshot::capture(list).same_selection(&snapshot),
    };
    debug_log_line(&format!(
        "reloaded {} entries from {} (current restored: {}, selection kept: {})",
        summary.entries,
        dir.display(),
        summary.current_restored,
        summary.selection_kept
    ));
    Ok(summary)
}

/// Rebuilds the map-pack tree from a recursive scan of `dir`, keeping selected leaves that
/// still exist.
pub(crate) fn update_map_tree_from_dir<S, F>(
    tree: &mut MapTree,
    scanner: &S,
    dir: &Path,
    is_map_file: F,
) -> Result<ReloadSummary, ScanError>
where
    S: DirScanner + ?Sized,
    F: Fn(&ScannedEntry) -> bool,
{
    let current = tree.current_id().cloned();
    let selected = tree.selected_ids().to_vec();

    let entries = scanner.scan(dir, true, EntryTypes::Both)?;
    let nodes = MapTree::build_nodes(dir, &entries, is_map_file);

    tree.replace_nodes(nodes);
    for id in &selected {
        tree.select(id);
    }
    let current_restored = match &current {
        Some(id) => tree.set_current(id),
        None => true,
    };
    let selection_kept = current_restored && tree.selected_ids().len() == selected.len();

    debug_log_line(&format!(
        "reloaded map tree from {} ({} nodes, current restored: {}, selection kept: {})",
        dir.display(),
        tree.flatten().len(),
        current_restored,
        selection_kept
    ));
    Ok(ReloadSummary {
        entries: tree.flatten().len(),
        current_restored,
        selection_kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Iwad;
    use crate::fs_scan::fake::FakeFs;
    use crate::fs_scan::{IWAD_SUFFIXES, MAP_SUFFIXES};
    use crate::paths::EntityId;

    fn iwad_item(entry: &ScannedEntry) -> Option<Iwad> {
        entry
            .has_suffix(IWAD_SUFFIXES)
            .then(|| Iwad::from_path(&entry.path))
    }

    fn fake_fs() -> FakeFs {
        let fs = FakeFs::new();
        fs.add_file("/wads/doom.wad");
        fs.add_file("/wads/doom2.wad");
        fs.add_file("/wads/notes.txt");
        fs.add_file("/wads/tnt.wad");
        fs
    }

    #[test]
    fn reload_keeps_selection_by_identity() {
        let fs = fake_fs();
        let dir = Path::new("/wads");
        let mut list = EntityList::new();
        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        assert_eq!(list.len(), 3);
        list.choose_item(1);

        fs.remove_file("/wads/doom.wad");
        fs.add_file("/wads/aaa.wad");
        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");

        let names: Vec<_> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["doom2.wad", "tnt.wad", "aaa.wad"]);
        assert_eq!(list.current().map(|i| i.name.as_str()), Some("doom2.wad"));
        assert_eq!(list.selected_indices(), &[0]);
    }

    #[test]
    fn reload_is_idempotent() {
        let fs = fake_fs();
        let dir = Path::new("/wads");
        let mut list = EntityList::new();
        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        list.choose_item(2);

        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        let first = list.clone();
        let summary = update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        assert!(summary.selection_kept);
        assert_eq!(list, first);
    }

    #[test]
    fn current_is_unset_when_file_disappears() {
        let fs = fake_fs();
        let dir = Path::new("/wads");
        let mut list = EntityList::new();
        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        list.choose_item(2);

        fs.remove_file("/wads/tnt.wad");
        let summary = update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        assert!(!summary.current_restored);
        assert!(!summary.selection_kept);
        assert_eq!(list.current_index(), None);
        assert!(!list.is_something_selected());
    }

    #[test]
    fn failed_scan_leaves_list_untouched() {
        let fs = fake_fs();
        let dir = Path::new("/wads");
        let mut list = EntityList::new();
        update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect("reload");
        list.choose_item(0);
        let before = list.clone();

        fs.fail_on("/wads");
        let err = update_list_from_dir(&mut list, &fs, dir, false, iwad_item).expect_err("scan");
        assert_eq!(err.dir, dir);
        assert_eq!(list, before);
    }

    #[test]
    fn map_tree_reload_restores_selected_leaf() {
        let fs = FakeFs::new();
        fs.add_file("/maps/a/one.wad");
        fs.add_file("/maps/two.pk3");
        let dir = Path::new("/maps");
        let is_map = |e: &ScannedEntry| e.has_suffix(MAP_SUFFIXES);

        let mut tree = MapTree::new();
        update_map_tree_from_dir(&mut tree, &fs, dir, is_map).expect("reload");
        let one = EntityId::from_path(Path::new("/maps/a/one.wad"));
        assert!(tree.select(&one));
        assert!(tree.set_current(&one));

        fs.add_file("/maps/a/zero.wad");
        let summary = update_map_tree_from_dir(&mut tree, &fs, dir, is_map).expect("reload");
        assert!(summary.current_restored);
        assert!(summary.selection_kept);
        assert_eq!(tree.current_id(), Some(&one));
        assert_eq!(tree.selected_ids(), &[one.clone()]);

        fs.remove_file("/maps/a/one.wad");
        update_map_tree_from_dir(&mut tree, &fs, dir, is_map).expect("reload");
        assert!(tree.current_id().is_none());
        assert!(tree.selected_ids().is_empty());
    }
}
