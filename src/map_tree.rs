use crate::entities::Identified;
use crate::fs_scan::ScannedEntry;
use crate::paths::{EntityId, file_name_of};
use std::path::{Path, PathBuf};

/// Directory or map file inside the map-pack directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapNode {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) is_dir: bool,
    pub(crate) children: Vec<MapNode>,
}

impl MapNode {
    fn dir(path: PathBuf) -> Self {
        MapNode {
            name: file_name_of(&path),
            path,
            is_dir: true,
            children: Vec::new(),
        }
    }

    fn file(path: PathBuf) -> Self {
        MapNode {
            name: file_name_of(&path),
            path,
            is_dir: false,
            children: Vec::new(),
        }
    }

    fn find(&self, id: &EntityId) -> Option<&MapNode> {
        if &self.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

impl Identified for MapNode {
    fn id(&self) -> EntityId {
        EntityId::from_path(&self.path)
    }
}

/// Tree of map packs mirroring a directory hierarchy.
///
/// Only file leaves can be current or selected; directory nodes never hold selection.
/// Selection is stored by identity, so it survives a rebuild of the nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MapTree {
    nodes: Vec<MapNode>,
    current: Option<EntityId>,
    selected: Vec<EntityId>,
}

impl MapTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds the tree from a recursive scan of `root_dir`.
    /// Files are kept only when `is_map_file` accepts them; directories are always kept.
    pub(crate) fn build_nodes(
        root_dir: &Path,
        entries: &[ScannedEntry],
        is_map_file: impl Fn(&ScannedEntry) -> bool,
    ) -> Vec<MapNode> {
        let mut roots: Vec<MapNode> = Vec::new();
        for entry in entries {
            let Ok(relative) = entry.path.strip_prefix(root_dir) else {
                continue;
            };
            let components: Vec<_> = relative.components().collect();
            let Some((last, parents)) = components.split_last() else {
                continue;
            };

            let mut level = &mut roots;
            let mut node_path = root_dir.to_path_buf();
            for component in parents {
                node_path.push(component);
                let pos = match level.iter().position(|n| n.is_dir && n.path == node_path) {
                    Some(pos) => pos,
                    None => {
                        level.push(MapNode::dir(node_path.clone()));
                        level.len() - 1
                    }
                };
                level = &mut level[pos].children;
            }
            node_path.push(last);

            if entry.is_dir {
                if !level.iter().any(|n| n.is_dir && n.path == node_path) {
                    level.push(MapNode::dir(node_path));
                }
            } else if entry.is_file && is_map_file(entry) {
                level.push(MapNode::file(node_path));
            }
        }
        roots
    }

    /// Swaps in freshly built nodes. Selection is cleared; restoring it is the caller's job.
    pub(crate) fn replace_nodes(&mut self, nodes: Vec<MapNode>) {
        self.nodes = nodes;
        self.current = None;
        self.selected.clear();
    }

    pub(crate) fn find(&self, id: &EntityId) -> Option<&MapNode> {
        self.nodes.iter().find_map(|n| n.find(id))
    }

    pub(crate) fn is_selectable(&self, id: &EntityId) -> bool {
        self.find(id).is_some_and(|n| !n.is_dir)
    }

    pub(crate) fn current_id(&self) -> Option<&EntityId> {
        self.current.as_ref()
    }

    pub(crate) fn selected_ids(&self) -> &[EntityId] {
        &self.selected
    }

    pub(crate) fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    /// Selected map files in the order they were selected.
    pub(crate) fn selected_files(&self) -> Vec<&MapNode> {
        self.selected.iter().filter_map(|id| self.find(id)).collect()
    }

    pub(crate) fn set_current(&mut self, id: &EntityId) -> bool {
        if self.is_selectable(id) {
            self.current = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub(crate) fn select(&mut self, id: &EntityId) -> bool {
        if !self.is_selectable(id) {
            return false;
        }
        if !self.selected.contains(id) {
            self.selected.push(id.clone());
        }
        true
    }

    pub(crate) fn deselect_all_and_unset_current(&mut self) {
        self.selected.clear();
        self.current = None;
    }

    /// Depth-first listing of all nodes with their depth, for display.
    pub(crate) fn flatten(&self) -> Vec<(usize, &MapNode)> {
        fn walk<'a>(nodes: &'a [MapNode], depth: usize, out: &mut Vec<(usize, &'a MapNode)>) {
            for node in nodes {
                out.push((depth, node));
                walk(&node.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_scan::MAP_SUFFIXES;

    fn entries() -> Vec<ScannedEntry> {
        vec![
            ScannedEntry::dir("/maps/megawads"),
            ScannedEntry::file("/maps/megawads/av.wad"),
            ScannedEntry::file("/maps/megawads/readme.txt"),
            ScannedEntry::file("/maps/scythe.wad"),
            ScannedEntry::file("/maps/deep/er/nested.pk3"),
        ]
    }

    fn tree() -> MapTree {
        let root = Path::new("/maps");
        let nodes = MapTree::build_nodes(root, &entries(), |e| e.has_suffix(MAP_SUFFIXES));
        let mut tree = MapTree::new();
        tree.replace_nodes(nodes);
        tree
    }

    fn id(path: &str) -> EntityId {
        EntityId::from_path(Path::new(path))
    }

    #[test]
    fn builds_hierarchy_in_scan_order_and_filters_files() {
        let tree = tree();
        let flat: Vec<(usize, &str)> = tree
            .flatten()
            .into_iter()
            .map(|(d, n)| (d, n.name.as_str()))
            .collect();
        assert_eq!(
            flat,
            vec![
                (0, "megawads"),
                (1, "av.wad"),
                (0, "scythe.wad"),
                (0, "deep"),
                (1, "er"),
                (2, "nested.pk3"),
            ]
        );
    }

    #[test]
    fn directories_cannot_be_selected() {
        let mut tree = tree();
        assert!(!tree.select(&id("/maps/megawads")));
        assert!(!tree.set_current(&id("/maps/deep")));
        assert!(tree.selected_ids().is_empty());
        assert!(tree.select(&id("/maps/deep/er/nested.pk3")));
    }

    #[test]
    fn selection_keeps_click_order_and_clears() {
        let mut tree = tree();
        assert!(tree.select(&id("/maps/scythe.wad")));
        assert!(tree.select(&id("/maps/megawads/av.wad")));
        assert!(tree.select(&id("/maps/scythe.wad")));
        assert!(tree.set_current(&id("/maps/scythe.wad")));
        let names: Vec<&str> = tree.selected_files().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["scythe.wad", "av.wad"]);

        tree.deselect_all_and_unset_current();
        assert!(tree.current_id().is_none());
        assert!(tree.selected_ids().is_empty());
    }
}
