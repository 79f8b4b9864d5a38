//! Child map construction and root location.

use rivers_core::errors::TreeError;
use rivers_core::types::collections::{FxHashMap, FxHashSet};
use rivers_core::types::Edge;
use smallvec::SmallVec;

/// Tributary ids per confluence, in priority order: the tributary with the
/// larger upstream area (the mainstem) first. After binarization almost
/// every entry holds at most two ids.
pub type ChildMap = FxHashMap<i64, SmallVec<[i64; 2]>>;

/// Group edges by the confluence they flow into and order each group by
/// drainage priority. Ties keep insertion order; the order must be stable
/// so reruns pick the same mainstem.
pub fn build_child_map(edges: &[Edge]) -> ChildMap {
    let area: FxHashMap<i64, f64> = edges.iter().map(|e| (e.id, e.upstream_area)).collect();

    let mut map: ChildMap = FxHashMap::default();
    for edge in edges {
        map.entry(edge.downstream_id).or_default().push(edge.id);
    }
    for tribs in map.values_mut() {
        tribs.sort_by(|a, b| {
            area[b]
                .partial_cmp(&area[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    map
}

/// Locate the basin outlet: the one edge whose `downstream_id` references
/// no edge in the set. Ambiguity is surfaced, never silently resolved.
pub fn find_root(edges: &[Edge], basin_id: i64) -> Result<i64, TreeError> {
    let ids: FxHashSet<i64> = edges.iter().map(|e| e.id).collect();

    let candidates: Vec<i64> = edges
        .iter()
        .filter(|e| !ids.contains(&e.downstream_id))
        .map(|e| e.id)
        .collect();

    match candidates.as_slice() {
        [root] => Ok(*root),
        [] => Err(TreeError::RootNotFound { basin_id }),
        _ => Err(TreeError::MultipleRoots {
            basin_id,
            candidates,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: i64, down: i64, area: f64) -> Edge {
        Edge::new(id, down, 1.0, area, 1)
    }

    #[test]
    fn test_child_map_priority_order() {
        let edges = vec![
            edge(1, 10, 2.0),
            edge(2, 10, 5.0),
            edge(10, 0, 8.0),
        ];
        let map = build_child_map(&edges);
        // Larger area first
        assert_eq!(map[&10].as_slice(), &[2, 1]);
    }

    #[test]
    fn test_child_map_tie_keeps_insertion_order() {
        let edges = vec![
            edge(7, 10, 3.0),
            edge(4, 10, 3.0),
            edge(10, 0, 6.0),
        ];
        let map = build_child_map(&edges);
        assert_eq!(map[&10].as_slice(), &[7, 4]);
    }

    #[test]
    fn test_find_root_unique() {
        let edges = vec![edge(1, 2, 1.0), edge(2, 3, 2.0), edge(3, 99, 3.0)];
        assert_eq!(find_root(&edges, 3).unwrap(), 3);
    }

    #[test]
    fn test_find_root_ambiguous() {
        let edges = vec![edge(1, 98, 1.0), edge(2, 99, 2.0)];
        let err = find_root(&edges, 5).unwrap_err();
        match err {
            TreeError::MultipleRoots {
                basin_id,
                candidates,
            } => {
                assert_eq!(basin_id, 5);
                assert_eq!(candidates, vec![1, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_root_cycle_has_none() {
        let edges = vec![edge(1, 2, 1.0), edge(2, 1, 2.0)];
        assert!(matches!(
            find_root(&edges, 9),
            Err(TreeError::RootNotFound { basin_id: 9 })
        ));
    }
}
