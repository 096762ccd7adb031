//! Parent-first ordering of a flat todo set.
//!
//! The store hands back an unordered scan; rendering wants every parent
//! immediately followed by its subtree. This module rebuilds that order from
//! the `children` lists alone and never drops a record, however inconsistent
//! the parent/children mirror happens to be.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::db::entities::todo;

/// Order a flat record set parent-first, children in `children`-list order.
///
/// Records whose `parent_id` resolves to nothing reachable are emitted as
/// roots; children ids with no matching record are skipped; a record
/// referenced from more than one place keeps its first position only.
pub fn assemble(todos: Vec<todo::Model>) -> Vec<todo::Model> {
    let index: HashMap<Uuid, &todo::Model> = todos.iter().map(|t| (t.id, t)).collect();
    let mut order: Vec<Uuid> = Vec::with_capacity(todos.len());
    let mut emitted: HashSet<Uuid> = HashSet::with_capacity(todos.len());

    for root in todos.iter().filter(|t| t.parent_id.is_none()) {
        emit_subtree(root, &index, &mut order, &mut emitted);
    }

    // Orphan pass: anything still unemitted has a dangling parent_id or sits
    // outside every children chain. Treat it as a root of its own subtree.
    for orphan in todos.iter() {
        if !emitted.contains(&orphan.id) {
            emit_subtree(orphan, &index, &mut order, &mut emitted);
        }
    }

    let mut by_id: HashMap<Uuid, todo::Model> =
        todos.into_iter().map(|t| (t.id, t)).collect();
    order.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn emit_subtree(
    root: &todo::Model,
    index: &HashMap<Uuid, &todo::Model>,
    order: &mut Vec<Uuid>,
    emitted: &mut HashSet<Uuid>,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !emitted.insert(node.id) {
            continue;
        }
        order.push(node.id);
        // Reversed so the stack pops children in list order.
        for child_id in node.children.iter().rev() {
            if let Some(&child) = index.get(child_id) {
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use uuid::Uuid;

    use super::assemble;
    use crate::db::entities::todo::{self, ChildIds};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn node(id: Uuid, parent_id: Option<Uuid>, children: Vec<Uuid>) -> todo::Model {
        let now = ts();
        todo::Model {
            id,
            owner_id: Uuid::nil(),
            text: "todo".to_string(),
            status: false,
            parent_id,
            children: ChildIds(children),
            collapsed: false,
            background_color: "white".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(todos: &[todo::Model]) -> Vec<Uuid> {
        todos.iter().map(|t| t.id).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(assemble(Vec::new()).is_empty());
    }

    #[test]
    fn chain_is_ordered_parent_first() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // Scan order deliberately scrambled.
        let flat = vec![
            node(c, Some(b), vec![]),
            node(a, None, vec![b]),
            node(b, Some(a), vec![c]),
        ];

        assert_eq!(ids(&assemble(flat)), vec![a, b, c]);
    }

    #[test]
    fn siblings_follow_the_children_list_order_not_the_scan_order() {
        let root = Uuid::new_v4();
        let (x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let flat = vec![
            node(z, Some(root), vec![]),
            node(x, Some(root), vec![]),
            node(root, None, vec![y, z, x]),
            node(y, Some(root), vec![]),
        ];

        assert_eq!(ids(&assemble(flat)), vec![root, y, z, x]);
    }

    #[test]
    fn subtree_is_emitted_before_the_next_root() {
        let (a, a1, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let flat = vec![
            node(a, None, vec![a1]),
            node(b, None, vec![]),
            node(a1, Some(a), vec![]),
        ];

        assert_eq!(ids(&assemble(flat)), vec![a, a1, b]);
    }

    #[test]
    fn missing_children_ids_are_skipped() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let flat = vec![node(root, None, vec![gone, child]), node(child, Some(root), vec![])];

        assert_eq!(ids(&assemble(flat)), vec![root, child]);
    }

    #[test]
    fn dangling_parent_makes_the_record_a_root() {
        let root = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let flat = vec![node(root, None, vec![]), node(orphan, Some(Uuid::new_v4()), vec![])];

        assert_eq!(ids(&assemble(flat)), vec![root, orphan]);
    }

    #[test]
    fn orphan_keeps_its_own_subtree() {
        let orphan = Uuid::new_v4();
        let child = Uuid::new_v4();
        let flat = vec![
            node(orphan, Some(Uuid::new_v4()), vec![child]),
            node(child, Some(orphan), vec![]),
        ];

        assert_eq!(ids(&assemble(flat)), vec![orphan, child]);
    }

    #[test]
    fn duplicate_reference_keeps_first_occurrence_only() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let shared = Uuid::new_v4();
        // Corrupted mirror: both roots claim the same child.
        let flat = vec![
            node(a, None, vec![shared]),
            node(b, None, vec![shared]),
            node(shared, Some(a), vec![]),
        ];

        assert_eq!(ids(&assemble(flat)), vec![a, shared, b]);
    }

    #[test]
    fn every_record_survives_a_children_cycle() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // Corrupted data: two nodes claiming each other.
        let flat = vec![node(a, Some(b), vec![b]), node(b, Some(a), vec![a])];

        let out = assemble(flat);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, a);
        assert_eq!(out[1].id, b);
    }

    #[test]
    fn totality_holds_for_arbitrary_inconsistent_input() {
        let all: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let flat = vec![
            node(all[0], None, vec![all[1], all[2]]),
            node(all[1], Some(all[0]), vec![]),
            node(all[2], Some(all[0]), vec![all[3], Uuid::new_v4()]),
            node(all[3], Some(all[2]), vec![]),
            node(all[4], Some(Uuid::new_v4()), vec![all[5]]),
            node(all[5], Some(all[4]), vec![]),
            node(all[6], None, vec![all[1]]),
            node(all[7], Some(all[7]), vec![]),
        ];

        let out = assemble(flat);
        assert_eq!(out.len(), all.len());
        let mut seen: Vec<Uuid> = ids(&out);
        seen.sort();
        let mut expected = all.clone();
        expected.sort();
        assert_eq!(seen, expected);
    }
}
