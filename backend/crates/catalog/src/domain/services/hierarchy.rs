//! Category Hierarchy Rules

use std::collections::{HashMap, HashSet, VecDeque};

use kernel::id::CategoryId;

use crate::domain::entity::category::{Category, SubcategorySummary};

/// `(id, parent_id)` edge of the category forest
pub type ParentLink = (CategoryId, Option<CategoryId>);

/// Whether re-parenting `target` under `new_parent` would close a loop.
///
/// True when `new_parent` is `target` itself or any transitive
/// descendant of `target`. Walks breadth-first with a visited set, so
/// corrupted data that already contains a loop still terminates.
pub fn creates_cycle(target: CategoryId, new_parent: CategoryId, links: &[ParentLink]) -> bool {
    if new_parent == target {
        return true;
    }

    let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for &(id, parent) in links {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut visited = HashSet::from([target]);
    let mut queue = VecDeque::from([target]);

    while let Some(current) = queue.pop_front() {
        for &child in children.get(&current).into_iter().flatten() {
            if child == new_parent {
                return true;
            }
            if visited.insert(child) {
                queue.push_back(child);
            }
        }
    }

    false
}

/// Pair every category with its immediate children.
///
/// Order of `categories` is preserved at both levels, so a name-sorted
/// input yields name-sorted parents and children.
pub fn with_children(categories: Vec<Category>) -> Vec<(Category, Vec<SubcategorySummary>)> {
    let mut children: HashMap<CategoryId, Vec<SubcategorySummary>> = HashMap::new();
    for category in &categories {
        if let Some(parent) = category.parent_id {
            children
                .entry(parent)
                .or_default()
                .push(category.to_summary());
        }
    }

    categories
        .into_iter()
        .map(|category| {
            let subs = children.remove(&category.id).unwrap_or_default();
            (category, subs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> CategoryId {
        CategoryId::from_i64(n)
    }

    // 1 -> 2 -> 3 -> 4, and 5 standalone
    fn chain() -> Vec<ParentLink> {
        vec![
            (id(1), None),
            (id(2), Some(id(1))),
            (id(3), Some(id(2))),
            (id(4), Some(id(3))),
            (id(5), None),
        ]
    }

    #[test]
    fn test_self_is_cycle() {
        assert!(creates_cycle(id(1), id(1), &chain()));
    }

    #[test]
    fn test_any_descendant_is_cycle() {
        for descendant in [2, 3, 4] {
            assert!(creates_cycle(id(1), id(descendant), &chain()));
        }
        assert!(creates_cycle(id(2), id(4), &chain()));
    }

    #[test]
    fn test_ancestor_or_unrelated_is_fine() {
        assert!(!creates_cycle(id(4), id(1), &chain()));
        assert!(!creates_cycle(id(3), id(5), &chain()));
        assert!(!creates_cycle(id(5), id(4), &chain()));
    }

    #[test]
    fn test_existing_loop_terminates() {
        let links = vec![(id(1), Some(id(2))), (id(2), Some(id(1))), (id(3), None)];
        assert!(!creates_cycle(id(1), id(3), &links));
        assert!(creates_cycle(id(1), id(2), &links));
    }
}
