//! Forest assembly from a flat task list.
//!
//! Every view that shows tasks nested under their parents goes through
//! [`assemble_forest`]. The input is usually a filtered subset of a user's
//! tasks; a task whose parent is not in that subset is shown at top level.

use crate::types::{Task, TaskTree};
use std::collections::{HashMap, HashSet};

/// Top-level tasks plus a child list for every task in the input.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub top_level: Vec<Task>,
    pub children_of: HashMap<i64, Vec<Task>>,
}

/// Group tasks under their parents in two passes.
///
/// Order within `top_level` and each child list follows input order.
pub fn assemble_forest(tasks: Vec<Task>) -> Forest {
    let mut children_of: HashMap<i64, Vec<Task>> =
        tasks.iter().map(|t| (t.id, Vec::new())).collect();
    let mut top_level = Vec::new();

    for task in tasks {
        match task.parent_id {
            Some(pid) if pid != task.id && children_of.contains_key(&pid) => {
                if let Some(siblings) = children_of.get_mut(&pid) {
                    siblings.push(task);
                }
            }
            _ => top_level.push(task),
        }
    }

    Forest {
        top_level,
        children_of,
    }
}

impl Forest {
    /// Direct children of `id`, empty if none or if `id` is not in the forest.
    pub fn children(&self, id: i64) -> &[Task] {
        self.children_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of tasks reachable from the top level.
    pub fn len(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Depth-first pre-order walk, calling `visit(task, depth)`.
    ///
    /// Each task is visited at most once, so cyclic parent links in the
    /// underlying data cannot loop.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Task, usize),
    {
        let mut seen = HashSet::new();
        for root in &self.top_level {
            self.walk_from(root, 0, &mut seen, &mut visit);
        }
    }

    fn walk_from<F>(&self, task: &Task, depth: usize, seen: &mut HashSet<i64>, visit: &mut F)
    where
        F: FnMut(&Task, usize),
    {
        if !seen.insert(task.id) {
            return;
        }
        visit(task, depth);
        for child in self.children(task.id) {
            self.walk_from(child, depth + 1, seen, visit);
        }
    }

    /// Nested trees rooted at the top-level tasks.
    pub fn trees(&self) -> Vec<TaskTree> {
        let mut seen = HashSet::new();
        self.top_level
            .iter()
            .filter_map(|root| self.tree_from(root, &mut seen))
            .collect()
    }

    fn tree_from(&self, task: &Task, seen: &mut HashSet<i64>) -> Option<TaskTree> {
        if !seen.insert(task.id) {
            return None;
        }
        let children = self
            .children(task.id)
            .iter()
            .filter_map(|child| self.tree_from(child, seen))
            .collect();
        Some(TaskTree {
            task: task.clone(),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;

    fn task(id: i64, parent_id: Option<i64>) -> Task {
        Task {
            id,
            user_id: "u1".into(),
            title: format!("task {}", id),
            description: None,
            due_date: None,
            important: false,
            urgent: false,
            status: TaskStatus::Pending,
            period: None,
            parent_id,
            is_archived: false,
            archived_by: None,
            archived_at: None,
            archive_reason: None,
            remind_at: None,
            remind_type: None,
            is_reminded: false,
            difficulty: None,
            motivation: None,
            completion_rate: None,
            feedback: None,
            created_at: id,
            updated_at: id,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_children_grouped_under_parent() {
        let forest = assemble_forest(vec![
            task(1, None),
            task(2, Some(1)),
            task(3, Some(1)),
            task(4, Some(2)),
        ]);
        assert_eq!(ids(&forest.top_level), vec![1]);
        assert_eq!(ids(forest.children(1)), vec![2, 3]);
        assert_eq!(ids(forest.children(2)), vec![4]);
        assert!(forest.children(4).is_empty());
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn test_missing_parent_promotes_to_top_level() {
        // Parent 1 was filtered out of this view
        let forest = assemble_forest(vec![task(2, Some(1)), task(3, Some(2))]);
        assert_eq!(ids(&forest.top_level), vec![2]);
        assert_eq!(ids(forest.children(2)), vec![3]);
        assert!(!forest.children_of.contains_key(&1));
    }

    #[test]
    fn test_every_child_listed_under_present_parent() {
        let tasks = vec![
            task(10, None),
            task(11, Some(10)),
            task(12, Some(99)),
            task(13, Some(11)),
            task(14, None),
        ];
        let forest = assemble_forest(tasks.clone());
        for t in &tasks {
            match t.parent_id {
                Some(p) if tasks.iter().any(|x| x.id == p) => {
                    assert!(forest.children(p).iter().any(|c| c.id == t.id));
                }
                _ => assert!(forest.top_level.iter().any(|c| c.id == t.id)),
            }
        }
    }

    #[test]
    fn test_trees_nest_arbitrarily_deep() {
        let forest = assemble_forest(vec![
            task(1, None),
            task(2, Some(1)),
            task(3, Some(2)),
            task(4, Some(3)),
        ]);
        let trees = forest.trees();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].size(), 4);
        assert_eq!(trees[0].children[0].children[0].children[0].task.id, 4);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        // 1 and 2 point at each other; 3 hangs off 2. None is reachable
        // from the top level, but assembly and walking still terminate.
        let forest = assemble_forest(vec![task(1, Some(2)), task(2, Some(1)), task(3, Some(2))]);
        assert!(forest.top_level.is_empty());
        assert_eq!(forest.len(), 0);
        assert!(forest.trees().is_empty());
    }

    #[test]
    fn test_self_parent_is_top_level() {
        let forest = assemble_forest(vec![task(5, Some(5))]);
        assert_eq!(ids(&forest.top_level), vec![5]);
    }

    #[test]
    fn test_walk_reports_depth() {
        let forest = assemble_forest(vec![task(1, None), task(2, Some(1)), task(3, Some(2))]);
        let mut seen = Vec::new();
        forest.walk(|t, depth| seen.push((t.id, depth)));
        assert_eq!(seen, vec![(1, 0), (2, 1), (3, 2)]);
    }
}
