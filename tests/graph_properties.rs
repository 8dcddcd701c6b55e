// tests/graph_properties.rs

use std::collections::HashSet;

use proptest::prelude::*;
use taskdag::dag::{detect_cycle, frontier, validate};
use taskdag::document::{Task, TaskMap};
use taskdag::types::{format_task_id, TaskStatus};

const STATUSES: [TaskStatus; 4] = TaskStatus::ALL;

// Strategy for an acyclic plan: task i may only depend on tasks 0..i.
// Document order is shuffled afterwards so it does not follow the edges.
fn acyclic_plan_strategy(max_tasks: usize) -> impl Strategy<Value = TaskMap> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        );
        let statuses = proptest::collection::vec(0..STATUSES.len(), num_tasks);
        let order = Just((0..num_tasks).collect::<Vec<usize>>()).prop_shuffle();

        (deps, statuses, order).prop_map(move |(raw_deps, statuses, order)| {
            let mut tasks: Vec<Task> = raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut task = Task::new(format_task_id(i as u64 + 1, 3), format!("t{i}"));
                    task.status = STATUSES[statuses[i]];
                    let mut seen = HashSet::new();
                    for d in potential {
                        if i > 0 && seen.insert(d % i) {
                            task.dependencies.push(format_task_id((d % i) as u64 + 1, 3));
                        }
                    }
                    task
                })
                .collect();

            let mut shuffled = Vec::with_capacity(tasks.len());
            for idx in order {
                shuffled.push(std::mem::replace(&mut tasks[idx], Task::new("", "")));
            }
            shuffled.into_iter().collect()
        })
    })
}

proptest! {
    #[test]
    fn acyclic_plans_have_no_cycle(tasks in acyclic_plan_strategy(12)) {
        prop_assert!(detect_cycle(&tasks).is_empty());
        prop_assert!(validate(&tasks).is_ok());
    }

    #[test]
    fn frontier_only_contains_ready_tasks(tasks in acyclic_plan_strategy(12)) {
        let ready = frontier(&tasks).expect("acyclic plans are consistent");
        for id in &ready {
            let task = tasks.get(id).expect("frontier ids exist");
            prop_assert_eq!(task.status, TaskStatus::Pending);
            for dep in &task.dependencies {
                prop_assert_eq!(tasks.status_of(dep), Some(TaskStatus::Completed));
            }
        }
        // Every eligible task is included.
        let eligible = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| t.dependencies.iter().all(|d| tasks.status_of(d) == Some(TaskStatus::Completed)))
            .count();
        prop_assert_eq!(ready.len(), eligible);
        // Priorities never decrease along the list.
        let priorities: Vec<_> = ready.iter().map(|id| tasks.get(id).map(|t| t.priority)).collect();
        prop_assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn closing_a_back_edge_creates_a_reported_cycle(tasks in acyclic_plan_strategy(12)) {
        // Find any edge a -> b and add b -> a.
        let edge = tasks
            .iter()
            .find_map(|t| t.dependencies.first().map(|d| (t.id.clone(), d.clone())));
        if let Some((a, b)) = edge {
            let with_cycle: TaskMap = tasks
                .iter()
                .cloned()
                .map(|mut t| {
                    if t.id == b {
                        t.dependencies.push(a.clone());
                    }
                    t
                })
                .collect();
            let cycle = detect_cycle(&with_cycle);
            prop_assert!(cycle.len() >= 3);
            prop_assert_eq!(cycle.first(), cycle.last());
            // Consecutive entries follow dependency edges.
            for w in cycle.windows(2) {
                let from = with_cycle.get(&w[0]).expect("cycle ids exist");
                prop_assert!(from.depends_on(&w[1]));
            }
        }
    }
}
