use std::sync::Arc;

use sat::{Formula, Solver, Status};

use super::*;
use crate::config::DISCOUNT;

fn solver(dimacs: &str) -> Solver {
    Solver::new(Arc::new(dimacs.parse::<Formula>().unwrap()))
}

#[test]
fn first_rollout_waits_for_evaluation() {
    let solver = solver("p cnf 2 1\n1 2 0\n");
    let mut node = Node::default();
    let mut path = Vec::new();

    assert_eq!(node.virtual_rollout(&mut solver.clone(), &mut path), Rollout::Pending);
    assert!(path.is_empty());
    assert_eq!(node.virtual_visits, 1);
    let actions: Vec<usize> = node.children.iter().map(|(a, _)| *a).collect();
    assert_eq!(actions, vec![0, 2]);

    node.devirtualize_path(&mut path.into_iter(), &[0.7, 0.1, 0.2, 0.0], 0.5);
    assert_eq!((node.visits, node.virtual_visits), (1, 0));
    assert!((node.expected_reward - 0.5).abs() < 1e-6);
    assert!((node.children[0].1.policy - 0.7 / 0.9).abs() < 1e-6);
    assert!((node.children[1].1.policy - 0.2 / 0.9).abs() < 1e-6);
}

#[test]
fn solved_positions_back_up_discounted_reward() {
    let solver = solver("p cnf 2 1\n1 2 0\n");
    let mut node = Node::default();
    let mut path = Vec::new();
    let _ = node.virtual_rollout(&mut solver.clone(), &mut path);
    node.devirtualize_path(&mut path.into_iter(), &[0.25; 4], 0.0);

    // Either literal satisfies the only clause.
    let mut position = solver.clone();
    let mut path = Vec::new();
    let rollout = node.virtual_rollout(&mut position, &mut path);
    assert_eq!(rollout, Rollout::Finished(DISCOUNT));
    assert_eq!(position.status(), Status::Satisfied);
    assert_eq!(path.len(), 1);
    assert_eq!(node.visits, 2);
    assert!((node.expected_reward - DISCOUNT / 2.0).abs() < 1e-6);
    assert_eq!(node.explored(), 1);
}

#[test]
fn play_keeps_searched_child() {
    let solver = solver("p cnf 3 2\n1 2 0\n-1 3 0\n");
    let mut node = Node::default();
    for _ in 0..20 {
        let mut path = Vec::new();
        if node.virtual_rollout(&mut solver.clone(), &mut path) == Rollout::Pending {
            node.devirtualize_path(&mut path.into_iter(), &[1.0 / 6.0; 6], 0.0);
        }
    }
    assert_eq!(node.visits, 20);

    let (action, visits) = node
        .children
        .iter()
        .map(|(action, child)| (*action, child.visits))
        .max_by_key(|&(_, visits)| visits)
        .unwrap();
    assert!(visits > 0);
    assert_eq!(node.clone().play(action).visits, visits);
    assert!(!node.play(100).is_initialized());
}

#[test]
fn exploration_grows_with_visits() {
    assert!(exploration_rate(0.0) > 4.0);
    assert!(exploration_rate(10_000.0) > exploration_rate(10.0));
}
