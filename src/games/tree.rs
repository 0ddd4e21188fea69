//! Explicit two-player game trees.
//!
//! A `TreeGame` is a list of nodes; an action is the id of the child to move
//! to. Nodes may be shared between parents, which turns the tree into a DAG
//! with transpositions. Useful for checking search engines against each other
//! on hand-built or random positions.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::policy::game::{Evaluator, Game};

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Seat to move (ignored for leaves).
    pub to_move: usize,
    /// Child node ids; empty for a leaf.
    pub children: Vec<usize>,
    /// Payoff for seat 0 at a leaf; seat 1 gets the negation.
    pub payoff: f64,
    /// Static score for seat 0 used by [`TreeHeuristic`].
    pub heuristic: Option<f64>,
}

impl TreeNode {
    /// Decision node.
    pub fn internal(to_move: usize, children: Vec<usize>) -> Self {
        Self {
            to_move,
            children,
            payoff: 0.0,
            heuristic: None,
        }
    }

    /// Terminal node with seat 0's payoff.
    pub fn leaf(payoff: f64) -> Self {
        Self {
            to_move: 0,
            children: Vec::new(),
            payoff,
            heuristic: None,
        }
    }

    /// Builder method: attach a static score.
    pub fn with_heuristic(mut self, score: f64) -> Self {
        self.heuristic = Some(score);
        self
    }
}

/// Position in a [`TreeGame`]: the id of the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeState(pub usize);

/// Game defined by an explicit node list; node 0 is the root.
#[derive(Debug, Clone)]
pub struct TreeGame {
    nodes: Arc<Vec<TreeNode>>,
}

impl TreeGame {
    /// Build from nodes. Children must point at valid ids.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        debug_assert!(nodes
            .iter()
            .all(|n| n.children.iter().all(|&c| c < nodes.len())));
        Self {
            nodes: Arc::new(nodes),
        }
    }

    /// Layered random DAG.
    ///
    /// Layer 0 is the root; layers `1..depth` hold `width` nodes each and
    /// layer `depth` holds leaves. Every decision node links to between one
    /// and `max_branching` distinct nodes of the next layer, so the same node
    /// is often reachable along several paths. About one middle-layer node in
    /// ten is an early leaf. Seat `layer % 2` moves at each layer.
    pub fn random_layered<R: Rng>(rng: &mut R, depth: usize, width: usize, max_branching: usize) -> Self {
        assert!(depth >= 1 && width >= 1 && max_branching >= 1);

        let layer_start = |layer: usize| if layer == 0 { 0 } else { 1 + (layer - 1) * width };
        let mut nodes = Vec::with_capacity(1 + depth * width);

        for layer in 0..=depth {
            let count = if layer == 0 { 1 } else { width };
            for _ in 0..count {
                let payoff = rng.gen_range(-1..=1) as f64;
                let heuristic = rng.gen_range(-50..=50) as f64;
                let early_leaf = layer > 0 && layer < depth && rng.gen_bool(0.1);

                let node = if layer == depth || early_leaf {
                    TreeNode::leaf(payoff)
                } else {
                    let next: Vec<usize> = (layer_start(layer + 1)..layer_start(layer + 1) + width).collect();
                    let branching = rng.gen_range(1..=max_branching.min(width));
                    let children = next.choose_multiple(rng, branching).copied().collect();
                    TreeNode::internal(layer % 2, children)
                };
                nodes.push(node.with_heuristic(heuristic));
            }
        }

        Self::from_nodes(nodes)
    }

    /// The root position.
    pub fn root_state(&self) -> TreeState {
        TreeState(0)
    }

    /// Node behind a state.
    pub fn node(&self, state: &TreeState) -> &TreeNode {
        &self.nodes[state.0]
    }
}

impl Game for TreeGame {
    type State = TreeState;
    type Action = usize;

    fn num_players(&self) -> usize {
        2
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        let node = self.node(state);
        (!node.children.is_empty()).then_some(node.to_move)
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        self.node(state).children.clone()
    }

    fn apply_action(&self, _state: &Self::State, action: &Self::Action) -> Self::State {
        TreeState(*action)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.node(state).children.is_empty()
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        let payoff = self.node(state).payoff;
        if player == 0 {
            payoff
        } else {
            -payoff
        }
    }
}

/// Reads each node's stored static score.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeHeuristic;

impl Evaluator<TreeGame> for TreeHeuristic {
    fn evaluate(&self, game: &TreeGame, state: &TreeState, perspective: usize) -> Option<f64> {
        let score = game.node(state).heuristic?;
        Some(if perspective == 0 { score } else { -score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hand_built_tree() {
        let game = TreeGame::from_nodes(vec![
            TreeNode::internal(0, vec![1, 2]),
            TreeNode::leaf(1.0),
            TreeNode::leaf(-1.0),
        ]);
        let root = game.root_state();
        assert_eq!(game.current_player(&root), Some(0));
        assert_eq!(game.available_actions(&root), vec![1, 2]);

        let win = game.apply_action(&root, &1);
        assert!(game.is_terminal(&win));
        assert_eq!(game.current_player(&win), None);
        assert_eq!(game.get_payoff(&win, 0), 1.0);
        assert_eq!(game.get_payoff(&win, 1), -1.0);
    }

    #[test]
    fn test_random_layered_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let game = TreeGame::random_layered(&mut rng, 4, 5, 3);
        assert!(!game.is_terminal(&game.root_state()));

        // every path ends at a leaf within `depth` moves, seats alternate
        let mut frontier = vec![(game.root_state(), 0usize)];
        while let Some((state, ply)) = frontier.pop() {
            assert!(ply <= 4);
            if let Some(seat) = game.current_player(&state) {
                assert_eq!(seat, ply % 2);
                for action in game.available_actions(&state) {
                    frontier.push((game.apply_action(&state, &action), ply + 1));
                }
            }
        }
    }
}
