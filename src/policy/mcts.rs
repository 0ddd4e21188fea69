//! Monte Carlo Tree Search over an index arena.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeId`]; a node's
//! parent link is an index, so backpropagation is a walk up the arena with no
//! shared ownership. The tree is rebuilt from scratch for every decision.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::policy::config::{MctsConfig, MctsStats, SelectionPolicy};
use crate::policy::error::AgentError;
use crate::policy::game::{Game, Outcome};
use crate::policy::player::{acting_seat, legal_actions, Player};

/// Index of a node in the search arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Denominator guard for the final `reward / visits` ratio.
const VISIT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
struct Node<S, A> {
    state: S,
    parent: Option<NodeId>,
    children: Vec<(A, NodeId)>,
    visits: u64,
    reward: f64,
}

impl<S, A> Node<S, A> {
    fn new(state: S, parent: Option<NodeId>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
        }
    }
}

/// MCTS engine.
pub struct MctsSearch<G: Game> {
    config: MctsConfig,
    rng: StdRng,
    nodes: Vec<Node<G::State, G::Action>>,
    stats: MctsStats,
}

impl<G: Game> MctsSearch<G> {
    /// Create an engine, seeding its RNG from the config when a seed is set.
    pub fn new(config: MctsConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            nodes: Vec::new(),
            stats: MctsStats::default(),
        })
    }

    /// Run the configured number of iterations from `state` and return the
    /// root action with the best average reward.
    pub fn search(&mut self, game: &G, state: &G::State) -> Result<G::Action, AgentError> {
        legal_actions(game, state)?;
        let root_player = acting_seat(game, state)?;

        self.nodes.clear();
        self.nodes.push(Node::new(state.clone(), None));

        for i in 0..self.config.iterations {
            let leaf = self.select();
            let simulated = self.expand(game, leaf);
            let reward = self.simulate(game, simulated, root_player);
            self.backpropagate(simulated, reward);
            trace!("iteration {}: simulated node {} reward {}", i, simulated, reward);
        }

        self.stats = MctsStats {
            iterations: self.config.iterations,
            nodes: self.nodes.len(),
            root_visits: self.nodes[ROOT].visits,
        };

        let (action, best) = self.best_root_child().ok_or(AgentError::EmptySearchTree)?;
        debug!(
            "mcts chose {:?} after {} iterations ({} nodes, child visits {}, reward {})",
            action,
            self.stats.iterations,
            self.stats.nodes,
            self.nodes[best].visits,
            self.nodes[best].reward
        );
        Ok(action)
    }

    /// Counters from the most recent search.
    pub fn stats(&self) -> &MctsStats {
        &self.stats
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Visit and reward totals of the root's children, in expansion order.
    pub fn root_children(&self) -> Vec<(G::Action, u64, f64)> {
        self.nodes
            .first()
            .map(|root| {
                root.children
                    .iter()
                    .map(|(a, id)| (a.clone(), self.nodes[*id].visits, self.nodes[*id].reward))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Descend from the root to a node without children.
    fn select(&mut self) -> NodeId {
        let mut id = ROOT;
        while !self.nodes[id].children.is_empty() {
            id = match self.config.selection {
                SelectionPolicy::UniformRandom => self.random_child(id),
                SelectionPolicy::Ucb1 { exploration } => self.ucb1_child(id, exploration),
            };
        }
        id
    }

    fn random_child(&mut self, id: NodeId) -> NodeId {
        let children = &self.nodes[id].children;
        children
            .choose(&mut self.rng)
            .map(|(_, child)| *child)
            .unwrap_or(id)
    }

    /// Unvisited children first (in expansion order), then highest UCB1.
    fn ucb1_child(&self, id: NodeId, exploration: f64) -> NodeId {
        let parent = &self.nodes[id];
        let ln_parent = (parent.visits.max(1) as f64).ln();

        let mut best = id;
        let mut best_value = f64::NEG_INFINITY;
        for &(_, child) in &parent.children {
            let node = &self.nodes[child];
            if node.visits == 0 {
                return child;
            }
            let visits = node.visits as f64;
            let value = node.reward / visits + exploration * (ln_parent / visits).sqrt();
            if value > best_value {
                best_value = value;
                best = child;
            }
        }
        best
    }

    /// Add one child per legal action and return the node to simulate from:
    /// a random new child, or `id` itself when it is terminal.
    fn expand(&mut self, game: &G, id: NodeId) -> NodeId {
        let state = self.nodes[id].state.clone();
        let actions = game.available_actions(&state);
        if actions.is_empty() {
            return id;
        }

        for action in actions {
            let child = self.nodes.len();
            let next = game.apply_action(&state, &action);
            self.nodes.push(Node::new(next, Some(id)));
            self.nodes[id].children.push((action, child));
        }
        self.random_child(id)
    }

    /// Uniform random playout; 1 if `root_player` wins, else 0.
    fn simulate(&mut self, game: &G, id: NodeId, root_player: usize) -> f64 {
        let mut state = self.nodes[id].state.clone();
        loop {
            let actions = game.available_actions(&state);
            match actions.choose(&mut self.rng) {
                Some(action) => state = game.apply_action(&state, action),
                None => break,
            }
        }
        match game.outcome(&state, root_player) {
            Outcome::Win => 1.0,
            Outcome::Loss | Outcome::Draw => 0.0,
        }
    }

    fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.reward += reward;
            current = node.parent;
        }
    }

    /// Root child maximising `reward / (visits + eps)`; first wins ties.
    fn best_root_child(&self) -> Option<(G::Action, NodeId)> {
        let root = self.nodes.first()?;
        let mut best: Option<(&G::Action, NodeId, f64)> = None;
        for (action, id) in &root.children {
            let node = &self.nodes[*id];
            let ratio = node.reward / (node.visits as f64 + VISIT_EPSILON);
            if best.map_or(true, |(_, _, r)| ratio > r) {
                best = Some((action, *id, ratio));
            }
        }
        best.map(|(action, id, _)| (action.clone(), id))
    }
}

/// Player wrapping [`MctsSearch`].
pub struct MctsPlayer<G: Game> {
    name: String,
    seat: usize,
    search: MctsSearch<G>,
}

impl<G: Game> MctsPlayer<G> {
    /// Create an MCTS player.
    pub fn new(name: impl Into<String>, config: MctsConfig) -> Result<Self, AgentError> {
        Ok(Self {
            name: name.into(),
            seat: 0,
            search: MctsSearch::new(config)?,
        })
    }

    /// Counters from the last decision.
    pub fn last_stats(&self) -> &MctsStats {
        self.search.stats()
    }
}

impl<G: Game> Player<G> for MctsPlayer<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn seat(&self) -> usize {
        self.seat
    }

    fn set_seat(&mut self, seat: usize) {
        self.seat = seat;
    }

    fn choose_action(&mut self, game: &G, state: &G::State) -> Result<G::Action, AgentError> {
        self.search.search(game, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::connect4::Connect4;
    use crate::games::tree::{TreeGame, TreeNode};

    fn engine(iterations: u32, seed: u64) -> MctsSearch<TreeGame> {
        MctsSearch::new(MctsConfig::default().with_iterations(iterations).with_seed(seed)).unwrap()
    }

    fn check_counts<G: Game>(search: &MctsSearch<G>) {
        for node in &search.nodes {
            assert!(node.reward <= node.visits as f64);
            let child_visits: u64 = node.children.iter().map(|(_, c)| search.nodes[*c].visits).sum();
            assert!(child_visits <= node.visits);
        }
    }

    #[test]
    fn test_single_action_root() {
        let game = TreeGame::from_nodes(vec![
            TreeNode::internal(0, vec![1]),
            TreeNode::internal(1, vec![2, 3]),
            TreeNode::leaf(1.0),
            TreeNode::leaf(-1.0),
        ]);
        for n in 1..=50 {
            let mut search = engine(n, n as u64);
            assert_eq!(search.search(&game, &game.root_state()).unwrap(), 1);
            assert_eq!(search.stats().root_visits, n as u64);
            check_counts(&search);
        }
    }

    #[test]
    fn test_zero_iterations_is_an_error() {
        let game = TreeGame::from_nodes(vec![
            TreeNode::internal(0, vec![1, 2]),
            TreeNode::leaf(1.0),
            TreeNode::leaf(0.0),
        ]);
        let mut search = engine(0, 1);
        assert!(matches!(
            search.search(&game, &game.root_state()),
            Err(AgentError::EmptySearchTree)
        ));
    }

    #[test]
    fn test_terminal_root_is_an_error() {
        let game = TreeGame::from_nodes(vec![TreeNode::leaf(1.0)]);
        let mut search = engine(10, 1);
        assert!(matches!(
            search.search(&game, &game.root_state()),
            Err(AgentError::NoLegalActions)
        ));
    }

    #[test]
    fn test_finds_immediate_win() {
        // child 2 wins outright; the others lose
        let game = TreeGame::from_nodes(vec![
            TreeNode::internal(0, vec![1, 2, 3]),
            TreeNode::leaf(-1.0),
            TreeNode::leaf(1.0),
            TreeNode::leaf(-1.0),
        ]);
        for selection in [
            SelectionPolicy::UniformRandom,
            SelectionPolicy::Ucb1 { exploration: 1.4 },
        ] {
            let config = MctsConfig::default()
                .with_iterations(30)
                .with_selection(selection)
                .with_seed(5);
            let mut search = MctsSearch::new(config).unwrap();
            assert_eq!(search.search(&game, &game.root_state()).unwrap(), 2);
            check_counts(&search);
        }
    }

    #[test]
    fn test_terminal_leaves_are_revisited() {
        let game = TreeGame::from_nodes(vec![
            TreeNode::internal(0, vec![1, 2]),
            TreeNode::leaf(1.0),
            TreeNode::leaf(-1.0),
        ]);
        let mut search = engine(40, 9);
        search.search(&game, &game.root_state()).unwrap();
        // both children are terminal, so the arena never grows past them
        assert_eq!(search.stats().nodes, 3);
        let visits: u64 = search.root_children().iter().map(|(_, v, _)| v).sum();
        assert_eq!(visits, 40);
    }

    #[test]
    fn test_connect4_returns_legal_move() {
        let game = Connect4::new();
        let state = game.from_moves(&[3, 3, 3, 3, 3, 3]).unwrap();
        let mut player =
            MctsPlayer::new("mcts", MctsConfig::default().with_iterations(100).with_seed(42)).unwrap();
        let action = player.choose_action(&game, &state).unwrap();
        assert!(game.available_actions(&state).contains(&action));
        assert_eq!(player.last_stats().root_visits, 100);
        assert_eq!(player.last_stats().iterations, 100);
    }
}
