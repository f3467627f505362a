//! In-process model of the display container.
//!
//! The stage tracks which nodes are attached and which lifecycle class each
//! one carries. It never renders anything and never schedules anything; the
//! controller owns all timing and mirrors every mutation made here to the
//! renderer. Invariant: at most one active and at most one retiring node at
//! any instant, and the retiring node is always the slide that was active
//! immediately before the current advance.

use crate::events::SlideId;
use crate::slide::SlideElement;
use crate::transition::{ACTIVE_CLASS, EXIT_CLASS, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Attached in its pre-transition start state. `committed` records
    /// whether a layout flush has happened since insertion.
    Staged {
        transition: Transition,
        committed: bool,
    },
    Active,
    Retiring,
}

#[derive(Debug, Clone)]
pub struct StageNode {
    pub id: SlideId,
    pub element: SlideElement,
    phase: Phase,
}

impl StageNode {
    /// The classes currently on the node: the base class plus the
    /// lifecycle class for its phase.
    pub fn classes(&self) -> Vec<&'static str> {
        let phase_class = match self.phase {
            Phase::Staged { transition, .. } => transition.start_class(),
            Phase::Active => ACTIVE_CLASS,
            Phase::Retiring => EXIT_CLASS,
        };
        vec![self.element.class, phase_class]
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_retiring(&self) -> bool {
        self.phase == Phase::Retiring
    }
}

/// Outcome of activating a staged node. Activating before the start state
/// was committed collapses the enter effect into an instant cut; the
/// ordering insert -> flush -> activate is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Animated(Transition),
    InstantCut,
}

#[derive(Debug, Default)]
pub struct Stage {
    nodes: Vec<StageNode>,
    next_id: SlideId,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an element. With `Some(transition)` the node enters in its
    /// start state and must be flushed then activated; with `None` it is
    /// attached directly active (first slide only).
    pub fn insert(&mut self, element: SlideElement, start: Option<Transition>) -> SlideId {
        let id = self.next_id;
        self.next_id += 1;
        let phase = match start {
            Some(transition) => Phase::Staged {
                transition,
                committed: false,
            },
            None => Phase::Active,
        };
        self.nodes.push(StageNode { id, element, phase });
        debug_assert!(
            self.nodes.len() <= 2,
            "container must never exceed one incoming and one outgoing slide"
        );
        id
    }

    /// Commit the start state of any staged node, standing in for the
    /// browser's synchronous reflow between style mutations.
    pub fn flush_layout(&mut self) {
        for node in &mut self.nodes {
            if let Phase::Staged { committed, .. } = &mut node.phase {
                *committed = true;
            }
        }
    }

    /// Swap the start class for `active`. `None` when the node is not
    /// attached; `InstantCut` when the start state was never committed or
    /// the node was not staged.
    pub fn activate(&mut self, id: SlideId) -> Option<Activation> {
        let node = self.nodes.iter_mut().find(|n| n.id == id)?;
        let outcome = match node.phase {
            Phase::Staged {
                transition,
                committed: true,
            } => Activation::Animated(transition),
            _ => Activation::InstantCut,
        };
        node.phase = Phase::Active;
        Some(outcome)
    }

    /// Swap `active` for the exit class. `false` when the node is not
    /// attached.
    pub fn retire(&mut self, id: SlideId) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.phase = Phase::Retiring;
                true
            }
            None => false,
        }
    }

    /// Detach a node. No-op (`false`) when it already left the container,
    /// which the grace-delay timer is allowed to race against.
    pub fn remove(&mut self, id: SlideId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.nodes.len() != before
    }

    pub fn contains(&self, id: SlideId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StageNode> {
        self.nodes.iter()
    }

    pub fn active(&self) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.is_active())
    }

    pub fn retiring(&self) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.is_retiring())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use std::path::Path;

    fn element(index: usize) -> SlideElement {
        let manifest =
            Manifest::from_entries(vec!["a.jpg".into(), "b.mp4".into(), "c.jpg".into()])
                .expect("non-empty");
        SlideElement::build(index, &manifest, Path::new("assets"), false)
    }

    #[test]
    fn first_slide_attaches_directly_active() {
        let mut stage = Stage::new();
        let id = stage.insert(element(0), None);
        let node = stage.active().expect("active node");
        assert_eq!(node.id, id);
        assert_eq!(node.classes(), vec!["slide", "active"]);
    }

    #[test]
    fn flush_then_activate_animates() {
        let mut stage = Stage::new();
        let id = stage.insert(element(0), Some(Transition::Zoom));
        assert_eq!(
            stage.nodes().next().unwrap().classes(),
            vec!["slide", "start-zoom"]
        );
        stage.flush_layout();
        assert_eq!(
            stage.activate(id),
            Some(Activation::Animated(Transition::Zoom))
        );
        assert_eq!(stage.active().unwrap().classes(), vec!["slide", "active"]);
    }

    #[test]
    fn skipping_the_flush_collapses_to_an_instant_cut() {
        let mut stage = Stage::new();
        let id = stage.insert(element(0), Some(Transition::Fade));
        assert_eq!(stage.activate(id), Some(Activation::InstantCut));
    }

    #[test]
    fn retiring_swaps_to_the_exit_class() {
        let mut stage = Stage::new();
        let id = stage.insert(element(0), None);
        assert!(stage.retire(id));
        assert_eq!(
            stage.retiring().unwrap().classes(),
            vec!["slide", "start-fade"]
        );
        assert!(stage.active().is_none());
    }

    #[test]
    fn removal_of_a_detached_node_is_a_noop() {
        let mut stage = Stage::new();
        let id = stage.insert(element(0), None);
        assert!(stage.remove(id));
        assert!(!stage.remove(id));
        assert!(!stage.contains(id));
        assert_eq!(stage.node_count(), 0);
    }

    #[test]
    fn advance_sequence_never_exceeds_two_nodes() {
        let mut stage = Stage::new();
        let first = stage.insert(element(0), None);

        let second = stage.insert(element(1), Some(Transition::SlideLeft));
        stage.flush_layout();
        stage.activate(second);
        stage.retire(first);
        assert_eq!(stage.node_count(), 2);
        assert!(stage.active().is_some());
        assert!(stage.retiring().is_some());

        stage.remove(first);
        assert_eq!(stage.node_count(), 1);
    }
}
