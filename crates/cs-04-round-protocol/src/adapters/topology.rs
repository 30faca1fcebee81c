//! # Static Aggregation Tree

use std::collections::HashMap;

use shared_types::NodeId;
use thiserror::Error;

use crate::ports::TopologyProvider;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("tree needs at least one node")]
    Empty,

    #[error("branching factor must be at least 1")]
    ZeroBranching,

    #[error("{0} already has a parent")]
    DuplicateChild(NodeId),

    #[error("{0} cannot be its own ancestor")]
    Cycle(NodeId),
}

/// A fixed tree, built once and shared by every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTree {
    root: NodeId,
    parents: HashMap<NodeId, NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl StaticTree {
    /// A lone root.
    pub fn single(root: NodeId) -> Self {
        Self {
            root,
            parents: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Nodes `0..count` in breadth-first order; node `i` hangs under
    /// `(i - 1) / branching`.
    pub fn k_ary(count: u32, branching: u32) -> Result<Self, TopologyError> {
        if count == 0 {
            return Err(TopologyError::Empty);
        }
        if branching == 0 {
            return Err(TopologyError::ZeroBranching);
        }

        let mut tree = Self::single(NodeId(0));
        for i in 1..count {
            tree.attach(NodeId((i - 1) / branching), NodeId(i))?;
        }
        Ok(tree)
    }

    /// Hang `child` under `parent`. Children keep insertion order.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TopologyError> {
        if child == self.root || self.parents.contains_key(&child) {
            return Err(TopologyError::DuplicateChild(child));
        }
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(TopologyError::Cycle(child));
            }
            cursor = self.parents.get(&node).copied();
        }

        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Every node, root first, then in breadth-first order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = vec![self.root];
        let mut i = 0;
        while i < out.len() {
            if let Some(kids) = self.children.get(&out[i]) {
                out.extend_from_slice(kids);
            }
            i += 1;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.parents.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tree edges adjacent to `node`.
    pub fn neighbours(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.parent(node).into_iter().collect();
        out.extend(self.children(node));
        out
    }
}

impl TopologyProvider for StaticTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children.get(&node).cloned().unwrap_or_default()
    }
}
