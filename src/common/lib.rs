// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! sable selection binder: source locations, node identifiers, and the
//! diagnostic machinery.

pub mod errors;
pub mod source;
pub mod util;

use std::sync::atomic::{AtomicUsize, Ordering};

/// A positive, small ID assigned to nodes that are allocated during binding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a node id from a raw index.
    pub fn new(x: usize) -> NodeId {
        NodeId(x)
    }

    /// Allocate a new unused ID.
    ///
    /// The IDs generated by this function are monotonically increasing and
    /// never reused within one process.
    pub fn alloc() -> NodeId {
        static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(1);
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Return the raw index of the ID.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}
