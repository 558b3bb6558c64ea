//! Interactions with the [`Monitor`] struct

use crate::tree::{Desktop, Node};
use itertools::Itertools;
use serde::Deserialize;
use std::fmt;

/// A monitor as tracked by `bspwm`
///
/// This is a snapshot built from a single `bspc query -T -m` and is thrown
/// away after one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Monitor {
    /// Monitor's name, shared with the RandR output
    pub(crate) name:     String,
    /// Desktops in declaration order
    pub(crate) desktops: Vec<Desktop>,
}

impl Monitor {
    /// Every window on every desktop of this monitor
    ///
    /// Desktops are visited in order and each tree in pre-order. Structural
    /// nodes and empty desktops are skipped.
    pub(crate) fn windows(&self) -> impl Iterator<Item = &Node> {
        self.desktops
            .iter()
            .filter_map(|desktop| desktop.root.as_ref())
            .flat_map(Node::iter)
            .filter(|node| node.is_window())
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Monitor {} [{}]>",
            self.name,
            self.desktops.iter().map(|d| d.name.as_str()).join(" ")
        )
    }
}
