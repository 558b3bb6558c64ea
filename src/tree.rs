//! Interacting with the [`Node`] tree reported by `bspwm`

use serde::{de, Deserialize};
use std::{fmt, iter};

/// Type alias used for syntax compatibility
pub(crate) type Xid = u32;

/// Deserialize a field that must be present but may be `null`
///
/// `serde` treats a missing [`Option`] field as [`None`]; `bspc` always writes
/// these keys, so a missing one means the document is not what we expect
fn nullable<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: de::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d)
}

// ============================== Client ==============================

/// The application attached to a window [`Node`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Client {
    /// Typically the name of the app, formatted. i.e., "Ripcord" vs "ripcord"
    pub(crate) class_name: String,
}

// =============================== Node ===============================

/// A single element of a desktop's binary layout tree
///
/// Nodes are either structural (splits that only parent other nodes) or hold
/// a window. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Node {
    /// `id` of the [`Node`]
    id:           Xid,
    /// Is the current [`Node`] private?
    private:      bool,
    /// [`Client`] running in this [`Node`], if any
    #[serde(deserialize_with = "nullable")]
    client:       Option<Client>,
    /// First child [`Node`] of current [`Node`]
    #[serde(deserialize_with = "nullable")]
    first_child:  Option<Box<Node>>,
    /// Second child [`Node`] of current [`Node`]
    #[serde(deserialize_with = "nullable")]
    second_child: Option<Box<Node>>,
}

impl Node {
    /// `id` of the [`Node`], as used in `bspc node <id>`
    pub(crate) const fn id(&self) -> Xid {
        self.id
    }

    /// Does this [`Node`] hold a window?
    pub(crate) const fn is_window(&self) -> bool {
        self.client.is_some()
    }

    /// Class name of the window, [`None`] for structural nodes
    pub(crate) fn class_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.class_name.as_str())
    }

    /// Is the current [`Node`] private?
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) const fn is_private(&self) -> bool {
        self.private
    }

    /// First child [`Node`] of current [`Node`]
    pub(crate) fn first_child(&self) -> Option<&Self> {
        self.first_child.as_deref()
    }

    /// Second child [`Node`] of current [`Node`]
    pub(crate) fn second_child(&self) -> Option<&Self> {
        self.second_child.as_deref()
    }

    /// Every descendant of this [`Node`], depth first
    ///
    /// The order is: first child, its descendants, second child, its
    /// descendants. The node itself is not included.
    pub(crate) fn all_children(&self) -> Descendants<'_> {
        let mut descendants = Descendants { stack: Vec::new() };
        descendants.push_children(self);
        descendants
    }

    /// This [`Node`] followed by [`Node::all_children`]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Self> {
        iter::once(self).chain(self.all_children())
    }

    /// Find the first [`Node`] in this subtree (including itself) with the
    /// given `id`
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn find_node(&self, id: Xid) -> Option<&Self> {
        self.iter().find(|n| n.id == id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class_name() {
            Some(class) => write!(f, "<Node {:#0x} {}", self.id, class)?,
            None => write!(f, "<Node {:#0x} (split)", self.id)?,
        }
        if self.private {
            write!(f, " (private)")?;
        }
        write!(f, ">")
    }
}

/// Stack based pre-order walk over a [`Node`]'s descendants
#[derive(Debug, Clone)]
pub(crate) struct Descendants<'a> {
    /// Nodes still to be visited, next on top
    stack: Vec<&'a Node>,
}

impl<'a> Descendants<'a> {
    /// Queue the children of `node` so the first child is visited next
    fn push_children(&mut self, node: &'a Node) {
        if let Some(second) = node.second_child() {
            self.stack.push(second);
        }
        if let Some(first) = node.first_child() {
            self.stack.push(first);
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.push_children(node);
        Some(node)
    }
}

// ============================== Desktop =============================

/// A virtual desktop belonging to a single monitor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Desktop {
    /// Desktop's name
    pub(crate) name: String,
    /// Root [`Node`] of the desktop, absent when there are no windows
    #[serde(deserialize_with = "nullable")]
    pub(crate) root: Option<Node>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Desktop, Node, Xid};
    use serde_json::{json, Value};

    /// A window leaf as `bspc query -T` writes it
    pub(crate) fn window(id: Xid, class: &str) -> Value {
        json!({
            "id": id,
            "private": false,
            "client": { "className": class, "instanceName": class.to_lowercase() },
            "firstChild": null,
            "secondChild": null,
        })
    }

    /// A structural split node
    pub(crate) fn split(id: Xid, first: Value, second: Value) -> Value {
        json!({
            "id": id,
            "splitType": "vertical",
            "private": false,
            "client": null,
            "firstChild": first,
            "secondChild": second,
        })
    }

    /// Root structural, two structural children, four window leaves
    fn three_levels() -> Node {
        serde_json::from_value(split(
            1,
            split(2, window(10, "Alacritty"), window(11, "Firefox")),
            split(3, window(12, "Ripcord"), window(13, "Zathura")),
        ))
        .unwrap()
    }

    #[test]
    fn all_children_is_pre_order() {
        let root = three_levels();
        let ids = root.all_children().map(Node::id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 10, 11, 3, 12, 13]);

        // Restartable
        assert_eq!(root.all_children().count(), 6);
    }

    #[test]
    fn leaf_has_no_children() {
        let leaf: Node = serde_json::from_value(window(7, "mpv")).unwrap();
        assert!(leaf.is_window());
        assert_eq!(leaf.class_name(), Some("mpv"));
        assert_eq!(leaf.all_children().next(), None);
    }

    #[test]
    fn structural_nodes_have_no_class() {
        let root = three_levels();
        assert!(!root.is_window());
        assert_eq!(root.class_name(), None);
        assert!(!root.is_private());
    }

    #[test]
    fn find_node_searches_whole_subtree() {
        let root = three_levels();
        assert_eq!(root.find_node(1).map(Node::id), Some(1));
        assert_eq!(
            root.find_node(12).and_then(Node::class_name),
            Some("Ripcord")
        );
        assert_eq!(root.find_node(99), None);
    }

    #[test]
    fn one_sided_split() {
        let root: Node =
            serde_json::from_value(split(1, window(2, "a"), Value::Null)).unwrap();
        assert_eq!(root.all_children().map(Node::id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(root.second_child(), None);
    }

    #[test]
    fn missing_field_is_an_error() {
        let doc = json!({ "id": 1, "private": false, "client": null, "firstChild": null });
        assert!(serde_json::from_value::<Node>(doc).is_err());

        let doc = json!({ "name": "1" });
        assert!(serde_json::from_value::<Desktop>(doc).is_err());
    }

    #[test]
    fn display() {
        let root = three_levels();
        assert_eq!(root.to_string(), "<Node 0x1 (split)>");
        assert_eq!(root.find_node(10).unwrap().to_string(), "<Node 0xa Alacritty>");
    }

    #[test]
    fn empty_desktop() {
        let desktop: Desktop = serde_json::from_value(json!({ "name": "I", "root": null })).unwrap();
        assert_eq!(desktop.root, None);
    }
}
