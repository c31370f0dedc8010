//! Groups slash separated paths into a tree.
//!
//! Every value is mapped to a path like `/a/b/c`. The last segment becomes
//! the node name, the leading segments select the parents. Parents that are
//! not backed by a value of their own are created as artificial nodes. All
//! top level nodes hang below an artificial root named `root`.

use crate::utils::text::cleanup;

pub const ROOT_NAME: &str = "root";

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTreeNode<T> {
    name: String,
    value: Option<T>,
    level: usize,
    children: Vec<NamedTreeNode<T>>,
}

impl<T> NamedTreeNode<T> {
    fn new(name: &str, value: Option<T>, level: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
            level,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Distance from the root, which has level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn children(&self) -> &[NamedTreeNode<T>] {
        &self.children
    }

    pub fn is_artificial(&self) -> bool {
        self.value.is_none()
    }

    pub fn child_by_name(&self, name: &str) -> Option<&NamedTreeNode<T>> {
        self.children.iter().find(|c| c.name == name)
    }

    fn insert(&mut self, segments: &[String], value: T) {
        match segments {
            [] => {}
            [leaf] => {
                let existing = self
                    .children
                    .iter_mut()
                    .find(|c| c.name == *leaf && c.value.is_none());
                match existing {
                    Some(node) => node.value = Some(value),
                    None => self
                        .children
                        .push(NamedTreeNode::new(leaf, Some(value), self.level + 1)),
                }
            }
            [head, rest @ ..] => {
                let idx = match self.children.iter().position(|c| c.name == *head) {
                    Some(idx) => idx,
                    None => {
                        self.children
                            .push(NamedTreeNode::new(head, None, self.level + 1));
                        self.children.len() - 1
                    }
                };
                self.children[idx].insert(rest, value);
            }
        }
    }

    /// Depth first pre-order walk.
    pub fn walk<F>(&self, skip_self: bool, handle: &mut F)
    where
        F: FnMut(&NamedTreeNode<T>),
    {
        if !skip_self {
            handle(self);
        }
        for child in &self.children {
            child.walk(false, handle);
        }
    }

    fn visit_edges<F>(&self, prefix: &str, handle: &mut F)
    where
        F: FnMut(&str, Option<&T>, Option<&T>),
    {
        let is_root = self.level == 0;
        for child in &self.children {
            if is_root {
                handle("/", None, child.value());
            } else {
                handle(prefix, self.value(), child.value());
            }
            child.visit_edges(&format!("{}/{}", prefix, child.name), handle);
        }
    }
}

fn split(path: &str) -> Vec<String> {
    path.split('/').filter_map(|s| cleanup(Some(s))).collect()
}

/// Builds the tree for the supplied values.
pub fn parenthesize<T, I, P>(values: I, to_path: P) -> NamedTreeNode<T>
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> String,
{
    let mut root = NamedTreeNode::new(ROOT_NAME, None, 0);
    for value in values {
        let path = to_path(&value);
        let segments = split(&path);
        if segments.is_empty() {
            tracing::warn!("Ignoring value with empty tree path '{}'", path);
            continue;
        }
        root.insert(&segments, value);
    }
    root
}

/// Builds the tree and reports every parent/child edge depth first as
/// `(prefix, parent value, child value)`. Children of the root get the
/// prefix `/` and no parent, deeper edges get the parent's path.
pub fn parenthesize_with<T, I, P, F>(values: I, to_path: P, mut add_child: F) -> NamedTreeNode<T>
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> String,
    F: FnMut(&str, Option<&T>, Option<&T>),
{
    let root = parenthesize(values, to_path);
    root.visit_edges("", &mut add_child);
    root
}

pub fn for_tree_node_do<T, I, P, F>(values: I, to_path: P, skip_root: bool, mut handle_node: F)
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> String,
    F: FnMut(&NamedTreeNode<T>),
{
    parenthesize(values, to_path).walk(skip_root, &mut handle_node);
}

/// Like [`for_tree_node_do`] but hands out the values together with their
/// depth. When the root is skipped the top level nodes have depth 0.
pub fn for_tree_value_do<T, I, P, F>(values: I, to_path: P, skip_root: bool, mut handle_value: F)
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> String,
    F: FnMut(Option<&T>, usize),
{
    let offset = usize::from(skip_root);
    for_tree_node_do(values, to_path, skip_root, |node| {
        handle_value(node.value(), node.level() - offset)
    });
}
