use super::{NodeId, Tree};
use crate::{ArborConfig, Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Nesting deeper than this is rejected as a layout overflow.
    pub max_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { max_depth: 4096 }
    }
}

impl LoadOptions {
    pub fn from_config(config: &ArborConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_depth: config
                .get_u64("limits.maxDepth")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_depth),
        }
    }
}

/// Builds a [`Tree`] from the `{ "name": string, "children": [...] }` hierarchy shape.
pub fn load(raw: &Value) -> Result<Tree> {
    load_with(raw, &LoadOptions::default())
}

/// Like [`load`], with an explicit nesting bound.
///
/// Identities are allocated in document (pre-)order, so the root is always the first id.
pub fn load_with(raw: &Value, options: &LoadOptions) -> Result<Tree> {
    let root_label = node_label(raw, "")?;
    let mut tree = Tree::new(root_label);

    let mut stack: Vec<Pending<'_>> = Vec::new();
    push_children(&mut stack, raw, tree.root(), "", 1, options)?;

    while let Some(item) = stack.pop() {
        let label = node_label(item.value, &item.path)?;
        let id = tree.add_child(item.parent, label)?;
        push_children(&mut stack, item.value, id, &item.path, item.depth + 1, options)?;
    }

    tracing::debug!(nodes = tree.node_count(), "loaded tree");
    Ok(tree)
}

struct Pending<'a> {
    value: &'a Value,
    parent: NodeId,
    path: String,
    depth: usize,
}

fn push_children<'a>(
    stack: &mut Vec<Pending<'a>>,
    value: &'a Value,
    parent: NodeId,
    path: &str,
    depth: usize,
    options: &LoadOptions,
) -> Result<()> {
    let children = node_children(value, path)?;
    if !children.is_empty() && depth > options.max_depth {
        return Err(Error::overflow(format!(
            "nesting at {} exceeds the depth bound of {}",
            display_path(path),
            options.max_depth
        )));
    }
    // Reverse so the stack pops children in document order.
    for (idx, child) in children.iter().enumerate().rev() {
        stack.push(Pending {
            value: child,
            parent,
            path: format!("{path}/children/{idx}"),
            depth,
        });
    }
    Ok(())
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

fn node_label(value: &Value, path: &str) -> Result<String> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::malformed(display_path(path), "expected a JSON object"))?;
    match obj.get("name") {
        Some(Value::String(name)) => Ok(name.clone()),
        Some(_) => Err(Error::malformed(display_path(path), "`name` is not a string")),
        None => Err(Error::malformed(display_path(path), "missing `name`")),
    }
}

fn node_children<'a>(value: &'a Value, path: &str) -> Result<&'a [Value]> {
    match value.get("children") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(children)) => Ok(children),
        Some(_) => Err(Error::malformed(
            display_path(path),
            "`children` is not an array",
        )),
    }
}
