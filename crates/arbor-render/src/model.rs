use arbor_core::NodeId;
use arbor_core::geom::Point;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for LayoutPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Box geometry used to place edge anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub node_height: f64,
    pub arrow_clearance: f64,
}

/// A parent→child connector, stored as its two anchors.
///
/// The source anchor is the bottom-center of the parent box and the target anchor sits
/// `arrow_clearance` above the top-center of the child box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePath {
    pub source: LayoutPoint,
    pub target: LayoutPoint,
}

impl EdgePath {
    pub fn between(parent: LayoutPoint, child: LayoutPoint, geometry: &EdgeGeometry) -> Self {
        let half = geometry.node_height / 2.0;
        Self {
            source: LayoutPoint {
                x: parent.x,
                y: parent.y + half,
            },
            target: LayoutPoint {
                x: child.x,
                y: child.y - half - geometry.arrow_clearance,
            },
        }
    }

    /// The degenerate connector drawn while an edge grows out of (or shrinks into) `at`.
    pub fn collapsed_at(at: LayoutPoint, geometry: &EdgeGeometry) -> Self {
        Self::between(at, at, geometry)
    }

    /// SVG path data for the vertical cubic connector.
    pub fn to_svg_path(&self) -> String {
        let (sx, sy) = (self.source.x, self.source.y);
        let (tx, ty) = (self.target.x, self.target.y);
        let my = (sy + ty) / 2.0;
        format!("M {sx} {sy} C {sx} {my}, {tx} {my}, {tx} {ty}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub label: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub collapsed: bool,
}

impl LayoutNode {
    pub fn position(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x,
            y: self.y,
        }
    }
}

/// Edge keyed by its child: every drawn non-root node has exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: NodeId,
    pub parent: NodeId,
    pub path: EdgePath,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Drawn nodes in depth-first pre-order.
    pub nodes: Vec<LayoutNode>,
    /// One edge per non-root node, in the same order as `nodes`.
    pub edges: Vec<LayoutEdge>,
    #[serde(skip)]
    node_index: FxHashMap<NodeId, usize>,
    #[serde(skip)]
    edge_index: FxHashMap<NodeId, usize>,
}

impl LayoutResult {
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<LayoutEdge>) -> Self {
        let node_index = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let edge_index = edges.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
        Self {
            nodes,
            edges,
            node_index,
            edge_index,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: NodeId) -> Option<&LayoutEdge> {
        self.edge_index.get(&id).map(|&i| &self.edges[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Extent of all node boxes.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().flat_map(|n| {
            let (hw, hh) = (n.width / 2.0, n.height / 2.0);
            [(n.x - hw, n.y - hh), (n.x + hw, n.y + hh)]
        }))
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_path_is_a_vertical_cubic() {
        let geometry = EdgeGeometry {
            node_height: 30.0,
            arrow_clearance: 8.0,
        };
        let path = EdgePath::between(
            LayoutPoint { x: 0.0, y: 0.0 },
            LayoutPoint { x: 110.0, y: 120.0 },
            &geometry,
        );
        assert_eq!(path.source, LayoutPoint { x: 0.0, y: 15.0 });
        assert_eq!(path.target, LayoutPoint { x: 110.0, y: 97.0 });
        assert_eq!(path.to_svg_path(), "M 0 15 C 0 56, 110 56, 110 97");
    }

    #[test]
    fn collapsed_path_straddles_the_anchor() {
        let geometry = EdgeGeometry {
            node_height: 30.0,
            arrow_clearance: 8.0,
        };
        let path = EdgePath::collapsed_at(LayoutPoint { x: 5.0, y: 100.0 }, &geometry);
        assert_eq!(path.source.y, 115.0);
        assert_eq!(path.target.y, 77.0);
        assert_eq!(path.source.x, path.target.x);
    }
}
