use arbor_core::ArborConfig;
use arbor_core::geom::{Point, point};
use walker::Separation;

/// Typed view of the layout and animation keys of an [`ArborConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Horizontal distance between sibling centers.
    pub node_size_x: f64,
    /// Vertical distance between depth bands.
    pub node_size_y: f64,
    pub separation: Separation,
    pub label_padding: f64,
    pub node_height: f64,
    pub font_size: f64,
    /// Gap between an edge's end and the child box, leaving room for the arrowhead.
    pub arrow_clearance: f64,
    /// The root's transition start point before the first layout.
    pub anchor: Point,
    pub duration: f64,
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&ArborConfig::default())
    }
}

impl Settings {
    /// Missing or mistyped keys fall back to the built-in defaults.
    pub fn from_config(config: &ArborConfig) -> Self {
        let (node_size_x, node_size_y) = config
            .get_pair("layout.nodeSize")
            .unwrap_or((220.0, 120.0));
        let f = |path: &str, default: f64| config.get_f64(path).unwrap_or(default);

        Self {
            node_size_x,
            node_size_y,
            separation: Separation {
                siblings: f("layout.separation.siblings", 1.0),
                cousins: f("layout.separation.cousins", 2.0),
            },
            label_padding: f("node.labelPadding", 20.0),
            node_height: f("node.height", 30.0),
            font_size: f("node.fontSize", 16.0).max(1.0),
            arrow_clearance: f("edge.arrowClearance", 8.0),
            anchor: point(f("anchor.x", 480.0), f("anchor.y", 0.0)),
            duration: f("animation.duration", 750.0).max(0.0),
            max_depth: config
                .get_u64("limits.maxDepth")
                .map(|v| v as usize)
                .unwrap_or(4096),
        }
    }

    pub fn with_node_size(mut self, x: f64, y: f64) -> Self {
        self.node_size_x = x;
        self.node_size_y = y;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_builtin_config() {
        let s = Settings::default();
        assert_eq!((s.node_size_x, s.node_size_y), (220.0, 120.0));
        assert_eq!(s.label_padding, 20.0);
        assert_eq!(s.node_height, 30.0);
        assert_eq!(s.arrow_clearance, 8.0);
        assert_eq!(s.duration, 750.0);
        assert_eq!(s.separation, Separation::default());
    }

    #[test]
    fn mistyped_keys_fall_back() {
        let cfg = ArborConfig::from_value(json!({
            "layout": { "nodeSize": "wide" },
            "animation": { "duration": -5 },
            "anchor": { "x": 12 }
        }));
        let s = Settings::from_config(&cfg);
        assert_eq!((s.node_size_x, s.node_size_y), (220.0, 120.0));
        assert_eq!(s.duration, 0.0);
        assert_eq!(s.anchor, point(12.0, 0.0));
    }
}
