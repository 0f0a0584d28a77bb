use serde_json::{Value, json};

/// Built-in configuration. Every key read by the layout and animation code has a value here.
pub fn default_config() -> Value {
    json!({
        "layout": {
            "nodeSize": [220.0, 120.0],
            "separation": {
                "siblings": 1.0,
                "cousins": 2.0
            }
        },
        "node": {
            "labelPadding": 20.0,
            "height": 30.0,
            "fontSize": 16.0
        },
        "edge": {
            "arrowClearance": 8.0
        },
        "anchor": {
            "x": 480.0,
            "y": 0.0
        },
        "animation": {
            "duration": 750.0
        },
        "limits": {
            "maxDepth": 4096,
            "maxNodes": 1_000_000
        }
    })
}
