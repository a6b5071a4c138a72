//! Tree definitions: the initial tree a session starts from.
//!
//! Definitions use the snapshot node shape, as JSON (a bare array) or TOML
//! (`[[nodes]]` tables). Check states in a definition are ignored; every
//! node starts unchecked.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, PathContext};
use crate::domain::snapshot::{tree_from_raw, RawNode};
use crate::domain::{LeafKind, Node, Scalar, Tree};
use crate::infrastructure::traits::FileSystem;

/// Id of the confidence slider in the bundled definition.
pub const CONFIDENCE_THRESHOLD_ID: &str = "confidence-threshold";

/// Id of the base map style picker in the bundled definition.
pub const MAP_STYLE_ID: &str = "map-style";

const MAP_STYLES: [&str; 6] = ["Dark", "Ocean", "Satellite", "Infrared", "Night", "Terrain"];

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Toml,
}

impl DefinitionFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DefinitionFormat::Toml,
            _ => DefinitionFormat::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlDefinition {
    #[serde(default)]
    nodes: Vec<RawNode>,
}

fn reset_states(raw: &mut RawNode) {
    raw.check_state = None;
    if let Some(children) = raw.children.as_mut() {
        children.iter_mut().for_each(reset_states);
    }
}

/// Parse definition text; `origin` only labels errors.
#[instrument(level = "debug", skip(content))]
pub fn parse_definition(content: &str, format: DefinitionFormat, origin: &Path) -> ApplicationResult<Tree> {
    let mut raw: Vec<RawNode> = match format {
        DefinitionFormat::Json => serde_json::from_str(content).as_definition_error(origin)?,
        DefinitionFormat::Toml => {
            toml::from_str::<TomlDefinition>(content)
                .as_definition_error(origin)?
                .nodes
        }
    };
    raw.iter_mut().for_each(reset_states);
    let tree = tree_from_raw(raw).as_definition_error(origin)?;
    debug!("definition has {} nodes", tree.len());
    Ok(tree)
}

/// Read and parse a definition file.
pub fn load_definition(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Tree> {
    let content = fs.read_to_string(path).with_path_context("read definition", path)?;
    parse_definition(&content, DefinitionFormat::from_path(path), path)
}

fn category(id: &str, label: &str) -> Node {
    Node::leaf(id, label)
}

/// Detection categories grouped by domain, map layers, and the confidence slider.
pub fn default_definition() -> Tree {
    let roots = vec![
        Node::group(
            "detections",
            "Detections",
            vec![
                Node::group("air", "Air", vec![category("aircraft", "Aircraft")]),
                Node::group("maritime", "Maritime", vec![category("vessels", "Vessels")]),
                Node::group(
                    "ground",
                    "Ground",
                    vec![
                        category("tanks", "Tanks"),
                        category("vehicles", "Vehicles"),
                        category("personnel", "Personnel"),
                    ],
                ),
                Node::group(
                    "built",
                    "Built environment",
                    vec![
                        category("structures", "Structures"),
                        category("buildings", "Buildings"),
                        category("infrastructure", "Infrastructure"),
                    ],
                ),
            ],
        )
        .opened(true),
        Node::group(
            "layers",
            "Map layers",
            vec![
                Node::leaf(MAP_STYLE_ID, "Map style")
                    .with_kind(LeafKind::Picker {
                        options: MAP_STYLES.iter().map(|s| s.to_string()).collect(),
                    })
                    .with_value(MAP_STYLES[0]),
                category("labels", "Labels"),
                category("roads", "Roads"),
                category("borders", "Borders"),
            ],
        ),
        Node::group(
            "settings",
            "Settings",
            vec![Node::leaf(CONFIDENCE_THRESHOLD_ID, "Confidence threshold")
                .with_kind(LeafKind::Slider {
                    min: 0.0,
                    max: 1.0,
                    step: 0.05,
                })
                .with_value(0.5)],
        ),
    ];
    // ids above are unique
    Tree::new(roots).unwrap_or_default()
}
