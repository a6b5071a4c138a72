//! Integration tests for loading tree definitions from files through the container.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use filtertree::application::services::{Action, Origin};
use filtertree::application::ApplicationError;
use filtertree::config::Settings;
use filtertree::domain::{CheckState, LeafKind, Scalar};
use filtertree::infrastructure::di::ServiceContainer;
use filtertree::infrastructure::{MemorySnapshotStore, RealFileSystem};

fn container_for(dir: &TempDir, definition: &str) -> ServiceContainer {
    let settings = Settings {
        snapshot_path: dir.path().join("snapshot.json"),
        definition: Some(dir.path().join(definition)),
        persist: false,
        ..Settings::default()
    };
    ServiceContainer::with_deps(settings, Arc::new(RealFileSystem), Arc::new(MemorySnapshotStore::new()))
}

#[test]
fn given_json_definition_file_when_opening_session_then_tree_comes_from_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("filters.json"),
        r#"[
          {"id": "vehicles", "label": "Vehicles", "open": true, "children": [
            {"id": "cars", "label": "Cars", "checkState": "checked"},
            {"id": "trucks", "label": "Trucks"}
          ]},
          {"id": "min-score", "kind": {"type": "numericInput"}, "boundValue": 2}
        ]"#,
    )
    .unwrap();
    let container = container_for(&dir, "filters.json");

    // Act
    let mut session = container.session().unwrap();

    // Assert: states in a definition are ignored, structure and values kept
    assert_eq!(session.origin(), Origin::Definition);
    assert_eq!(session.tree().len(), 4);
    assert_eq!(session.tree().find("cars").unwrap().check_state, CheckState::Unchecked);
    assert_eq!(session.tree().find("min-score").unwrap().kind, LeafKind::NumericInput);
    assert_eq!(session.tree().find("min-score").unwrap().label, "min-score");

    session.dispatch(Action::ToggleCheck("cars".into()));
    session.dispatch(Action::SetValue("min-score".into(), Scalar::parse("7.5")));
    let projection = session.projection();
    assert!(projection.is_checked("cars"));
    assert_eq!(projection.number("min-score"), Some(7.5));
    assert_eq!(
        session.tree().find("vehicles").unwrap().check_state,
        CheckState::Indeterminate
    );
}

#[test]
fn given_toml_definition_file_when_opening_session_then_nodes_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("filters.toml"),
        r#"
[[nodes]]
id = "ships"
label = "Ships"

[[nodes.children]]
id = "tankers"
label = "Tankers"

[[nodes.children]]
id = "ferries"
label = "Ferries"

[[nodes]]
id = "region"
label = "Region"
kind = { type = "picker", options = ["north", "south"] }
boundValue = "north"
"#,
    )
    .unwrap();
    let container = container_for(&dir, "filters.toml");

    let mut session = container.session().unwrap();
    session.dispatch(Action::ToggleCheck("ships".into()));
    session.dispatch(Action::SetValue("region".into(), Scalar::parse("west")));

    let projection = session.projection();
    assert!(projection.is_checked("tankers"));
    assert!(projection.is_checked("ferries"));
    assert_eq!(projection.values.get("region"), Some(&Scalar::Text("north".into())));
}

#[test]
fn given_missing_definition_file_when_opening_session_then_error() {
    let dir = TempDir::new().unwrap();
    let container = container_for(&dir, "absent.json");

    let result = container.session();

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_malformed_definition_when_opening_session_then_definition_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), r#"{"id": "not-an-array"}"#).unwrap();
    let container = container_for(&dir, "broken.json");

    let err = container.session().err().expect("malformed definition");

    assert!(matches!(err, ApplicationError::Definition { .. }));
    assert!(err.to_string().contains("broken.json"));
}
