//! Structural validation of stored graph modules.

use scopegraph_core::{GraphError, GraphLink, GraphModule, GraphNode, NodeRole, Point};
use serde_json::json;
use uuid::Uuid;

fn ids() -> (Uuid, Uuid, Uuid) {
    (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
}

fn link(source: Uuid, destination: Uuid) -> GraphLink {
    GraphLink::connect(
        Uuid::new_v4(),
        "next",
        "1.0.0",
        (source, Point::new(0, 0)),
        (destination, Point::new(5, 5)),
    )
}

fn sample() -> (GraphModule, Uuid, Uuid) {
    let (a, b, _) = ids();
    let module = GraphModule::new(Uuid::new_v4(), "greeting")
        .with_node(GraphNode::event_entry(a, "start", "message.received"))
        .with_node(GraphNode::action(b, "reply", Uuid::new_v4(), "send_text", "1.2.0").at(Point::new(3, 4)))
        .with_link(link(a, b));
    (module, a, b)
}

#[test]
fn well_formed_module_validates() {
    let (module, a, b) = sample();
    module.validate().unwrap();
    assert_eq!(module.node_count(), 2);
    assert_eq!(module.link_count(), 1);
    assert_eq!(module.node(a).map(GraphNode::role), Some(NodeRole::EventEntry));
    assert_eq!(module.node(b).map(GraphNode::role), Some(NodeRole::Action));
}

#[test]
fn duplicate_source_destination_pair_is_reported() {
    let (module, a, b) = sample();
    let module = module.with_link(link(a, b));
    let err = module.validate().unwrap_err();
    assert!(matches!(
        err,
        GraphError::DuplicateLinks { from, to } if from == a && to == b
    ));
    assert_eq!(err.to_string(), format!("duplicate links {a}-{b}"));
}

#[test]
fn link_messages() {
    let (a, b, _) = ids();
    let mut l = link(a, b);
    l.endpoint_b.node_id = Some(a);
    assert_eq!(
        l.validate().unwrap_err().to_string(),
        "link source and destination cannot be identical"
    );

    let mut l = link(a, b);
    l.endpoint_b.position = l.endpoint_a.position;
    assert_eq!(
        l.validate().unwrap_err().to_string(),
        "both link points cannot occupy the same position"
    );

    let mut l = link(a, b);
    l.config_json = "{".into();
    assert_eq!(l.validate().unwrap_err().to_string(), "config json is invalid");
}

#[test]
fn node_with_two_roles_is_rejected() {
    let mut node = GraphNode::action(Uuid::new_v4(), "x", Uuid::new_v4(), "t", "1.0.0");
    node.event_type_id = Some("evt".into());
    assert!(matches!(
        node.validate(),
        Err(GraphError::ConflictingRoles { first: "action", second: "event_entry" })
    ));
}

#[test]
fn node_versions_must_be_semver() {
    let node = GraphNode::module_ref(Uuid::new_v4(), "sub", Uuid::new_v4(), "v1");
    assert!(matches!(node.validate(), Err(GraphError::InvalidVersion(_))));

    let node = GraphNode::module_ref(Uuid::new_v4(), "sub", Uuid::new_v4(), "2.0.0-rc.1+build.5");
    node.validate().unwrap();
}

#[test]
fn stored_document_decodes() {
    let (a, b, link_id) = ids();
    let module_id = Uuid::new_v4();
    let doc = json!({
        "id": module_id,
        "label": "stored",
        "nodes": {
            a.to_string(): {"id": a, "label": "in", "event_type_id": "evt", "layout": {"x": 0, "y": 0}},
            b.to_string(): {"id": b, "label": "sub", "module_id": Uuid::new_v4(), "module_version": "0.0.1"}
        },
        "links": [{
            "id": link_id,
            "type_id": "next",
            "version": "1.0.0",
            "config_json": "{}",
            "a": {"node_id": a, "is_input": true, "pos": {"x": 1, "y": 1}},
            "b": {"node_id": b, "is_input": false, "pos": {"x": 9, "y": 1}}
        }]
    });
    let module: GraphModule = serde_json::from_value(doc).unwrap();
    module.validate().unwrap();
    assert_eq!(module.node(b).map(GraphNode::role), Some(NodeRole::ModuleRef));
    assert!(module.get_link(link_id).unwrap().endpoint_a.is_output);
    assert_eq!(module.digest().unwrap(), module.clone().digest().unwrap());

    let saved = serde_json::to_value(&module).unwrap();
    assert_eq!(saved["links"][0]["a"]["is_input"], json!(true));
    assert_eq!(saved["links"][0]["b"]["is_input"], json!(false));
}
