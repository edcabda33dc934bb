//! Copy-on-write transformation batches over a context chain.

use scopegraph_core::context::Data;
use scopegraph_core::{
    ContainerKind, ContextError, ContextNode, ContextTree, MemoryContainer, PlaceholderRenderer,
    Transformation,
};
use serde_json::json;
use uuid::Uuid;

fn chain() -> ContextTree {
    let mut seeded = Data::new();
    seeded.insert("greeting".into(), json!("hello"));
    ContextTree::from_nodes(vec![
        ContextNode::new("environment", Uuid::new_v4())
            .with_container(MemoryContainer::new("config", ContainerKind::ReadOnly).with_data(seeded))
            .with_container(MemoryContainer::new("data", ContainerKind::Context).exposed(true)),
        ContextNode::new("user", Uuid::new_v4())
            .with_container(MemoryContainer::new("data", ContainerKind::Session))
            .with_container(MemoryContainer::new("secrets", ContainerKind::Secure)),
    ])
    .expect("non-empty chain")
}

#[test]
fn set_lands_in_new_tree_only() {
    let tree = chain();
    let next = tree
        .with_transformations(&[Transformation::set("user.data.test", "woah there")])
        .expect("valid batch");

    assert_eq!(next.get_data_string("user.data.test").as_deref(), Some("woah there"));
    assert!(tree.get_data("user.data.test").is_none());
    assert_eq!(next.id_path(), tree.id_path());
}

#[test]
fn one_bad_path_rejects_the_batch() {
    let tree = chain();
    let err = tree
        .with_transformations(&[
            Transformation::set("user.data.ok", 1),
            Transformation::set("user.data", 2),
        ])
        .unwrap_err();
    assert_eq!(
        err,
        ContextError::InvalidTransformationPath {
            path: "user.data".into()
        }
    );
    assert!(err.to_string().starts_with("invalid transformation path"));
}

#[test]
fn applying_twice_is_idempotent() {
    let tree = chain();
    let batch = [
        Transformation::set("user.data.a", 1),
        Transformation::set("environment.data.b", json!({"x": true})),
        Transformation::delete("user.data.c"),
    ];
    let once = tree.with_transformations(&batch).unwrap();
    let twice = once.with_transformations(&batch).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn delete_removes_key() {
    let tree = chain()
        .with_transformations(&[Transformation::set("user.data.k", "v")])
        .unwrap();
    let next = tree
        .with_transformations(&[Transformation::delete("user.data.k")])
        .unwrap();
    assert!(next.get_data("user.data.k").is_none());
    assert!(tree.get_data("user.data.k").is_some());
}

#[test]
fn read_only_containers_are_untouched() {
    let tree = chain();
    let next = tree
        .with_transformations(&[
            Transformation::set("environment.config.greeting", "bye"),
            Transformation::set("environment.config.new", 1),
        ])
        .unwrap();
    assert_eq!(next.get_data_string("environment.config.greeting").as_deref(), Some("hello"));
    assert!(next.get_data("environment.config.new").is_none());
}

#[test]
fn unknown_level_or_container_is_ignored() {
    let tree = chain();
    let next = tree
        .with_transformations(&[
            Transformation::set("bot.data.k", 1),
            Transformation::set("user.missing.k", 1),
        ])
        .unwrap();
    assert_eq!(next, tree);
}

#[test]
fn multipart_keys_are_stored_flat() {
    let next = chain()
        .with_transformations(&[Transformation::set("user.data.a.b", 7)])
        .unwrap();
    let user = next.find_by_name("user").unwrap();
    assert_eq!(user.memory_container("data").unwrap().get("a.b"), Some(&json!(7)));
}

#[test]
fn set_all_addresses_every_entry() {
    let mut data = Data::new();
    data.insert("one".into(), json!(1));
    data.insert("two".into(), json!("2"));
    let batch = Transformation::set_all("user.secrets", &data);
    assert_eq!(batch.len(), 2);

    let next = chain().with_transformations(&batch).unwrap();
    assert_eq!(next.get_data_int("user.secrets.one"), Some(1));
    assert_eq!(next.get_data_int("user.secrets.two"), Some(2));
}

#[test]
fn memory_updates_group_by_mutable_container() {
    let tree = chain();
    let batch = [
        Transformation::set("user.data.a", 1),
        Transformation::set("environment.config.greeting", "bye"),
        Transformation::set("environment.data.b", 2),
        Transformation::delete("user.data.c"),
    ];
    let updates = tree.memory_updates(&batch).unwrap();
    assert_eq!(updates.len(), 2);

    assert_eq!(updates[0].context_id, tree.root().id());
    assert_eq!(updates[0].container_name, "data");
    assert_eq!(updates[0].container_kind, ContainerKind::Context);
    assert_eq!(updates[0].transformations.len(), 1);

    assert_eq!(updates[1].context_id, tree.leaf().id());
    assert_eq!(updates[1].container_kind, ContainerKind::Session);
    assert_eq!(updates[1].transformations, vec![batch[0].clone(), batch[3].clone()]);

    let wire = serde_json::to_value(&updates[1]).unwrap();
    assert_eq!(wire["ct"], json!(1));
    assert_eq!(wire["c"], json!("data"));
    assert_eq!(wire["t"][1]["operation"], json!(1));
}

#[test]
fn memory_updates_reject_bad_paths() {
    assert!(chain()
        .memory_updates(&[Transformation::set("nope", 1)])
        .is_err());
}

#[test]
fn exposed_memory_lists_flagged_containers() {
    let tree = chain();
    let exposed = tree.exposed_memory();
    assert_eq!(exposed.len(), 1);
    assert_eq!(exposed[0].0.name(), "environment");
    assert_eq!(exposed[0].1.name, "data");
}

#[test]
fn render_uses_transformed_values() {
    let next = chain()
        .with_transformations(&[
            Transformation::set("user.data.name", "Ada"),
            Transformation::set("user.data.visits", 3),
        ])
        .unwrap();
    let out = next
        .render(
            &PlaceholderRenderer,
            "{{ environment.config.greeting }} {{user.data.name}}, visit {{ user.data.visits }}{{ user.data.none }}",
        )
        .unwrap();
    assert_eq!(out, "hello Ada, visit 3");
}
