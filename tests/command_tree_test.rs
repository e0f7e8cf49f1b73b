mod common;

use std::sync::Arc;

use network_core::command::{
    CommandMeta, CommandRegistry, NoopExecutor, TreeError,
};
use network_core::player::StaticPlayerDirectory;

fn registry() -> CommandRegistry {
    CommandRegistry::new(Arc::new(StaticPlayerDirectory::new()))
}

#[test]
fn attaching_children_synthesizes_exactly_one_help_child() {
    let mut registry = registry();

    let root = registry.create("rank", CommandMeta::new("Manage ranks"), Arc::new(NoopExecutor));
    let set = registry.create("set", CommandMeta::new("Set a rank"), Arc::new(NoopExecutor));
    let get = registry.create("get", CommandMeta::new("Get a rank"), Arc::new(NoopExecutor));

    registry.attach(root, set).unwrap();
    registry.attach(root, get).unwrap();

    let help_children: Vec<_> = registry
        .children(root)
        .into_iter()
        .filter(|child| registry.name(*child) == "help")
        .collect();
    assert_eq!(help_children.len(), 1);
    assert_eq!(registry.children(root).len(), 3);
}

#[test]
fn user_supplied_help_child_is_never_overwritten() {
    let mut registry = registry();

    let root = registry.create("rank", CommandMeta::new("Manage ranks"), Arc::new(NoopExecutor));
    let help = registry.create("help", CommandMeta::new("Custom help"), Arc::new(NoopExecutor));
    let set = registry.create("set", CommandMeta::new("Set a rank"), Arc::new(NoopExecutor));

    registry.attach(root, help).unwrap();
    registry.attach(root, set).unwrap();

    let help_child = registry.resolve_child(root, "help").unwrap();
    assert_eq!(registry.meta(help_child).description, "Custom help");

    let help_children: Vec<_> = registry
        .children(root)
        .into_iter()
        .filter(|child| registry.name(*child) == "help")
        .collect();
    assert_eq!(help_children.len(), 1);
}

#[test]
fn node_cannot_be_attached_under_two_parents() {
    let mut registry = registry();

    let first = registry.create("first", CommandMeta::new("first"), Arc::new(NoopExecutor));
    let second = registry.create("second", CommandMeta::new("second"), Arc::new(NoopExecutor));
    let shared = registry.create("shared", CommandMeta::new("shared"), Arc::new(NoopExecutor));

    registry.attach(first, shared).unwrap();
    assert_eq!(
        registry.attach(second, shared),
        Err(TreeError::AlreadyAttached("shared".to_string()))
    );
}

#[test]
fn detached_node_can_be_reattached() {
    let mut registry = registry();

    let first = registry.create("first", CommandMeta::new("first"), Arc::new(NoopExecutor));
    let second = registry.create("second", CommandMeta::new("second"), Arc::new(NoopExecutor));
    let child = registry.create("child", CommandMeta::new("child"), Arc::new(NoopExecutor));

    registry.attach(first, child).unwrap();
    registry.detach(child).unwrap();
    registry.attach(second, child).unwrap();

    assert!(registry.resolve_child(first, "child").is_none());
    assert!(registry.resolve_child(second, "child").is_some());
}

#[test]
fn exact_name_match_wins_over_case_insensitive_fallback() {
    let mut registry = registry();

    let root = registry.create("root", CommandMeta::new("root"), Arc::new(NoopExecutor));
    let upper = registry.create("Foo", CommandMeta::new("upper"), Arc::new(NoopExecutor));
    let lower = registry.create("foo", CommandMeta::new("lower"), Arc::new(NoopExecutor));

    registry.attach(root, upper).unwrap();
    registry.attach(root, lower).unwrap();

    let resolved = registry.resolve_child(root, "Foo").unwrap();
    assert_eq!(registry.meta(resolved).description, "upper");

    let resolved = registry.resolve_child(root, "foo").unwrap();
    assert_eq!(registry.meta(resolved).description, "lower");

    // A token with no exact match falls back to some case-insensitive sibling.
    assert!(registry.resolve_child(root, "FOO").is_some());
}

#[test]
fn partial_match_short_circuits_on_exact_name() {
    let mut registry = registry();

    let root = registry.create("root", CommandMeta::new("root"), Arc::new(NoopExecutor));
    let set = registry.create("set", CommandMeta::new("set"), Arc::new(NoopExecutor));
    let settings = registry.create("settings", CommandMeta::new("settings"), Arc::new(NoopExecutor));

    registry.attach(root, set).unwrap();
    registry.attach(root, settings).unwrap();

    let exact = registry.partial_matches(root, "set");
    assert_eq!(exact.len(), 1);
    assert_eq!(registry.name(exact[0]), "set");

    let mut prefixed: Vec<_> = registry
        .partial_matches(root, "SE")
        .into_iter()
        .map(|id| registry.name(id).to_string())
        .collect();
    prefixed.sort();
    assert_eq!(prefixed, vec!["set", "settings"]);
}

#[test]
fn full_path_walks_parent_links() {
    let mut registry = registry();

    let root = registry.create("rank", CommandMeta::new("rank"), Arc::new(NoopExecutor));
    let set = registry.create("set", CommandMeta::new("set"), Arc::new(NoopExecutor));
    registry.attach(root, set).unwrap();

    assert_eq!(registry.full_path(root), "/rank");
    assert_eq!(registry.full_path(set), "/rank set");
}

#[test]
fn duplicate_root_names_are_rejected() {
    let mut registry = registry();

    let first = registry.create("rank", CommandMeta::new("first"), Arc::new(NoopExecutor));
    let second = registry.create("rank", CommandMeta::new("second"), Arc::new(NoopExecutor));

    registry.register_root(first).unwrap();
    assert_eq!(
        registry.register_root(second),
        Err(TreeError::DuplicateRoot("rank".to_string()))
    );
}

#[test]
fn root_aliases_resolve_to_the_same_node() {
    let mut registry = registry();

    let meta = CommandMeta::new("Broadcast a message")
        .with_aliases(vec!["bc".to_string(), "shout".to_string()]);
    let root = registry.create("broadcast", meta, Arc::new(NoopExecutor));
    registry.register_root(root).unwrap();

    assert_eq!(registry.root("broadcast"), Some(root));
    assert_eq!(registry.root("bc"), Some(root));
    assert_eq!(registry.root("shout"), Some(root));
}
