//! 构造与失败回滚测试

use super::scenario_space;
use crate::{ClassRegistryImpl, ObjectSpace};
use objmodel_abstractions::ClassSchema;
use objmodel_common::{
    value_map, EngineConfig, InstanceId, ObjectError, ObjectInfo, Value, ValueMap, WireObject,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_missing_required_prop() {
    let mut space = scenario_space();
    let err = space.construct("Base", ValueMap::new()).unwrap_err();
    assert!(matches!(
        err,
        ObjectError::MissingRequiredField { class, field } if class == "Base" && field == "a"
    ));
    assert!(space.is_empty());
}

#[test]
fn test_missing_required_dependency() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Leaf")).unwrap();
    registry
        .define(ClassSchema::new("Needy").required_dep("leaf"))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    assert!(matches!(
        space.construct("Needy", ValueMap::new()),
        Err(ObjectError::MissingRequiredField { .. })
    ));

    let needy = space
        .construct("Needy", value_map([("leaf", "Leaf")]))
        .unwrap();
    let leaf = space.get(needy, "leaf").unwrap().as_instance().unwrap();
    assert_eq!(space.class_name_of(leaf).unwrap(), "Leaf");
}

#[test]
fn test_class_reference_as_dependency() {
    let registry = Arc::new(ClassRegistryImpl::new());
    let leaf = registry
        .define(ClassSchema::new("Leaf").prop("x", 1))
        .unwrap();
    let other = registry
        .define(ClassSchema::new("OtherLeaf").prop("x", 2))
        .unwrap();
    registry
        .define(ClassSchema::new("Holder").dep("leaf", &*leaf))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    let holder = space.construct("Holder", ValueMap::new()).unwrap();
    assert_eq!(space.get_path(holder, "leaf.x").unwrap(), Value::Int(1));

    let holder = space
        .construct("Holder", value_map([("leaf", Value::from(&*other))]))
        .unwrap();
    assert_eq!(
        space.describe(holder).unwrap().args["leaf"],
        Value::Descriptor(ObjectInfo::from(&*other))
    );
    assert_eq!(space.get_path(holder, "leaf.x").unwrap(), Value::Int(2));
}

#[test]
fn test_required_dependency_rejects_bare_arguments() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry
        .define(ClassSchema::new("Needy").required_dep("leaf"))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    let args = value_map([("leaf", Value::Map(value_map([("x", 1)])))]);
    assert!(matches!(
        space.construct("Needy", args),
        Err(ObjectError::InvalidDependencySpecification { .. })
    ));
}

#[test]
fn test_invalid_dependency_override() {
    let mut space = scenario_space();
    let args = value_map([("a", Value::Int(1)), ("test", Value::Int(5))]);
    assert!(matches!(
        space.construct("Base", args),
        Err(ObjectError::InvalidDependencySpecification { field, .. }) if field == "test"
    ));
}

#[test]
fn test_unknown_class() {
    let mut space = scenario_space();
    assert!(matches!(
        space.construct("Nope", ValueMap::new()),
        Err(ObjectError::UnknownClass { .. })
    ));
    assert!(matches!(
        space.instantiate(&Value::Int(3), None),
        Err(ObjectError::InvalidDependencySpecification { .. })
    ));
}

#[test]
fn test_null_dependency_argument_uses_default() {
    let mut space = scenario_space();
    let base = space
        .construct("Base", value_map([("a", Value::Int(1)), ("test", Value::Null)]))
        .unwrap();
    assert_eq!(space.get_path(base, "test.x").unwrap(), Value::Int(12));
}

#[test]
fn test_undeclared_arguments_are_ignored() {
    let mut space = scenario_space();
    let base = space
        .construct("Base", value_map([("a", 1), ("zzz", 2)]))
        .unwrap();
    assert!(!space.describe(base).unwrap().args.contains_key("zzz"));
}

#[test]
fn test_init_runs_once_after_fields_settle() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let registry = Arc::new(ClassRegistryImpl::new());
    registry
        .define(ClassSchema::new("Counted").prop("n", 3).init(move |ctx| {
            let n = ctx.get("n")?.as_i64().unwrap_or_default();
            seen.fetch_add(n as usize, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();
    registry
        .define(ClassSchema::new("SubCounted").inherits("Counted").prop("n", 4))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    let id = space.construct("Counted", ValueMap::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    space.get(id, "n").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // 子类继承 init
    space.construct("SubCounted", ValueMap::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 7);
}

#[test]
fn test_failed_init_discards_instance_and_children() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Leaf").prop("x", 1)).unwrap();
    registry
        .define(ClassSchema::new("Fragile").dep("leaf", "Leaf").init(|ctx| {
            ctx.get("leaf")?;
            Err(ObjectError::missing_required("Fragile", "token"))
        }))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    let survivor = space.construct("Leaf", ValueMap::new()).unwrap();
    assert!(space.construct("Fragile", ValueMap::new()).is_err());
    assert_eq!(space.len(), 1);
    assert_eq!(space.get(survivor, "x").unwrap(), Value::Int(1));
}

#[test]
fn test_failed_child_construction_keeps_owner() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry
        .define(ClassSchema::new("Strict").required("token"))
        .unwrap();
    registry
        .define(ClassSchema::new("Owner").dep("strict", "Strict"))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    let owner = space.construct("Owner", ValueMap::new()).unwrap();
    assert!(matches!(
        space.get(owner, "strict"),
        Err(ObjectError::MissingRequiredField { .. })
    ));
    assert_eq!(space.len(), 1);
    assert!(!space.is_resolved(owner, "strict").unwrap());
}

#[test]
fn test_deserialization_depth_is_bounded() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry
        .define(ClassSchema::new("Node").dep("next", "Node"))
        .unwrap();
    let config = EngineConfig {
        max_resolution_depth: 4,
        ..EngineConfig::default()
    };
    let mut space = ObjectSpace::with_config(registry, config);

    let err = space
        .deserialize(&WireObject::new("Node", ValueMap::new()), None)
        .unwrap_err();
    assert!(matches!(err, ObjectError::ResolutionDepthExceeded { depth: 5, .. }));
    assert!(space.is_empty());

    // 非反序列化模式下依赖保持惰性
    let node = space.construct("Node", ValueMap::new()).unwrap();
    assert!(space.get_path(node, "next.next.next").is_ok());
}

#[test]
fn test_instance_limit() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Leaf")).unwrap();
    let config = EngineConfig {
        max_instances: 2,
        ..EngineConfig::default()
    };
    let mut space = ObjectSpace::with_config(registry, config);

    space.construct("Leaf", ValueMap::new()).unwrap();
    space.construct("Leaf", ValueMap::new()).unwrap();
    assert!(matches!(
        space.construct("Leaf", ValueMap::new()),
        Err(ObjectError::InstanceLimitExceeded { limit: 2 })
    ));
}

#[test]
fn test_failed_construction_frees_capacity() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Leaf")).unwrap();
    registry
        .define(ClassSchema::new("Fragile").init(|_| Err(ObjectError::wire("boom"))))
        .unwrap();
    let config = EngineConfig {
        max_instances: 2,
        ..EngineConfig::default()
    };
    let mut space = ObjectSpace::with_config(registry, config);

    assert!(space.construct("Fragile", ValueMap::new()).is_err());
    space.construct("Leaf", ValueMap::new()).unwrap();
    assert_eq!(space.len(), 1);
    space.construct("Leaf", ValueMap::new()).unwrap();
    assert_eq!(space.len(), 2);
}

#[test]
fn test_stale_handle_is_rejected_after_slot_reuse() {
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Leaf").prop("x", 1)).unwrap();
    registry
        .define(ClassSchema::new("Fragile").init(|_| Err(ObjectError::wire("boom"))))
        .unwrap();
    let mut space = ObjectSpace::new(registry);

    assert!(space.construct("Fragile", ValueMap::new()).is_err());
    let stale = InstanceId::new(0, 0);
    assert!(matches!(
        space.get(stale, "x"),
        Err(ObjectError::InvalidInstance { .. })
    ));

    let leaf = space.construct("Leaf", ValueMap::new()).unwrap();
    assert_eq!(leaf.index(), stale.index());
    assert_ne!(leaf, stale);
    assert!(matches!(
        space.get(stale, "x"),
        Err(ObjectError::InvalidInstance { .. })
    ));
    assert_eq!(space.get(leaf, "x").unwrap(), Value::Int(1));
}

#[test]
fn test_release_removes_owned_subtree_only() {
    let mut space = scenario_space();
    let outside = space.construct("Dep", ValueMap::new()).unwrap();
    let base = space.construct("Base", value_map([("a", 1)])).unwrap();
    let owned = space.get(base, "test").unwrap().as_instance().unwrap();
    let bound = space
        .construct("Base", value_map([("a", Value::Int(2)), ("test", Value::Instance(outside))]))
        .unwrap();
    assert_eq!(space.len(), 4);

    assert_eq!(space.release(base).unwrap(), 2);
    assert_eq!(space.len(), 2);
    assert!(matches!(space.get(owned, "x"), Err(ObjectError::InvalidInstance { .. })));
    assert!(matches!(space.release(base), Err(ObjectError::InvalidInstance { .. })));

    // 外部绑定的依赖有自己的父链，释放持有者时不受影响
    assert_eq!(space.release(bound).unwrap(), 1);
    assert_eq!(space.get(outside, "x").unwrap(), Value::Int(1));
}

#[test]
fn test_clear_invalidates_every_handle() {
    let mut space = scenario_space();
    let base = space.construct("Base", value_map([("a", 1)])).unwrap();
    space.get(base, "test").unwrap();

    space.clear();
    assert!(space.is_empty());
    assert!(matches!(space.get(base, "a"), Err(ObjectError::InvalidInstance { .. })));

    let again = space.construct("Base", value_map([("a", 1)])).unwrap();
    assert_ne!(again, base);
    assert_eq!(space.get(again, "b").unwrap(), Value::Int(10));
}
