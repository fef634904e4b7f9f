//! 全局注册表与引擎配置集成测试
use objmodel_abstractions::ClassSchema;
use objmodel_common::{value_map, EngineConfig, ObjectError, Value, ValueMap, WireObject};
use objmodel_impl::{define_class, global_registry, lookup_class, ObjectSpace};

#[test]
fn test_classes_defined_globally_are_visible_to_global_space() -> anyhow::Result<()> {
    define_class(ClassSchema::new("GlobalLeaf").prop("x", 3))?;
    define_class(
        ClassSchema::new("GlobalRoot")
            .dep("leaf", "GlobalLeaf")
            .prop("label", "root"),
    )?;

    assert!(lookup_class("GlobalRoot").is_some());
    assert!(global_registry().len() >= 2);

    let mut space = ObjectSpace::global();
    let root = space.construct("GlobalRoot", ValueMap::new())?;
    assert_eq!(space.get_path(root, "leaf.x")?, Value::Int(3));
    assert_eq!(space.get(root, "label")?, Value::from("root"));
    Ok(())
}

#[test]
fn test_redefinition_does_not_touch_existing_instances() -> anyhow::Result<()> {
    define_class(ClassSchema::new("GlobalVersioned").prop("v", 1))?;
    let mut space = ObjectSpace::global();
    let old = space.construct("GlobalVersioned", ValueMap::new())?;

    define_class(ClassSchema::new("GlobalVersioned").prop("v", 2))?;
    let new = space.construct("GlobalVersioned", ValueMap::new())?;

    assert_eq!(space.get(old, "v")?, Value::Int(1));
    assert_eq!(space.get(new, "v")?, Value::Int(2));
    Ok(())
}

#[test]
fn test_config_limits_deserialization_depth() -> anyhow::Result<()> {
    define_class(ClassSchema::new("GlobalChain").dep("next", "GlobalChain"))?;

    let config = EngineConfig::from_toml_str("max_resolution_depth = 2")?;
    let mut space = ObjectSpace::with_config(global_registry(), config);

    let err = space
        .deserialize(&WireObject::new("GlobalChain", ValueMap::new()), None)
        .unwrap_err();
    assert!(matches!(err, ObjectError::ResolutionDepthExceeded { .. }));
    assert!(space.is_empty());

    let head = space.construct("GlobalChain", value_map([("next", "GlobalChain")]))?;
    assert!(space.get_path(head, "next.next").is_ok());
    assert!(matches!(
        space.get_path(head, "next.next.next"),
        Err(ObjectError::ResolutionDepthExceeded { .. })
    ));
    Ok(())
}
