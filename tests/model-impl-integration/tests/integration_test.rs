//! objmodel-impl 集成测试
use chrono::{DateTime, Utc};
use objmodel_abstractions::{ClassSchema, FieldCodec, FnCodec};
use objmodel_common::{value_map, ObjectError, ObjectInfo, Value, ValueMap, WireObject};
use objmodel_impl::{ClassRegistryImpl, ObjectSpace};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// 时间戳字段以 RFC 3339 字符串写入线格式
fn timestamp_codec() -> Arc<dyn FieldCodec> {
    FnCodec::shared(
        |value: &Value| {
            value
                .downcast_native::<DateTime<Utc>>()
                .map(|d| Value::String(d.to_rfc3339()))
                .ok_or_else(|| ObjectError::codec("d", "期望 DateTime<Utc>"))
        },
        |raw: &Value| {
            let text = raw
                .as_str()
                .ok_or_else(|| ObjectError::codec("d", "期望 RFC 3339 字符串"))?;
            let parsed = DateTime::parse_from_rfc3339(text)
                .map_err(|e| ObjectError::codec("d", e.to_string()))?;
            Ok(Value::native(parsed.with_timezone(&Utc)))
        },
    )
}

fn registry() -> anyhow::Result<Arc<ClassRegistryImpl>> {
    let registry = Arc::new(ClassRegistryImpl::new());

    registry.define(
        ClassSchema::new("Dep")
            .prop("x", 1)
            .injected(["a", "rand", "lol"]),
    )?;

    registry.define(
        ClassSchema::new("Base")
            .required("a")
            .prop("b", 10)
            .lazy("k", |_| Ok(Value::Float(rand::random::<f64>())))
            .lazy("d", |_| Ok(Value::native(Utc::now())))
            .dep("test", ObjectInfo::new("Dep", value_map([("x", 12)])))
            .computed("c", |ctx| {
                let a = ctx.get("a")?.as_i64().unwrap_or_default();
                let b = ctx.get("b")?.as_i64().unwrap_or_default();
                Ok(Value::Int(a + b))
            })
            .method("sum_with", |ctx, args| {
                let c = ctx.get("c")?.as_i64().unwrap_or_default();
                let extra = args.first().and_then(Value::as_i64).unwrap_or_default();
                Ok(Value::Int(c + extra))
            })
            .provided(["a", "b"])
            .provide("rand", "k")
            .serializer("d", timestamp_codec()),
    )?;

    Ok(registry)
}

fn timestamp(space: &mut ObjectSpace, id: objmodel_common::InstanceId) -> anyhow::Result<DateTime<Utc>> {
    let value = space.get(id, "d")?;
    value
        .downcast_native::<DateTime<Utc>>()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("d 不是时间戳: {}", value.kind()))
}

#[test]
fn test_construct_and_read_fields() -> anyhow::Result<()> {
    init_tracing();
    let mut space = ObjectSpace::new(registry()?);

    let base = space.construct("Base", value_map([("a", 1)]))?;
    assert_eq!(space.get(base, "a")?, Value::Int(1));
    assert_eq!(space.get(base, "b")?, Value::Int(10));
    assert_eq!(space.get(base, "c")?, Value::Int(11));
    assert_eq!(space.call(base, "sum_with", &[Value::Int(4)])?, Value::Int(15));

    assert_eq!(space.get_path(base, "test.x")?, Value::Int(12));
    assert_eq!(space.get_path(base, "test.a")?, Value::Int(1));
    assert_eq!(space.get_path(base, "test.rand")?, space.get(base, "k")?);
    assert_eq!(space.get_path(base, "test.lol")?, Value::Null);
    Ok(())
}

#[test]
fn test_override_dependency_arguments() -> anyhow::Result<()> {
    init_tracing();
    let mut space = ObjectSpace::new(registry()?);

    let base = space.construct(
        "Base",
        value_map([("a", Value::Int(1)), ("test", Value::Map(value_map([("x", 22)])))]),
    )?;
    assert_eq!(space.get_path(base, "test.x")?, Value::Int(22));
    Ok(())
}

#[test]
fn test_immutable_after_construction() -> anyhow::Result<()> {
    init_tracing();
    let mut space = ObjectSpace::new(registry()?);

    let base = space.construct("Base", value_map([("a", 1)]))?;
    let err = space.set(base, "a", Value::Int(2)).unwrap_err();
    assert!(matches!(err, ObjectError::ImmutableFieldWrite { .. }));
    assert_eq!(space.get(base, "a")?, Value::Int(1));
    Ok(())
}

#[test]
fn test_wire_round_trip_with_timestamp_codec() -> anyhow::Result<()> {
    init_tracing();
    let mut space = ObjectSpace::new(registry()?);

    let base = space.construct("Base", value_map([("a", Value::Int(1)), ("k", Value::Float(0.25))]))?;
    let created = timestamp(&mut space, base)?;
    let k = space.get(base, "k")?;

    let text = space.serialize(base)?.to_json_string()?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(json[0], "Base");
    assert_eq!(json[1]["a"], 1);
    assert_eq!(json[1]["b"], 10);
    assert_eq!(json[1]["k"], 0.25);
    assert_eq!(json[1]["d"], created.to_rfc3339());
    assert_eq!(json[1]["test"], serde_json::json!(["Dep", {"x": 12}]));
    assert!(json[1].get("c").is_none());

    let mut restored = ObjectSpace::new(registry()?);
    let copy = restored.deserialize(&WireObject::from_json_str(&text)?, None)?;
    assert_eq!(timestamp(&mut restored, copy)?, created);
    assert_eq!(restored.get(copy, "k")?, k);
    assert_eq!(restored.get(copy, "c")?, Value::Int(11));
    assert_eq!(restored.get_path(copy, "test.rand")?, k);

    assert_eq!(restored.serialize(copy)?.to_json_string()?, text);
    Ok(())
}

#[test]
fn test_serialization_without_codec_fails_for_native_values() -> anyhow::Result<()> {
    init_tracing();
    let registry = Arc::new(ClassRegistryImpl::new());
    registry.define(ClassSchema::new("Stamped").lazy("at", |_| Ok(Value::native(Utc::now()))))?;
    let mut space = ObjectSpace::new(registry);

    let stamped = space.construct("Stamped", ValueMap::new())?;
    let wire = space.serialize(stamped)?;
    assert!(matches!(wire.to_json_string(), Err(ObjectError::Json { .. })));
    Ok(())
}

#[test]
fn test_inheritance_chain_keeps_injection_working() -> anyhow::Result<()> {
    init_tracing();
    let registry = registry()?;
    registry.define(
        ClassSchema::new("Derived")
            .inherits("Base")
            .prop("b", 20)
            .dep("extra", "Dep"),
    )?;
    let mut space = ObjectSpace::new(registry.clone());

    let derived = space.construct("Derived", value_map([("a", 2)]))?;
    assert_eq!(space.get(derived, "c")?, Value::Int(22));
    assert_eq!(space.get_path(derived, "extra.a")?, Value::Int(2));
    assert_eq!(space.get_path(derived, "extra.x")?, Value::Int(1));

    let definition = space.definition_of(derived)?;
    assert!(definition.is_a("Base"));
    assert_eq!(definition.parent(), Some("Base"));
    Ok(())
}
