//! 对象空间单元测试

mod construction_tests;

use crate::{ClassRegistryImpl, ObjectSpace};
use objmodel_abstractions::ClassSchema;
use objmodel_common::{value_map, ObjectInfo, Value};
use std::sync::Arc;

/// 注册 `Dep` 与 `Base` 两个示例类
fn scenario_registry() -> Arc<ClassRegistryImpl> {
    let registry = Arc::new(ClassRegistryImpl::new());

    registry
        .define(
            ClassSchema::new("Dep")
                .prop("x", 1)
                .injected(["a", "rand", "lol"]),
        )
        .unwrap();

    registry
        .define(
            ClassSchema::new("Base")
                .required("a")
                .prop("b", 10)
                .lazy("k", |_| Ok(Value::Float(rand::random::<f64>())))
                .dep("test", ObjectInfo::new("Dep", value_map([("x", 12)])))
                .computed("c", |ctx| {
                    let a = ctx.get("a")?.as_i64().unwrap_or_default();
                    let b = ctx.get("b")?.as_i64().unwrap_or_default();
                    Ok(Value::Int(a + b))
                })
                .provided(["a", "b"])
                .provide("rand", "k"),
        )
        .unwrap();

    registry
}

fn scenario_space() -> ObjectSpace {
    ObjectSpace::new(scenario_registry())
}
