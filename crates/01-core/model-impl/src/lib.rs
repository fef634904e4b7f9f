//! # 对象模型具体实现
//!
//! 提供类定义组合器、类注册表和对象空间（实例构造、字段解析、
//! 祖先注入与序列化管道）。
//!
//! ## 基本使用
//!
//! ```rust
//! use objmodel_abstractions::ClassSchema;
//! use objmodel_common::{value_map, Value};
//! use objmodel_impl::{ClassRegistryImpl, ObjectSpace};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ClassRegistryImpl::new());
//! registry.define(ClassSchema::new("Point").required("x").prop("y", 0))?;
//!
//! let mut space = ObjectSpace::new(registry);
//! let point = space.construct("Point", value_map([("x", 3)]))?;
//! assert_eq!(space.get(point, "y")?, Value::Int(0));
//!
//! let wire = space.serialize(point)?;
//! assert_eq!(wire.to_json_string()?, r#"["Point",{"x":3,"y":0}]"#);
//! # Ok::<(), objmodel_common::ObjectError>(())
//! ```

mod context;
mod injector;
mod resolution;
mod serializer;

pub mod composer;
pub mod registry;
pub mod space;

pub use composer::DefinitionComposer;
pub use registry::{define_class, global_registry, lookup_class, ClassRegistryImpl};
pub use space::ObjectSpace;

#[cfg(test)]
mod tests;
