//! # Object Model Abstractions
//!
//! 对象模型的声明词汇：类模式、已编译定义和注册表接口。
//!
//! ## 核心接口
//!
//! - [`ClassSchema`] - 定义类时提交的原始模式
//! - [`Definition`] - 合并继承后的已编译定义，携带字段访问器表
//! - [`FieldCodec`] - 字段编解码器
//! - [`ObjectContext`] - 用户函数看到的实例上下文
//! - [`ClassRegistry`] - 类注册表接口

pub mod codec;
pub mod context;
pub mod definition;
pub mod registry;
pub mod schema;

pub use codec::*;
pub use context::*;
pub use definition::*;
pub use registry::*;
pub use schema::*;
