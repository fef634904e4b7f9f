//! # Object Model Common
//!
//! 这个 crate 提供对象模型各层共用的基础类型。
//!
//! ## 核心类型
//!
//! - [`Value`] - 字段与参数的动态值
//! - [`ObjectInfo`] - 对象描述符（类名 + 构造参数）
//! - [`WireObject`] - `[className, args]` 线格式
//! - [`ObjectError`] - 对象模型错误
//! - [`EngineConfig`] - 对象空间配置

pub mod configuration;
pub mod descriptor;
pub mod errors;
pub mod value;
pub mod wire;

pub use configuration::*;
pub use descriptor::*;
pub use errors::*;
pub use value::*;
pub use wire::*;
