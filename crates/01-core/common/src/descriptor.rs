//! 对象描述符
//!
//! `ObjectInfo` 是"用参数表 `args` 构造的 `name` 类实例"的可序列化描述，
//! 参数值本身也可以是嵌套的描述符

use crate::errors::{ObjectError, ObjectResult};
use crate::value::{Value, ValueMap};

/// 对象描述符
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectInfo {
    /// 类名称
    pub name: String,
    /// 构造参数
    pub args: ValueMap,
}

impl ObjectInfo {
    /// 创建新的描述符
    pub fn new(name: impl Into<String>, args: ValueMap) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// 创建无参数的描述符
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, ValueMap::new())
    }

    /// 由 `[name, args]` 形式的数组创建描述符
    pub fn from_pair(items: &[Value]) -> Option<Self> {
        match items {
            [Value::String(name)] => Some(Self::named(name.clone())),
            [Value::String(name), Value::Map(args)] => Some(Self::new(name.clone(), args.clone())),
            [Value::String(name), Value::Null] => Some(Self::named(name.clone())),
            _ => None,
        }
    }

    /// 将任意描述形式的值规范化为描述符
    ///
    /// 接受类名字符串、描述符以及 `[name, args]` 数组
    pub fn from_value(field: &str, value: &Value) -> ObjectResult<Self> {
        match value {
            Value::String(name) => Ok(Self::named(name.clone())),
            Value::Descriptor(info) => Ok(info.clone()),
            Value::List(items) => Self::from_pair(items).ok_or_else(|| {
                ObjectError::invalid_dependency(field, "数组必须是 [类名, 参数表] 形式")
            }),
            other => Err(ObjectError::invalid_dependency(
                field,
                format!("无法从 {} 值推导依赖描述", other.kind()),
            )),
        }
    }

    /// 与覆盖值合并
    ///
    /// - 无值: 原描述符的副本
    /// - 字符串: 保留参数，替换类名
    /// - 描述符或 `[name, args]` 数组: 整体替换
    /// - 参数表: 浅合并到原参数中
    pub fn merge(&self, field: &str, overriding: &Value) -> ObjectResult<Self> {
        match overriding {
            Value::Null => Ok(self.clone()),
            Value::String(name) => Ok(Self::new(name.clone(), self.args.clone())),
            Value::Descriptor(_) | Value::List(_) => Self::from_value(field, overriding),
            Value::Map(extra) => {
                let mut args = self.args.clone();
                args.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(Self::new(self.name.clone(), args))
            }
            other => Err(ObjectError::invalid_dependency(
                field,
                format!("不支持用 {} 值覆盖依赖", other.kind()),
            )),
        }
    }

    /// 转换为 `[name, args]` 数组形式，嵌套描述符递归转换
    pub fn to_array(&self) -> Value {
        Value::List(vec![
            Value::String(self.name.clone()),
            Value::Map(
                self.args
                    .iter()
                    .map(|(k, v)| (k.clone(), flatten_descriptors(v)))
                    .collect(),
            ),
        ])
    }
}

fn flatten_descriptors(value: &Value) -> Value {
    match value {
        Value::Descriptor(info) => info.to_array(),
        other => other.clone(),
    }
}
