//! 线格式
//!
//! 序列化后的对象是一个二元组 `[className, args]`，
//! 嵌套依赖同样以二元组出现在 `args` 中

use crate::descriptor::ObjectInfo;
use crate::errors::{ObjectError, ObjectResult};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};

/// 序列化对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireObject(pub String, pub ValueMap);

impl WireObject {
    /// 创建新的序列化对象
    pub fn new(name: impl Into<String>, args: ValueMap) -> Self {
        Self(name.into(), args)
    }

    /// 类名称
    pub fn name(&self) -> &str {
        &self.0
    }

    /// 参数表
    pub fn args(&self) -> &ValueMap {
        &self.1
    }

    /// 转换为 `[name, args]` 数组值
    pub fn into_value(self) -> Value {
        Value::List(vec![Value::String(self.0), Value::Map(self.1)])
    }

    /// 从 `[name, args]` 数组值解析
    pub fn from_value(value: &Value) -> ObjectResult<Self> {
        match value {
            Value::List(items) => ObjectInfo::from_pair(items)
                .map(Self::from)
                .ok_or_else(|| ObjectError::wire("期望 [类名, 参数表] 二元组")),
            Value::Descriptor(info) => Ok(Self::from(info.clone())),
            other => Err(ObjectError::wire(format!(
                "期望 [类名, 参数表] 二元组，实际为 {}",
                other.kind()
            ))),
        }
    }

    /// 编码为 JSON 字符串
    pub fn to_json_string(&self) -> ObjectResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 编码为带缩进的 JSON 字符串
    pub fn to_json_pretty(&self) -> ObjectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 从 JSON 字符串解码
    pub fn from_json_str(text: &str) -> ObjectResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<ObjectInfo> for WireObject {
    fn from(info: ObjectInfo) -> Self {
        Self(info.name, info.args)
    }
}

impl From<WireObject> for ObjectInfo {
    fn from(wire: WireObject) -> Self {
        Self::new(wire.0, wire.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::value_map;

    #[test]
    fn test_json_shape_is_pair() {
        let nested = WireObject::new("Dep", value_map([("x", 12)])).into_value();
        let wire = WireObject::new(
            "Base",
            value_map([("a", Value::Int(1)), ("test", nested)]),
        );
        let text = wire.to_json_string().unwrap();
        assert_eq!(text, r#"["Base",{"a":1,"test":["Dep",{"x":12}]}]"#);
        assert_eq!(WireObject::from_json_str(&text).unwrap(), wire);
    }

    #[test]
    fn test_from_value_rejects_non_pairs() {
        assert!(WireObject::from_value(&Value::Int(1)).is_err());
        assert!(WireObject::from_value(&Value::List(vec![Value::Int(1)])).is_err());
    }
}
