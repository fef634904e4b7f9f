//! 动态值定义
//!
//! 对象字段、构造参数和线格式共用同一套动态值表示

use crate::descriptor::ObjectInfo;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 参数表 / 字段表
pub type ValueMap = BTreeMap<String, Value>;

/// 实例句柄
///
/// 指向某个对象空间中实例槽位的索引，不持有实例本身。
/// 槽位被释放后会带着新的代数复用，旧句柄因代数不符而失效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    index: usize,
    generation: u32,
}

impl InstanceId {
    /// 由槽位索引和代数创建句柄
    pub const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// 槽位索引
    pub const fn index(self) -> usize {
        self.index
    }

    /// 槽位代数
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

/// 宿主原生值
///
/// 用于承载无法直接用 JSON 表示的值（例如时间戳），
/// 序列化时必须经过字段编解码器转换
#[derive(Clone)]
pub struct NativeValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl NativeValue {
    /// 包装原生值
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 尝试按具体类型读取
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// 原生类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native<{}>", self.type_name)
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// 动态值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// 无值
    #[default]
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 列表
    List(Vec<Value>),
    /// 键值表
    Map(ValueMap),
    /// 尚未实例化的对象描述
    Descriptor(ObjectInfo),
    /// 已构造的实例
    Instance(InstanceId),
    /// 宿主原生值
    Native(NativeValue),
}

impl Value {
    /// 包装宿主原生值
    pub fn native<T: Any + Send + Sync>(value: T) -> Self {
        Self::Native(NativeValue::new(value))
    }

    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 读取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 读取整数
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// 数值读取，整数会被提升为浮点
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// 读取字符串
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 读取键值表
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// 读取实例句柄
    pub fn as_instance(&self) -> Option<InstanceId> {
        match self {
            Self::Instance(id) => Some(*id),
            _ => None,
        }
    }

    /// 读取原生值
    pub fn downcast_native<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Native(native) => native.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// 值类别名称，用于错误信息
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Descriptor(_) => "descriptor",
            Self::Instance(_) => "instance",
            Self::Native(_) => "native",
        }
    }

    /// 转换为 JSON 值；实例句柄和原生值无法转换
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// 由键值对构建参数表
pub fn value_map<K, V, I>(pairs: I) -> ValueMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Self::Map(v)
    }
}

impl From<ObjectInfo> for Value {
    fn from(v: ObjectInfo) -> Self {
        Self::Descriptor(v)
    }
}

impl From<InstanceId> for Value {
    fn from(v: InstanceId) -> Self {
        Self::Instance(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Descriptor(info) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&info.name)?;
                seq.serialize_element(&Self::Map(info.args.clone()))?;
                seq.end()
            }
            Self::Instance(id) => Err(S::Error::custom(format!(
                "实例 {id} 必须先序列化为描述数组"
            ))),
            Self::Native(native) => Err(S::Error::custom(format!(
                "原生值 {} 需要字段编解码器",
                native.type_name()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
