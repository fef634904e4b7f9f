//! 类定义原始模式
//!
//! `ClassSchema` 是定义类时提交的原始声明，经组合器编译后得到 [`Definition`](crate::Definition)

use crate::codec::FieldCodec;
use crate::context::{InitHook, MethodFn, ObjectContext, ValueFn};
use crate::definition::Definition;
use objmodel_common::{ObjectResult, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 属性声明
#[derive(Clone)]
pub enum PropSpec {
    /// 必需值，构造时必须提供
    Required,
    /// 字面默认值
    Literal(Value),
    /// 惰性默认值，首次读取时求值
    Lazy(ValueFn),
}

impl fmt::Debug for PropSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Lazy(_) => write!(f, "Lazy(<function>)"),
        }
    }
}

/// 父类引用
#[derive(Clone)]
pub enum ParentRef {
    /// 按注册名称引用
    Named(String),
    /// 直接引用已编译的定义
    Definition(Arc<Definition>),
}

impl ParentRef {
    /// 父类名称
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Definition(definition) => &definition.name,
        }
    }
}

impl fmt::Debug for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Definition(definition) => {
                f.debug_tuple("Definition").field(&definition.name).finish()
            }
        }
    }
}

/// 提供/注入名称映射
///
/// 列表形式是简写，表示每个名称映射到自身
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refs {
    /// 显式映射
    Map(BTreeMap<String, String>),
    /// 同名简写
    List(Vec<String>),
}

impl Refs {
    /// 规范化为映射形式
    pub fn normalize(self) -> BTreeMap<String, String> {
        match self {
            Self::Map(map) => map,
            Self::List(names) => names.into_iter().map(|n| (n.clone(), n)).collect(),
        }
    }
}

impl From<Vec<String>> for Refs {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl From<Vec<&str>> for Refs {
    fn from(names: Vec<&str>) -> Self {
        Self::List(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Refs {
    fn from(names: [&str; N]) -> Self {
        Self::List(names.iter().map(|n| (*n).to_string()).collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Refs {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::Map(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for Refs {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map)
    }
}

/// 类定义原始模式
#[derive(Clone, Default)]
pub struct ClassSchema {
    /// 类名称，同时是注册键
    pub name: String,
    /// 父类
    pub parent: Option<ParentRef>,
    /// 属性
    pub props: BTreeMap<String, PropSpec>,
    /// 依赖，`None` 表示构造时必须提供
    pub deps: BTreeMap<String, Option<Value>>,
    /// 计算字段
    pub computed: BTreeMap<String, ValueFn>,
    /// 方法
    pub methods: BTreeMap<String, MethodFn>,
    /// 外部名称 -> 本地字段
    pub provided: BTreeMap<String, String>,
    /// 本地字段 -> 外部名称
    pub injected: BTreeMap<String, String>,
    /// 字段编解码器
    pub serializers: BTreeMap<String, Arc<dyn FieldCodec>>,
    /// 构造完成钩子
    pub init: Option<InitHook>,
}

impl ClassSchema {
    /// 创建新的类模式
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 按名称继承父类
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(ParentRef::Named(parent.into()));
        self
    }

    /// 直接继承已编译的定义
    pub fn inherits_definition(mut self, parent: Arc<Definition>) -> Self {
        self.parent = Some(ParentRef::Definition(parent));
        self
    }

    /// 添加必需属性
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.props.insert(name.into(), PropSpec::Required);
        self
    }

    /// 添加带字面默认值的属性
    pub fn prop(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.props
            .insert(name.into(), PropSpec::Literal(default.into()));
        self
    }

    /// 添加带惰性默认值的属性
    pub fn lazy<F>(mut self, name: impl Into<String>, default: F) -> Self
    where
        F: Fn(&mut dyn ObjectContext) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.props
            .insert(name.into(), PropSpec::Lazy(Arc::new(default)));
        self
    }

    /// 添加依赖，默认值可以是类名、描述符或 `[name, args]` 数组
    pub fn dep(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.deps.insert(name.into(), Some(default.into()));
        self
    }

    /// 添加构造时必须提供的依赖
    pub fn required_dep(mut self, name: impl Into<String>) -> Self {
        self.deps.insert(name.into(), None);
        self
    }

    /// 添加计算字段
    pub fn computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&mut dyn ObjectContext) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.computed.insert(name.into(), Arc::new(compute));
        self
    }

    /// 添加方法
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut dyn ObjectContext, &[Value]) -> ObjectResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// 批量声明提供的能力
    pub fn provided(mut self, refs: impl Into<Refs>) -> Self {
        self.provided.extend(refs.into().normalize());
        self
    }

    /// 以外部名称提供本地字段
    pub fn provide(mut self, external: impl Into<String>, local: impl Into<String>) -> Self {
        self.provided.insert(external.into(), local.into());
        self
    }

    /// 批量声明注入字段
    pub fn injected(mut self, refs: impl Into<Refs>) -> Self {
        self.injected.extend(refs.into().normalize());
        self
    }

    /// 注入外部名称到本地字段
    pub fn inject(mut self, local: impl Into<String>, external: impl Into<String>) -> Self {
        self.injected.insert(local.into(), external.into());
        self
    }

    /// 设置字段编解码器
    pub fn serializer(mut self, field: impl Into<String>, codec: Arc<dyn FieldCodec>) -> Self {
        self.serializers.insert(field.into(), codec);
        self
    }

    /// 设置构造完成钩子
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn ObjectContext) -> ObjectResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ClassSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassSchema")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("props", &self.props)
            .field("deps", &self.deps)
            .field("computed", &self.computed.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("provided", &self.provided)
            .field("injected", &self.injected)
            .field("serializers", &self.serializers.keys().collect::<Vec<_>>())
            .field("init", &self.init.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_shorthand_maps_names_to_themselves() {
        let map = Refs::from(["a", "b"]).normalize();
        assert_eq!(map.get("a").map(String::as_str), Some("a"));
        assert_eq!(map.get("b").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_mixed_provided_forms() {
        let schema = ClassSchema::new("Base")
            .provided(["a", "b"])
            .provide("rand", "k");
        assert_eq!(schema.provided.len(), 3);
        assert_eq!(schema.provided["rand"], "k");
        assert_eq!(schema.provided["a"], "a");
    }

    #[test]
    fn test_builder_collects_categories() {
        let schema = ClassSchema::new("Base")
            .inherits("Root")
            .required("a")
            .prop("b", 10)
            .lazy("k", |_| Ok(Value::Float(0.5)))
            .dep("test", "Dep")
            .required_dep("other")
            .computed("c", |_| Ok(Value::Null))
            .inject("x", "y");

        assert_eq!(schema.parent.as_ref().map(ParentRef::name), Some("Root"));
        assert!(matches!(schema.props["a"], PropSpec::Required));
        assert!(matches!(schema.props["b"], PropSpec::Literal(Value::Int(10))));
        assert!(matches!(schema.props["k"], PropSpec::Lazy(_)));
        assert_eq!(schema.deps["test"], Some(Value::from("Dep")));
        assert_eq!(schema.deps["other"], None);
        assert_eq!(schema.injected["x"], "y");
    }
}
