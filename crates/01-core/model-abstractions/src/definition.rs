//! 已编译的类定义
//!
//! 每个定义携带一张静态声明的访问器表：字段名 -> 解析策略，
//! 由对象空间中唯一的通用解析器按策略求值

use crate::codec::FieldCodec;
use crate::context::{InitHook, MethodFn, ValueFn};
use crate::schema::PropSpec;
use objmodel_common::{ObjectInfo, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 类成员表（各类别独立合并）
#[derive(Clone, Default)]
pub struct ClassMembers {
    /// 属性及其默认值
    pub props: BTreeMap<String, PropSpec>,
    /// 依赖及其默认描述，无默认值时为必填
    pub deps: BTreeMap<String, Option<ObjectInfo>>,
    /// 计算字段
    pub computed: BTreeMap<String, ValueFn>,
    /// 方法
    pub methods: BTreeMap<String, MethodFn>,
    /// 提供给后代的名称，外部名称到本地字段
    pub provided: BTreeMap<String, String>,
    /// 注入字段，本地字段到外部名称
    pub injected: BTreeMap<String, String>,
    /// 字段编解码器
    pub serializers: BTreeMap<String, Arc<dyn FieldCodec>>,
}

impl ClassMembers {
    /// 移除任意值类别中的同名字段
    pub fn remove_field(&mut self, field: &str) {
        self.props.remove(field);
        self.deps.remove(field);
        self.computed.remove(field);
        self.injected.remove(field);
    }
}

/// 字段类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 属性
    Prop,
    /// 依赖
    Dependency,
    /// 计算字段
    Computed,
    /// 注入字段
    Injected,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prop => "prop",
            Self::Dependency => "dependency",
            Self::Computed => "computed",
            Self::Injected => "injected",
        };
        f.write_str(name)
    }
}

/// 字段解析策略
#[derive(Clone)]
pub enum FieldStrategy {
    /// 必需值
    RequiredValue,
    /// 字面默认值
    LiteralDefault(Value),
    /// 惰性默认值
    LazyDefault(ValueFn),
    /// 依赖描述符，`None` 表示必须在构造时提供
    DependencyDescriptor(Option<ObjectInfo>),
    /// 计算字段
    ComputedFn(ValueFn),
    /// 注入字段，携带外部名称
    Injected(String),
}

impl FieldStrategy {
    /// 策略所属的字段类别
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::RequiredValue | Self::LiteralDefault(_) | Self::LazyDefault(_) => FieldKind::Prop,
            Self::DependencyDescriptor(_) => FieldKind::Dependency,
            Self::ComputedFn(_) => FieldKind::Computed,
            Self::Injected(_) => FieldKind::Injected,
        }
    }
}

impl fmt::Debug for FieldStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredValue => write!(f, "RequiredValue"),
            Self::LiteralDefault(v) => f.debug_tuple("LiteralDefault").field(v).finish(),
            Self::LazyDefault(_) => write!(f, "LazyDefault(<function>)"),
            Self::DependencyDescriptor(info) => {
                f.debug_tuple("DependencyDescriptor").field(info).finish()
            }
            Self::ComputedFn(_) => write!(f, "ComputedFn(<function>)"),
            Self::Injected(external) => f.debug_tuple("Injected").field(external).finish(),
        }
    }
}

impl From<&PropSpec> for FieldStrategy {
    fn from(spec: &PropSpec) -> Self {
        match spec {
            PropSpec::Required => Self::RequiredValue,
            PropSpec::Literal(value) => Self::LiteralDefault(value.clone()),
            PropSpec::Lazy(f) => Self::LazyDefault(f.clone()),
        }
    }
}

/// 已编译的类定义
///
/// 定义在类定义时创建一次，之后不再修改
pub struct Definition {
    /// 类名称
    pub name: String,
    /// 祖先类名称，由近及远
    pub ancestors: Vec<String>,
    /// 合并后的成员
    pub members: ClassMembers,
    /// 构造完成钩子
    pub init: Option<InitHook>,
    accessors: BTreeMap<String, FieldStrategy>,
}

impl Definition {
    /// 创建定义并生成访问器表
    pub fn new(
        name: impl Into<String>,
        ancestors: Vec<String>,
        members: ClassMembers,
        init: Option<InitHook>,
    ) -> Self {
        let mut accessors = BTreeMap::new();
        for (field, spec) in &members.props {
            accessors.insert(field.clone(), FieldStrategy::from(spec));
        }
        for (field, default) in &members.deps {
            accessors.insert(
                field.clone(),
                FieldStrategy::DependencyDescriptor(default.clone()),
            );
        }
        for (field, compute) in &members.computed {
            accessors.insert(field.clone(), FieldStrategy::ComputedFn(compute.clone()));
        }
        for (field, external) in &members.injected {
            accessors.insert(field.clone(), FieldStrategy::Injected(external.clone()));
        }

        Self {
            name: name.into(),
            ancestors,
            members,
            init,
            accessors,
        }
    }

    /// 直接父类名称
    pub fn parent(&self) -> Option<&str> {
        self.ancestors.first().map(String::as_str)
    }

    /// 是否为指定类或其子类
    pub fn is_a(&self, class: &str) -> bool {
        self.name == class || self.ancestors.iter().any(|a| a == class)
    }

    /// 查找字段的解析策略
    pub fn accessor(&self, field: &str) -> Option<&FieldStrategy> {
        self.accessors.get(field)
    }

    /// 所有字段及其解析策略
    pub fn accessors(&self) -> impl Iterator<Item = (&String, &FieldStrategy)> {
        self.accessors.iter()
    }

    /// 以外部名称提供的本地字段
    pub fn provider_for(&self, external: &str) -> Option<&str> {
        self.members.provided.get(external).map(String::as_str)
    }

    /// 字段编解码器
    pub fn codec(&self, field: &str) -> Option<&Arc<dyn FieldCodec>> {
        self.members.serializers.get(field)
    }

    /// 方法
    pub fn method(&self, name: &str) -> Option<&MethodFn> {
        self.members.methods.get(name)
    }
}

/// 类引用，作为依赖默认值或覆盖值时按类名称解析
impl From<&Definition> for Value {
    fn from(definition: &Definition) -> Self {
        Self::String(definition.name.clone())
    }
}

impl From<&Definition> for ObjectInfo {
    fn from(definition: &Definition) -> Self {
        Self::named(definition.name.clone())
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("accessors", &self.accessors)
            .field("methods", &self.members.methods.keys().collect::<Vec<_>>())
            .field("provided", &self.members.provided)
            .field("serializers", &self.members.serializers.keys().collect::<Vec<_>>())
            .field("init", &self.init.is_some())
            .finish()
    }
}
