//! 实例上下文抽象
//!
//! 惰性默认值、计算字段、方法和 `init` 钩子都以绑定实例的上下文为接收者

use objmodel_common::{InstanceId, ObjectResult, Value, WireObject};
use std::sync::Arc;

/// 绑定到某个实例的访问上下文
pub trait ObjectContext {
    /// 绑定的实例
    fn id(&self) -> InstanceId;

    /// 绑定实例的类名称
    fn class_name(&self) -> String;

    /// 绑定实例的父实例
    fn parent(&self) -> Option<InstanceId>;

    /// 读取绑定实例的字段，必要时触发解析
    fn get(&mut self, field: &str) -> ObjectResult<Value>;

    /// 读取任意实例的字段
    fn get_of(&mut self, id: InstanceId, field: &str) -> ObjectResult<Value>;

    /// 调用绑定实例的方法
    fn call(&mut self, method: &str, args: &[Value]) -> ObjectResult<Value>;

    /// 以绑定实例为父实例构造新实例
    fn instantiate(&mut self, info: &Value) -> ObjectResult<InstanceId>;

    /// 序列化任意实例
    fn serialize(&mut self, id: InstanceId) -> ObjectResult<WireObject>;

    /// 以绑定实例为父实例反序列化
    fn deserialize(&mut self, wire: &WireObject) -> ObjectResult<InstanceId>;
}

/// 惰性默认值与计算字段函数
pub type ValueFn = Arc<dyn Fn(&mut dyn ObjectContext) -> ObjectResult<Value> + Send + Sync>;

/// 实例方法
pub type MethodFn =
    Arc<dyn Fn(&mut dyn ObjectContext, &[Value]) -> ObjectResult<Value> + Send + Sync>;

/// 构造完成钩子
pub type InitHook = Arc<dyn Fn(&mut dyn ObjectContext) -> ObjectResult<()> + Send + Sync>;

/// 把闭包包装为 [`ValueFn`]
pub fn value_fn<F>(f: F) -> ValueFn
where
    F: Fn(&mut dyn ObjectContext) -> ObjectResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}
