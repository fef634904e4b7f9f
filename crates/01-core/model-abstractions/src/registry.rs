//! 类注册表抽象接口

use crate::definition::Definition;
use std::sync::Arc;

/// 类注册表 trait
///
/// 类名称到已编译定义的映射。只追加或替换，同名重新注册会静默替换旧定义
pub trait ClassRegistry: Send + Sync {
    /// 注册定义，返回共享的定义
    fn register(&self, definition: Definition) -> Arc<Definition>;

    /// 按名称查找定义
    fn lookup(&self, name: &str) -> Option<Arc<Definition>>;

    /// 检查类是否已注册
    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// 所有已注册的类名称
    fn class_names(&self) -> Vec<String>;
}
