//! 类注册表实现

use crate::composer::DefinitionComposer;
use objmodel_abstractions::{ClassRegistry, ClassSchema, Definition};
use objmodel_common::ObjectResult;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// 进程级全局类注册表
static GLOBAL_CLASS_REGISTRY: Lazy<Arc<ClassRegistryImpl>> =
    Lazy::new(|| Arc::new(ClassRegistryImpl::new()));

/// 类注册表实现
///
/// 定义以 `Arc` 共享，查找时不会在持锁期间执行用户代码
#[derive(Debug, Default)]
pub struct ClassRegistryImpl {
    classes: RwLock<HashMap<String, Arc<Definition>>>,
}

impl ClassRegistryImpl {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// 编译并注册类模式
    pub fn define(&self, schema: ClassSchema) -> ObjectResult<Arc<Definition>> {
        let definition = DefinitionComposer::compose(schema, self)?;
        Ok(self.register(definition))
    }

    /// 已注册的类数量
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// 是否没有注册任何类
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl ClassRegistry for ClassRegistryImpl {
    fn register(&self, definition: Definition) -> Arc<Definition> {
        let definition = Arc::new(definition);
        let previous = self
            .classes
            .write()
            .insert(definition.name.clone(), definition.clone());

        if previous.is_some() {
            warn!("类 {} 已存在，旧定义被替换", definition.name);
        } else {
            info!("注册类: {}", definition.name);
        }
        definition
    }

    fn lookup(&self, name: &str) -> Option<Arc<Definition>> {
        self.classes.read().get(name).cloned()
    }

    fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// 获取全局类注册表
pub fn global_registry() -> Arc<ClassRegistryImpl> {
    GLOBAL_CLASS_REGISTRY.clone()
}

/// 在全局注册表中定义类
pub fn define_class(schema: ClassSchema) -> ObjectResult<Arc<Definition>> {
    GLOBAL_CLASS_REGISTRY.define(schema)
}

/// 在全局注册表中查找类
pub fn lookup_class(name: &str) -> Option<Arc<Definition>> {
    GLOBAL_CLASS_REGISTRY.lookup(name)
}
