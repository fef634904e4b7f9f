//! 对象空间
//!
//! 实例保存在对象空间的槽位数组中，调用方只持有 [`InstanceId`]。
//! 父实例关系以句柄记录，注入查找沿句柄向上遍历。
//! 释放的槽位进入空闲列表，复用时代数加一，旧句柄随之失效。

use crate::context::InstanceContext;
use crate::registry::global_registry;
use objmodel_abstractions::{ClassRegistry, Definition, FieldKind, FieldStrategy, PropSpec};
use objmodel_common::{
    EngineConfig, InstanceId, ObjectError, ObjectInfo, ObjectResult, Value, ValueMap,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 字段状态
///
/// 不在字段表中的惰性默认值、计算字段和注入字段视为未解析
#[derive(Debug, Clone)]
pub(crate) enum FieldState {
    /// 依赖尚未实例化
    Descriptor(ObjectInfo),
    /// 已解析，之后不可再写
    Resolved(Value),
}

/// 实例槽位
pub(crate) struct InstanceSlot {
    pub(crate) definition: Arc<Definition>,
    pub(crate) parent: Option<InstanceId>,
    pub(crate) depth: usize,
    pub(crate) fields: BTreeMap<String, FieldState>,
    pub(crate) dependency_infos: BTreeMap<String, ObjectInfo>,
    /// 仅在反序列化构造期间为 true
    pub(crate) deserializing: bool,
}

/// 槽位条目
struct SlotEntry {
    generation: u32,
    instance: Option<InstanceSlot>,
}

/// 对象空间
pub struct ObjectSpace {
    registry: Arc<dyn ClassRegistry>,
    config: EngineConfig,
    slots: Vec<SlotEntry>,
    free: Vec<usize>,
    live: usize,
    pub(crate) resolving: BTreeSet<(InstanceId, String)>,
}

impl ObjectSpace {
    /// 使用指定注册表创建对象空间
    pub fn new(registry: Arc<dyn ClassRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    /// 使用指定注册表和配置创建对象空间
    pub fn with_config(registry: Arc<dyn ClassRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            resolving: BTreeSet::new(),
        }
    }

    /// 使用全局注册表创建对象空间
    pub fn global() -> Self {
        Self::new(global_registry())
    }

    /// 对象空间使用的类注册表
    pub fn registry(&self) -> &Arc<dyn ClassRegistry> {
        &self.registry
    }

    /// 对象空间配置
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 存活实例数量
    pub fn len(&self) -> usize {
        self.live
    }

    /// 是否没有存活实例
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// 构造顶层实例
    pub fn construct(&mut self, class: &str, args: ValueMap) -> ObjectResult<InstanceId> {
        let definition = self.lookup(class)?;
        self.construct_instance(definition, args, None, false)
    }

    /// 按描述构造实例
    ///
    /// 接受类名、描述符或 `[name, args]` 数组；子实例继承父实例的反序列化模式
    pub fn instantiate(
        &mut self,
        info: &Value,
        parent: Option<InstanceId>,
    ) -> ObjectResult<InstanceId> {
        let info = ObjectInfo::from_value("<instantiate>", info)?;
        let deserializing = match parent {
            Some(parent) => self.slot(parent)?.deserializing,
            None => false,
        };
        self.instantiate_info(info, parent, deserializing)
    }

    pub(crate) fn instantiate_info(
        &mut self,
        info: ObjectInfo,
        parent: Option<InstanceId>,
        deserializing: bool,
    ) -> ObjectResult<InstanceId> {
        let definition = self.lookup(&info.name)?;
        self.construct_instance(definition, info.args, parent, deserializing)
    }

    pub(crate) fn lookup(&self, class: &str) -> ObjectResult<Arc<Definition>> {
        self.registry
            .lookup(class)
            .ok_or_else(|| ObjectError::unknown_class(class))
    }

    pub(crate) fn construct_instance(
        &mut self,
        definition: Arc<Definition>,
        mut args: ValueMap,
        parent: Option<InstanceId>,
        deserializing: bool,
    ) -> ObjectResult<InstanceId> {
        let depth = match parent {
            Some(parent) => self.slot(parent)?.depth + 1,
            None => 0,
        };
        if depth > self.config.max_resolution_depth {
            return Err(ObjectError::ResolutionDepthExceeded {
                class: definition.name.clone(),
                depth,
            });
        }
        if self.live >= self.config.max_instances {
            return Err(ObjectError::InstanceLimitExceeded {
                limit: self.config.max_instances,
            });
        }

        if deserializing {
            Self::decode_arguments(&definition, &mut args)?;
        }

        let mut fields = BTreeMap::new();
        let mut dependency_infos = BTreeMap::new();
        let mut eager = Vec::new();

        for (field, spec) in &definition.members.props {
            match (args.remove(field), spec) {
                (Some(value), _) => {
                    fields.insert(field.clone(), FieldState::Resolved(value));
                }
                (None, PropSpec::Required) => {
                    return Err(ObjectError::missing_required(&definition.name, field));
                }
                (None, PropSpec::Literal(value)) => {
                    fields.insert(field.clone(), FieldState::Resolved(value.clone()));
                }
                (None, PropSpec::Lazy(_)) => {
                    if deserializing {
                        eager.push(field.clone());
                    }
                }
            }
        }

        for (field, default) in &definition.members.deps {
            let supplied = args.remove(field).filter(|value| !value.is_null());

            if let Some(Value::Instance(child)) = supplied {
                dependency_infos.insert(field.clone(), self.describe(child)?);
                fields.insert(field.clone(), FieldState::Resolved(Value::Instance(child)));
                continue;
            }

            let info = match (default, supplied) {
                (Some(default), supplied) => {
                    default.merge(field, &supplied.unwrap_or(Value::Null))?
                }
                (None, Some(supplied)) => ObjectInfo::from_value(field, &supplied)?,
                (None, None) => {
                    return Err(ObjectError::missing_required(&definition.name, field));
                }
            };
            fields.insert(field.clone(), FieldState::Descriptor(info));
            if deserializing {
                eager.push(field.clone());
            }
        }

        if !args.is_empty() {
            trace!(
                "{} 忽略未声明的参数: {:?}",
                definition.name,
                args.keys().collect::<Vec<_>>()
            );
        }

        let id = self.allocate(InstanceSlot {
            definition: definition.clone(),
            parent,
            depth,
            fields,
            dependency_infos,
            deserializing,
        });
        debug!(
            "构造实例: {} {} (父实例: {:?}, 反序列化: {})",
            definition.name, id, parent, deserializing
        );

        if let Err(err) = self.finish_construction(id, &definition, eager) {
            self.discard(id);
            return Err(err);
        }
        Ok(id)
    }

    /// 强制延迟字段并运行 `init` 钩子
    fn finish_construction(
        &mut self,
        id: InstanceId,
        definition: &Definition,
        eager: Vec<String>,
    ) -> ObjectResult<()> {
        for field in eager {
            self.get(id, &field)?;
        }
        self.slot_mut(id)?.deserializing = false;

        if let Some(init) = definition.init.clone() {
            let mut ctx = InstanceContext::new(self, id)?;
            init(&mut ctx)?;
        }
        Ok(())
    }

    /// 丢弃构造失败的实例及其在构造期间产生的后代
    fn discard(&mut self, root: InstanceId) {
        let removed = self.remove_tree(root);
        warn!("构造失败，丢弃 {} 个实例", removed);
    }

    /// 释放实例及其后代
    ///
    /// 以实例为祖先的所有实例一并释放，外部绑定的实例保留自己的父链不受影响。
    /// 返回释放的实例数量
    pub fn release(&mut self, id: InstanceId) -> ObjectResult<usize> {
        self.slot(id)?;
        let removed = self.remove_tree(id);
        debug!("释放实例 {} (共 {} 个)", id, removed);
        Ok(removed)
    }

    /// 释放所有实例
    pub fn clear(&mut self) {
        let ids: Vec<InstanceId> = self.live_ids().collect();
        for id in ids {
            self.release_slot(id);
        }
        self.resolving.clear();
        debug!("清空对象空间");
    }

    fn allocate(&mut self, instance: InstanceSlot) -> InstanceId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            if let Some(entry) = self.slots.get_mut(index) {
                entry.instance = Some(instance);
                return InstanceId::new(index, entry.generation);
            }
        }
        self.slots.push(SlotEntry {
            generation: 0,
            instance: Some(instance),
        });
        InstanceId::new(self.slots.len() - 1, 0)
    }

    fn release_slot(&mut self, id: InstanceId) {
        if let Some(entry) = self.slots.get_mut(id.index()) {
            if entry.generation == id.generation() && entry.instance.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(id.index());
                self.live -= 1;
            }
        }
    }

    fn live_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.instance.is_some())
            .map(|(index, entry)| InstanceId::new(index, entry.generation))
    }

    fn descends_from(&self, id: InstanceId, root: InstanceId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.slot(current).ok().and_then(|slot| slot.parent);
        }
        false
    }

    fn remove_tree(&mut self, root: InstanceId) -> usize {
        let doomed: Vec<InstanceId> = self
            .live_ids()
            .filter(|id| self.descends_from(*id, root))
            .collect();
        for id in &doomed {
            self.release_slot(*id);
        }
        self.resolving.retain(|(id, _)| !doomed.contains(id));
        doomed.len()
    }

    pub(crate) fn slot(&self, id: InstanceId) -> ObjectResult<&InstanceSlot> {
        self.slots
            .get(id.index())
            .filter(|entry| entry.generation == id.generation())
            .and_then(|entry| entry.instance.as_ref())
            .ok_or_else(|| ObjectError::InvalidInstance { id: id.to_string() })
    }

    pub(crate) fn slot_mut(&mut self, id: InstanceId) -> ObjectResult<&mut InstanceSlot> {
        self.slots
            .get_mut(id.index())
            .filter(|entry| entry.generation == id.generation())
            .and_then(|entry| entry.instance.as_mut())
            .ok_or_else(|| ObjectError::InvalidInstance { id: id.to_string() })
    }

    /// 读取字段，首次读取时解析并缓存
    pub fn get(&mut self, id: InstanceId, field: &str) -> ObjectResult<Value> {
        let slot = self.slot(id)?;
        let pending = match slot.fields.get(field) {
            Some(FieldState::Resolved(value)) => return Ok(value.clone()),
            Some(FieldState::Descriptor(info)) => Some(info.clone()),
            None => None,
        };
        if let Some(info) = pending {
            return self.resolve_dependency(id, field, info);
        }

        let strategy = slot
            .definition
            .accessor(field)
            .cloned()
            .ok_or_else(|| ObjectError::UnknownField {
                class: slot.definition.name.clone(),
                field: field.to_string(),
            })?;
        self.resolve_field(id, field, strategy)
    }

    /// 按 `a.b.c` 路径读取，中间字段必须是实例
    pub fn get_path(&mut self, id: InstanceId, path: &str) -> ObjectResult<Value> {
        let mut current = id;
        let mut segments = path.split('.').peekable();
        while let Some(field) = segments.next() {
            let value = self.get(current, field)?;
            if segments.peek().is_none() {
                return Ok(value);
            }
            current = value.as_instance().ok_or_else(|| ObjectError::UnknownField {
                class: self.slot(current).map(|s| s.definition.name.clone()).unwrap_or_default(),
                field: path.to_string(),
            })?;
        }
        Ok(Value::Instance(current))
    }

    /// 写入字段
    ///
    /// 属性、计算字段和注入字段一律不可写；
    /// 只有尚未实例化的依赖字段可以绑定一个已构造的实例
    pub fn set(&mut self, id: InstanceId, field: &str, value: Value) -> ObjectResult<()> {
        let slot = self.slot(id)?;
        let class = slot.definition.name.clone();
        let kind = slot
            .definition
            .accessor(field)
            .map(FieldStrategy::kind)
            .ok_or_else(|| ObjectError::UnknownField {
                class: class.clone(),
                field: field.to_string(),
            })?;

        let bindable = kind == FieldKind::Dependency
            && matches!(slot.fields.get(field), Some(FieldState::Descriptor(_)))
            && !self.resolving.contains(&(id, field.to_string()));
        if !bindable {
            return Err(ObjectError::immutable(class, field));
        }

        let child = value
            .as_instance()
            .ok_or_else(|| ObjectError::invalid_dependency(field, "只能绑定已构造的实例"))?;
        let snapshot = self.describe(child)?;
        let slot = self.slot_mut(id)?;
        slot.dependency_infos.insert(field.to_string(), snapshot);
        slot.fields
            .insert(field.to_string(), FieldState::Resolved(Value::Instance(child)));
        trace!("绑定依赖 {}.{} -> {}", class, field, child);
        Ok(())
    }

    /// 调用方法
    pub fn call(&mut self, id: InstanceId, method: &str, args: &[Value]) -> ObjectResult<Value> {
        let definition = self.definition_of(id)?;
        let method_fn = definition
            .method(method)
            .cloned()
            .ok_or_else(|| ObjectError::UnknownMethod {
                class: definition.name.clone(),
                method: method.to_string(),
            })?;
        let mut ctx = InstanceContext::new(self, id)?;
        method_fn(&mut ctx, args)
    }

    /// 字段是否已解析
    pub fn is_resolved(&self, id: InstanceId, field: &str) -> ObjectResult<bool> {
        let slot = self.slot(id)?;
        if slot.definition.accessor(field).is_none() {
            return Err(ObjectError::UnknownField {
                class: slot.definition.name.clone(),
                field: field.to_string(),
            });
        }
        Ok(matches!(slot.fields.get(field), Some(FieldState::Resolved(_))))
    }

    /// 父实例
    pub fn parent_of(&self, id: InstanceId) -> ObjectResult<Option<InstanceId>> {
        Ok(self.slot(id)?.parent)
    }

    /// 实例的类定义
    pub fn definition_of(&self, id: InstanceId) -> ObjectResult<Arc<Definition>> {
        Ok(self.slot(id)?.definition.clone())
    }

    /// 实例的类名称
    pub fn class_name_of(&self, id: InstanceId) -> ObjectResult<String> {
        Ok(self.slot(id)?.definition.name.clone())
    }

    /// 依赖字段解析时记录的描述符快照
    pub fn dependency_info(&self, id: InstanceId, field: &str) -> ObjectResult<Option<ObjectInfo>> {
        Ok(self.slot(id)?.dependency_infos.get(field).cloned())
    }

    /// 由已解析的字段生成实例描述符
    ///
    /// 只包含属性和依赖；已实例化的依赖递归描述，未实例化的保留原描述符
    pub fn describe(&self, id: InstanceId) -> ObjectResult<ObjectInfo> {
        self.describe_at(id, 0)
    }

    fn describe_at(&self, id: InstanceId, depth: usize) -> ObjectResult<ObjectInfo> {
        let slot = self.slot(id)?;
        if depth > self.config.max_resolution_depth {
            return Err(ObjectError::ResolutionDepthExceeded {
                class: slot.definition.name.clone(),
                depth,
            });
        }

        let mut args = ValueMap::new();
        for (field, state) in &slot.fields {
            let kind = slot.definition.accessor(field).map(FieldStrategy::kind);
            let value = match (kind, state) {
                (Some(FieldKind::Prop), FieldState::Resolved(value)) => value.clone(),
                (Some(FieldKind::Dependency), FieldState::Resolved(Value::Instance(child))) => {
                    Value::Descriptor(self.describe_at(*child, depth + 1)?)
                }
                (Some(FieldKind::Dependency), FieldState::Descriptor(info)) => {
                    Value::Descriptor(info.clone())
                }
                _ => continue,
            };
            args.insert(field.clone(), value);
        }
        Ok(ObjectInfo::new(slot.definition.name.clone(), args))
    }
}

impl fmt::Debug for ObjectSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpace")
            .field("config", &self.config)
            .field("instances", &self.len())
            .field("classes", &self.registry.class_names())
            .finish()
    }
}
