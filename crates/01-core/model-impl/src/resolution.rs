//! 字段解析引擎
//!
//! 所有字段类别共用一个解析入口：按访问器表中的策略求值，成功后写入字段表，
//! 之后的读取直接返回缓存值

use crate::context::InstanceContext;
use crate::space::{FieldState, ObjectSpace};
use objmodel_abstractions::{FieldStrategy, ValueFn};
use objmodel_common::{InstanceId, ObjectError, ObjectInfo, ObjectResult, Value};
use tracing::{debug, trace};

impl ObjectSpace {
    /// 解析惰性默认值、计算字段或注入字段
    pub(crate) fn resolve_field(
        &mut self,
        id: InstanceId,
        field: &str,
        strategy: FieldStrategy,
    ) -> ObjectResult<Value> {
        let class = self.slot(id)?.definition.name.clone();
        let key = self.enter_resolution(id, &class, field)?;

        let result = match strategy {
            FieldStrategy::LazyDefault(f) | FieldStrategy::ComputedFn(f) => self.evaluate(id, &f),
            FieldStrategy::Injected(external) => self.resolve_injected(id, &external),
            FieldStrategy::LiteralDefault(value) => Ok(value),
            FieldStrategy::RequiredValue | FieldStrategy::DependencyDescriptor(_) => {
                Err(ObjectError::missing_required(&class, field))
            }
        };
        self.resolving.remove(&key);

        let value = result?;
        trace!("解析字段 {}.{} {}", class, field, id);
        self.slot_mut(id)?
            .fields
            .insert(field.to_string(), FieldState::Resolved(value.clone()));
        Ok(value)
    }

    /// 实例化依赖字段
    ///
    /// 子实例以当前实例为父实例，并继承当前的反序列化模式
    pub(crate) fn resolve_dependency(
        &mut self,
        id: InstanceId,
        field: &str,
        info: ObjectInfo,
    ) -> ObjectResult<Value> {
        let slot = self.slot(id)?;
        let class = slot.definition.name.clone();
        let deserializing = slot.deserializing;
        let key = self.enter_resolution(id, &class, field)?;

        debug!("解析依赖 {}.{} -> {}", class, field, info.name);
        let result = self.instantiate_info(info, Some(id), deserializing);
        self.resolving.remove(&key);

        let child = result?;
        let snapshot = self.describe(child)?;
        let slot = self.slot_mut(id)?;
        slot.dependency_infos.insert(field.to_string(), snapshot);
        slot.fields
            .insert(field.to_string(), FieldState::Resolved(Value::Instance(child)));
        Ok(Value::Instance(child))
    }

    fn enter_resolution(
        &mut self,
        id: InstanceId,
        class: &str,
        field: &str,
    ) -> ObjectResult<(InstanceId, String)> {
        let key = (id, field.to_string());
        if !self.resolving.insert(key.clone()) {
            return Err(ObjectError::CircularResolution {
                class: class.to_string(),
                field: field.to_string(),
            });
        }
        Ok(key)
    }

    fn evaluate(&mut self, id: InstanceId, f: &ValueFn) -> ObjectResult<Value> {
        let mut ctx = InstanceContext::new(self, id)?;
        f(&mut ctx)
    }
}
