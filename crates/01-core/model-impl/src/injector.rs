//! 提供者/注入解析
//!
//! 从父实例开始沿父链向上查找，第一个在 `provided` 中声明了外部名称的祖先
//! 提供该值；找不到时解析为 `Value::Null`

use crate::space::ObjectSpace;
use objmodel_common::{InstanceId, ObjectResult, Value};
use tracing::trace;

impl ObjectSpace {
    /// 解析注入字段
    pub(crate) fn resolve_injected(
        &mut self,
        id: InstanceId,
        external: &str,
    ) -> ObjectResult<Value> {
        match self.locate_provider(id, external)? {
            Some((ancestor, local)) => {
                // 提供的字段可以留给子类声明，实际类没有声明时视为无值
                if self.slot(ancestor)?.definition.accessor(&local).is_none() {
                    trace!("注入 {} 的提供者 {} 没有字段 {}", external, ancestor, local);
                    return Ok(Value::Null);
                }
                trace!("注入 {} 由 {} 的字段 {} 提供", external, ancestor, local);
                self.get(ancestor, &local)
            }
            None => {
                trace!("注入 {} 没有提供者", external);
                Ok(Value::Null)
            }
        }
    }

    /// 查找为实例提供外部名称的最近祖先
    pub fn find_provider(
        &self,
        id: InstanceId,
        external: &str,
    ) -> ObjectResult<Option<InstanceId>> {
        Ok(self
            .locate_provider(id, external)?
            .map(|(ancestor, _)| ancestor))
    }

    fn locate_provider(
        &self,
        id: InstanceId,
        external: &str,
    ) -> ObjectResult<Option<(InstanceId, String)>> {
        let mut cursor = self.slot(id)?.parent;
        while let Some(ancestor) = cursor {
            let slot = self.slot(ancestor)?;
            if let Some(local) = slot.definition.provider_for(external) {
                return Ok(Some((ancestor, local.to_string())));
            }
            cursor = slot.parent;
        }
        Ok(None)
    }
}
