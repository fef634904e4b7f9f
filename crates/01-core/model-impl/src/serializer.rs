//! 序列化管道
//!
//! 实例 <-> `[className, args]`。属性取解析后的值，依赖递归序列化为二元组，
//! 声明了编解码器的字段在边界处编码/解码。计算字段和注入字段不序列化。

use crate::space::ObjectSpace;
use objmodel_abstractions::{Definition, FieldKind};
use objmodel_common::{InstanceId, ObjectError, ObjectResult, ValueMap, WireObject};
use tracing::{debug, trace};

impl ObjectSpace {
    /// 序列化实例
    pub fn serialize(&mut self, id: InstanceId) -> ObjectResult<WireObject> {
        self.serialize_at(id, 0)
    }

    fn serialize_at(&mut self, id: InstanceId, depth: usize) -> ObjectResult<WireObject> {
        let definition = self.definition_of(id)?;
        if depth > self.config().max_resolution_depth {
            return Err(ObjectError::ResolutionDepthExceeded {
                class: definition.name.clone(),
                depth,
            });
        }

        let mut args = ValueMap::new();
        for (field, strategy) in definition.accessors() {
            let value = match strategy.kind() {
                FieldKind::Prop => self.get(id, field)?,
                FieldKind::Dependency => {
                    let child = self.get(id, field)?.as_instance().ok_or_else(|| {
                        ObjectError::wire(format!("依赖字段 {}.{field} 没有绑定实例", definition.name))
                    })?;
                    self.serialize_at(child, depth + 1)?.into_value()
                }
                FieldKind::Computed | FieldKind::Injected => continue,
            };

            let value = match definition.codec(field) {
                Some(codec) => codec.encode(&value)?,
                None => value,
            };
            args.insert(field.clone(), value);
        }

        trace!("序列化实例: {} {}", definition.name, id);
        Ok(WireObject::new(definition.name.clone(), args))
    }

    /// 反序列化
    ///
    /// 以反序列化模式构造：先解码声明了编解码器的参数，
    /// 再强制所有惰性默认值和依赖，返回前整棵对象树已物化
    pub fn deserialize(
        &mut self,
        wire: &WireObject,
        parent: Option<InstanceId>,
    ) -> ObjectResult<InstanceId> {
        debug!("反序列化实例: {}", wire.name());
        let definition = self.lookup(wire.name())?;
        self.construct_instance(definition, wire.args().clone(), parent, true)
    }

    /// 对出现在参数中的字段应用解码器
    pub(crate) fn decode_arguments(definition: &Definition, args: &mut ValueMap) -> ObjectResult<()> {
        for (field, codec) in &definition.members.serializers {
            if let Some(raw) = args.get_mut(field) {
                *raw = codec.decode(raw)?;
            }
        }
        Ok(())
    }
}
