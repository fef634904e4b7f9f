//! 绑定实例的上下文实现

use crate::space::ObjectSpace;
use objmodel_abstractions::ObjectContext;
use objmodel_common::{InstanceId, ObjectResult, Value, WireObject};

/// 把对象空间与某个实例绑定，交给用户函数使用
pub(crate) struct InstanceContext<'a> {
    space: &'a mut ObjectSpace,
    id: InstanceId,
    class: String,
    parent: Option<InstanceId>,
}

impl<'a> InstanceContext<'a> {
    pub(crate) fn new(space: &'a mut ObjectSpace, id: InstanceId) -> ObjectResult<Self> {
        let slot = space.slot(id)?;
        let class = slot.definition.name.clone();
        let parent = slot.parent;
        Ok(Self {
            space,
            id,
            class,
            parent,
        })
    }
}

impl ObjectContext for InstanceContext<'_> {
    fn id(&self) -> InstanceId {
        self.id
    }

    fn class_name(&self) -> String {
        self.class.clone()
    }

    fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    fn get(&mut self, field: &str) -> ObjectResult<Value> {
        self.space.get(self.id, field)
    }

    fn get_of(&mut self, id: InstanceId, field: &str) -> ObjectResult<Value> {
        self.space.get(id, field)
    }

    fn call(&mut self, method: &str, args: &[Value]) -> ObjectResult<Value> {
        self.space.call(self.id, method, args)
    }

    fn instantiate(&mut self, info: &Value) -> ObjectResult<InstanceId> {
        self.space.instantiate(info, Some(self.id))
    }

    fn serialize(&mut self, id: InstanceId) -> ObjectResult<WireObject> {
        self.space.serialize(id)
    }

    fn deserialize(&mut self, wire: &WireObject) -> ObjectResult<InstanceId> {
        self.space.deserialize(wire, Some(self.id))
    }
}
