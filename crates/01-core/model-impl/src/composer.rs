//! 类定义组合器
//!
//! 把原始模式与父类定义合并为已编译定义。各类别独立按键覆盖，
//! 子类的字段会遮蔽父类中任意类别的同名字段。
//! 同一模式在多个类别中声明同名字段时，按 属性、依赖、计算、注入 的顺序后者生效

use objmodel_abstractions::{ClassMembers, ClassRegistry, ClassSchema, Definition, ParentRef};
use objmodel_common::{ObjectError, ObjectInfo, ObjectResult};
use std::sync::Arc;
use tracing::debug;

/// 类定义组合器
#[derive(Debug, Default)]
pub struct DefinitionComposer;

impl DefinitionComposer {
    /// 编译类模式
    pub fn compose(schema: ClassSchema, registry: &dyn ClassRegistry) -> ObjectResult<Definition> {
        if schema.name.is_empty() {
            return Err(ObjectError::InvalidSchema {
                class: String::new(),
                message: "类名称不能为空".to_string(),
            });
        }

        let parent = Self::resolve_parent(&schema, registry)?;
        let (mut members, ancestors, inherited_init) = match &parent {
            Some(parent) => {
                let mut ancestors = vec![parent.name.clone()];
                ancestors.extend(parent.ancestors.iter().cloned());
                (parent.members.clone(), ancestors, parent.init.clone())
            }
            None => (ClassMembers::default(), Vec::new(), None),
        };

        let ClassSchema {
            name,
            props,
            deps,
            computed,
            methods,
            provided,
            injected,
            serializers,
            init,
            ..
        } = schema;

        for (field, spec) in props {
            members.remove_field(&field);
            members.props.insert(field, spec);
        }
        for (field, default) in deps {
            let default = default
                .map(|raw| ObjectInfo::from_value(&field, &raw))
                .transpose()?;
            members.remove_field(&field);
            members.deps.insert(field, default);
        }
        for (field, compute) in computed {
            members.remove_field(&field);
            members.computed.insert(field, compute);
        }
        for (field, external) in injected {
            members.remove_field(&field);
            members.injected.insert(field, external);
        }
        members.methods.extend(methods);
        members.provided.extend(provided);
        members.serializers.extend(serializers);

        let definition = Definition::new(name, ancestors, members, init.or(inherited_init));

        debug!(
            "编译类定义: {} (父类: {:?}, 字段 {} 个)",
            definition.name,
            definition.parent(),
            definition.accessors().count()
        );
        Ok(definition)
    }

    fn resolve_parent(
        schema: &ClassSchema,
        registry: &dyn ClassRegistry,
    ) -> ObjectResult<Option<Arc<Definition>>> {
        match &schema.parent {
            None => Ok(None),
            Some(ParentRef::Definition(definition)) => Ok(Some(definition.clone())),
            Some(ParentRef::Named(name)) => registry
                .lookup(name)
                .map(Some)
                .ok_or_else(|| ObjectError::unknown_class(name.clone())),
        }
    }
}
