//! 字段编解码器
//!
//! 只在序列化边界使用：`encode` 把字段值转换为线格式值，`decode` 反向转换

use objmodel_common::{ObjectResult, Value};
use std::sync::Arc;

/// 字段编解码器 trait
pub trait FieldCodec: Send + Sync {
    /// 编码字段值
    fn encode(&self, value: &Value) -> ObjectResult<Value>;

    /// 解码线格式值
    fn decode(&self, raw: &Value) -> ObjectResult<Value>;
}

/// 由一对闭包组成的编解码器
pub struct FnCodec<E, D>
where
    E: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
    D: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
{
    /// 编码闭包
    pub encode_fn: E,
    /// 解码闭包
    pub decode_fn: D,
}

impl<E, D> FnCodec<E, D>
where
    E: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
    D: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
{
    /// 由编码和解码闭包创建
    pub fn new(encode_fn: E, decode_fn: D) -> Self {
        Self {
            encode_fn,
            decode_fn,
        }
    }

    /// 包装为共享的编解码器
    pub fn shared(encode_fn: E, decode_fn: D) -> Arc<dyn FieldCodec> {
        Arc::new(Self::new(encode_fn, decode_fn))
    }
}

impl<E, D> FieldCodec for FnCodec<E, D>
where
    E: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
    D: Fn(&Value) -> ObjectResult<Value> + Send + Sync + 'static,
{
    fn encode(&self, value: &Value) -> ObjectResult<Value> {
        (self.encode_fn)(value)
    }

    fn decode(&self, raw: &Value) -> ObjectResult<Value> {
        (self.decode_fn)(raw)
    }
}
