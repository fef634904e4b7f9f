//! 错误类型定义

use thiserror::Error;

/// 对象模型错误类型
///
/// 所有错误都是同步、立即返回给调用方的，引擎内部不做重试或默认值替换。
#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("缺少必需的值: {class}.{field}")]
    MissingRequiredField { class: String, field: String },

    #[error("类未定义: {name}")]
    UnknownClass { name: String },

    #[error("依赖声明无效: {field}, 原因: {message}")]
    InvalidDependencySpecification { field: String, message: String },

    #[error("不能修改不可变字段: {class}.{field}")]
    ImmutableFieldWrite { class: String, field: String },

    #[error("字段不存在: {class}.{field}")]
    UnknownField { class: String, field: String },

    #[error("方法不存在: {class}.{method}")]
    UnknownMethod { class: String, method: String },

    #[error("类定义无效: {class}, 原因: {message}")]
    InvalidSchema { class: String, message: String },

    #[error("字段循环解析: {class}.{field}")]
    CircularResolution { class: String, field: String },

    #[error("解析深度超出限制: {class}, 深度 {depth}")]
    ResolutionDepthExceeded { class: String, depth: usize },

    #[error("实例数量超出限制: {limit}")]
    InstanceLimitExceeded { limit: usize },

    #[error("实例句柄无效: {id}")]
    InvalidInstance { id: String },

    #[error("字段编解码失败: {field}, 原因: {message}")]
    Codec { field: String, message: String },

    #[error("线格式无效: {message}")]
    Wire { message: String },

    #[error("JSON 处理失败: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ObjectError {
    /// 创建缺少必需值错误
    pub fn missing_required(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            class: class.into(),
            field: field.into(),
        }
    }

    /// 创建类未定义错误
    pub fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }

    /// 创建依赖声明无效错误
    pub fn invalid_dependency(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDependencySpecification {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建不可变字段写入错误
    pub fn immutable(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ImmutableFieldWrite {
            class: class.into(),
            field: field.into(),
        }
    }

    /// 创建编解码错误
    pub fn codec(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建线格式错误
    pub fn wire(message: impl Into<String>) -> Self {
        Self::Wire {
            message: message.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("不支持的配置格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 结果类型别名
pub type ObjectResult<T> = Result<T, ObjectError>;
/// 配置结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
