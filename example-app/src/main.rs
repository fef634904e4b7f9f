//! # 示例应用程序
//!
//! 演示如何用 Lorn Objects 定义类、构造实例、沿父链注入以及线格式往返

use chrono::{DateTime, Utc};
use clap::Parser;
use objmodel_abstractions::{ClassSchema, FnCodec};
use objmodel_common::{value_map, EngineConfig, ObjectError, ObjectInfo, Value, WireObject};
use objmodel_impl::{define_class, global_registry, ObjectSpace};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn Objects 示例应用")]
struct Args {
    /// 引擎配置文件路径（.toml 或 .json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base 实例的必需属性 `a`
    #[arg(short, long, default_value_t = 1)]
    a: i64,

    /// 覆盖依赖 `test` 的参数 `x`
    #[arg(short, long)]
    x: Option<i64>,

    /// 以缩进格式输出线格式
    #[arg(long)]
    pretty: bool,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志，RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动 Lorn Objects 示例应用");

    let config = load_config(&args)?;
    define_classes()?;

    let mut space = ObjectSpace::with_config(global_registry(), config);
    let mut overrides = value_map([("a", args.a)]);
    if let Some(x) = args.x {
        overrides.insert("test".to_string(), Value::Map(value_map([("x", x)])));
    }

    let base = space.construct("Base", overrides)?;
    demonstrate_fields(&mut space, base)?;

    let wire = space.serialize(base)?;
    let text = if args.pretty {
        wire.to_json_pretty()?
    } else {
        wire.to_json_string()?
    };
    println!("{text}");

    let copy = space.deserialize(&WireObject::from_json_str(&text)?, None)?;
    info!(
        "反序列化完成: {} c = {:?}, test.rand = {:?}",
        copy,
        space.get(copy, "c")?,
        space.get_path(copy, "test.rand")?
    );

    info!("当前存活实例 {} 个", space.len());
    Ok(())
}

/// 加载引擎配置
fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    match &args.config {
        Some(path) if path.exists() => {
            let config = EngineConfig::from_file(path)?;
            info!("加载引擎配置: {:?}", config);
            Ok(config)
        }
        Some(path) => {
            warn!("配置文件 {} 不存在，使用默认配置", path.display());
            Ok(EngineConfig::default())
        }
        None => Ok(EngineConfig::default()),
    }
}

/// 定义示例类
fn define_classes() -> anyhow::Result<()> {
    define_class(
        ClassSchema::new("Dep")
            .prop("x", 1)
            .injected(["a", "rand", "lol"]),
    )?;

    let timestamp = FnCodec::shared(
        |value: &Value| {
            value
                .downcast_native::<DateTime<Utc>>()
                .map(|d| Value::String(d.to_rfc3339()))
                .ok_or_else(|| ObjectError::codec("d", "期望时间戳"))
        },
        |raw: &Value| {
            let text = raw
                .as_str()
                .ok_or_else(|| ObjectError::codec("d", "期望字符串"))?;
            DateTime::parse_from_rfc3339(text)
                .map(|d| Value::native(d.with_timezone(&Utc)))
                .map_err(|e| ObjectError::codec("d", e.to_string()))
        },
    );

    define_class(
        ClassSchema::new("Base")
            .required("a")
            .prop("b", 10)
            .lazy("k", |_| Ok(Value::Float(rand::random::<f64>())))
            .lazy("d", |_| Ok(Value::native(Utc::now())))
            .dep("test", ObjectInfo::new("Dep", value_map([("x", 12)])))
            .computed("c", |ctx| {
                let a = ctx.get("a")?.as_i64().unwrap_or_default();
                let b = ctx.get("b")?.as_i64().unwrap_or_default();
                Ok(Value::Int(a + b))
            })
            .provided(["a", "b"])
            .provide("rand", "k")
            .serializer("d", timestamp),
    )?;
    Ok(())
}

/// 演示字段读取与注入
fn demonstrate_fields(
    space: &mut ObjectSpace,
    base: objmodel_common::InstanceId,
) -> anyhow::Result<()> {
    info!("Base {}: a = {:?}, b = {:?}", base, space.get(base, "a")?, space.get(base, "b")?);
    info!("计算字段 c = {:?}", space.get(base, "c")?);
    info!("依赖 test.x = {:?}", space.get_path(base, "test.x")?);
    info!(
        "注入 test.a = {:?}, test.rand = {:?}, test.lol = {:?}",
        space.get_path(base, "test.a")?,
        space.get_path(base, "test.rand")?,
        space.get_path(base, "test.lol")?
    );

    if let Err(e) = space.set(base, "a", Value::Int(2)) {
        info!("写入属性被拒绝: {}", e);
    }
    Ok(())
}
