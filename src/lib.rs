// ==========================================
// 设计出图进度跟踪 - 核心库
// ==========================================
// 里程碑: Required on Site → Status A → First Issue
// 技术栈: Rust + SQLite
// 分层: domain / engine / repository / config / api / app
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 日期推算 / 状态判定 / 汇总
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AnchorKey, Role, RowKind, StatusFilter, SummaryStatus, TrafficStatus, View};

// 领域实体
pub use domain::{AppSnapshot, Page, Project, Row, ScheduleSettings, UserContext, UserPermissions};

// 引擎
pub use engine::{ScheduleCalculator, StatusClassifier, SummaryAggregator, SummaryEntry, SummaryFilter};

// API
pub use api::{ApiError, ApiResult, BackupApi, StateApi, SummaryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设计出图进度跟踪";
