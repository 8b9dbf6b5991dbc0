// ==========================================
// 设计出图进度跟踪 - 配置层
// ==========================================
// 职责: 系统配置管理（全局天数、信号灯窗口、缓存、备份、聊天模型）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod schedule_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use schedule_config_trait::ScheduleConfigReader;
