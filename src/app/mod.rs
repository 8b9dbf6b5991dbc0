// ==========================================
// 设计出图进度跟踪 - 应用层
// ==========================================
// 职责: 组装仓储与API，供宿主（HTTP 服务 / CLI）使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
