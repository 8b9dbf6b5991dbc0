// ==========================================
// 设计出图进度跟踪 - API 层
// ==========================================
// 职责: 提供业务 API 接口（权限校验 + 仓储读写 + 引擎计算），供宿主调用
// ==========================================

pub mod backup_api;
pub mod error;
pub mod permission_api;
pub mod state_api;
pub mod summary_api;

// 重导出核心类型
pub use backup_api::BackupApi;
pub use error::{ApiError, ApiResult};
pub use permission_api::{PermissionCache, PermissionService};
pub use state_api::{BootstrapResponse, MeInfo, StateApi, TickOutcome};
pub use summary_api::{CsvExport, ProgrammeView, SummaryApi};
