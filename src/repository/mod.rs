// ==========================================
// 设计出图进度跟踪 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod cache;
pub mod error;
pub mod permission_repo;
pub mod state_repo;

// 重导出核心仓储
pub use cache::ExpiringCache;
pub use error::{RepositoryError, RepositoryResult};
pub use permission_repo::PermissionRepository;
pub use state_repo::{BackupRecord, StateRepository, STATE_TITLE};
