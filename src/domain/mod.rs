// ==========================================
// 设计出图进度跟踪 - 领域模型层
// ==========================================
// 职责: 定义项目树实体、枚举类型、行补丁与权限模型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod lenient;
pub mod project;
pub mod row_patch;
pub mod snapshot;
pub mod types;
pub mod user;

// 重导出核心类型
pub use project::{
    new_id, BlockZone, Level, Page, PageMeta, Project, Responsibility, Row, RowMeta,
    LEGACY_MASTER_PAGE_NAME, MASTER_PAGE_NAME,
};
pub use row_patch::{PatchError, RowFlagPatch, ALLOWED_PATCH_FIELDS};
pub use snapshot::{AppSnapshot, RowLocation, ScheduleSettings, FILTER_ALL};
pub use types::{
    AnchorKey, Role, RowKind, StatusFilter, SummaryStatus, TrafficStatus, View,
    UNKNOWN_STATUS_RANK,
};
pub use user::{PermissionRecord, UserContext, UserPermissions};
