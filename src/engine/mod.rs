// ==========================================
// 设计出图进度跟踪 - 引擎层
// ==========================================
// 职责: 日期推算 / 状态判定 / 汇总 / 总进度生成
// 红线: 纯函数，不访问数据库，不返回错误
//       （非法输入产生空值或占位结果）
// ==========================================

pub mod chat_context;
pub mod dates;
pub mod generation;
pub mod hydrate;
pub mod permission;
pub mod programme;
pub mod schedule;
pub mod status;
pub mod summary;

// 重导出核心引擎
pub use chat_context::{build_chat_context, extract_answer, ChatContext, ChatMessage, ChatRequest};
pub use generation::{
    build_generated_rows, regenerate_page_rows, regenerate_project_rows, sync_responsibility_pages,
};
pub use hydrate::{hydrate_project, hydrate_projects, hydrate_snapshot};
pub use permission::resolve_permissions;
pub use programme::{
    build_programme_items, level_duration_days, month_ticks, programme_range, MonthTick,
    ProgrammeItem, ProgrammeRange,
};
pub use schedule::{DayOffsets, DerivedDates, ScheduleCalculator, ScheduleInput};
pub use status::{OverdueFlags, RowEvaluation, StatusClassifier};
pub use summary::{
    export_summary_csv, summary_csv_filename, supplier_options, SummaryAggregator, SummaryEntry,
    SummaryFilter,
};
