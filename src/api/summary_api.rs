// ==========================================
// 设计出图进度跟踪 - 汇总 API
// ==========================================
// 职责: 基于已保存状态的汇总查询、CSV 导出、总进度视图、聊天上下文
// 全局天数: 快照中的值优先，缺失时取 config_kv 默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::snapshot::{AppSnapshot, ScheduleSettings};
use crate::engine::chat_context::{build_chat_context, ChatContext, ChatMessage, ChatRequest};
use crate::engine::programme::{
    build_programme_items, month_ticks, programme_range, MonthTick, ProgrammeItem, ProgrammeRange,
};
use crate::engine::status::StatusClassifier;
use crate::engine::summary::{
    export_summary_csv, summary_csv_filename, supplier_options, SummaryAggregator, SummaryEntry,
    SummaryFilter,
};
use crate::repository::state_repo::StateRepository;

/// CSV 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// 总进度（甘特）视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeView {
    pub items: Vec<ProgrammeItem>,
    pub range: Option<ProgrammeRange>,
    pub ticks: Vec<MonthTick>,
}

// ==========================================
// SummaryApi - 汇总 API
// ==========================================
pub struct SummaryApi {
    state_repo: Arc<StateRepository>,
    config_manager: Arc<ConfigManager>,
}

impl SummaryApi {
    pub fn new(state_repo: Arc<StateRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            state_repo,
            config_manager,
        }
    }

    /// 读取已保存状态（尚无状态时返回空快照）
    fn load_snapshot(&self) -> ApiResult<AppSnapshot> {
        Ok(self.state_repo.read_state()?.unwrap_or_default())
    }

    fn settings_for(&self, snapshot: &AppSnapshot) -> ApiResult<ScheduleSettings> {
        let defaults = self
            .config_manager
            .schedule_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(snapshot.schedule_settings(defaults))
    }

    fn aggregator(&self) -> ApiResult<SummaryAggregator> {
        let window = self
            .config_manager
            .amber_window_days()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(SummaryAggregator::with_classifier(
            StatusClassifier::with_amber_window(window),
        ))
    }

    /// 完整汇总（已排序，未筛选）
    fn full_summary(&self, snapshot: &AppSnapshot, today_iso: &str) -> ApiResult<Vec<SummaryEntry>> {
        let settings = self.settings_for(snapshot)?;
        Ok(self.aggregator()?.build(&snapshot.projects, &settings, today_iso))
    }

    /// 汇总查询
    ///
    /// # 参数
    /// - filter: 状态 / 项目 / 供应商筛选
    /// - today_iso: 今天（YYYY-MM-DD）
    ///
    /// # 返回
    /// - 排序后的汇总条目；尚无状态时为空
    pub fn summary(&self, filter: &SummaryFilter, today_iso: &str) -> ApiResult<Vec<SummaryEntry>> {
        let snapshot = self.load_snapshot()?;
        let all = self.full_summary(&snapshot, today_iso)?;
        Ok(SummaryAggregator::apply_filter(&all, filter))
    }

    /// 快照中保存的筛选条件
    pub fn saved_filter(&self) -> ApiResult<SummaryFilter> {
        Ok(SummaryFilter::from_snapshot(&self.load_snapshot()?))
    }

    /// 导出 CSV
    pub fn export_csv(&self, filter: &SummaryFilter, today_iso: &str) -> ApiResult<CsvExport> {
        let entries = self.summary(filter, today_iso)?;
        let content =
            export_summary_csv(&entries).map_err(|e| ApiError::ExportError(e.to_string()))?;
        let filename = summary_csv_filename(filter, today_iso);
        info!(filename = %filename, rows = entries.len(), "汇总已导出");
        Ok(CsvExport { filename, content })
    }

    /// 供应商下拉选项
    pub fn supplier_options(&self) -> ApiResult<Vec<String>> {
        Ok(supplier_options(&self.load_snapshot()?.projects))
    }

    /// 项目总进度视图
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 项目不存在
    pub fn programme(&self, project_id: &str) -> ApiResult<ProgrammeView> {
        let snapshot = self.load_snapshot()?;
        let project = snapshot
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ApiError::NotFound(format!("项目(id={})不存在", project_id)))?;

        let items = build_programme_items(&project.master);
        let range = programme_range(&items);
        let ticks = range.as_ref().map(month_ticks).unwrap_or_default();
        Ok(ProgrammeView {
            items,
            range,
            ticks,
        })
    }

    /// 聊天助手上下文（基于完整汇总）
    pub fn chat_context(&self, today_iso: &str) -> ApiResult<ChatContext> {
        let snapshot = self.load_snapshot()?;
        let summary = self.full_summary(&snapshot, today_iso)?;
        Ok(build_chat_context(&summary, &snapshot, today_iso))
    }

    /// 构建聊天请求体（HTTP 发送由宿主负责）
    pub fn chat_request(&self, messages: &[ChatMessage], today_iso: &str) -> ApiResult<ChatRequest> {
        let context = self.chat_context(today_iso)?;
        let model = self
            .config_manager
            .chat_model()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        ChatRequest::build(messages, &context, &model)
            .map_err(|e| ApiError::InternalError(format!("聊天请求序列化失败: {}", e)))
    }
}
