// ==========================================
// 设计出图进度跟踪 - 汇总引擎
// ==========================================
// 职责: 将所有项目/页面的事项展平为排序后的汇总列表
// 范围: 非总进度页 + 非 header + 非 notRequired
// 排序: 状态名次 → Status A（缺失排最后）→ 标题（稳定排序）
// 筛选: 状态 / 项目 / 供应商，互相独立 AND，不再重新排序
// ==========================================

use crate::domain::project::Project;
use crate::domain::snapshot::{AppSnapshot, ScheduleSettings, FILTER_ALL};
use crate::domain::types::{StatusFilter, SummaryStatus, TrafficStatus};
use crate::engine::dates::parse_iso;
use crate::engine::status::{OverdueFlags, StatusClassifier};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

// ==========================================
// SummaryEntry - 汇总条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub project_id: String,
    pub project_name: String,
    pub page_id: String,
    pub page_name: String, // 责任方页面名称
    pub row_id: String,
    pub title: String,
    pub supplier: String,
    pub required_on_site: String,
    pub status_a: String,
    pub first_issue: String,
    pub completed: bool,
    pub status: SummaryStatus,
    pub traffic: TrafficStatus,
    pub overdue: OverdueFlags,
}

// ==========================================
// SummaryFilter - 汇总筛选
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub status: StatusFilter,
    pub project_id: Option<String>, // None = 全部项目
    pub supplier: Option<String>,   // None = 全部供应商
}

impl SummaryFilter {
    /// 不做任何筛选
    pub fn all() -> Self {
        Self {
            status: StatusFilter::All,
            project_id: None,
            supplier: None,
        }
    }

    /// 从字符串解析；"all"（区分大小写）或空串为通配，未知状态回退为 ongoing
    pub fn parse(status: &str, project_id: &str, supplier: &str) -> Self {
        let wildcard = |s: &str| {
            let s = s.trim();
            if s.is_empty() || s == FILTER_ALL {
                None
            } else {
                Some(s.to_string())
            }
        };
        Self {
            status: StatusFilter::parse(status).unwrap_or_default(),
            project_id: wildcard(project_id),
            supplier: wildcard(supplier),
        }
    }

    /// 使用快照中保存的筛选条件
    pub fn from_snapshot(snapshot: &AppSnapshot) -> Self {
        Self::parse(
            &snapshot.summary_filter,
            &snapshot.summary_project_id,
            &snapshot.summary_supplier,
        )
    }

    pub fn matches(&self, entry: &SummaryEntry) -> bool {
        if !self.status.accepts(entry.status) {
            return false;
        }
        if let Some(pid) = &self.project_id {
            if &entry.project_id != pid {
                return false;
            }
        }
        // 供应商两侧均去空白后比较，与 supplier_options 一致
        if let Some(supplier) = &self.supplier {
            if entry.supplier.trim() != supplier.trim() {
                return false;
            }
        }
        true
    }
}

// ==========================================
// SummaryAggregator - 汇总引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator {
    classifier: StatusClassifier,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self {
            classifier: StatusClassifier::new(),
        }
    }

    pub fn with_classifier(classifier: StatusClassifier) -> Self {
        Self { classifier }
    }

    /// 构建完整汇总（已排序，未筛选）
    #[instrument(skip(self, projects, settings), fields(projects = projects.len()))]
    pub fn build(
        &self,
        projects: &[Project],
        settings: &ScheduleSettings,
        today_iso: &str,
    ) -> Vec<SummaryEntry> {
        let mut entries = Vec::new();

        for project in projects {
            for page in project.pages.iter().filter(|p| !p.is_master()) {
                let supplier = project.supplier_for(page.meta.responsibility_id.as_deref());

                for row in page.rows.iter().filter(|r| !r.is_header() && !r.not_required) {
                    let ev = self.classifier.evaluate_row(row, settings, today_iso);
                    let status = self.classifier.aggregate_status(row, &ev.overdue);
                    entries.push(SummaryEntry {
                        project_id: project.id.clone(),
                        project_name: project.name.clone(),
                        page_id: page.id.clone(),
                        page_name: page.name.clone(),
                        row_id: row.id.clone(),
                        title: row.item.clone(),
                        supplier: supplier.clone(),
                        required_on_site: ev.dates.required_on_site,
                        status_a: ev.dates.status_a,
                        first_issue: ev.dates.first_issue,
                        completed: row.completed,
                        status,
                        traffic: ev.traffic,
                        overdue: ev.overdue,
                    });
                }
            }
        }

        Self::sort_entries(&mut entries);
        debug!(count = entries.len(), "汇总构建完成");
        entries
    }

    /// 稳定排序: 状态名次 → Status A → 标题
    pub fn sort_entries(entries: &mut [SummaryEntry]) {
        entries.sort_by(compare_entries);
    }

    /// 应用筛选，保持原有顺序
    pub fn apply_filter(entries: &[SummaryEntry], filter: &SummaryFilter) -> Vec<SummaryEntry> {
        entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    /// 构建并筛选
    pub fn build_filtered(
        &self,
        projects: &[Project],
        settings: &ScheduleSettings,
        today_iso: &str,
        filter: &SummaryFilter,
    ) -> Vec<SummaryEntry> {
        let all = self.build(projects, settings, today_iso);
        Self::apply_filter(&all, filter)
    }
}

/// 汇总条目比较
fn compare_entries(a: &SummaryEntry, b: &SummaryEntry) -> Ordering {
    a.status
        .rank()
        .cmp(&b.status.rank())
        .then_with(|| compare_status_a(&a.status_a, &b.status_a))
        .then_with(|| a.title.cmp(&b.title))
}

/// Status A 比较，缺失/非法日期排在所有真实日期之后
fn compare_status_a(a: &str, b: &str) -> Ordering {
    match (parse_iso(a), parse_iso(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 所有项目的供应商列表（去空白、去重、排序）
pub fn supplier_options(projects: &[Project]) -> Vec<String> {
    projects
        .iter()
        .flat_map(|p| p.responsibilities.iter())
        .map(|r| r.supplier.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 导出文件名: Summary-{filter}-{today}.csv（空白替换为 -）
pub fn summary_csv_filename(filter: &SummaryFilter, today_iso: &str) -> String {
    format!("Summary-{}-{}.csv", filter.status, today_iso)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// 导出汇总为 CSV（列头本地化，状态/信号灯保留原始取值）
pub fn export_summary_csv(entries: &[SummaryEntry]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let headers: Vec<String> = [
        "summary.col_status",
        "summary.col_traffic",
        "summary.col_project",
        "summary.col_responsibility",
        "summary.col_supplier",
        "summary.col_item",
        "summary.col_required_on_site",
        "summary.col_status_a",
        "summary.col_first_issue",
    ]
    .iter()
    .map(|key| crate::i18n::t(key))
    .collect();
    writer.write_record(&headers)?;

    for e in entries {
        writer.write_record([
            e.status.to_string().as_str(),
            e.traffic.to_string().as_str(),
            e.project_name.as_str(),
            e.page_name.as_str(),
            e.supplier.as_str(),
            e.title.as_str(),
            e.required_on_site.as_str(),
            e.status_a.as_str(),
            e.first_issue.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV 写出失败: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
