// ==========================================
// 设计出图进度跟踪 - 整体状态快照
// ==========================================
// 持久化单元: 整棵项目树 + 全局天数 + 前端视图状态
// 写入为整体覆盖（不合并），后写者生效
// ==========================================

use crate::domain::lenient::{days_lenient, opt_string_lenient, string_lenient};
use crate::domain::project::{Project, Row};
use crate::domain::types::View;
use serde::{Deserialize, Serialize};

/// 汇总筛选的通配值
pub const FILTER_ALL: &str = "all";

fn default_summary_filter() -> String {
    "ongoing".to_string()
}

fn default_all() -> String {
    FILTER_ALL.to_string()
}

// ==========================================
// ScheduleSettings - 全局天数偏移
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub days_req_to_status_a: i64,          // Required on Site → Status A
    pub days_status_a_to_first_issue: i64,  // Status A → First Issue
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            days_req_to_status_a: 14,
            days_status_a_to_first_issue: 28,
        }
    }
}

// ==========================================
// AppSnapshot - 持久化的整体状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    #[serde(default, deserialize_with = "days_lenient", skip_serializing_if = "Option::is_none")]
    pub global_days_req_to_status_a: Option<f64>,
    #[serde(default, deserialize_with = "days_lenient", skip_serializing_if = "Option::is_none")]
    pub global_days_status_a_to_first_issue: Option<f64>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub active_project_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub active_page_id: Option<String>,

    #[serde(default)]
    pub view: View,
    #[serde(default = "default_summary_filter", deserialize_with = "string_lenient")]
    pub summary_filter: String,
    #[serde(default = "default_all", deserialize_with = "string_lenient")]
    pub summary_project_id: String,
    #[serde(default = "default_all", deserialize_with = "string_lenient")]
    pub summary_supplier: String,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            global_days_req_to_status_a: None,
            global_days_status_a_to_first_issue: None,
            projects: Vec::new(),
            active_project_id: None,
            active_page_id: None,
            view: View::Landing,
            summary_filter: default_summary_filter(),
            summary_project_id: default_all(),
            summary_supplier: default_all(),
        }
    }
}

/// 行定位结果
#[derive(Debug)]
pub struct RowLocation<'a> {
    pub project_id: String,
    pub page_id: String,
    pub row: &'a mut Row,
}

impl AppSnapshot {
    /// 解析全局天数；快照中缺失或非有限值时使用配置默认值
    pub fn schedule_settings(&self, defaults: ScheduleSettings) -> ScheduleSettings {
        let pick = |v: Option<f64>, fallback: i64| match v {
            Some(n) if n.is_finite() => n.trunc() as i64,
            _ => fallback,
        };
        ScheduleSettings {
            days_req_to_status_a: pick(
                self.global_days_req_to_status_a,
                defaults.days_req_to_status_a,
            ),
            days_status_a_to_first_issue: pick(
                self.global_days_status_a_to_first_issue,
                defaults.days_status_a_to_first_issue,
            ),
        }
    }

    /// 按行ID查找（可变），遍历所有项目的所有页面
    pub fn find_row_mut(&mut self, row_id: &str) -> Option<RowLocation<'_>> {
        for project in self.projects.iter_mut() {
            for page in project.pages.iter_mut() {
                if let Some(row) = page.rows.iter_mut().find(|r| r.id == row_id) {
                    return Some(RowLocation {
                        project_id: project.id.clone(),
                        page_id: page.id.clone(),
                        row,
                    });
                }
            }
        }
        None
    }

    /// 对所有行强制 notRequired 不变量
    pub fn enforce_row_invariants(&mut self) {
        self.projects
            .iter_mut()
            .flat_map(|p| p.pages.iter_mut())
            .flat_map(|pg| pg.rows.iter_mut())
            .for_each(|r| r.enforce_not_required());
    }
}
