// ==========================================
// 设计出图进度跟踪 - 里程碑推算引擎
// ==========================================
// 输入: 锚点里程碑 + 锚点日期 + 两个天数偏移
// 输出: Required on Site / Status A / First Issue 三个日期
// ==========================================
// 推算规则:
// - 锚点=requiredOnSite: statusA = 锚点 - d1; firstIssue = statusA - d2
// - 锚点=statusA:        requiredOnSite = 锚点 + d1; firstIssue = 锚点 - d2
// - 锚点=firstIssue:     statusA = 锚点 + d2; requiredOnSite = statusA + d1
// 红线: 锚点日期非法 → 三个输出全部为空串
// ==========================================

use crate::domain::project::Row;
use crate::domain::snapshot::ScheduleSettings;
use crate::domain::types::AnchorKey;
use crate::engine::dates::{add_days, clamp_days, format_iso, parse_iso};
use serde::{Deserialize, Serialize};

// ==========================================
// DerivedDates - 推算结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedDates {
    pub required_on_site: String,
    pub status_a: String,
    pub first_issue: String,
}

impl DerivedDates {
    /// 三个日期全部为空
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.required_on_site.is_empty() && self.status_a.is_empty() && self.first_issue.is_empty()
    }

    /// 取某个里程碑的日期
    pub fn get(&self, key: AnchorKey) -> &str {
        match key {
            AnchorKey::RequiredOnSite => &self.required_on_site,
            AnchorKey::StatusA => &self.status_a,
            AnchorKey::FirstIssue => &self.first_issue,
        }
    }
}

// ==========================================
// DayOffsets - 生效的天数偏移
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOffsets {
    pub days_req_to_status_a: i64,
    pub days_status_a_to_first_issue: i64,
}

// ==========================================
// ScheduleInput - 推算输入
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInput<'a> {
    pub anchor_key: AnchorKey,
    pub anchor_date_iso: &'a str,
    pub days_req_to_status_a: i64,
    pub days_status_a_to_first_issue: i64,
}

// ==========================================
// ScheduleCalculator - 里程碑推算引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleCalculator;

impl ScheduleCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 由锚点推算三个里程碑日期
    ///
    /// 天数偏移先下限为 0；日期计算溢出同样视为非法输入
    pub fn compute(&self, input: &ScheduleInput<'_>) -> DerivedDates {
        let anchor = match parse_iso(input.anchor_date_iso) {
            Some(d) => d,
            None => return DerivedDates::empty(),
        };

        let d1 = input.days_req_to_status_a.max(0);
        let d2 = input.days_status_a_to_first_issue.max(0);

        let derived = match input.anchor_key {
            AnchorKey::RequiredOnSite => add_days(anchor, -d1)
                .and_then(|status_a| Some((anchor, status_a, add_days(status_a, -d2)?))),
            AnchorKey::StatusA => add_days(anchor, d1)
                .and_then(|req| Some((req, anchor, add_days(anchor, -d2)?))),
            AnchorKey::FirstIssue => add_days(anchor, d2)
                .and_then(|status_a| Some((add_days(status_a, d1)?, status_a, anchor))),
        };

        match derived {
            Some((req, status_a, first)) => DerivedDates {
                required_on_site: format_iso(req),
                status_a: format_iso(status_a),
                first_issue: format_iso(first),
            },
            None => DerivedDates::empty(),
        }
    }

    /// 行的生效天数：行级覆盖优先，否则取全局设置（取整，下限 0）
    pub fn resolve_offsets(&self, row: &Row, settings: &ScheduleSettings) -> DayOffsets {
        let pick = |over: Option<f64>, global: i64| match over {
            Some(v) => clamp_days(v),
            None => global.max(0),
        };
        DayOffsets {
            days_req_to_status_a: pick(
                row.override_days_req_to_status_a,
                settings.days_req_to_status_a,
            ),
            days_status_a_to_first_issue: pick(
                row.override_days_status_a_to_first_issue,
                settings.days_status_a_to_first_issue,
            ),
        }
    }

    /// 推算一行的日期；header 行没有日期
    pub fn derive_for_row(&self, row: &Row, settings: &ScheduleSettings) -> DerivedDates {
        if row.is_header() {
            return DerivedDates::empty();
        }
        let offsets = self.resolve_offsets(row, settings);
        self.compute(&ScheduleInput {
            anchor_key: row.anchor_key,
            anchor_date_iso: &row.anchor_date_iso,
            days_req_to_status_a: offsets.days_req_to_status_a,
            days_status_a_to_first_issue: offsets.days_status_a_to_first_issue,
        })
    }
}
