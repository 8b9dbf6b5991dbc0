// ==========================================
// 设计出图进度跟踪 - 状态判定引擎
// ==========================================
// 职责: 逾期标志 / 信号灯 / 汇总状态
// 输入: Row + DerivedDates + today
// ==========================================
// 逾期规则（各里程碑独立判定）:
// - overdueReq: requiredOnSite < today 且 未完成
// - overdueA:   statusA < today 且 未勾 statusADone 且 未完成
// - overdueF:   firstIssue < today 且 未勾 firstIssueDone 且 未完成
// - notRequired=true → 全部为 false
// 信号灯（仅看 Status A）:
// - notRequired → na; completed → green
// - 剩余天数 < 0 → red; 0..=7 → amber; > 7 → green; 日期缺失 → na
// ==========================================

use crate::domain::project::Row;
use crate::domain::snapshot::ScheduleSettings;
use crate::domain::types::{SummaryStatus, TrafficStatus};
use crate::engine::dates::{days_until, parse_iso};
use crate::engine::schedule::{DayOffsets, DerivedDates, ScheduleCalculator};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 黄灯窗口默认天数（含边界）
pub const DEFAULT_AMBER_WINDOW_DAYS: i64 = 7;

// ==========================================
// OverdueFlags - 逾期标志
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueFlags {
    pub overdue: bool,
    pub overdue_req: bool,
    #[serde(rename = "overdueA")]
    pub overdue_a: bool,
    #[serde(rename = "overdueF")]
    pub overdue_f: bool,
}

impl OverdueFlags {
    pub fn none() -> Self {
        Self::default()
    }
}

// ==========================================
// RowEvaluation - 单行计算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowEvaluation {
    pub row_id: String,
    pub dates: DerivedDates,
    pub offsets: DayOffsets,
    pub overdue: OverdueFlags,
    pub traffic: TrafficStatus,
}

// ==========================================
// StatusClassifier - 状态判定引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StatusClassifier {
    amber_window_days: i64,
    calculator: ScheduleCalculator,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusClassifier {
    /// 使用默认黄灯窗口（7 天）
    pub fn new() -> Self {
        Self::with_amber_window(DEFAULT_AMBER_WINDOW_DAYS)
    }

    /// 指定黄灯窗口天数
    pub fn with_amber_window(amber_window_days: i64) -> Self {
        Self {
            amber_window_days: amber_window_days.max(0),
            calculator: ScheduleCalculator::new(),
        }
    }

    pub fn amber_window_days(&self) -> i64 {
        self.amber_window_days
    }

    // ==========================================
    // 逾期判定
    // ==========================================

    /// 计算逾期标志
    ///
    /// today 非法时全部为 false
    pub fn overdue_flags(&self, row: &Row, dates: &DerivedDates, today_iso: &str) -> OverdueFlags {
        if row.not_required || row.is_header() {
            return OverdueFlags::none();
        }
        let today = match parse_iso(today_iso) {
            Some(t) => t,
            None => return OverdueFlags::none(),
        };

        let before_today = |iso: &str| parse_iso(iso).map(|d| d < today).unwrap_or(false);

        let overdue_req = before_today(&dates.required_on_site) && !row.completed;
        let overdue_a = before_today(&dates.status_a) && !row.status_a_done && !row.completed;
        let overdue_f =
            before_today(&dates.first_issue) && !row.first_issue_done && !row.completed;

        OverdueFlags {
            overdue: overdue_req || overdue_a || overdue_f,
            overdue_req,
            overdue_a,
            overdue_f,
        }
    }

    // ==========================================
    // 信号灯判定
    // ==========================================

    /// 计算信号灯（仅依据 Status A）
    pub fn traffic(&self, row: &Row, dates: &DerivedDates, today_iso: &str) -> TrafficStatus {
        if row.is_header() || row.not_required {
            return TrafficStatus::Na;
        }
        if row.completed {
            return TrafficStatus::Green;
        }

        let (today, status_a) = match (parse_iso(today_iso), parse_iso(&dates.status_a)) {
            (Some(t), Some(a)) => (t, a),
            _ => return TrafficStatus::Na,
        };

        let days_left = days_until(today, status_a);
        if days_left < 0 {
            TrafficStatus::Red
        } else if days_left <= self.amber_window_days {
            TrafficStatus::Amber
        } else {
            TrafficStatus::Green
        }
    }

    // ==========================================
    // 汇总状态
    // ==========================================

    /// 三值汇总状态: done > overdue > ongoing
    pub fn aggregate_status(&self, row: &Row, flags: &OverdueFlags) -> SummaryStatus {
        if row.completed {
            SummaryStatus::Done
        } else if flags.overdue_req || flags.overdue_a || flags.overdue_f {
            SummaryStatus::Overdue
        } else {
            SummaryStatus::Ongoing
        }
    }

    // ==========================================
    // 整行计算
    // ==========================================

    /// 计算单行: 日期 + 偏移 + 逾期 + 信号灯（header 行为占位结果）
    pub fn evaluate_row(&self, row: &Row, settings: &ScheduleSettings, today_iso: &str) -> RowEvaluation {
        let offsets = self.calculator.resolve_offsets(row, settings);
        if row.is_header() {
            return RowEvaluation {
                row_id: row.id.clone(),
                dates: DerivedDates::empty(),
                offsets,
                overdue: OverdueFlags::none(),
                traffic: TrafficStatus::Na,
            };
        }

        let dates = self.calculator.derive_for_row(row, settings);
        let overdue = self.overdue_flags(row, &dates, today_iso);
        let traffic = self.traffic(row, &dates, today_iso);
        RowEvaluation {
            row_id: row.id.clone(),
            dates,
            offsets,
            overdue,
            traffic,
        }
    }

    /// 批量计算一页的所有行（保持原顺序）
    #[instrument(skip(self, rows, settings), fields(count = rows.len()))]
    pub fn evaluate_rows(
        &self,
        rows: &[Row],
        settings: &ScheduleSettings,
        today_iso: &str,
    ) -> Vec<RowEvaluation> {
        rows.iter()
            .map(|r| self.evaluate_row(r, settings, today_iso))
            .collect()
    }
}
