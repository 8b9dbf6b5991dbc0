// ==========================================
// 设计出图进度跟踪 - 领域类型定义
// ==========================================
// 里程碑依赖链: Required on Site → Status A → First Issue
// 序列化格式: 与前端持久化 JSON 一致 (camelCase / lowercase)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 锚点里程碑 (Anchor Key)
// ==========================================
// 用户直接填写的那个里程碑，其余两个由天数偏移推算
// 未知取值按 firstIssue 处理 (与历史数据兼容)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKey {
    #[default]
    RequiredOnSite, // 现场需求日
    StatusA,        // A状态
    #[serde(other)]
    FirstIssue,     // 首次出图
}

impl AnchorKey {
    pub const ALL: [AnchorKey; 3] = [
        AnchorKey::RequiredOnSite,
        AnchorKey::StatusA,
        AnchorKey::FirstIssue,
    ];

    /// 显示名称
    pub fn label(&self) -> &'static str {
        match self {
            AnchorKey::RequiredOnSite => "Required on Site",
            AnchorKey::StatusA => "Status A",
            AnchorKey::FirstIssue => "First Issue",
        }
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorKey::RequiredOnSite => write!(f, "requiredOnSite"),
            AnchorKey::StatusA => write!(f, "statusA"),
            AnchorKey::FirstIssue => write!(f, "firstIssue"),
        }
    }
}

// ==========================================
// 行类型 (Row Kind)
// ==========================================
// header 仅作分组标题，不参与日期与状态计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Header,
    #[default]
    #[serde(other)]
    Item,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Header => write!(f, "header"),
            RowKind::Item => write!(f, "item"),
        }
    }
}

// ==========================================
// 信号灯 (Traffic Status)
// ==========================================
// 仅依据 Status A 里程碑
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficStatus {
    Green, // 已完成 或 剩余 > 7 天
    Amber, // 剩余 0..=7 天
    Red,   // 已过 Status A
    Na,    // 不需要 / 日期缺失
}

impl TrafficStatus {
    /// 本地化显示名称
    pub fn localized(&self) -> String {
        crate::i18n::t(&format!("traffic.{}", self))
    }
}

impl fmt::Display for TrafficStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficStatus::Green => write!(f, "green"),
            TrafficStatus::Amber => write!(f, "amber"),
            TrafficStatus::Red => write!(f, "red"),
            TrafficStatus::Na => write!(f, "na"),
        }
    }
}

// ==========================================
// 汇总状态 (Summary Status)
// ==========================================
// 排序: overdue(0) < ongoing(1) < done(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Overdue,
    Ongoing,
    Done,
}

/// 未知状态的排序名次
pub const UNKNOWN_STATUS_RANK: u8 = 9;

impl SummaryStatus {
    /// 汇总排序名次
    pub fn rank(&self) -> u8 {
        match self {
            SummaryStatus::Overdue => 0,
            SummaryStatus::Ongoing => 1,
            SummaryStatus::Done => 2,
        }
    }

    /// 从字符串解析（未知返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "overdue" => Some(SummaryStatus::Overdue),
            "ongoing" => Some(SummaryStatus::Ongoing),
            "done" => Some(SummaryStatus::Done),
            _ => None,
        }
    }

    /// 按字符串取排序名次，未知状态排在最后
    pub fn rank_of(label: &str) -> u8 {
        Self::parse(label)
            .map(|s| s.rank())
            .unwrap_or(UNKNOWN_STATUS_RANK)
    }

    /// 本地化显示名称
    pub fn localized(&self) -> String {
        crate::i18n::t(&format!("status.{}", self))
    }
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStatus::Overdue => write!(f, "overdue"),
            SummaryStatus::Ongoing => write!(f, "ongoing"),
            SummaryStatus::Done => write!(f, "done"),
        }
    }
}

// ==========================================
// 汇总状态筛选 (Status Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Overdue,
    #[default]
    Ongoing,
    Done,
}

impl StatusFilter {
    /// 从字符串解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "overdue" => Some(StatusFilter::Overdue),
            "ongoing" => Some(StatusFilter::Ongoing),
            "done" => Some(StatusFilter::Done),
            _ => None,
        }
    }

    /// 判断某状态是否命中
    pub fn accepts(&self, status: SummaryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Overdue => status == SummaryStatus::Overdue,
            StatusFilter::Ongoing => status == SummaryStatus::Ongoing,
            StatusFilter::Done => status == SummaryStatus::Done,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Overdue => write!(f, "overdue"),
            StatusFilter::Ongoing => write!(f, "ongoing"),
            StatusFilter::Done => write!(f, "done"),
        }
    }
}

// ==========================================
// 角色 (Role)
// ==========================================
// 权限等级: viewer(0) < tickonly(1) < editor(2) < admin(3) = owner(3)
// 同义词: readOnly → viewer, checkbox → tickonly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    TickOnly,
    Editor,
    Admin,
    Owner,
}

impl Role {
    /// 从字符串解析角色（大小写不敏感，未知角色视为 viewer）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tickonly" | "checkbox" => Role::TickOnly,
            "editor" => Role::Editor,
            "admin" => Role::Admin,
            "owner" => Role::Owner,
            _ => Role::Viewer,
        }
    }

    /// 权限等级
    pub fn rank(&self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::TickOnly => 1,
            Role::Editor => 2,
            Role::Admin | Role::Owner => 3,
        }
    }

    /// 是否可以整体保存状态
    pub fn can_write_state(&self) -> bool {
        self.rank() >= Role::Editor.rank()
    }

    /// 是否可以勾选里程碑
    pub fn can_tick(&self) -> bool {
        self.rank() >= Role::TickOnly.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::TickOnly => write!(f, "tickonly"),
            Role::Editor => write!(f, "editor"),
            Role::Admin => write!(f, "admin"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

// ==========================================
// 前端视图 (View)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Project,
    Summary,
    GanttSummary,
    /// 未知视图回退到首页
    #[default]
    #[serde(other)]
    Landing,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Landing => write!(f, "landing"),
            View::Project => write!(f, "project"),
            View::Summary => write!(f, "summary"),
            View::GanttSummary => write!(f, "gantt_summary"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_synonyms_share_rank() {
        assert_eq!(Role::from_str("tickOnly"), Role::TickOnly);
        assert_eq!(Role::from_str("CHECKBOX"), Role::TickOnly);
        assert_eq!(Role::from_str("readOnly"), Role::Viewer);
        assert_eq!(Role::from_str("something-else"), Role::Viewer);
        assert_eq!(Role::Admin.rank(), Role::Owner.rank());
        assert_ne!(Role::Admin, Role::Owner);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(!Role::Viewer.can_tick());
        assert!(Role::TickOnly.can_tick());
        assert!(!Role::TickOnly.can_write_state());
        assert!(Role::Editor.can_write_state());
        assert!(Role::Owner.can_write_state());
    }

    #[test]
    fn test_summary_status_rank() {
        assert_eq!(SummaryStatus::rank_of("overdue"), 0);
        assert_eq!(SummaryStatus::rank_of("ongoing"), 1);
        assert_eq!(SummaryStatus::rank_of("done"), 2);
        assert_eq!(SummaryStatus::rank_of("blocked"), UNKNOWN_STATUS_RANK);
    }

    #[test]
    fn test_anchor_key_serde() {
        let k: AnchorKey = serde_json::from_str("\"statusA\"").unwrap();
        assert_eq!(k, AnchorKey::StatusA);
        let unknown: AnchorKey = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(unknown, AnchorKey::FirstIssue);
        assert_eq!(serde_json::to_string(&AnchorKey::RequiredOnSite).unwrap(), "\"requiredOnSite\"");
    }

    #[test]
    fn test_view_serde() {
        let v: View = serde_json::from_str("\"gantt_summary\"").unwrap();
        assert_eq!(v, View::GanttSummary);
        let v: View = serde_json::from_str("\"nonsense\"").unwrap();
        assert_eq!(v, View::Landing);
        assert_eq!(View::default(), View::Landing);
        assert_eq!(serde_json::to_string(&View::Landing).unwrap(), "\"landing\"");
    }
}
