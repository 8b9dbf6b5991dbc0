// ==========================================
// 设计出图进度跟踪 - 总进度甘特视图模型
// ==========================================
// 每个楼层一条横道: 开始日期 → 完成日期（缺完成日期时取开始日期）
// 时间范围: 最早开始 - 3 天 .. 最晚完成 + 3 天
// 月份刻度: 从范围起始月的 1 日起，逐月到范围结束
// ==========================================

use crate::domain::project::{BlockZone, Level};
use crate::engine::dates::{add_days, diff_days, format_iso, parse_iso};
use crate::engine::generation::level_display_name;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 时间范围两端的留白天数
pub const RANGE_PADDING_DAYS: i64 = 3;

// ==========================================
// ProgrammeItem - 甘特横道
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammeItem {
    pub id: String,
    pub label: String,
    #[serde(rename = "startISO")]
    pub start_iso: String,
    #[serde(rename = "finishISO")]
    pub finish_iso: String,
}

impl ProgrammeItem {
    pub fn start(&self) -> Option<NaiveDate> {
        parse_iso(&self.start_iso)
    }

    pub fn finish(&self) -> Option<NaiveDate> {
        parse_iso(&self.finish_iso)
    }
}

// ==========================================
// ProgrammeRange / MonthTick
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammeRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl ProgrammeRange {
    /// 总天数（至少 1）
    pub fn total_days(&self) -> i64 {
        (self.max - self.min).num_days().max(1)
    }

    /// 日期在范围内的位置百分比
    pub fn percent_of(&self, date: NaiveDate) -> f64 {
        (date - self.min).num_days() as f64 / self.total_days() as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTick {
    pub key: String,   // YYYY-M
    pub label: String, // 例如 Jun 24
    pub date: String,  // 该月 1 日
    pub pct: f64,
}

/// 由总进度构建甘特横道
pub fn build_programme_items(master: &[BlockZone]) -> Vec<ProgrammeItem> {
    let mut items = Vec::new();
    for bz in master {
        let label = bz.block_zone.trim();
        for (idx, level) in bz.levels.iter().enumerate() {
            let level_name = level_display_name(&level.name, idx);
            let finish_iso = if level.finish_date.is_empty() {
                level.start_date.clone()
            } else {
                level.finish_date.clone()
            };
            items.push(ProgrammeItem {
                id: if level.id.is_empty() {
                    crate::domain::project::new_id()
                } else {
                    level.id.clone()
                },
                label: if label.is_empty() {
                    level_name
                } else {
                    format!("{} — {}", label, level_name)
                },
                start_iso: level.start_date.clone(),
                finish_iso,
            });
        }
    }
    items
}

/// 甘特时间范围；没有任何开始/完成都有效的横道时返回 None
pub fn programme_range(items: &[ProgrammeItem]) -> Option<ProgrammeRange> {
    let valid: Vec<(NaiveDate, NaiveDate)> = items
        .iter()
        .filter_map(|it| Some((it.start()?, it.finish()?)))
        .collect();

    let min = valid.iter().map(|(s, _)| *s).min()?;
    let max = valid.iter().map(|(_, f)| *f).max()?;

    Some(ProgrammeRange {
        min: add_days(min, -RANGE_PADDING_DAYS)?,
        max: add_days(max, RANGE_PADDING_DAYS)?,
    })
}

/// 月份刻度
pub fn month_ticks(range: &ProgrammeRange) -> Vec<MonthTick> {
    let mut ticks = Vec::new();
    let mut cur = match NaiveDate::from_ymd_opt(range.min.year(), range.min.month(), 1) {
        Some(d) => d,
        None => return ticks,
    };

    while cur <= range.max {
        ticks.push(MonthTick {
            key: format!("{}-{}", cur.year(), cur.month()),
            label: cur.format("%b %y").to_string(),
            date: format_iso(cur),
            pct: range.percent_of(cur),
        });
        cur = match cur.checked_add_months(chrono::Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    ticks
}

/// 楼层工期天数（开始/完成任一无效时为 None）
pub fn level_duration_days(level: &Level) -> Option<i64> {
    diff_days(&level.start_date, &level.finish_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(name: &str, start: &str, finish: &str) -> Level {
        Level {
            id: format!("lv-{}", name),
            name: name.to_string(),
            start_date: start.to_string(),
            finish_date: finish.to_string(),
        }
    }

    fn master() -> Vec<BlockZone> {
        vec![
            BlockZone {
                id: "a".to_string(),
                block_zone: "Block A".to_string(),
                levels: vec![
                    level("L1", "2024-05-10", "2024-06-20"),
                    level("L2", "2024-06-01", ""),
                ],
            },
            BlockZone {
                id: "b".to_string(),
                block_zone: String::new(),
                levels: vec![level("", "bad", "2024-07-01")],
            },
        ]
    }

    #[test]
    fn test_build_programme_items() {
        let items = build_programme_items(&master());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].label, "Block A — L1");
        assert_eq!(items[1].finish_iso, "2024-06-01");
        assert_eq!(items[2].label, "Level 1");
    }

    #[test]
    fn test_programme_range_ignores_invalid_items() {
        let items = build_programme_items(&master());
        let range = programme_range(&items).unwrap();
        assert_eq!(format_iso(range.min), "2024-05-07");
        assert_eq!(format_iso(range.max), "2024-06-23");
        assert!(programme_range(&[]).is_none());
    }

    #[test]
    fn test_month_ticks() {
        let items = build_programme_items(&master());
        let range = programme_range(&items).unwrap();
        let ticks = month_ticks(&range);
        let keys: Vec<&str> = ticks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-5", "2024-6"]);
        assert!(ticks[0].pct < 0.0);
        assert!(ticks[1].pct > 0.0 && ticks[1].pct < 100.0);
        assert_eq!(ticks[1].label, "Jun 24");
    }

    #[test]
    fn test_level_duration() {
        assert_eq!(level_duration_days(&level("x", "2024-01-01", "2024-01-31")), Some(30));
        assert_eq!(level_duration_days(&level("x", "2024-01-01", "")), None);
    }
}
