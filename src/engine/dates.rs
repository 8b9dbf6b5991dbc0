// ==========================================
// 设计出图进度跟踪 - 日期引擎
// ==========================================
// 职责: ISO 日期 (YYYY-MM-DD) 解析/格式化/加减/相差天数
// 红线: 全部按 UTC 日历日计算，不受夏令时影响
// 红线: 非法输入返回空值（None / 空串），从不 panic
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};

/// 一天的毫秒数
pub const DAY_MS: i64 = 86_400_000;

/// 解析 ISO 日期
///
/// 规则:
/// - 去除首尾空白后按 `-` 切分，必须正好三段且全部为数字
/// - 年份四位，月/日一到两位
/// - 日期必须真实存在（2024-02-30、2023-02-29 之类返回 None）
pub fn parse_iso(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let all_digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !all_digits(parts[0], 4, 4) || !all_digits(parts[1], 1, 2) || !all_digits(parts[2], 1, 2) {
        return None;
    }

    let y: i32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let d: u32 = parts[2].parse().ok()?;
    if y == 0 || m == 0 || d == 0 {
        return None;
    }

    // from_ymd_opt 不做自动进位，等价于"组件往返一致"校验
    NaiveDate::from_ymd_opt(y, m, d)
}

/// 格式化为补零的 YYYY-MM-DD
pub fn format_iso(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// 可选日期格式化，None → 空串
pub fn format_opt(date: Option<NaiveDate>) -> String {
    date.map(format_iso).unwrap_or_default()
}

/// 加减天数（溢出返回 None）
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// 两个 ISO 日期相差的整天数（finish - start），毫秒差 / 86_400_000 四舍五入
pub fn diff_days(start_iso: &str, finish_iso: &str) -> Option<i64> {
    let start = parse_iso(start_iso)?;
    let finish = parse_iso(finish_iso)?;
    let ms = (finish - start).num_milliseconds();
    Some((ms as f64 / DAY_MS as f64).round() as i64)
}

/// 距离目标日期的剩余天数（向上取整）
pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    let ms = (target - today).num_milliseconds();
    (ms as f64 / DAY_MS as f64).ceil() as i64
}

/// 天数取整并下限为 0（非有限值视为 0）
pub fn clamp_days(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc() as i64).max(0)
}

/// 今天（本地日历日）
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 今天的 ISO 字符串
pub fn today_iso() -> String {
    format_iso(today())
}
