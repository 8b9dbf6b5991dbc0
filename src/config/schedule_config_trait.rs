// ==========================================
// 设计出图进度跟踪 - 推算配置读取 Trait
// ==========================================
// 职责: 定义日期推算/状态判定所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::snapshot::ScheduleSettings;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ScheduleConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ScheduleConfigReader: Send + Sync {
    /// Required on Site → Status A 的全局天数
    ///
    /// # 默认值
    /// - 14
    async fn get_days_req_to_status_a(&self) -> Result<i64, Box<dyn Error>>;

    /// Status A → First Issue 的全局天数
    ///
    /// # 默认值
    /// - 28
    async fn get_days_status_a_to_first_issue(&self) -> Result<i64, Box<dyn Error>>;

    /// 黄灯窗口天数（剩余天数 0..=N 为 amber）
    ///
    /// # 默认值
    /// - 7
    async fn get_amber_window_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 两个全局天数合并读取
    async fn get_schedule_settings(&self) -> Result<ScheduleSettings, Box<dyn Error>> {
        let days_req_to_status_a = self.get_days_req_to_status_a().await?;
        let days_status_a_to_first_issue = self.get_days_status_a_to_first_issue().await?;
        Ok(ScheduleSettings {
            days_req_to_status_a,
            days_status_a_to_first_issue,
        })
    }
}
