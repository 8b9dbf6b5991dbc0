// ==========================================
// 设计出图进度跟踪 - 备份 API
// ==========================================
// 职责: 每周备份（由宿主定时触发，例如每周日 02:00 UTC）
// 备份标题: {backup_title_prefix}{YYYY-MM-DD}
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::i18n::t_with_args;
use crate::repository::state_repo::{BackupRecord, StateRepository};

pub struct BackupApi {
    state_repo: Arc<StateRepository>,
    config_manager: Arc<ConfigManager>,
}

impl BackupApi {
    pub fn new(state_repo: Arc<StateRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            state_repo,
            config_manager,
        }
    }

    /// 执行每周备份
    ///
    /// # 参数
    /// - today_iso: 备份日期（YYYY-MM-DD）
    ///
    /// # 返回
    /// - Ok(Some(title)): 已写入备份
    /// - Ok(None): 尚无状态，跳过
    pub fn run_weekly_backup(&self, today_iso: &str) -> ApiResult<Option<String>> {
        let snapshot = match self.state_repo.read_state()? {
            Some(s) => s,
            None => {
                info!("{}", crate::i18n::t("backup.skipped"));
                return Ok(None);
            }
        };

        let prefix = self
            .config_manager
            .backup_title_prefix()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let title = format!("{}{}", prefix, today_iso);

        self.state_repo.append_backup(&snapshot, &title)?;
        info!("{}", t_with_args("backup.written", &[("date", today_iso)]));
        Ok(Some(title))
    }

    /// 全部备份记录
    pub fn list_backups(&self) -> ApiResult<Vec<BackupRecord>> {
        Ok(self.state_repo.list_backups()?)
    }
}
