// ==========================================
// 设计出图进度跟踪 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::api::{BackupApi, PermissionCache, PermissionService, StateApi, SummaryApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::{PermissionRepository, StateRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "WORKBACK_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源，由宿主（HTTP 服务 / CLI）持有
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 整体状态API
    pub state_api: Arc<StateApi>,

    /// 汇总API
    pub summary_api: Arc<SummaryApi>,

    /// 备份API
    pub backup_api: Arc<BackupApi>,

    /// 权限解析服务
    pub permission_service: Arc<PermissionService>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 权限缓存（TTL 来自 permission_cache_ttl_secs）
    permission_cache: Mutex<PermissionCache>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let state_repo = Arc::new(StateRepository::from_connection(conn.clone()));
        let permission_repo = Arc::new(PermissionRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let ttl_secs = config_manager
            .permission_cache_ttl_secs()
            .map_err(|e| format!("无法读取权限缓存配置: {}", e))?;

        // ==========================================
        // 创建API实例
        // ==========================================
        let permission_service = Arc::new(PermissionService::new(permission_repo));
        let state_api = Arc::new(StateApi::new(state_repo.clone(), permission_service.clone()));
        let summary_api = Arc::new(SummaryApi::new(state_repo.clone(), config_manager.clone()));
        let backup_api = Arc::new(BackupApi::new(state_repo, config_manager.clone()));

        tracing::info!(ttl_secs, "AppState初始化完成");

        Ok(Self {
            db_path,
            state_api,
            summary_api,
            backup_api,
            permission_service,
            config_manager,
            permission_cache: Mutex::new(PermissionCache::new(Duration::from_secs(ttl_secs))),
        })
    }

    /// 获取权限缓存（锁中毒时恢复内部数据，缓存内容可随时丢弃）
    pub fn permission_cache(&self) -> MutexGuard<'_, PermissionCache> {
        match self.permission_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.clear();
                guard
            }
        }
    }
}

/// 获取默认数据库路径
///
/// 优先级: WORKBACK_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./workback.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("workback-tracker-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("workback-tracker");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("workback.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Role;
    use crate::domain::user::UserContext;
    use tempfile::NamedTempFile;

    #[test]
    fn test_app_state_wires_shared_connection() {
        let file = NamedTempFile::new().unwrap();
        let db_path = file.path().to_string_lossy().to_string();
        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);

        let user = UserContext::with_email("someone@example.com");
        let boot = {
            let mut cache = state.permission_cache();
            state.state_api.bootstrap(&user, &mut cache).unwrap()
        };
        assert!(boot.snapshot.projects.is_empty());
        assert_eq!(boot.me.role, Role::Viewer);
        assert_eq!(state.permission_cache().len(), 1);
    }
}
