// ==========================================
// 设计出图进度跟踪 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::schedule_config_trait::ScheduleConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::snapshot::ScheduleSettings;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ===== 默认值 =====
pub const DEFAULT_DAYS_REQ_TO_STATUS_A: i64 = 14;
pub const DEFAULT_DAYS_STATUS_A_TO_FIRST_ISSUE: i64 = 28;
pub const DEFAULT_AMBER_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_PERMISSION_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_BACKUP_TITLE_PREFIX: &str = "backup-";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA 并确保表结构（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置；缺失或无法解析时返回默认值（无法解析时告警）
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key = %key, value = %raw, default = %default, "配置值无法解析，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    // ===== 类型化读取 =====

    /// 全局天数偏移（下限 0）
    pub fn schedule_settings(&self) -> Result<ScheduleSettings, Box<dyn Error>> {
        Ok(ScheduleSettings {
            days_req_to_status_a: self
                .get_parsed_or_default(
                    config_keys::GLOBAL_DAYS_REQ_TO_STATUS_A,
                    DEFAULT_DAYS_REQ_TO_STATUS_A,
                )?
                .max(0),
            days_status_a_to_first_issue: self
                .get_parsed_or_default(
                    config_keys::GLOBAL_DAYS_STATUS_A_TO_FIRST_ISSUE,
                    DEFAULT_DAYS_STATUS_A_TO_FIRST_ISSUE,
                )?
                .max(0),
        })
    }

    pub fn amber_window_days(&self) -> Result<i64, Box<dyn Error>> {
        Ok(self
            .get_parsed_or_default(config_keys::AMBER_WINDOW_DAYS, DEFAULT_AMBER_WINDOW_DAYS)?
            .max(0))
    }

    pub fn permission_cache_ttl_secs(&self) -> Result<u64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::PERMISSION_CACHE_TTL_SECS,
            DEFAULT_PERMISSION_CACHE_TTL_SECS,
        )
    }

    pub fn backup_title_prefix(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::BACKUP_TITLE_PREFIX, DEFAULT_BACKUP_TITLE_PREFIX)
    }

    pub fn chat_model(&self) -> Result<String, Box<dyn Error>> {
        let model = self.get_config_or_default(config_keys::CHAT_MODEL, DEFAULT_CHAT_MODEL)?;
        if model.trim().is_empty() {
            return Ok(DEFAULT_CHAT_MODEL.to_string());
        }
        Ok(model)
    }

    // ===== 快照 =====

    /// 获取所有 global 配置的快照（JSON格式，键有序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置（覆盖同名 global 配置），返回恢复条数
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
                params![GLOBAL_SCOPE, key, value],
            )?;
        }

        tx.commit()?;
        info!(count, "配置已从快照恢复");
        Ok(count)
    }
}

// ==========================================
// ScheduleConfigReader 实现
// ==========================================
#[async_trait]
impl ScheduleConfigReader for ConfigManager {
    async fn get_days_req_to_status_a(&self) -> Result<i64, Box<dyn Error>> {
        Ok(self.schedule_settings()?.days_req_to_status_a)
    }

    async fn get_days_status_a_to_first_issue(&self) -> Result<i64, Box<dyn Error>> {
        Ok(self.schedule_settings()?.days_status_a_to_first_issue)
    }

    async fn get_amber_window_days(&self) -> Result<i64, Box<dyn Error>> {
        self.amber_window_days()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 全局天数偏移
    pub const GLOBAL_DAYS_REQ_TO_STATUS_A: &str = "global_days_req_to_status_a";
    pub const GLOBAL_DAYS_STATUS_A_TO_FIRST_ISSUE: &str = "global_days_status_a_to_first_issue";

    // 信号灯
    pub const AMBER_WINDOW_DAYS: &str = "amber_window_days";

    // 权限缓存
    pub const PERMISSION_CACHE_TTL_SECS: &str = "permission_cache_ttl_secs";

    // 备份
    pub const BACKUP_TITLE_PREFIX: &str = "backup_title_prefix";

    // 聊天助手
    pub const CHAT_MODEL: &str = "chat_model";
}
