// ==========================================
// 设计出图进度跟踪 - 整体状态仓储
// ==========================================
// 表: workback_state  (固定一行 title='STATE'，整体覆盖写入)
//     workback_backup (追加写入的备份快照)
// 红线: Repository 不含业务逻辑；写入为后写者生效，无版本校验
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::snapshot::AppSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 状态行的固定标题
pub const STATE_TITLE: &str = "STATE";

// ==========================================
// BackupRecord - 备份记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub backup_id: i64,
    pub title: String,
    pub data_json: String,
    pub created_utc: String,
}

impl BackupRecord {
    /// 解析备份内容
    pub fn snapshot(&self) -> RepositoryResult<AppSnapshot> {
        Ok(serde_json::from_str(&self.data_json)?)
    }
}

// ==========================================
// StateRepository - 整体状态仓储
// ==========================================
pub struct StateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StateRepository {
    /// 打开数据库并确保表结构
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 整体状态
    // ==========================================

    /// 读取整体状态
    ///
    /// # 返回
    /// - Ok(Some(snapshot)): 已有状态
    /// - Ok(None): 尚无状态，或存储内容无法解析（记录告警）
    pub fn read_state(&self) -> RepositoryResult<Option<AppSnapshot>> {
        let conn = self.get_conn()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data_json FROM workback_state WHERE title = ?1",
                params![STATE_TITLE],
                |row| row.get(0),
            )
            .optional()?;

        let data = match data {
            Some(d) if !d.trim().is_empty() => d,
            _ => return Ok(None),
        };

        match serde_json::from_str::<Option<AppSnapshot>>(&data) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(error = %e, "状态 JSON 无法解析，按无状态处理");
                Ok(None)
            }
        }
    }

    /// 整体覆盖写入状态（不合并）
    pub fn write_state(&self, snapshot: &AppSnapshot) -> RepositoryResult<()> {
        let json = serde_json::to_string(snapshot)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO workback_state (title, data_json, last_saved_utc)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(title) DO UPDATE SET
                data_json = excluded.data_json,
                last_saved_utc = excluded.last_saved_utc
            "#,
            params![STATE_TITLE, json, now],
        )?;
        info!(projects = snapshot.projects.len(), bytes = json.len(), "状态已保存");
        Ok(())
    }

    /// 最近一次保存时间
    pub fn last_saved_utc(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let v = conn
            .query_row(
                "SELECT last_saved_utc FROM workback_state WHERE title = ?1",
                params![STATE_TITLE],
                |row| row.get(0),
            )
            .optional()?;
        Ok(v)
    }

    // ==========================================
    // 备份
    // ==========================================

    /// 追加一条备份，返回 backup_id
    pub fn append_backup(&self, snapshot: &AppSnapshot, title: &str) -> RepositoryResult<i64> {
        let json = serde_json::to_string(snapshot)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO workback_backup (title, data_json, created_utc) VALUES (?1, ?2, ?3)",
            params![title, json, now],
        )?;
        let id = conn.last_insert_rowid();
        info!(backup_id = id, title = %title, "备份已写入");
        Ok(id)
    }

    /// 列出全部备份（按写入顺序）
    pub fn list_backups(&self) -> RepositoryResult<Vec<BackupRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT backup_id, title, data_json, created_utc
            FROM workback_backup
            ORDER BY backup_id ASC
            "#,
        )?;
        let rows = stmt.query_map([], map_backup_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// 最新一条备份
    pub fn latest_backup(&self) -> RepositoryResult<Option<BackupRecord>> {
        let conn = self.get_conn()?;
        let v = conn
            .query_row(
                r#"
                SELECT backup_id, title, data_json, created_utc
                FROM workback_backup
                ORDER BY backup_id DESC
                LIMIT 1
                "#,
                [],
                map_backup_row,
            )
            .optional()?;
        Ok(v)
    }
}

fn map_backup_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BackupRecord> {
    Ok(BackupRecord {
        backup_id: row.get(0)?,
        title: row.get(1)?,
        data_json: row.get(2)?,
        created_utc: row.get(3)?,
    })
}
