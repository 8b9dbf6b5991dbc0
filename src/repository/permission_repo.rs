// ==========================================
// 设计出图进度跟踪 - 权限记录仓储
// ==========================================
// 表: workback_permission
// 一条记录 = 用户(邮箱/对象ID) × 页面(可空) × 角色文本
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::user::PermissionRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct PermissionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PermissionRepository {
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增权限记录，返回 permission_id
    pub fn insert(&self, record: &PermissionRecord) -> RepositoryResult<i64> {
        if record.user_email.trim().is_empty() && record.user_object_id.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "权限记录必须包含邮箱或对象ID".to_string(),
            ));
        }
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO workback_permission (user_email, user_object_id, page_id, role)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.user_email,
                record.user_object_id,
                record.page_id,
                record.role,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(permission_id = id, page_id = %record.page_id, role = %record.role, "新增权限记录");
        Ok(id)
    }

    /// 全部权限记录（按写入顺序，页面覆盖以后写入者为准）
    pub fn list_all(&self) -> RepositoryResult<Vec<PermissionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT user_email, user_object_id, page_id, role
            FROM workback_permission
            ORDER BY permission_id ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PermissionRecord {
                user_email: row.get(0)?,
                user_object_id: row.get(1)?,
                page_id: row.get(2)?,
                role: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// 删除某页面的全部权限记录，返回删除条数
    pub fn delete_for_page(&self, page_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM workback_permission WHERE page_id = ?1",
            params![page_id],
        )?;
        Ok(n)
    }
}
