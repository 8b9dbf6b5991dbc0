// ==========================================
// 设计出图进度跟踪 - 用户与权限模型
// ==========================================
// 用户身份由宿主环境解析后传入（不在本库解析请求头）
// 权限记录: 用户(邮箱/对象ID) × 页面 × 角色
// ==========================================

use crate::domain::types::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// UserContext - 当前用户
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub authenticated: bool,
    pub name: String,
    pub email: String,
    pub oid: String, // Entra 对象ID
    pub roles: Vec<String>,
}

impl UserContext {
    /// 匿名用户
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 以邮箱标识的已登录用户（对象ID同邮箱，便于本地调试）
    pub fn with_email(email: &str) -> Self {
        Self {
            authenticated: true,
            name: email.to_string(),
            email: email.to_string(),
            oid: email.to_string(),
            roles: vec!["authenticated".to_string()],
        }
    }

    /// 缓存键（小写对象ID优先，其次邮箱）
    pub fn cache_key(&self) -> String {
        format!(
            "{}::{}",
            self.oid.trim().to_lowercase(),
            self.email.trim().to_lowercase()
        )
    }
}

// ==========================================
// PermissionRecord - 权限记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    pub user_email: String,
    pub user_object_id: String,
    pub page_id: String, // 为空表示仅参与全局角色计算
    pub role: String,    // 原始角色文本，解析时大小写不敏感
}

// ==========================================
// UserPermissions - 解析后的权限
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
    pub role: Role,                              // 最强角色
    pub roles_by_page_id: HashMap<String, Role>, // 页面级覆盖
}

impl UserPermissions {
    /// 无权限（viewer，无覆盖）
    pub fn viewer() -> Self {
        Self::default()
    }

    /// 页面的生效角色: 页面覆盖优先，否则取全局角色
    pub fn role_for_page(&self, page_id: &str) -> Role {
        self.roles_by_page_id
            .get(page_id)
            .copied()
            .unwrap_or(self.role)
    }
}
