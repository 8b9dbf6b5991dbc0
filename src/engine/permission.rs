// ==========================================
// 设计出图进度跟踪 - 权限解析
// ==========================================
// 匹配: 对象ID 相同（均非空）或 邮箱相同（均非空），大小写不敏感
// 页面覆盖: 记录带 pageId 时写入 rolesByPageId（后出现者覆盖）
// 全局角色: 所有命中记录中等级最高者（严格大于才替换）
// ==========================================

use crate::domain::types::Role;
use crate::domain::user::{PermissionRecord, UserContext, UserPermissions};
use std::collections::HashMap;

/// 判断记录是否属于该用户
pub fn record_matches(record: &PermissionRecord, user: &UserContext) -> bool {
    let email = user.email.trim().to_lowercase();
    let oid = user.oid.trim().to_lowercase();
    let r_email = record.user_email.trim().to_lowercase();
    let r_oid = record.user_object_id.trim().to_lowercase();

    (!oid.is_empty() && r_oid == oid) || (!email.is_empty() && r_email == email)
}

/// 由权限记录解析用户权限
///
/// 未登录用户直接返回 viewer
pub fn resolve_permissions(records: &[PermissionRecord], user: &UserContext) -> UserPermissions {
    if !user.authenticated {
        return UserPermissions::viewer();
    }

    let mut roles_by_page_id: HashMap<String, Role> = HashMap::new();
    let mut strongest = Role::Viewer;

    for record in records.iter().filter(|r| record_matches(r, user)) {
        let role = Role::from_str(&record.role);
        let page_id = record.page_id.trim();
        if !page_id.is_empty() {
            roles_by_page_id.insert(page_id.to_string(), role);
        }
        if role.rank() > strongest.rank() {
            strongest = role;
        }
    }

    UserPermissions {
        role: strongest,
        roles_by_page_id,
    }
}
