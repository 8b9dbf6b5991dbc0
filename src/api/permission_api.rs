// ==========================================
// 设计出图进度跟踪 - 权限解析 API
// ==========================================
// 职责: 按当前用户读取权限记录并解析为全局角色 + 页面覆盖
// 缓存: 由调用方持有的 ExpiringCache，按 oid/邮箱 缓存
// ==========================================

use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiResult;
use crate::domain::user::{PermissionRecord, UserContext, UserPermissions};
use crate::engine::permission::resolve_permissions;
use crate::repository::cache::ExpiringCache;
use crate::repository::permission_repo::PermissionRepository;

/// 权限缓存类型
pub type PermissionCache = ExpiringCache<String, UserPermissions>;

// ==========================================
// PermissionService - 权限解析服务
// ==========================================
pub struct PermissionService {
    permission_repo: Arc<PermissionRepository>,
}

impl PermissionService {
    pub fn new(permission_repo: Arc<PermissionRepository>) -> Self {
        Self { permission_repo }
    }

    /// 解析当前用户的权限
    ///
    /// # 参数
    /// - user: 当前用户
    /// - cache: 调用方持有的权限缓存
    ///
    /// # 返回
    /// - 未登录用户: viewer，无页面覆盖（不查库、不写缓存）
    /// - 已登录用户: 缓存命中直接返回，否则读库解析并写入缓存
    pub fn resolve(
        &self,
        user: &UserContext,
        cache: &mut PermissionCache,
    ) -> ApiResult<UserPermissions> {
        if !user.authenticated {
            return Ok(UserPermissions::viewer());
        }

        let key = user.cache_key();
        if let Some(hit) = cache.get(&key) {
            debug!(key = %key, "权限缓存命中");
            return Ok(hit);
        }

        let records = self.permission_repo.list_all()?;
        let perms = resolve_permissions(&records, user);
        debug!(
            key = %key,
            role = %perms.role,
            overrides = perms.roles_by_page_id.len(),
            "权限已解析"
        );
        cache.insert(key, perms.clone());
        Ok(perms)
    }

    /// 新增权限记录
    ///
    /// 写入后缓存中的旧结果仍会保留到过期，需要立即生效时由调用方清理缓存
    pub fn grant(&self, record: &PermissionRecord) -> ApiResult<i64> {
        Ok(self.permission_repo.insert(record)?)
    }

    /// 全部权限记录
    pub fn list_records(&self) -> ApiResult<Vec<PermissionRecord>> {
        Ok(self.permission_repo.list_all()?)
    }
}
