// ==========================================
// 设计出图进度跟踪 - 整体状态 API
// ==========================================
// 职责: 启动加载（bootstrap）、整体保存、单行勾选
// 权限: 保存需 editor/admin/owner；勾选按页面生效角色，需 tickonly 及以上
// 写入: 后写者生效，无版本校验；写入前按总进度同步责任页与生成行
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::permission_api::{PermissionCache, PermissionService};
use crate::domain::project::Row;
use crate::domain::row_patch::RowFlagPatch;
use crate::domain::snapshot::AppSnapshot;
use crate::domain::types::Role;
use crate::domain::user::UserContext;
use crate::engine::generation::{regenerate_project_rows, sync_responsibility_pages};
use crate::engine::hydrate::hydrate_snapshot;
use crate::repository::state_repo::StateRepository;

// ==========================================
// 响应结构
// ==========================================

/// 当前用户 + 解析后的全局角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeInfo {
    #[serde(flatten)]
    pub user: UserContext,
    pub role: Role,
}

/// 启动加载响应: 快照字段平铺 + me + rolesByPageId
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    #[serde(flatten)]
    pub snapshot: AppSnapshot,
    pub me: MeInfo,
    pub roles_by_page_id: HashMap<String, Role>,
}

/// 勾选结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    pub project_id: String,
    pub page_id: String,
    pub row: Row,
}

// ==========================================
// StateApi - 整体状态 API
// ==========================================

/// 整体状态API
///
/// 职责：
/// 1. 启动加载（状态 + 当前用户权限）
/// 2. 整体保存（规范化后覆盖写入）
/// 3. 单行勾选（仅四个勾选字段）
pub struct StateApi {
    state_repo: Arc<StateRepository>,
    permission_service: Arc<PermissionService>,
}

impl StateApi {
    pub fn new(state_repo: Arc<StateRepository>, permission_service: Arc<PermissionService>) -> Self {
        Self {
            state_repo,
            permission_service,
        }
    }

    /// 启动加载
    ///
    /// # 参数
    /// - user: 当前用户
    /// - cache: 权限缓存
    ///
    /// # 返回
    /// - 已有状态: 原样返回
    /// - 尚无状态: 空项目列表 + landing 视图 + 默认筛选
    pub fn bootstrap(
        &self,
        user: &UserContext,
        cache: &mut PermissionCache,
    ) -> ApiResult<BootstrapResponse> {
        let perms = self.permission_service.resolve(user, cache)?;
        let snapshot = self.state_repo.read_state()?.unwrap_or_default();

        Ok(BootstrapResponse {
            snapshot,
            me: MeInfo {
                user: user.clone(),
                role: perms.role,
            },
            roles_by_page_id: perms.roles_by_page_id,
        })
    }

    /// 整体保存
    ///
    /// # 参数
    /// - user: 当前用户
    /// - cache: 权限缓存
    /// - snapshot: 客户端提交的完整状态
    ///
    /// # 返回
    /// - Ok(()): 已写入（先规范化，再同步责任页并重建生成行）
    /// - Err(ApiError::Forbidden): 全局角色不足 editor
    pub fn save(
        &self,
        user: &UserContext,
        cache: &mut PermissionCache,
        snapshot: AppSnapshot,
    ) -> ApiResult<()> {
        let perms = self.permission_service.resolve(user, cache)?;
        if !perms.role.can_write_state() {
            warn!(user = %user.email, role = %perms.role, "保存被拒绝: 权限不足");
            return Err(ApiError::Forbidden { role: perms.role });
        }

        let mut snapshot = hydrate_snapshot(snapshot);
        for project in snapshot.projects.iter_mut() {
            sync_responsibility_pages(project);
            regenerate_project_rows(project);
        }
        self.state_repo.write_state(&snapshot)?;
        info!(user = %user.email, projects = snapshot.projects.len(), "整体状态已保存");
        Ok(())
    }

    /// 单行勾选
    ///
    /// 顺序: 校验补丁 → 读取状态 → 定位行 → 页面角色校验 → 应用 → 写回
    ///
    /// # 参数
    /// - user: 当前用户
    /// - cache: 权限缓存
    /// - row_id: 行ID
    /// - patch: JSON 补丁，仅允许 completed / notRequired / statusADone / firstIssueDone
    ///
    /// # 返回
    /// - Ok(TickOutcome): 更新后的行及其所在项目/页面
    /// - Err(ApiError::InvalidPatch): 补丁为空或含其他字段
    /// - Err(ApiError::RowNotFound): 尚无状态或找不到该行
    /// - Err(ApiError::Forbidden): 页面生效角色不足 tickonly
    pub fn tick_row(
        &self,
        user: &UserContext,
        cache: &mut PermissionCache,
        row_id: &str,
        patch: &Value,
    ) -> ApiResult<TickOutcome> {
        let patch = RowFlagPatch::from_json(patch).map_err(|e| {
            warn!(row_id = %row_id, error = %e, "勾选被拒绝: 补丁无效");
            ApiError::from(e)
        })?;

        let mut snapshot = self
            .state_repo
            .read_state()?
            .ok_or_else(|| ApiError::RowNotFound(row_id.to_string()))?;

        let perms = self.permission_service.resolve(user, cache)?;

        let outcome = {
            let location = snapshot
                .find_row_mut(row_id)
                .ok_or_else(|| ApiError::RowNotFound(row_id.to_string()))?;

            let role = perms.role_for_page(&location.page_id);
            if !role.can_tick() {
                warn!(row_id = %row_id, page_id = %location.page_id, role = %role, "勾选被拒绝: 权限不足");
                return Err(ApiError::Forbidden { role });
            }

            patch.apply_to(location.row);
            TickOutcome {
                project_id: location.project_id,
                page_id: location.page_id,
                row: location.row.clone(),
            }
        };

        self.state_repo.write_state(&snapshot)?;
        info!(row_id = %row_id, page_id = %outcome.page_id, "行勾选已写入");
        Ok(outcome)
    }
}
