// ==========================================
// 设计出图进度跟踪 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 每个错误带机器可读的 error_code 与建议的 HTTP 状态码（由宿主使用）
// ==========================================

use crate::domain::row_patch::PatchError;
use crate::domain::types::Role;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    /// 行补丁校验失败（字段为空或含不允许字段）
    #[error("无效的行补丁: {0}")]
    InvalidPatch(#[from] PatchError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 行不存在
    #[error("行不存在: row_id={0}")]
    RowNotFound(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 权限错误
    // ==========================================
    #[error("权限不足: role={role}")]
    Forbidden { role: Role },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 配置 / 导出错误
    // ==========================================
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 机器可读错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidPatch(_) => "invalid_patch",
            ApiError::InvalidInput(_) | ApiError::ValidationError(_) => "invalid_input",
            ApiError::RowNotFound(_) => "row_not_found",
            ApiError::NotFound(_) => "not_found",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::DatabaseError(_) | ApiError::DatabaseConnectionError(_) => "database_error",
            ApiError::ConfigError(_) => "config_error",
            ApiError::ExportError(_) => "export_failed",
            ApiError::InternalError(_) | ApiError::Other(_) => "internal_error",
        }
    }

    /// 建议的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::InvalidPatch(_) | ApiError::InvalidInput(_) | ApiError::ValidationError(_) => 400,
            ApiError::Forbidden { .. } => 403,
            ApiError::RowNotFound(_) | ApiError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::Busy(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库繁忙，请稍后重试: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_error_maps_to_400() {
        let err: ApiError = PatchError::InvalidFields {
            fields: vec!["item".to_string()],
        }
        .into();
        assert_eq!(err.error_code(), "invalid_patch");
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("item"));
    }

    #[test]
    fn test_forbidden_carries_role() {
        let err = ApiError::Forbidden { role: Role::TickOnly };
        assert_eq!(err.http_status(), 403);
        assert!(err.to_string().contains("tickonly"));
    }

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Backup".to_string(),
            id: "7".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Backup"));
                assert!(msg.contains("7"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(api_err.error_code(), "database_error");
    }
}
