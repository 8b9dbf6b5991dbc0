// ==========================================
// 设计出图进度跟踪 - 行勾选补丁
// ==========================================
// 只允许修改四个勾选字段: completed / notRequired / statusADone / firstIssueDone
// 含任何其他字段的补丁整体拒绝
// ==========================================

use crate::domain::lenient::truthy;
use crate::domain::project::Row;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// 允许出现在补丁中的字段
pub const ALLOWED_PATCH_FIELDS: [&str; 4] =
    ["completed", "notRequired", "statusADone", "firstIssueDone"];

/// 补丁校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("补丁必须是 JSON 对象")]
    NotAnObject,

    #[error("补丁为空")]
    Empty,

    #[error("补丁包含不允许的字段: {}", fields.join(", "))]
    InvalidFields { fields: Vec<String> },
}

/// 已校验的勾选补丁
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFlagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_required: Option<bool>,
    #[serde(rename = "statusADone", skip_serializing_if = "Option::is_none")]
    pub status_a_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_issue_done: Option<bool>,
}

impl RowFlagPatch {
    /// 从 JSON 对象解析补丁
    ///
    /// 取值按真值转换；字段名区分大小写
    pub fn from_json(value: &Value) -> Result<Self, PatchError> {
        let map = value.as_object().ok_or(PatchError::NotAnObject)?;
        if map.is_empty() {
            return Err(PatchError::Empty);
        }

        let mut invalid: Vec<String> = map
            .keys()
            .filter(|k| !ALLOWED_PATCH_FIELDS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            invalid.sort();
            return Err(PatchError::InvalidFields { fields: invalid });
        }

        let flag = |key: &str| map.get(key).map(truthy);
        Ok(Self {
            completed: flag("completed"),
            not_required: flag("notRequired"),
            status_a_done: flag("statusADone"),
            first_issue_done: flag("firstIssueDone"),
        })
    }

    /// 应用到行
    ///
    /// 先写入所有给定字段，若结果为 notRequired 则清除其他勾选
    pub fn apply_to(&self, row: &mut Row) {
        if let Some(v) = self.completed {
            row.completed = v;
        }
        if let Some(v) = self.status_a_done {
            row.status_a_done = v;
        }
        if let Some(v) = self.first_issue_done {
            row.first_issue_done = v;
        }
        if let Some(v) = self.not_required {
            row.not_required = v;
        }
        row.enforce_not_required();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RowKind;
    use serde_json::json;

    #[test]
    fn test_rejects_foreign_field_even_with_allowed_ones() {
        let err = RowFlagPatch::from_json(&json!({ "completed": true, "item": "x" })).unwrap_err();
        assert_eq!(err, PatchError::InvalidFields { fields: vec!["item".to_string()] });
        assert!(err.to_string().contains("item"));
    }

    #[test]
    fn test_rejects_empty_and_non_object() {
        assert_eq!(RowFlagPatch::from_json(&json!({})).unwrap_err(), PatchError::Empty);
        assert_eq!(RowFlagPatch::from_json(&json!([true])).unwrap_err(), PatchError::NotAnObject);
    }

    #[test]
    fn test_apply_not_required_wins() {
        let mut row = Row::new(RowKind::Item);
        let patch = RowFlagPatch::from_json(&json!({ "completed": true, "notRequired": 1 })).unwrap();
        patch.apply_to(&mut row);
        assert!(row.not_required);
        assert!(!row.completed);
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut row = Row::new(RowKind::Item);
        row.first_issue_done = true;
        let patch = RowFlagPatch::from_json(&json!({ "statusADone": "yes" })).unwrap();
        patch.apply_to(&mut row);
        assert!(row.status_a_done);
        assert!(row.first_issue_done);
        assert!(!row.completed);
    }
}
