// ==========================================
// 设计出图进度跟踪 - 项目树领域模型
// ==========================================
// 结构: Project → (Block/Zone → Level) 总进度
//                → Responsibility (责任方/供应商)
//                → Page → Row (跟踪事项)
// 红线: notRequired=true 时 completed/statusADone/firstIssueDone 必须为 false
// ==========================================

use crate::domain::lenient::{bool_lenient, days_lenient, opt_string_lenient, string_lenient};
use crate::domain::types::{AnchorKey, RowKind};
use serde::{Deserialize, Serialize};

/// 生成新的实体ID
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 默认总进度首页名称
pub const MASTER_PAGE_NAME: &str = "Project Home";

/// 历史版本的总进度页名称（加载时迁移）
pub const LEGACY_MASTER_PAGE_NAME: &str = "Master";

// ==========================================
// Level - 楼层
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub start_date: String, // ISO 日期，可能为空或非法
    #[serde(default, deserialize_with = "string_lenient")]
    pub finish_date: String, // ISO 日期，可能为空或非法
}

impl Level {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            start_date: String::new(),
            finish_date: String::new(),
        }
    }
}

// ==========================================
// BlockZone - 区块/分区 (总进度的一行)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockZone {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub block_zone: String, // 自由文本标签
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl BlockZone {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            block_zone: String::new(),
            levels: vec![Level::new("Level 1")],
        }
    }
}

impl Default for BlockZone {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Responsibility - 责任方
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsibility {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub supplier: String,
}

impl Responsibility {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            supplier: String::new(),
        }
    }
}

impl Default for Responsibility {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// RowMeta - 行的生成信息
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMeta {
    #[serde(default, deserialize_with = "bool_lenient")]
    pub generated: bool, // 是否由总进度自动生成
    #[serde(default, deserialize_with = "string_lenient")]
    pub block_zone: String,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub level_id: Option<String>,
    #[serde(default, deserialize_with = "string_lenient")]
    pub level_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub finish_date: String,
}

// ==========================================
// Row - 跟踪事项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default)]
    pub kind: RowKind,
    #[serde(default, deserialize_with = "string_lenient")]
    pub item: String, // 标题
    #[serde(default)]
    pub anchor_key: AnchorKey,
    #[serde(rename = "anchorDateISO", default, deserialize_with = "string_lenient")]
    pub anchor_date_iso: String,
    #[serde(default, deserialize_with = "days_lenient")]
    pub override_days_req_to_status_a: Option<f64>,
    #[serde(default, deserialize_with = "days_lenient")]
    pub override_days_status_a_to_first_issue: Option<f64>,

    // ===== 勾选标志 =====
    #[serde(default, deserialize_with = "bool_lenient")]
    pub completed: bool,
    #[serde(default, deserialize_with = "bool_lenient")]
    pub not_required: bool,
    #[serde(rename = "statusADone", default, deserialize_with = "bool_lenient")]
    pub status_a_done: bool,
    #[serde(default, deserialize_with = "bool_lenient")]
    pub first_issue_done: bool,

    #[serde(default)]
    pub meta: RowMeta,
}

impl Row {
    /// 新建空行
    pub fn new(kind: RowKind) -> Self {
        Self {
            id: new_id(),
            kind,
            item: String::new(),
            anchor_key: AnchorKey::RequiredOnSite,
            anchor_date_iso: String::new(),
            override_days_req_to_status_a: None,
            override_days_status_a_to_first_issue: None,
            completed: false,
            not_required: false,
            status_a_done: false,
            first_issue_done: false,
            meta: RowMeta::default(),
        }
    }

    pub fn is_header(&self) -> bool {
        self.kind == RowKind::Header
    }

    /// 设置"不需要"标志
    ///
    /// 置为 true 时同时清除其他三个勾选；其他转换没有副作用
    pub fn set_not_required(&mut self, value: bool) {
        self.not_required = value;
        self.enforce_not_required();
    }

    /// 保证 notRequired 不变量
    pub fn enforce_not_required(&mut self) {
        if self.not_required {
            self.completed = false;
            self.status_a_done = false;
            self.first_issue_done = false;
        }
    }
}

// ==========================================
// PageMeta / Page - 责任页
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default, deserialize_with = "bool_lenient")]
    pub generated: bool, // 由责任方自动生成
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub responsibility_id: Option<String>,
    #[serde(default, deserialize_with = "bool_lenient")]
    pub is_master: bool, // 总进度首页
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub meta: PageMeta,
}

impl Page {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            rows: Vec::new(),
            meta: PageMeta::default(),
        }
    }

    /// 总进度首页
    pub fn new_master() -> Self {
        let mut page = Self::new(MASTER_PAGE_NAME);
        page.meta.is_master = true;
        page
    }

    /// 由责任方生成的页面
    pub fn for_responsibility(responsibility: &Responsibility, name: &str) -> Self {
        let mut page = Self::new(name);
        page.meta.generated = true;
        page.meta.responsibility_id = Some(responsibility.id.clone());
        page
    }

    pub fn is_master(&self) -> bool {
        self.meta.is_master
    }
}

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default)]
    pub master: Vec<BlockZone>,
    #[serde(default)]
    pub responsibilities: Vec<Responsibility>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Project {
    /// 新建项目：一个空区块、一个空责任方、一个总进度首页
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            master: vec![BlockZone::new()],
            responsibilities: vec![Responsibility::new()],
            pages: vec![Page::new_master()],
        }
    }

    pub fn master_page(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.is_master())
    }

    /// 责任方ID → 供应商
    pub fn supplier_for(&self, responsibility_id: Option<&str>) -> String {
        responsibility_id
            .and_then(|rid| self.responsibilities.iter().find(|r| r.id == rid))
            .map(|r| r.supplier.clone())
            .unwrap_or_default()
    }
}
