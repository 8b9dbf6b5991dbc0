// ==========================================
// 设计出图进度跟踪 - 加载规范化
// ==========================================
// 对持久化读出的项目树做补齐与迁移:
// - 空列表 → 默认项目 "Project 1"
// - 缺失的 id 补齐，空名称补默认值
// - 空总进度 / 空责任方 → 各补一个默认项
// - 无总进度首页 → 在最前插入 "Project Home"
// - 旧名称 "Master" 的总进度页 → 改名 "Project Home"
// - 所有行强制 notRequired 不变量
// ==========================================

use crate::domain::project::{
    new_id, BlockZone, Level, Page, Project, Responsibility, LEGACY_MASTER_PAGE_NAME,
    MASTER_PAGE_NAME,
};
use crate::domain::snapshot::AppSnapshot;
use crate::engine::generation::level_display_name;
use tracing::{debug, instrument};

/// 默认项目名称（无任何项目时）
pub const DEFAULT_PROJECT_NAME: &str = "Project 1";
const UNTITLED_PROJECT: &str = "Untitled Project";
const UNTITLED_PAGE: &str = "Untitled Page";

fn fill_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = new_id();
    }
}

/// 规范化项目列表
#[instrument(skip(projects), fields(count = projects.len()))]
pub fn hydrate_projects(projects: Vec<Project>) -> Vec<Project> {
    if projects.is_empty() {
        debug!("无项目，创建默认项目");
        return vec![Project::new(DEFAULT_PROJECT_NAME)];
    }
    projects.into_iter().map(hydrate_project).collect()
}

/// 规范化单个项目
pub fn hydrate_project(mut project: Project) -> Project {
    fill_id(&mut project.id);
    if project.name.is_empty() {
        project.name = UNTITLED_PROJECT.to_string();
    }

    if project.master.is_empty() {
        project.master.push(BlockZone::new());
    }
    for bz in project.master.iter_mut() {
        fill_id(&mut bz.id);
        if bz.levels.is_empty() {
            bz.levels.push(Level::new("Level 1"));
        }
        for (idx, level) in bz.levels.iter_mut().enumerate() {
            fill_id(&mut level.id);
            if level.name.is_empty() {
                level.name = level_display_name("", idx);
            }
        }
    }

    if project.responsibilities.is_empty() {
        project.responsibilities.push(Responsibility::new());
    }
    for resp in project.responsibilities.iter_mut() {
        fill_id(&mut resp.id);
    }

    for page in project.pages.iter_mut() {
        fill_id(&mut page.id);
        if page.name.is_empty() {
            page.name = UNTITLED_PAGE.to_string();
        }
        if page.meta.is_master && page.name == LEGACY_MASTER_PAGE_NAME {
            page.name = MASTER_PAGE_NAME.to_string();
        }
        for row in page.rows.iter_mut() {
            fill_id(&mut row.id);
            row.enforce_not_required();
        }
    }

    if !project.pages.iter().any(|p| p.is_master()) {
        project.pages.insert(0, Page::new_master());
    }

    project
}

/// 规范化整个快照（项目树 + 行不变量）
pub fn hydrate_snapshot(mut snapshot: AppSnapshot) -> AppSnapshot {
    let projects = std::mem::take(&mut snapshot.projects);
    snapshot.projects = hydrate_projects(projects);
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RowKind;
    use serde_json::json;

    #[test]
    fn test_empty_input_creates_default_project() {
        let projects = hydrate_projects(Vec::new());
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, DEFAULT_PROJECT_NAME);
        assert!(projects[0].master_page().is_some());
    }

    #[test]
    fn test_hydrate_fills_defaults_and_migrates_master() {
        let raw = json!([{
            "name": "",
            "master": [{ "blockZone": "A", "levels": [{ "name": "" }, { "name": "L2" }] }],
            "responsibilities": [],
            "pages": [
                { "id": "pg1", "name": "Master", "meta": { "isMaster": true } },
                { "name": "", "rows": [
                    { "kind": "item", "completed": true, "notRequired": true }
                ] }
            ]
        }]);
        let projects: Vec<Project> = serde_json::from_value(raw).unwrap();
        let out = hydrate_projects(projects);
        let p = &out[0];

        assert!(!p.id.is_empty());
        assert_eq!(p.name, "Untitled Project");
        assert_eq!(p.master[0].levels[0].name, "Level 1");
        assert_eq!(p.master[0].levels[1].name, "L2");
        assert!(p.master[0].levels.iter().all(|l| !l.id.is_empty()));
        assert_eq!(p.responsibilities.len(), 1);

        assert_eq!(p.pages.len(), 2);
        assert_eq!(p.pages[0].name, MASTER_PAGE_NAME);
        assert_eq!(p.pages[1].name, "Untitled Page");
        let row = &p.pages[1].rows[0];
        assert_eq!(row.kind, RowKind::Item);
        assert!(row.not_required && !row.completed);
        assert!(!row.id.is_empty());
    }

    #[test]
    fn test_hydrate_inserts_master_page_first() {
        let mut project = Project::new("P");
        project.pages = vec![Page::new("Structure")];
        let out = hydrate_project(project);
        assert_eq!(out.pages.len(), 2);
        assert!(out.pages[0].is_master());
        assert_eq!(out.pages[1].name, "Structure");
    }

    #[test]
    fn test_non_master_page_named_master_is_kept() {
        let mut project = Project::new("P");
        project.pages.push(Page::new("Master"));
        let out = hydrate_project(project);
        assert_eq!(out.pages[1].name, "Master");
    }
}
