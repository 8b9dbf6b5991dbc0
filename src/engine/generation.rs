// ==========================================
// 设计出图进度跟踪 - 总进度生成引擎
// ==========================================
// 职责:
// - 由总进度 (Block/Zone × Level) 生成责任页的跟踪行
// - 总进度变化后重建责任页的生成行（保留手工行）
// - 按责任方同步生成页面
// 调用方: StateApi::save 在规范化之后执行同步与重建
// ==========================================
// 生成规则:
// - 标签为空或无楼层的 Block/Zone 跳过
// - 每个 Block/Zone: 1 个 header 行 + 每个楼层 1 个 item 行
// - item 标题: {页面}_{区块}_{楼层}，锚点 requiredOnSite = 楼层开始日期
// ==========================================

use crate::domain::project::{BlockZone, Page, Project, Row, RowMeta};
use crate::domain::types::{AnchorKey, RowKind};
use std::collections::HashMap;
use tracing::{debug, info};

/// 楼层显示名（空名按序号补齐）
pub fn level_display_name(name: &str, idx: usize) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("Level {}", idx + 1)
    } else {
        name.to_string()
    }
}

// ==========================================
// 生成行
// ==========================================

/// 由总进度生成一页的跟踪行（全新ID，未勾选）
pub fn build_generated_rows(page_name: &str, master: &[BlockZone]) -> Vec<Row> {
    let page = page_name.trim();
    let mut rows = Vec::new();

    for bz in master {
        let label = bz.block_zone.trim();
        if label.is_empty() || bz.levels.is_empty() {
            continue;
        }

        let mut header = Row::new(RowKind::Header);
        header.item = label.to_string();
        header.meta = RowMeta {
            generated: true,
            block_zone: label.to_string(),
            ..RowMeta::default()
        };
        rows.push(header);

        for (idx, level) in bz.levels.iter().enumerate() {
            let level_name = level_display_name(&level.name, idx);
            let mut row = Row::new(RowKind::Item);
            row.item = format!("{}_{}_{}", page, label, level_name);
            row.anchor_key = AnchorKey::RequiredOnSite;
            row.anchor_date_iso = level.start_date.clone();
            row.meta = RowMeta {
                generated: true,
                block_zone: label.to_string(),
                level_id: if level.id.is_empty() {
                    None
                } else {
                    Some(level.id.clone())
                },
                level_name,
                finish_date: level.finish_date.clone(),
            };
            rows.push(row);
        }
    }

    rows
}

/// 行签名: kind:item:blockZone:levelId:anchorDate:finishDate
fn row_signature(rows: &[Row]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "{}:{}:{}:{}:{}:{}",
                r.kind,
                r.item,
                r.meta.block_zone,
                r.meta.level_id.as_deref().unwrap_or(""),
                r.anchor_date_iso,
                r.meta.finish_date
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// 生成行的匹配键（跨重建保持身份）
fn generated_key(row: &Row) -> String {
    match (&row.kind, &row.meta.level_id) {
        (RowKind::Item, Some(level_id)) => format!("item:{}", level_id),
        (RowKind::Item, None) => format!("item::{}", row.item),
        (RowKind::Header, _) => format!("header:{}", row.meta.block_zone),
    }
}

/// 重建责任页的生成行
///
/// 结果顺序: 生成行在前，手工行按原顺序在后。
/// 仍然存在的生成行保留 id / 勾选 / 天数覆盖；失效的生成行被丢弃。
/// 总进度页或签名未变化时不做修改，返回 false。
pub fn regenerate_page_rows(page: &mut Page, master: &[BlockZone]) -> bool {
    if page.is_master() {
        return false;
    }

    let fresh = build_generated_rows(&page.name, master);
    let manual: Vec<Row> = page
        .rows
        .iter()
        .filter(|r| !r.meta.generated)
        .cloned()
        .collect();

    let mut existing: HashMap<String, &Row> = HashMap::new();
    for r in page.rows.iter().filter(|r| r.meta.generated) {
        existing.entry(generated_key(r)).or_insert(r);
    }

    let mut next: Vec<Row> = fresh
        .into_iter()
        .map(|mut row| {
            if let Some(old) = existing.get(&generated_key(&row)) {
                row.id = old.id.clone();
                row.completed = old.completed;
                row.not_required = old.not_required;
                row.status_a_done = old.status_a_done;
                row.first_issue_done = old.first_issue_done;
                row.override_days_req_to_status_a = old.override_days_req_to_status_a;
                row.override_days_status_a_to_first_issue =
                    old.override_days_status_a_to_first_issue;
                row.enforce_not_required();
            }
            row
        })
        .collect();
    next.extend(manual);

    if row_signature(&page.rows) == row_signature(&next) {
        return false;
    }

    debug!(
        page = %page.name,
        before = page.rows.len(),
        after = next.len(),
        "重建生成行"
    );
    page.rows = next;
    true
}

/// 对项目所有非总进度页重建生成行，返回发生变化的页数
pub fn regenerate_project_rows(project: &mut Project) -> usize {
    let master = project.master.clone();
    let changed = project
        .pages
        .iter_mut()
        .map(|page| regenerate_page_rows(page, &master))
        .filter(|changed| *changed)
        .count();
    if changed > 0 {
        info!(project = %project.name, changed, "总进度变化，已重建责任页");
    }
    changed
}

// ==========================================
// 按责任方同步页面
// ==========================================

/// 页面签名: M/G/U:id:name:responsibilityId
fn page_signature(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|p| {
            let tag = if p.meta.is_master {
                "M"
            } else if p.meta.generated {
                "G"
            } else {
                "U"
            };
            format!(
                "{}:{}:{}:{}",
                tag,
                p.id,
                p.name,
                p.meta.responsibility_id.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// 按责任方同步页面
///
/// 结果顺序: 总进度页 → 每个有名称的责任方一个生成页 → 用户页。
/// 责任方改名时页面同步改名；责任方删除后其生成页随之移除。
/// 返回是否有变化。
pub fn sync_responsibility_pages(project: &mut Project) -> bool {
    let existing = std::mem::take(&mut project.pages);

    let mut master_page: Option<Page> = None;
    let mut generated_by_resp: HashMap<String, Page> = HashMap::new();
    let mut user_pages: Vec<Page> = Vec::new();

    for page in existing.iter().cloned() {
        if page.meta.is_master {
            if master_page.is_none() {
                master_page = Some(page);
            }
        } else if page.meta.generated {
            if let Some(rid) = page.meta.responsibility_id.clone() {
                generated_by_resp.entry(rid).or_insert(page);
            }
        } else {
            user_pages.push(page);
        }
    }

    let mut next: Vec<Page> = Vec::with_capacity(existing.len());
    next.extend(master_page);

    for resp in &project.responsibilities {
        let name = resp.name.trim();
        if name.is_empty() {
            continue;
        }
        match generated_by_resp.remove(&resp.id) {
            Some(mut page) => {
                if page.name != name {
                    page.name = name.to_string();
                }
                next.push(page);
            }
            None => next.push(Page::for_responsibility(resp, name)),
        }
    }
    next.extend(user_pages);

    let changed = page_signature(&existing) != page_signature(&next);
    if changed {
        info!(
            project = %project.name,
            before = existing.len(),
            after = next.len(),
            "责任方页面已同步"
        );
    }
    project.pages = next;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::{Level, Responsibility};

    fn level(id: &str, name: &str, start: &str, finish: &str) -> Level {
        Level {
            id: id.to_string(),
            name: name.to_string(),
            start_date: start.to_string(),
            finish_date: finish.to_string(),
        }
    }

    fn block(label: &str, levels: Vec<Level>) -> BlockZone {
        BlockZone {
            id: format!("bz-{}", label),
            block_zone: label.to_string(),
            levels,
        }
    }

    fn sample_master() -> Vec<BlockZone> {
        vec![
            block(
                " Block A ",
                vec![
                    level("l1", "Ground", "2024-07-01", "2024-07-20"),
                    level("l2", "", "2024-08-01", ""),
                ],
            ),
            block("   ", vec![level("l3", "Roof", "2024-09-01", "")]),
            block("Block B", vec![]),
        ]
    }

    fn responsibility(id: &str, name: &str) -> Responsibility {
        Responsibility {
            id: id.to_string(),
            name: name.to_string(),
            supplier: String::new(),
        }
    }

    #[test]
    fn test_build_generated_rows() {
        let rows = build_generated_rows(" Structure ", &sample_master());
        assert_eq!(rows.len(), 3);

        assert!(rows[0].is_header());
        assert_eq!(rows[0].item, "Block A");
        assert!(rows[0].meta.generated);
        assert_eq!(rows[0].meta.level_id, None);

        assert_eq!(rows[1].item, "Structure_Block A_Ground");
        assert_eq!(rows[1].anchor_key, AnchorKey::RequiredOnSite);
        assert_eq!(rows[1].anchor_date_iso, "2024-07-01");
        assert_eq!(rows[1].meta.level_id.as_deref(), Some("l1"));
        assert_eq!(rows[1].meta.finish_date, "2024-07-20");

        assert_eq!(rows[2].item, "Structure_Block A_Level 2");
        assert_eq!(rows[2].meta.level_name, "Level 2");
    }

    #[test]
    fn test_regenerate_keeps_manual_rows_and_drops_stale() {
        let mut master = sample_master();
        let mut page = Page::new("Structure");
        let mut manual = Row::new(RowKind::Item);
        manual.item = "Manual".to_string();
        page.rows.push(manual);

        assert!(regenerate_page_rows(&mut page, &master));
        assert_eq!(page.rows.len(), 4);
        assert_eq!(page.rows[3].item, "Manual");

        // 删除楼层 l2 后重建
        master[0].levels.pop();
        assert!(regenerate_page_rows(&mut page, &master));
        let titles: Vec<&str> = page.rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(titles, vec!["Block A", "Structure_Block A_Ground", "Manual"]);
    }

    #[test]
    fn test_regenerate_preserves_surviving_row_state() {
        let mut master = sample_master();
        let mut page = Page::new("Structure");
        regenerate_page_rows(&mut page, &master);

        let ground_id = page.rows[1].id.clone();
        page.rows[1].status_a_done = true;
        page.rows[1].override_days_req_to_status_a = Some(5.0);

        master[0].levels[0].name = "Podium".to_string();
        assert!(regenerate_page_rows(&mut page, &master));
        assert_eq!(page.rows[1].item, "Structure_Block A_Podium");
        assert_eq!(page.rows[1].id, ground_id);
        assert!(page.rows[1].status_a_done);
        assert_eq!(page.rows[1].override_days_req_to_status_a, Some(5.0));
    }

    #[test]
    fn test_regenerate_follows_level_date_changes() {
        let mut master = sample_master();
        let mut page = Page::new("Structure");
        regenerate_page_rows(&mut page, &master);
        let ground_id = page.rows[1].id.clone();
        page.rows[1].completed = true;

        master[0].levels[0].start_date = "2024-09-01".to_string();
        assert!(regenerate_page_rows(&mut page, &master));
        assert_eq!(page.rows[1].anchor_date_iso, "2024-09-01");
        assert_eq!(page.rows[1].id, ground_id);
        assert!(page.rows[1].completed);

        master[0].levels[0].finish_date = "2024-09-30".to_string();
        assert!(regenerate_page_rows(&mut page, &master));
        assert_eq!(page.rows[1].meta.finish_date, "2024-09-30");
        assert!(!regenerate_page_rows(&mut page, &master));
    }

    #[test]
    fn test_regenerate_noop_when_unchanged_or_master() {
        let master = sample_master();
        let mut page = Page::new("Structure");
        assert!(regenerate_page_rows(&mut page, &master));
        assert!(!regenerate_page_rows(&mut page, &master));

        let mut home = Page::new_master();
        assert!(!regenerate_page_rows(&mut home, &master));
        assert!(home.rows.is_empty());
    }

    #[test]
    fn test_sync_responsibility_pages() {
        let mut project = Project::new("Tower");
        project.responsibilities = vec![
            responsibility("r1", "Structure"),
            responsibility("r2", "  "),
            responsibility("r3", "MEP"),
        ];
        project.pages.push(Page::new("Notes"));

        assert!(sync_responsibility_pages(&mut project));
        let names: Vec<&str> = project.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Project Home", "Structure", "MEP", "Notes"]);
        let structure_id = project.pages[1].id.clone();

        // 改名 + 删除
        project.responsibilities = vec![responsibility("r1", "Frame")];
        assert!(sync_responsibility_pages(&mut project));
        let names: Vec<&str> = project.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Project Home", "Frame", "Notes"]);
        assert_eq!(project.pages[1].id, structure_id);

        assert!(!sync_responsibility_pages(&mut project));
    }

    #[test]
    fn test_regenerate_project_rows() {
        let mut project = Project::new("Tower");
        project.master = sample_master();
        project.responsibilities = vec![responsibility("r1", "Structure")];
        sync_responsibility_pages(&mut project);

        assert_eq!(regenerate_project_rows(&mut project), 1);
        assert!(project.pages[0].rows.is_empty());
        assert_eq!(project.pages[1].rows.len(), 3);
        assert_eq!(regenerate_project_rows(&mut project), 0);
    }
}
