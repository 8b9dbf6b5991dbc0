// ==========================================
// BackupApi 集成测试
// ==========================================


use test_helpers::*;
use workback_tracker::config::config_keys;
use workback_tracker::repository::StateRepository;

#[test]
fn test_backup_skipped_without_state() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let result = app.backup_api.run_weekly_backup("2024-06-02").unwrap();
    assert_eq!(result, None);
    assert!(app.backup_api.list_backups().unwrap().is_empty());
}

#[test]
fn test_backup_appends_dated_copy() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let (snapshot, ids) = sample_snapshot();
    let repo = StateRepository::new(&app.db_path).unwrap();
    repo.write_state(&snapshot).unwrap();

    let title = app.backup_api.run_weekly_backup("2024-06-02").unwrap();
    assert_eq!(title.as_deref(), Some("backup-2024-06-02"));

    // 备份为追加写入，同一天重复执行也会新增一条
    app.backup_api.run_weekly_backup("2024-06-02").unwrap();
    app.backup_api.run_weekly_backup("2024-06-09").unwrap();

    let backups = app.backup_api.list_backups().unwrap();
    assert_eq!(backups.len(), 3);
    assert_eq!(backups[2].title, "backup-2024-06-09");

    let restored = backups[0].snapshot().unwrap();
    assert_eq!(restored.projects[0].id, ids.project_id);
    assert_eq!(restored.projects[0].pages.len(), snapshot.projects[0].pages.len());
}

#[test]
fn test_backup_prefix_from_config() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let (snapshot, _) = sample_snapshot();
    StateRepository::new(&app.db_path)
        .unwrap()
        .write_state(&snapshot)
        .unwrap();
    app.config_manager
        .set_global_config_value(config_keys::BACKUP_TITLE_PREFIX, "weekly-")
        .unwrap();

    let title = app.backup_api.run_weekly_backup("2024-06-02").unwrap();
    assert_eq!(title.as_deref(), Some("weekly-2024-06-02"));
}
