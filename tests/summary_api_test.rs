// ==========================================
// SummaryApi 集成测试
// ==========================================
// 测试范围:
// 1. 汇总查询: 排序、筛选、排除项
// 2. 配置联动: 全局天数、黄灯窗口
// 3. CSV 导出 / 供应商选项 / 总进度视图 / 聊天上下文
// ==========================================


use test_helpers::*;
use workback_tracker::api::ApiError;
use workback_tracker::config::config_keys;
use workback_tracker::domain::{Level, StatusFilter, SummaryStatus, TrafficStatus};
use workback_tracker::engine::chat_context::ChatMessage;
use workback_tracker::engine::SummaryFilter;
use workback_tracker::repository::StateRepository;

fn write_sample(db_path: &str) -> SampleIds {
    let (snapshot, ids) = sample_snapshot();
    StateRepository::new(db_path)
        .unwrap()
        .write_state(&snapshot)
        .unwrap();
    ids
}

#[test]
fn test_summary_without_state_is_empty() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let entries = app.summary_api.summary(&SummaryFilter::all(), TODAY).unwrap();
    assert!(entries.is_empty());
    assert!(app.summary_api.supplier_options().unwrap().is_empty());
}

#[test]
fn test_summary_sorted_and_excludes_headers_and_not_required() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let ids = write_sample(&app.db_path);

    let entries = app.summary_api.summary(&SummaryFilter::all(), TODAY).unwrap();
    let statuses: Vec<SummaryStatus> = entries.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![SummaryStatus::Overdue, SummaryStatus::Ongoing, SummaryStatus::Done]
    );
    assert!(entries.iter().all(|e| e.row_id != ids.not_required_row));
    assert!(entries.iter().all(|e| e.title != "Podium"));

    let overdue = &entries[0];
    assert_eq!(overdue.row_id, ids.overdue_row);
    assert_eq!(overdue.supplier, "Acme");
    assert_eq!(overdue.page_name, "Structure");
    assert_eq!(overdue.required_on_site, "2024-06-03");
    assert_eq!(overdue.status_a, "2024-05-20");
    assert_eq!(overdue.first_issue, "2024-04-22");
    assert_eq!(overdue.traffic, TrafficStatus::Red);
    assert!(overdue.overdue.overdue_a);
    assert!(overdue.overdue.overdue_f);
    assert!(!overdue.overdue.overdue_req);

    assert_eq!(entries[1].traffic, TrafficStatus::Green);
    assert_eq!(entries[2].traffic, TrafficStatus::Green);
}

#[test]
fn test_summary_filters() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let ids = write_sample(&app.db_path);

    let ongoing = app
        .summary_api
        .summary(&SummaryFilter::parse("ongoing", "all", "all"), TODAY)
        .unwrap();
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0].row_id, ids.ongoing_row);

    let by_project = app
        .summary_api
        .summary(&SummaryFilter::parse("all", &ids.project_id, "Acme"), TODAY)
        .unwrap();
    assert_eq!(by_project.len(), 3);

    let other_supplier = app
        .summary_api
        .summary(&SummaryFilter::parse("all", "all", "Other Co"), TODAY)
        .unwrap();
    assert!(other_supplier.is_empty());

    // 快照默认筛选为 ongoing
    let saved = app.summary_api.saved_filter().unwrap();
    assert_eq!(saved.status, StatusFilter::Ongoing);
    assert_eq!(saved.project_id, None);
}

#[test]
fn test_config_days_apply_when_snapshot_has_none() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let ids = write_sample(&app.db_path);

    app.config_manager
        .set_global_config_value(config_keys::GLOBAL_DAYS_STATUS_A_TO_FIRST_ISSUE, "60")
        .unwrap();

    let entries = app.summary_api.summary(&SummaryFilter::all(), TODAY).unwrap();
    let row = entries.iter().find(|e| e.row_id == ids.ongoing_row).unwrap();
    assert_eq!(row.first_issue, "2024-05-02");
    assert_eq!(row.status, SummaryStatus::Overdue);
}

#[test]
fn test_snapshot_days_override_config() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let (mut snapshot, ids) = sample_snapshot();
    snapshot.global_days_status_a_to_first_issue = Some(10.0);
    StateRepository::new(&app.db_path)
        .unwrap()
        .write_state(&snapshot)
        .unwrap();
    app.config_manager
        .set_global_config_value(config_keys::GLOBAL_DAYS_STATUS_A_TO_FIRST_ISSUE, "60")
        .unwrap();

    let entries = app.summary_api.summary(&SummaryFilter::all(), TODAY).unwrap();
    let row = entries.iter().find(|e| e.row_id == ids.ongoing_row).unwrap();
    assert_eq!(row.first_issue, "2024-06-21");
    assert_eq!(row.status, SummaryStatus::Ongoing);
}

#[test]
fn test_amber_window_from_config() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let ids = write_sample(&app.db_path);

    app.config_manager
        .set_global_config_value(config_keys::AMBER_WINDOW_DAYS, "30")
        .unwrap();

    let entries = app.summary_api.summary(&SummaryFilter::all(), TODAY).unwrap();
    let row = entries.iter().find(|e| e.row_id == ids.ongoing_row).unwrap();
    // Status A 2024-07-01，剩余 30 天
    assert_eq!(row.traffic, TrafficStatus::Amber);
}

#[test]
fn test_export_csv() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    write_sample(&app.db_path);

    let export = app
        .summary_api
        .export_csv(&SummaryFilter::parse("all", "all", "all"), TODAY)
        .unwrap();
    assert_eq!(export.filename, "Summary-all-2024-06-01.csv");

    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "overdue,red,Tower A,Structure,Acme,Transfer slab,2024-06-03,2024-05-20,2024-04-22"
    );
    assert!(lines[3].starts_with("done,green,"));
}

#[test]
fn test_supplier_options() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    write_sample(&app.db_path);
    assert_eq!(app.summary_api.supplier_options().unwrap(), vec!["Acme".to_string()]);
}

#[test]
fn test_programme_view() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    let (mut snapshot, ids) = sample_snapshot();
    let master = &mut snapshot.projects[0].master[0];
    master.block_zone = "Podium".to_string();
    master.levels = vec![
        Level {
            id: "lv1".to_string(),
            name: "L1".to_string(),
            start_date: "2024-02-01".to_string(),
            finish_date: "2024-02-20".to_string(),
        },
        Level {
            id: "lv2".to_string(),
            name: "L2".to_string(),
            start_date: "2024-03-05".to_string(),
            finish_date: String::new(),
        },
    ];
    StateRepository::new(&app.db_path)
        .unwrap()
        .write_state(&snapshot)
        .unwrap();

    let view = app.summary_api.programme(&ids.project_id).unwrap();
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].label, "Podium — L1");
    assert_eq!(view.items[1].finish_iso, "2024-03-05");

    let range = view.range.expect("应有时间范围");
    assert_eq!(range.min.to_string(), "2024-01-29");
    assert_eq!(range.max.to_string(), "2024-03-08");
    let keys: Vec<&str> = view.ticks.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["2024-1", "2024-2", "2024-3"]);

    let err = app.summary_api.programme("missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_chat_context_and_request() {
    let (_tmp, app) = create_test_app().expect("无法创建测试环境");
    write_sample(&app.db_path);

    let context = app.summary_api.chat_context(TODAY).unwrap();
    assert_eq!(context.today, TODAY);
    assert_eq!(context.counts.projects, 1);
    assert_eq!(context.counts.summary_items, 3);
    assert_eq!(context.counts.overdue, 1);
    assert_eq!(context.sample.overdue_top.len(), 1);
    assert_eq!(context.sample.upcoming_status_a.len(), 2);
    assert_eq!(context.by_supplier["Acme"].total, 3);

    app.config_manager
        .set_global_config_value(config_keys::CHAT_MODEL, "gpt-test")
        .unwrap();
    let request = app
        .summary_api
        .chat_request(&[ChatMessage::user("What is overdue?")], TODAY)
        .unwrap();
    assert_eq!(request.model, "gpt-test");
    assert_eq!(request.input.len(), 3);
    assert!(request.input[1].content.starts_with("APP_CONTEXT_JSON:\n"));
    assert_eq!(request.input[2].content, "What is overdue?");
}
