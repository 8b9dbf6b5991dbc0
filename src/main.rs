// ==========================================
// 设计出图进度跟踪 - 命令行入口
// ==========================================
// 用法:
//   workback-tracker [--db PATH] <command>
//
// 命令:
//   summary [all|overdue|ongoing|done] [project_id] [supplier]   汇总（JSON）
//   csv [all|overdue|ongoing|done]                               汇总 CSV
//   backup                                                       写入今日备份
//   chat-context                                                 聊天助手上下文（JSON）
//   config                                                       当前推算配置
//   health                                                       健康检查
// ==========================================

use std::error::Error;

use serde_json::json;
use workback_tracker::app::{get_default_db_path, AppState};
use workback_tracker::config::ScheduleConfigReader;
use workback_tracker::engine::dates::today_iso;
use workback_tracker::engine::SummaryFilter;
use workback_tracker::domain::FILTER_ALL;

const USAGE: &str = "用法: workback-tracker [--db PATH] <summary [status] [project] [supplier] | csv [status] | backup | chat-context | config | health>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    workback_tracker::logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let db_path = match args.iter().position(|a| a == "--db") {
        Some(idx) => {
            if idx + 1 >= args.len() {
                return Err("--db 缺少路径参数".into());
            }
            let path = args.remove(idx + 1);
            args.remove(idx);
            path
        }
        None => get_default_db_path(),
    };

    let command = match args.first() {
        Some(c) => c.clone(),
        None => {
            eprintln!("{}", USAGE);
            return Err("缺少命令".into());
        }
    };
    let rest = &args[1..];
    let arg = |i: usize| rest.get(i).map(String::as_str).unwrap_or(FILTER_ALL);

    // 健康检查不需要打开数据库
    if command == "health" {
        println!("{}", json!({ "ok": true }));
        return Ok(());
    }

    tracing::info!(version = workback_tracker::VERSION, db = %db_path, command = %command, "{}", workback_tracker::APP_NAME);
    let state = AppState::new(db_path)?;
    let today = today_iso();

    match command.as_str() {
        "summary" => {
            let filter = SummaryFilter::parse(arg(0), arg(1), arg(2));
            let entries = state.summary_api.summary(&filter, &today)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "csv" => {
            let filter = SummaryFilter::parse(arg(0), FILTER_ALL, FILTER_ALL);
            let export = state.summary_api.export_csv(&filter, &today)?;
            tracing::info!(filename = %export.filename, "CSV 已生成");
            print!("{}", export.content);
        }
        "backup" => match state.backup_api.run_weekly_backup(&today)? {
            Some(title) => println!("{}", title),
            None => println!("{}", workback_tracker::i18n::t("backup.skipped")),
        },
        "chat-context" => {
            let context = state.summary_api.chat_context(&today)?;
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        "config" => {
            let settings = state.config_manager.get_schedule_settings().await?;
            let amber = state.config_manager.get_amber_window_days().await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "settings": settings,
                    "amberWindowDays": amber,
                }))?
            );
        }
        other => {
            eprintln!("{}", USAGE);
            return Err(format!("未知命令: {}", other).into());
        }
    }

    Ok(())
}
