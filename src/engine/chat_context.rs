// ==========================================
// 设计出图进度跟踪 - 聊天助手上下文
// ==========================================
// 职责:
// - 由汇总列表构建发送给大模型的上下文 (APP_CONTEXT_JSON)
// - 构建请求体（两条 system 消息 + 用户对话）
// - 从响应 JSON 中提取回答文本
// 红线: 不发起 HTTP 请求（由宿主负责传输）
// ==========================================

use crate::domain::snapshot::AppSnapshot;
use crate::domain::types::{SummaryStatus, TrafficStatus, View};
use crate::engine::dates::parse_iso;
use crate::engine::summary::SummaryEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 样本条目上限
pub const SAMPLE_LIMIT: usize = 30;
/// 空供应商的显示占位
pub const EMPTY_SUPPLIER: &str = "—";
/// 默认模型
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const CHAT_TEMPERATURE: f64 = 0.2;
pub const CHAT_MAX_OUTPUT_TOKENS: u32 = 800;
/// 响应中无文本时的回答
pub const NO_RESPONSE_TEXT: &str = "No response text returned.";

const SYSTEM_TEXT: &str = "You are a helpful assistant for a design programme tracker web app. \
Use the provided APP_CONTEXT_JSON to answer questions accurately. \
If the user asks for something not in the context, say what you’d need.";

// ==========================================
// 上下文结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub today: String,
    pub view: View,
    pub active_project: Option<ActiveRef>,
    pub active_page: Option<ActivePageRef>,
    pub counts: ChatCounts,
    pub sample: ChatSample,
    pub by_supplier: BTreeMap<String, SupplierTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePageRef {
    pub id: String,
    pub name: String,
    pub is_master: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCounts {
    pub projects: usize,
    pub summary_items: usize,
    pub overdue: usize,
    pub ongoing: usize,
    pub done: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSample {
    pub overdue_top: Vec<OverdueSample>,
    #[serde(rename = "upcomingStatusA")]
    pub upcoming_status_a: Vec<UpcomingSample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueSample {
    pub project: String,
    pub responsibility: String,
    pub supplier: String,
    pub item: String,
    pub required_on_site: String,
    pub status_a: String,
    pub traffic: TrafficStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingSample {
    pub project: String,
    pub responsibility: String,
    pub supplier: String,
    pub item: String,
    pub status_a: String,
    pub traffic: TrafficStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierTally {
    pub overdue: usize,
    pub ongoing: usize,
    pub done: usize,
    pub total: usize,
}

fn supplier_label(supplier: &str) -> String {
    if supplier.is_empty() {
        EMPTY_SUPPLIER.to_string()
    } else {
        supplier.to_string()
    }
}

/// 构建聊天上下文
///
/// summary 为已排序的完整汇总（未筛选）
pub fn build_chat_context(
    summary: &[SummaryEntry],
    snapshot: &AppSnapshot,
    today_iso: &str,
) -> ChatContext {
    let count_of = |status: SummaryStatus| summary.iter().filter(|e| e.status == status).count();

    let overdue_top = summary
        .iter()
        .filter(|e| e.status == SummaryStatus::Overdue)
        .take(SAMPLE_LIMIT)
        .map(|e| OverdueSample {
            project: e.project_name.clone(),
            responsibility: e.page_name.clone(),
            supplier: supplier_label(&e.supplier),
            item: e.title.clone(),
            required_on_site: e.required_on_site.clone(),
            status_a: e.status_a.clone(),
            traffic: e.traffic,
        })
        .collect();

    let mut due_soon: Vec<&SummaryEntry> = summary
        .iter()
        .filter(|e| e.status != SummaryStatus::Done && !e.status_a.is_empty())
        .collect();
    // 非法日期排在最后；sort_by_key 为稳定排序
    due_soon.sort_by_key(|e| parse_iso(&e.status_a).map_or((1, None), |d| (0, Some(d))));
    let upcoming_status_a = due_soon
        .into_iter()
        .take(SAMPLE_LIMIT)
        .map(|e| UpcomingSample {
            project: e.project_name.clone(),
            responsibility: e.page_name.clone(),
            supplier: supplier_label(&e.supplier),
            item: e.title.clone(),
            status_a: e.status_a.clone(),
            traffic: e.traffic,
        })
        .collect();

    let mut by_supplier: BTreeMap<String, SupplierTally> = BTreeMap::new();
    for e in summary {
        let tally = by_supplier.entry(supplier_label(&e.supplier)).or_default();
        tally.total += 1;
        match e.status {
            SummaryStatus::Overdue => tally.overdue += 1,
            SummaryStatus::Ongoing => tally.ongoing += 1,
            SummaryStatus::Done => tally.done += 1,
        }
    }

    let active_project = snapshot
        .active_project_id
        .as_deref()
        .and_then(|id| snapshot.projects.iter().find(|p| p.id == id));
    let active_page = active_project.and_then(|p| {
        snapshot
            .active_page_id
            .as_deref()
            .and_then(|id| p.pages.iter().find(|pg| pg.id == id))
    });

    ChatContext {
        today: today_iso.to_string(),
        view: snapshot.view,
        active_project: active_project.map(|p| ActiveRef {
            id: p.id.clone(),
            name: p.name.clone(),
        }),
        active_page: active_page.map(|pg| ActivePageRef {
            id: pg.id.clone(),
            name: pg.name.clone(),
            is_master: pg.is_master(),
        }),
        counts: ChatCounts {
            projects: snapshot.projects.len(),
            summary_items: summary.len(),
            overdue: count_of(SummaryStatus::Overdue),
            ongoing: count_of(SummaryStatus::Ongoing),
            done: count_of(SummaryStatus::Done),
        },
        sample: ChatSample {
            overdue_top,
            upcoming_status_a,
        },
        by_supplier,
    }
}

// ==========================================
// 请求 / 响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub input: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl ChatRequest {
    /// 构建请求体: 指令 + 上下文 + 用户对话
    pub fn build(
        messages: &[ChatMessage],
        context: &ChatContext,
        model: &str,
    ) -> serde_json::Result<Self> {
        let context_json = serde_json::to_string_pretty(context)?;
        let mut input = vec![
            ChatMessage::system(SYSTEM_TEXT),
            ChatMessage::system(format!("APP_CONTEXT_JSON:\n{}", context_json)),
        ];
        input.extend(messages.iter().cloned());

        let model = model.trim();
        Ok(Self {
            model: if model.is_empty() {
                DEFAULT_CHAT_MODEL.to_string()
            } else {
                model.to_string()
            },
            input,
            temperature: CHAT_TEMPERATURE,
            max_output_tokens: CHAT_MAX_OUTPUT_TOKENS,
        })
    }
}

/// 提取回答: output_text → output[0].content[0].text → 固定提示
pub fn extract_answer(response: &Value) -> String {
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    non_empty(response.get("output_text"))
        .or_else(|| non_empty(response.pointer("/output/0/content/0/text")))
        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::status::OverdueFlags;
    use serde_json::json;

    fn entry(title: &str, status: SummaryStatus, status_a: &str, supplier: &str) -> SummaryEntry {
        SummaryEntry {
            project_id: "p1".to_string(),
            project_name: "Tower".to_string(),
            page_id: "pg1".to_string(),
            page_name: "Structure".to_string(),
            row_id: title.to_string(),
            title: title.to_string(),
            supplier: supplier.to_string(),
            required_on_site: String::new(),
            status_a: status_a.to_string(),
            first_issue: String::new(),
            completed: status == SummaryStatus::Done,
            status,
            traffic: TrafficStatus::Amber,
            overdue: OverdueFlags::none(),
        }
    }

    #[test]
    fn test_counts_and_supplier_tallies() {
        let summary = vec![
            entry("a", SummaryStatus::Overdue, "2024-05-01", "Acme"),
            entry("b", SummaryStatus::Ongoing, "2024-07-01", ""),
            entry("c", SummaryStatus::Done, "2024-04-01", "Acme"),
        ];
        let ctx = build_chat_context(&summary, &AppSnapshot::default(), "2024-06-01");

        assert_eq!(ctx.counts.summary_items, 3);
        assert_eq!(ctx.counts.overdue, 1);
        assert_eq!(ctx.counts.done, 1);
        assert_eq!(ctx.by_supplier["Acme"].total, 2);
        assert_eq!(ctx.by_supplier[EMPTY_SUPPLIER].ongoing, 1);
        assert_eq!(ctx.sample.overdue_top.len(), 1);
        assert!(ctx.active_project.is_none());
    }

    #[test]
    fn test_upcoming_sorted_by_status_a_excluding_done() {
        let summary = vec![
            entry("late", SummaryStatus::Ongoing, "2024-08-01", "X"),
            entry("none", SummaryStatus::Ongoing, "", "X"),
            entry("done", SummaryStatus::Done, "2024-01-01", "X"),
            entry("early", SummaryStatus::Overdue, "2024-05-01", "X"),
        ];
        let ctx = build_chat_context(&summary, &AppSnapshot::default(), "2024-06-01");
        let items: Vec<&str> = ctx
            .sample
            .upcoming_status_a
            .iter()
            .map(|s| s.item.as_str())
            .collect();
        assert_eq!(items, vec!["early", "late"]);
    }

    #[test]
    fn test_sample_limit() {
        let summary: Vec<SummaryEntry> = (0..40)
            .map(|i| entry(&format!("r{}", i), SummaryStatus::Overdue, "2024-05-01", ""))
            .collect();
        let ctx = build_chat_context(&summary, &AppSnapshot::default(), "2024-06-01");
        assert_eq!(ctx.sample.overdue_top.len(), SAMPLE_LIMIT);
        assert_eq!(ctx.sample.upcoming_status_a.len(), SAMPLE_LIMIT);
    }

    #[test]
    fn test_chat_request_shape() {
        let ctx = build_chat_context(&[], &AppSnapshot::default(), "2024-06-01");
        let req = ChatRequest::build(&[ChatMessage::user("What is overdue?")], &ctx, "").unwrap();
        assert_eq!(req.model, DEFAULT_CHAT_MODEL);
        assert_eq!(req.input.len(), 3);
        assert_eq!(req.input[0].role, "system");
        assert!(req.input[1].content.starts_with("APP_CONTEXT_JSON:\n{"));
        assert_eq!(req.input[2].content, "What is overdue?");

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["max_output_tokens"], json!(800));
        assert_eq!(v["temperature"], json!(0.2));
    }

    #[test]
    fn test_extract_answer_fallbacks() {
        assert_eq!(extract_answer(&json!({ "output_text": "hi" })), "hi");
        let nested = json!({ "output_text": "", "output": [{ "content": [{ "text": "nested" }] }] });
        assert_eq!(extract_answer(&nested), "nested");
        assert_eq!(extract_answer(&json!({})), NO_RESPONSE_TEXT);
    }

    #[test]
    fn test_context_serializes_camel_case() {
        let ctx = build_chat_context(&[], &AppSnapshot::default(), "2024-06-01");
        let v = serde_json::to_value(&ctx).unwrap();
        assert!(v["sample"].get("upcomingStatusA").is_some());
        assert!(v["sample"].get("overdueTop").is_some());
        assert!(v.get("bySupplier").is_some());
        assert_eq!(v["counts"]["summaryItems"], json!(0));
    }
}
