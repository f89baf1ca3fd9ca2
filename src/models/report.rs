//! Report Models
//!
//! The strengths portfolio produced at the end of a session, the shape check
//! applied to raw model output, and the canned sample used when generation
//! fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code carried by the fallback outcome.
pub const FALLBACK_CODE: &str = "API_LIMIT_REACHED";

/// Notice shown alongside the sample report.
pub const FALLBACK_NOTICE: &str = "現在アクセスが集中しているか、API制限に達しました。";

/// Four scored dimensions, each 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthMap {
    pub practical: f64,
    pub empathy: f64,
    pub collaboration: f64,
    pub resilience: f64,
}

/// One skill surfaced by the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedSkill {
    /// `実務` (practical) or `普遍` (universal)
    #[serde(rename = "type")]
    pub skill_type: String,
    pub skill_name: String,
    pub description: String,
}

/// The strengths portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub focus_area: Vec<String>,
    pub strength_map: StrengthMap,
    pub message: String,
    pub identified_skills: Vec<IdentifiedSkill>,
}

/// A report as held by a session.
///
/// `data` is the accepted report body exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub data: Value,
    /// True when `data` is the canned sample rather than a generated report
    pub is_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl StoredReport {
    /// Accept a generated body. Returns `None` unless [`is_report_shape`]
    /// holds; the body is kept unmodified.
    pub fn generated(data: Value) -> Option<Self> {
        if !is_report_shape(&data) {
            return None;
        }
        Some(Self {
            data,
            is_sample: false,
            notice: None,
        })
    }

    pub fn sample(data: &ReportData, notice: impl Into<String>) -> serde_json::Result<Self> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            is_sample: true,
            notice: Some(notice.into()),
        })
    }
}

/// Minimal shape a report must have before it is rendered or stored:
/// an object whose `strengthMap` is an object and `identifiedSkills` an array.
pub fn is_report_shape(value: &Value) -> bool {
    value.is_object()
        && value.get("strengthMap").is_some_and(Value::is_object)
        && value.get("identifiedSkills").is_some_and(Value::is_array)
}

/// The hand-authored sample shown when report generation fails.
pub fn fallback_report() -> ReportData {
    ReportData {
        focus_area: vec!["現場の守護神".to_string(), "架け橋となる調整役".to_string()],
        strength_map: StrengthMap {
            practical: 80.0,
            empathy: 95.0,
            collaboration: 90.0,
            resilience: 70.0,
        },
        message: "（API制限等の理由により、サンプルレポートを表示しています）\n\n\
あなたの対話からは、利用者様一人ひとりの「声なき声」を拾い上げる深い共感と、\
それをチーム全体に共有してケアの質を高めようとする誠実さが伝わってきました。\
現場がどんなに忙しくても、あなたの存在があることで、利用者様もスタッフも安心できているはずです。"
            .to_string(),
        identified_skills: vec![
            IdentifiedSkill {
                skill_type: "普遍".to_string(),
                skill_name: "潜在的ニーズの言語化スキル".to_string(),
                description: "本人がうまく言葉にできない不安や要望を、表情やしぐさから読み取り、適切なケアにつなげている".to_string(),
            },
            IdentifiedSkill {
                skill_type: "実務".to_string(),
                skill_name: "事故リスクの予兆検知力".to_string(),
                description: "ヒヤリハットの段階で小さな違和感に気づき、大事に至る前に環境を改善している".to_string(),
            },
            IdentifiedSkill {
                skill_type: "普遍".to_string(),
                skill_name: "チームの心理的安全性醸成".to_string(),
                description: "後輩が失敗した際も、責めるのではなく「次はどうすればいいか」を一緒に考え、相談しやすい雰囲気を作っている".to_string(),
            },
        ],
    }
}
