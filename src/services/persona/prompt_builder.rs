//! Persona Prompt Builder
//!
//! Builds the coach system prompt (which carries the in-band state and
//! choices protocol) and the single-shot report prompt.

use super::types::{Persona, PromptSection};
use crate::models::profile::ProfileContext;
use crate::models::settings::OrganizationContext;
use crate::services::extraction::{CHOICES_DELIMITER, STATE_DELIMITER};

/// Hidden user turn that asks the coach to open the conversation.
pub const GREETING_KICKOFF: &str = "（会話を開始してください。最初に自己紹介し、「あなたは5年間、どちらの事務所でどのような業務をしてきましたか？」と聞いてください。）";

/// JSON shape the report pass must produce.
pub const REPORT_JSON_SCHEMA: &str = r#"{
  "focusArea": ["現場の支え手", "チームの調整役" など、福祉現場での役割名],
  "strengthMap": {
    "practical": 実務・専門的な確実さ (0-100の数値),
    "empathy": 利用者・家族への共感力 (0-100の数値),
    "collaboration": 仲間との連携・調整力 (0-100の数値),
    "resilience": 心のしなやかさ (0-100の数値)
  },
  "message": "MBTIの個性を踏まえつつ、対話で見つかった『その人らしさ』を称えるメッセージ。冒頭で{call_name}と呼びかけてください。200文字程度。ビジネス用語を避け、現場の情景が浮かぶ言葉を使ってください。",
  "identifiedSkills": [
    {
      "type": "実務 / 普遍",
      "skillName": "（例）言葉にできないニーズを汲み取る、観察と傾聴の専門スキル",
      "description": "対話から見えた具体的な行動事実をベースにした説明"
    }
  ]
}"#;

/// Local greeting used when the opening stream fails before any text.
pub fn fallback_greeting(type_code: &str) -> String {
    format!(
        "こんにちは！{}タイプですね。あなたの強みを見つける作戦会議を始めましょう。",
        type_code
    )
}

fn render_section(section: &PromptSection, call_name: &str) -> String {
    let lines = section
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let item = item.replace("{call_name}", call_name);
            if section.numbered {
                format!("{}. {}", idx + 1, item)
            } else {
                format!("- {}", item)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("【{}】\n{}", section.title, lines)
}

fn user_info_section(profile: &ProfileContext) -> String {
    let name = if profile.display_name.is_empty() {
        "未入力"
    } else {
        profile.display_name.as_str()
    };
    format!(
        "【ユーザー情報】\n\
- 名前: {}\n\
- 呼びかけ: {}\n\
- 業種: 社会福祉法人（介護・福祉）\n\
- 経験年数: 5年目（中堅・リーダー層）\n\
- MBTIタイプ: {}",
        name,
        profile.call_name(),
        profile.type_code
    )
}

fn organization_section(org: &OrganizationContext) -> Option<String> {
    let description = org.description.trim();
    if description.is_empty() {
        None
    } else {
        Some(format!("【{}について】\n{}", org.name, description))
    }
}

fn state_protocol_section() -> String {
    format!(
        r#"【状態出力（必須）】
各返答の末尾に、次のJSONを必ず付ける。
出力形式は「{state}{{...}}」のみ。本文には含めない。
{{
  "officeHistory": true/false,
  "role": true/false,
  "duties": true/false,
  "episode": true/false,
  "strengths": true/false,
  "episodeCount": 0-3,
  "strengthsCount": 0-3,
  "rotationStatus": "experienced" | "partial" | "none" | "unknown"
}}
※本文の文字数（100〜120文字）はSTATE部分を除いて数える。
※episodeCount/strengthsCount は対話で確認できた件数の累計。最大3で固定。

【返答候補（任意）】
答えやすい選択肢を示せる場合は、本文の後・状態出力の前に「{choices}["候補1","候補2"]」の形で2〜4個まで付けてよい。
候補は文字列のJSON配列のみとし、本文には含めない。"#,
        state = STATE_DELIMITER,
        choices = CHOICES_DELIMITER,
    )
}

/// Build the system prompt for the streamed coach conversation.
pub fn build_coach_system_prompt(
    persona: &Persona,
    org: &OrganizationContext,
    profile: &ProfileContext,
) -> String {
    let call_name = profile.call_name();
    let mut parts = Vec::with_capacity(persona.sections.len() + 4);

    parts.push(format!(
        "あなたは「{}」の{}です。\n{}",
        org.name, persona.identity_prompt, persona.mission
    ));
    if let Some(org_section) = organization_section(org) {
        parts.push(org_section);
    }
    parts.push(user_info_section(profile));
    for section in &persona.sections {
        parts.push(render_section(section, &call_name));
    }
    parts.push(state_protocol_section());

    parts.join("\n\n")
}

/// Build the single-shot report prompt embedding the whole transcript.
pub fn build_report_prompt(
    persona: &Persona,
    org: &OrganizationContext,
    profile: &ProfileContext,
    transcript: &str,
) -> String {
    let call_name = profile.call_name();
    let mut parts = Vec::with_capacity(persona.sections.len() + 6);

    parts.push(format!(
        "あなたは、{}の{}です。\n{}",
        org.name, persona.identity_prompt, persona.mission
    ));
    if let Some(org_section) = organization_section(org) {
        parts.push(org_section);
    }
    parts.push(user_info_section(profile));
    parts.push(format!("【対話ログ】\n{}", transcript));
    for section in &persona.sections {
        parts.push(render_section(section, &call_name));
    }
    parts.push(format!(
        "【出力レポート（JSON形式）】\n\
次のスキーマに従うJSONオブジェクトを1つだけ出力してください。\
コードフェンスや説明文は付けないでください。\
identifiedSkills は対話から見えたスキルを3つ程度挙げてください。\n{}",
        REPORT_JSON_SCHEMA.replace("{call_name}", &call_name)
    ));

    parts.join("\n\n")
}
