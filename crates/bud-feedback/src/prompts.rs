//! Prompt templates, one per [`FeedbackMode`].
//!
//! Prompts are written in Japanese: feedback is read by the child and their
//! parents, not by the English speaker in the recording.

use crate::types::{FeedbackMode, FeedbackRequest};

/// Placeholder used in the detailed prompt when the age is unknown.
pub const UNKNOWN_AGE: &str = "不明";

/// Build the prompt for `request`.
pub fn build_prompt(request: &FeedbackRequest) -> String {
    match request.mode {
        FeedbackMode::Short => short_prompt(&request.transcript),
        FeedbackMode::Detailed => detailed_prompt(&request.transcript, request.child_age),
        FeedbackMode::General => general_prompt(&request.transcript),
    }
}

/// About 100 characters of encouragement on courage, growth, and next steps.
pub fn short_prompt(transcript: &str) -> String {
    format!(
        r#"
以下は子どもが外国人と英語で話そうとした記録です: "{transcript}"

この子の「英語チャレンジ」を以下の観点で温かく評価してください：

🌟 【勇気ポイント】
- 外国人に話しかけた勇気（これだけでも素晴らしい！）
- 英語で何かを伝えようとした挑戦心
- 完璧でなくても諦めずに続けた粘り強さ

💫 【成長の芽】
- 単語一つでも英語を使えた（大きな前進！）
- 相手とのコミュニケーションが少しでも成立した
- 新しい表現や場面に挑戦した

🎯 【次への期待】
- 今回の経験が次の挑戦への自信になる
- 「英語って通じるんだ！」という実感
- 外国人との交流への興味が深まる

【重要】完璧な英語でなくても、話しかけた勇気と挑戦する気持ちが最も価値があります。
この子の頑張りを具体的に褒め、「また話してみたい！」と思えるような励ましを日本語で100文字程度で提供してください。

たとえ一言しか話せなくても、それは大きな成功です。

フィードバック:
"#
    )
}

/// Strict four-key JSON object.
pub fn detailed_prompt(transcript: &str, child_age: Option<u8>) -> String {
    let age = child_age.map_or_else(|| UNKNOWN_AGE.to_string(), |a| a.to_string());
    format!(
        r#"
以下は子どもが外国人と英語で話そうとした記録です: "{transcript}"

手順:
1) 推定話者分離: 「子どもが話した可能性が高い発話」を抽出（短い文・言い直し・ためらい・やさしい語彙など）
2) この子の「英語チャレンジ」を以下の観点で温かく評価（約50文字）:
   🌟【勇気ポイント】外国人に話しかけた勇気、英語で伝えようとした挑戦心
   💫【成長の芽】単語一つでも英語を使えた、コミュニケーションが成立した
   🎯【次への期待】この経験が次の挑戦への自信になる
   【重要】完璧でなくても、話しかけた勇気と挑戦する気持ちが最も価値がある
3) 会話文脈に沿った簡単な英語フレーズを1つ提案し、どんな場面で使うかを簡潔に説明（年齢: {age}）

出力は必ず次のJSON形式だけで返してください:
{{
  "child_utterances": ["子どもと推定した発話1", "発話2"],
  "feedback_short": "🌟💫🎯の観点を含む約50文字の短い応援コメント",
  "phrase_suggestion": {{ "en": "Hello", "ja": "初めて会った人への挨拶" }},
  "note": "話者推定で迷った点があれば簡潔に。なければ空文字"
}}
"#
    )
}

/// Up to 150 characters thanking, praising, and encouraging.
pub fn general_prompt(transcript: &str) -> String {
    format!(
        r#"
以下は子どもが話した内容です: "{transcript}"

子どもの発話を以下の観点で温かく評価してください：

1. 話してくれたことへの感謝
2. 良かった点の具体的な褒め言葉
3. 次に向けての優しい励まし

フィードバックは150文字以内で、子どもが理解しやすい言葉で書いてください。
"#
    )
}
