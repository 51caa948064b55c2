pub fn user_polarity_estimate(text: &str, subject: &str, context: Option<&str>) -> String {
    let context_block = match context {
        Some(c) if !c.trim().is_empty() => format!(
            r#"
Background on "{subject}" (use it to resolve sarcasm, slang and references; do not score the background itself):
<{c}>
"#
        ),
        _ => String::new(),
    };

    format!(r#"You are a calibrated sentiment analyst. Score this internet comment about "{subject}" objectively.
{context_block}
Comment:
<{text}>

Rules:
- Do NOT default to 50 (neutral) for ambiguous or mild comments.
- Negative criticism and complaints should score well BELOW 50.
- Positive praise and enthusiasm should score well ABOVE 50.
- Only score near 50 if the comment is genuinely mixed or neutral.
- Strong emotions in either direction are valid signals. Preserve them.
- Score the commenter's attitude toward "{subject}", not the topic's general mood.

Return ONLY this JSON object:

{{
  "word_sentiment_check": "<the 3 most sentiment-bearing words/phrases and whether each is positive or negative>",
  "reasoning": "<one sentence>",
  "sentiment": <integer 0-100>,
  "bias_score": <integer 0-100>
}}

Sentiment scale:
  0-20  : Extremely negative (rage, strong condemnation)
  21-35 : Clearly negative (criticism, disappointment)
  36-45 : Mildly negative (skepticism, mild complaint)
  46-54 : Genuinely neutral or evenly mixed
  55-64 : Mildly positive (cautious optimism, tentative approval)
  65-79 : Clearly positive (praise, approval)
  80-100: Extremely positive (enthusiasm, strong endorsement)

Bias scale:
  0-30  : Objective, factual, balanced
  31-60 : Opinion-based, some emotional language
  61-100: Extreme, conspiratorial, purely emotional/reactionary

Return ONLY valid JSON:"#)
}

pub fn user_context_summary(subject: &str) -> String {
    format!(r#"In 3-5 plain sentences, describe what "{subject}" is and what people are currently discussing about it.
Mention names, nicknames, slang or in-jokes a reader would need to understand online comments about it.

CONSTRAINTS:
- Neutral tone. No opinion of your own.
- ≤ 150 tokens.
- Plain text, no lists or headings."#)
}
