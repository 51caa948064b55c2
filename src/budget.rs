pub fn approx_tokens(s: &str) -> usize {
    // heuristic ~4 chars/token
    (s.chars().count() + 3) / 4
}

/// Cut comment text down to `max_tokens` before it goes into a prompt.
/// Cuts at a word boundary when one exists and marks the cut.
pub fn cap_prompt_text(text: &str, max_tokens: usize) -> String {
    if approx_tokens(text) <= max_tokens {
        return text.to_string();
    }
    let max_chars = max_tokens.saturating_mul(4);
    let mut s: String = text.chars().take(max_chars).collect();
    if let Some(idx) = s.rfind(char::is_whitespace) {
        if idx > 0 {
            s.truncate(idx);
        }
    }
    s.push_str(" …");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(cap_prompt_text("fine as is", 10), "fine as is");
    }

    #[test]
    fn long_text_is_cut_on_a_word_boundary() {
        let long = "word ".repeat(500);
        let capped = cap_prompt_text(&long, 20);
        assert!(capped.ends_with(" …"));
        assert!(approx_tokens(&capped) <= 22);
        assert!(!capped.trim_end_matches(" …").ends_with("wor"));
    }
}
