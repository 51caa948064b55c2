// src/render.rs
use itertools::Itertools;

use crate::engine::RunReport;
use crate::models::ScoredComment;

fn snippet(text: &str, max_chars: usize) -> String {
    let one_line = text.split_whitespace().join(" ");
    if one_line.chars().count() <= max_chars {
        one_line
    } else {
        let cut: String = one_line.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}

pub fn render_comment_line(s: &ScoredComment) -> String {
    format!(
        "- [{}] {:.1} (bias {:.0}, cred {:.0}, len {:.2}{}) “{}”\n",
        s.source,
        s.ensemble_score,
        s.bias_score,
        s.source_credibility,
        s.length_weight,
        if s.contextual_fallback { ", fallback" } else { "" },
        snippet(&s.text, 100)
    )
}

pub fn render_report_markdown(report: &RunReport) -> String {
    let r = &report.result;
    let mut md = String::new();
    md.push_str(&format!("# Sentiment Index: {}\n\n", r.subject));
    if let Some(cat) = &r.category {
        md.push_str(&format!("Category: {}\n\n", cat));
    }

    if r.no_data {
        md.push_str("**No data.** No qualifying comments were collected.\n\n");
    } else {
        md.push_str(&format!("**{:.2} / 100** ({})\n\n", r.index_score, r.label.as_str()));
        md.push_str(&format!("Confidence: {:.2} (heuristic)  \n", r.confidence));
        md.push_str(&format!("Sample size: {}\n\n", r.sample_size));

        md.push_str("## Scores\n");
        md.push_str(&format!(
            "- mean {:.2}, median {:.2}, std {:.2}, min {:.2}, max {:.2}\n",
            r.stats.mean, r.stats.median, r.stats.std_dev, r.stats.min, r.stats.max
        ));
        md.push_str(&format!(
            "- mean bias {:.2}, mean credibility {:.2}, mean length weight {:.3}, mean words {:.1}\n",
            r.mean_bias, r.mean_credibility, r.mean_length_weight, r.mean_word_count
        ));
        if r.fallback_count > 0 {
            md.push_str(&format!("- {} comment(s) scored by the lexical baseline alone\n", r.fallback_count));
        }
        md.push('\n');

        md.push_str("## Sources\n");
        for (source, n) in &r.source_breakdown {
            md.push_str(&format!("- {}: {}\n", source, n));
        }
        md.push('\n');

        let by_score: Vec<&ScoredComment> = report
            .scored
            .iter()
            .sorted_by(|a, b| b.ensemble_score.total_cmp(&a.ensemble_score))
            .collect();
        // the two lists never share a comment
        let top = by_score.len().min(3);
        let bottom = (by_score.len() - top).min(3);
        md.push_str("## Most Positive\n");
        for s in &by_score[..top] {
            md.push_str(&render_comment_line(s));
        }
        if bottom > 0 {
            md.push_str("\n## Most Negative\n");
            for s in by_score.iter().rev().take(bottom) {
                md.push_str(&render_comment_line(s));
            }
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("## Source Failures\n");
        for f in &report.failures {
            md.push_str(&format!("- {} ({}): {}\n", f.source, f.order, f.message));
        }
        md.push('\n');
    }

    let d = &report.dropped;
    if d.total() > 0 {
        md.push_str(&format!(
            "Dropped: {} (empty {}, deleted {}, too short {}, duplicate {}, over cap {})\n",
            d.total(),
            d.empty,
            d.deleted,
            d.too_short,
            d.duplicate,
            d.over_cap
        ));
    }
    if report.cancelled {
        md.push_str("\n_Run cancelled; partial result not persisted._\n");
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::collect::DropCounts;
    use crate::config::{AggregateConfig, WeightConfig};
    use crate::models::Source;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn scored(id: &str, score: f64, text: &str) -> ScoredComment {
        ScoredComment {
            comment_id: id.to_string(),
            source: Source::Reddit,
            platform_id: id.to_string(),
            venue: None,
            text: text.to_string(),
            author: "someone".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            engagement: 1,
            polarity_estimates: BTreeMap::new(),
            ensemble_score: score,
            bias_score: 30.0,
            contextual_fallback: false,
            source_credibility: 70.0,
            credibility_weight: 0.7,
            length_weight: 0.5,
            word_count: 6,
        }
    }

    fn report(scored: Vec<ScoredComment>) -> RunReport {
        let aggregator = Aggregator::new(&AggregateConfig::default(), &WeightConfig::default());
        RunReport {
            result: aggregator.aggregate("Widget", None, &scored),
            scored,
            failures: Vec::new(),
            dropped: DropCounts::default(),
            context: None,
            cancelled: false,
            persisted: None,
        }
    }

    #[test]
    fn small_samples_list_each_comment_once() {
        let md = render_report_markdown(&report(vec![
            scored("a", 80.0, "loved the new widget design"),
            scored("b", 20.0, "hated the new widget design"),
        ]));
        assert_eq!(md.matches("loved the new widget design").count(), 1);
        assert_eq!(md.matches("hated the new widget design").count(), 1);
        assert!(!md.contains("## Most Negative"));
    }

    #[test]
    fn larger_samples_split_between_extremes() {
        let texts = ["one", "two", "three", "four", "five"];
        let items = texts
            .iter()
            .enumerate()
            .map(|(i, t)| scored(t, 90.0 - 20.0 * i as f64, &format!("comment number {t} about it")))
            .collect();
        let md = render_report_markdown(&report(items));
        let (positive, negative) = md.split_once("## Most Negative").unwrap();
        assert!(positive.contains("comment number one") && positive.contains("comment number three"));
        assert!(negative.contains("comment number five") && negative.contains("comment number four"));
        assert!(!negative.contains("comment number three"));
        for t in texts {
            assert_eq!(md.matches(&format!("comment number {t} about")).count(), 1);
        }
    }

    #[test]
    fn long_text_is_cut() {
        let s = snippet(&"word ".repeat(60), 20);
        assert!(s.ends_with('…'));
        assert!(s.chars().count() <= 21);
        assert_eq!(snippet("short\n text", 20), "short text");
    }
}
