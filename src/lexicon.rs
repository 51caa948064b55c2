use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub static LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::build);

pub struct Lexicon {
    valences: HashMap<&'static str, f64>,
    negators: HashSet<&'static str>,
    boosters: HashMap<&'static str, f64>,
    emoticons: HashMap<&'static str, f64>,
    contrastives: HashSet<&'static str>,
}

// valences in [-1, 1]; boosters multiply, emoticons match the raw token
const POSITIVE: &[(&str, f64)] = &[
    ("good", 0.5), ("great", 0.7), ("excellent", 0.9), ("amazing", 0.8), ("awesome", 0.8),
    ("fantastic", 0.8), ("wonderful", 0.8), ("brilliant", 0.8), ("outstanding", 0.9), ("superb", 0.9),
    ("best", 0.8), ("better", 0.4), ("nice", 0.4), ("fine", 0.2), ("decent", 0.3),
    ("solid", 0.4), ("strong", 0.4), ("impressive", 0.7), ("impressed", 0.6), ("love", 0.8),
    ("loved", 0.8), ("loves", 0.8), ("like", 0.3), ("liked", 0.3), ("enjoy", 0.5),
    ("enjoyed", 0.5), ("happy", 0.6), ("glad", 0.5), ("pleased", 0.5), ("proud", 0.6),
    ("support", 0.4), ("supports", 0.4), ("agree", 0.4), ("approve", 0.5), ("approved", 0.4),
    ("praise", 0.6), ("thanks", 0.4), ("thank", 0.4), ("grateful", 0.6), ("helpful", 0.5),
    ("useful", 0.4), ("smart", 0.5), ("wise", 0.5), ("fair", 0.3), ("honest", 0.5),
    ("trust", 0.4), ("reliable", 0.5), ("success", 0.6), ("successful", 0.6), ("win", 0.5),
    ("winning", 0.5), ("improve", 0.4), ("improved", 0.5), ("improvement", 0.5), ("progress", 0.4),
    ("finally", 0.2), ("hope", 0.3), ("hopeful", 0.4), ("optimistic", 0.5), ("promising", 0.5),
    ("exciting", 0.6), ("excited", 0.6), ("beautiful", 0.7), ("perfect", 0.9), ("incredible", 0.7),
    ("effective", 0.5), ("benefit", 0.4), ("benefits", 0.4), ("positive", 0.4), ("favorite", 0.6),
    ("recommend", 0.5), ("worth", 0.3), ("genuine", 0.4), ("leadership", 0.3),
    ("legend", 0.6), ("goat", 0.6), ("based", 0.3), ("lit", 0.4), ("fire", 0.3),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("bad", -0.6), ("terrible", -0.9), ("awful", -0.9), ("horrible", -0.9), ("worst", -0.9),
    ("worse", -0.6), ("poor", -0.5), ("weak", -0.4), ("hate", -0.8), ("hated", -0.8),
    ("hates", -0.8), ("dislike", -0.5), ("disgusting", -0.9), ("disgrace", -0.8), ("disaster", -0.9),
    ("disastrous", -0.9), ("fail", -0.6), ("failed", -0.6), ("failure", -0.7), ("fails", -0.6),
    ("wrong", -0.5), ("stupid", -0.7), ("dumb", -0.6), ("idiot", -0.8), ("idiotic", -0.8),
    ("corrupt", -0.8), ("corruption", -0.7), ("liar", -0.8), ("lie", -0.6), ("lies", -0.6),
    ("lying", -0.7), ("fraud", -0.9), ("scam", -0.9), ("shame", -0.6), ("shameful", -0.8),
    ("pathetic", -0.8), ("useless", -0.7), ("waste", -0.6), ("broken", -0.5), ("mess", -0.6),
    ("problem", -0.4), ("problems", -0.4), ("issue", -0.3), ("issues", -0.3), ("concern", -0.3),
    ("concerned", -0.4), ("worried", -0.5), ("worry", -0.4), ("fear", -0.5), ("scary", -0.6),
    ("angry", -0.7), ("mad", -0.5), ("furious", -0.9), ("sad", -0.5), ("disappointed", -0.6),
    ("disappointing", -0.6), ("disappointment", -0.6), ("annoying", -0.5), ("boring", -0.4), ("rushed", -0.4),
    ("destroy", -0.8), ("destroyed", -0.8), ("destroying", -0.8), ("ruin", -0.7), ("ruined", -0.7),
    ("hurt", -0.5), ("harm", -0.6), ("harmful", -0.7), ("dangerous", -0.7), ("crisis", -0.7),
    ("against", -0.3), ("oppose", -0.5), ("reject", -0.5), ("criticism", -0.4), ("complaint", -0.4),
    ("skeptical", -0.3), ("doubt", -0.3), ("ridiculous", -0.7), ("absurd", -0.6), ("clown", -0.6),
    ("trash", -0.8), ("garbage", -0.8), ("sucks", -0.7), ("cringe", -0.6), ("mid", -0.3),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "nobody", "nothing", "nowhere", "none", "cannot",
    "can't", "cant", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
    "wouldn't", "wouldnt", "shouldn't", "shouldnt", "couldn't", "couldnt", "isn't", "isnt",
    "aren't", "arent", "wasn't", "wasnt", "weren't", "werent", "ain't", "aint", "hardly",
    "barely", "scarcely", "without",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", 1.5), ("really", 1.4), ("so", 1.3), ("extremely", 2.0), ("incredibly", 1.8),
    ("absolutely", 1.8), ("completely", 1.7), ("totally", 1.6), ("utterly", 1.8), ("highly", 1.5),
    ("deeply", 1.5), ("truly", 1.4), ("super", 1.5), ("most", 1.3), ("genuinely", 1.3),
    ("clearly", 1.2), ("slightly", 0.5), ("somewhat", 0.7), ("kinda", 0.7), ("kind", 0.8),
    ("sort", 0.8), ("marginally", 0.5), ("fairly", 0.8), ("relatively", 0.8),
];

const EMOTICONS: &[(&str, f64)] = &[
    (":)", 0.5), (":-)", 0.5), (":D", 0.7), (":-D", 0.7), (";)", 0.4), ("<3", 0.7),
    (":(", -0.5), (":-(", -0.5), (":'(", -0.6), (">:(", -0.7), (":/", -0.3), (":-/", -0.3),
    ("👍", 0.6), ("👏", 0.6), ("❤", 0.7), ("😍", 0.8), ("😊", 0.6), ("🙂", 0.4), ("🔥", 0.5),
    ("🎉", 0.6), ("💯", 0.6), ("👎", -0.6), ("😡", -0.8), ("🤬", -0.9), ("😠", -0.7), ("🤮", -0.8),
    ("😢", -0.5), ("😞", -0.5), ("🙄", -0.4), ("💩", -0.7), ("🤡", -0.6),
];

const CONTRASTIVES: &[&str] = &["but", "however", "although", "though", "yet"];

impl Lexicon {
    fn build() -> Self {
        Self {
            valences: POSITIVE.iter().chain(NEGATIVE.iter()).copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            emoticons: EMOTICONS.iter().copied().collect(),
            contrastives: CONTRASTIVES.iter().copied().collect(),
        }
    }

    /// Valence of a lowercased word.
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    pub fn is_negator(&self, word: &str) -> bool {
        self.negators.contains(word)
    }

    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }

    pub fn is_contrastive(&self, word: &str) -> bool {
        self.contrastives.contains(word)
    }

    /// Emoticon or emoji valence for a raw (untrimmed) token.
    pub fn emoticon(&self, raw: &str) -> Option<f64> {
        let t = raw.trim_end_matches(|c: char| matches!(c, '\u{FE0F}' | '.' | ',' | '!'));
        if let Some(v) = self.emoticons.get(t) {
            return Some(*v);
        }
        // runs of the same emoji ("👍👍👍") count once
        let first: String = t.chars().take(1).collect();
        if !first.is_empty() && t.chars().all(|c| c.to_string() == first || c == '\u{FE0F}') {
            return self.emoticons.get(first.as_str()).copied();
        }
        None
    }
}
