use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::OnceLock;

// Confidence rule table. OCR screenshots show several numbers (goal, current
// count, calories, distance) with no layout grammar, so every extraction pass
// scores its candidates and selection falls through a fixed ladder instead of
// failing hard. Values divisible by 1000 are treated as likely goals.
pub const CONF_NEAR_TOTAL: f64 = 0.995;
pub const CONF_TOTAL_PATTERN: f64 = 0.99;
pub const CONF_NEAR_TODAY: f64 = 0.99;
pub const CONF_STEPS_PATTERN: f64 = 0.98;
pub const CONF_TODAY_PATTERN: f64 = 0.97;
pub const CONF_NEAR_STEP: f64 = 0.95;
pub const CONF_THREE_DIGIT_KEYWORD: f64 = 0.95;
pub const CONF_COMMA_GROUPED: f64 = 0.9;
pub const CONF_FOUR_DIGIT: f64 = 0.85;
pub const CONF_SPLIT_NUMBER: f64 = 0.75;
pub const CONF_COMMA_ROUND_HUNDRED: f64 = 0.7;
pub const CONF_THREE_DIGIT_BARE: f64 = 0.7;
pub const CONF_WIDE_RANGE: f64 = 0.7;
pub const CONF_ROUND_THOUSAND: f64 = 0.3;
pub const CONF_COMMA_ROUND_THOUSAND: f64 = 0.2;
pub const CONF_TOKEN_TYPICAL: f64 = 0.92;
pub const CONF_TOKEN_LARGE: f64 = 0.7;
pub const CONF_TOKEN_ROUND: f64 = 0.15;
pub const CONF_COMMON_GOAL: f64 = 0.1;
pub const PROMINENCE_BONUS: f64 = 0.2;
pub const PROMINENCE_NON_ROUND_BONUS: f64 = 0.1;

/// Displayed targets fitness apps ship with; near-certain to be goals.
pub const COMMON_GOAL_VALUES: [u64; 4] = [5000, 8000, 10000, 12000];
pub const GOAL_EXCLUDE_MIN: u64 = 1000;
pub const MIN_PROMINENT_AREA: f64 = 1000.0;
pub const CONFIDENCE_BAND: f64 = 0.1;
pub const AREA_BAND: f64 = 100.0;
pub const SELECT_MIN_CONFIDENCE: f64 = 0.99;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        ((self.x1 - self.x0) * (self.y1 - self.y0)).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone)]
struct Candidate {
    value: u64,
    confidence: f64,
    area: Option<f64>,
}

struct Patterns {
    goal: Vec<Regex>,
    comma_grouped: Regex,
    total: Vec<Regex>,
    steps: Vec<Regex>,
    today: Vec<Regex>,
    three_digit: Regex,
    four_to_six_digit: Regex,
    split_number: Regex,
    four_digit: Regex,
    any_number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        goal: vec![
            compile(r"(?i)goal\s*:?\s*(\d{1,3}(?:,\d{3})*|\d{3,6})"),
            compile(r"(?i)target\s*:?\s*(\d{1,3}(?:,\d{3})*|\d{3,6})"),
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s*goal"),
        ],
        comma_grouped: compile(r"\d{1,3}(?:,\d{3})+"),
        total: vec![
            compile(r"(?i)total\s+(\d{1,3}(?:,\d{3})*|\d{3,6})\s+steps?"),
            compile(r"(?i)total\s+steps?\s*:?\s*(\d{1,3}(?:,\d{3})*|\d{3,6})"),
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s+steps?\s+total"),
        ],
        steps: vec![
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s+steps?"),
            compile(r"(?i)steps?\s*:?\s*(\d{1,3}(?:,\d{3})*|\d{3,6})"),
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s+st\b"),
        ],
        today: vec![
            compile(r"(?i)today\s*:?\s*(\d{1,3}(?:,\d{3})*|\d{3,6})"),
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s+today"),
            compile(r"(?i)(\d{1,3}(?:,\d{3})*|\d{3,6})\s+steps?\s+today"),
            compile(r"(?i)today\s+(\d{1,3}(?:,\d{3})*|\d{3,6})\s+steps?"),
        ],
        three_digit: compile(r"\b\d{3}\b"),
        four_to_six_digit: compile(r"\b\d{4,6}\b"),
        split_number: compile(r"\d{1,2}\s+\d{3,4}\b"),
        four_digit: compile(r"\b\d{4}\b"),
        any_number: compile(r"\d{1,3}(?:,\d{3})*|\d{3,6}"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid extraction pattern")
}

/// Best-guess step count from recognized screenshot text, or 0 when nothing
/// plausible is found. Pure; word tokens (with bounding boxes) are optional
/// and feed the visual-prominence pass.
pub fn extract_step_count(text: &str, words: &[RecognizedWord]) -> u64 {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let p = patterns();

    // Goal/target numbers are excluded from every later pass.
    let mut excluded: HashSet<u64> = HashSet::new();
    for re in &p.goal {
        for caps in re.captures_iter(&clean) {
            if let Some(value) = caps.get(1).and_then(|m| parse_grouped(m.as_str())) {
                if value >= GOAL_EXCLUDE_MIN {
                    excluded.insert(value);
                }
            }
        }
    }

    // First-seen scoring wins on duplicate values, so pass order matters.
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    for m in p.comma_grouped.find_iter(&clean) {
        let Some(value) = parse_grouped(m.as_str()) else {
            continue;
        };
        if (100..=1_000_000).contains(&value) && !excluded.contains(&value) {
            let confidence = if value % 1000 == 0 {
                CONF_COMMA_ROUND_THOUSAND
            } else if value % 100 == 0 {
                CONF_COMMA_ROUND_HUNDRED
            } else {
                CONF_COMMA_GROUPED
            };
            push_candidate(&mut candidates, &mut seen, value, confidence, None);
        }
    }

    for (regexes, confidence) in [
        (&p.total, CONF_TOTAL_PATTERN),
        (&p.steps, CONF_STEPS_PATTERN),
        (&p.today, CONF_TODAY_PATTERN),
    ] {
        for re in regexes.iter() {
            for caps in re.captures_iter(&clean) {
                let Some(value) = caps.get(1).and_then(|m| parse_grouped(m.as_str())) else {
                    continue;
                };
                if (100..=1_000_000).contains(&value) && !excluded.contains(&value) {
                    push_candidate(&mut candidates, &mut seen, value, confidence, None);
                }
            }
        }
    }

    // Bare 3-digit numbers: legitimate early-day counts like 981.
    for m in p.three_digit.find_iter(&clean) {
        let Some(value) = parse_grouped(m.as_str()) else {
            continue;
        };
        if (100..=999).contains(&value) && !excluded.contains(&value) {
            let context = window(&clean, m.start(), 30, 30).to_lowercase();
            let confidence = if context.contains("total") || context.contains("step") {
                CONF_THREE_DIGIT_KEYWORD
            } else {
                CONF_THREE_DIGIT_BARE
            };
            push_candidate(&mut candidates, &mut seen, value, confidence, None);
        }
    }

    for m in p.four_to_six_digit.find_iter(&clean) {
        let Some(value) = parse_grouped(m.as_str()) else {
            continue;
        };
        if (1000..=100_000).contains(&value) && !excluded.contains(&value) {
            let confidence = if value % 1000 == 0 {
                CONF_ROUND_THOUSAND
            } else {
                CONF_WIDE_RANGE
            };
            push_candidate(&mut candidates, &mut seen, value, confidence, None);
        }
    }

    // OCR sometimes splits a grouped number on the comma: "6,162" -> "6 162".
    for m in p.split_number.find_iter(&clean) {
        let joined: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
        let Some(value) = parse_grouped(&joined) else {
            continue;
        };
        if (1000..=100_000).contains(&value) && !excluded.contains(&value) {
            push_candidate(&mut candidates, &mut seen, value, CONF_SPLIT_NUMBER, None);
        }
    }

    for m in p.four_digit.find_iter(&clean) {
        let Some(value) = parse_grouped(m.as_str()) else {
            continue;
        };
        if (1000..=50_000).contains(&value) && !excluded.contains(&value) {
            let confidence = if value % 1000 == 0 {
                CONF_ROUND_THOUSAND
            } else {
                CONF_FOUR_DIGIT
            };
            push_candidate(&mut candidates, &mut seen, value, confidence, None);
        }
    }

    // Word tokens ranked by bounding-box area: the headline count is drawn
    // bigger than everything else on screen.
    let mut tokens: Vec<(u64, f64)> = words
        .iter()
        .filter_map(|word| {
            let digits: String = word
                .text
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            let value = digits.parse::<u64>().ok()?;
            if (1000..=100_000).contains(&value) && !excluded.contains(&value) {
                Some((value, word.bbox.area()))
            } else {
                None
            }
        })
        .collect();
    tokens.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (index, (value, area)) in tokens.iter().enumerate() {
        let round = value % 1000 == 0;
        let mut confidence = if (1000..=50_000).contains(value) {
            if round {
                CONF_TOKEN_ROUND
            } else {
                CONF_TOKEN_TYPICAL
            }
        } else {
            CONF_TOKEN_LARGE
        };
        if index == 0 && *area > MIN_PROMINENT_AREA {
            confidence += PROMINENCE_BONUS;
            if !round {
                confidence += PROMINENCE_NON_ROUND_BONUS;
            }
        }
        if COMMON_GOAL_VALUES.contains(value) {
            confidence = CONF_COMMON_GOAL;
        }
        push_candidate(
            &mut candidates,
            &mut seen,
            *value,
            confidence.min(1.0),
            Some(*area),
        );
    }

    // Proximity windows around the first keyword occurrence. Indices come
    // from the same string they slice; lowercasing a copy can shift byte
    // offsets for non-ASCII OCR output.
    if let Some(index) = find_ascii_ci(&clean, "total") {
        for value in numbers_in(p, window(&clean, index, 10, 40)) {
            if (100..=100_000).contains(&value) && !excluded.contains(&value) {
                push_candidate(&mut candidates, &mut seen, value, CONF_NEAR_TOTAL, None);
            }
        }
    }
    if let Some(index) = find_ascii_ci(&clean, "today") {
        for value in numbers_in(p, window(&clean, index, 30, 30)) {
            if (100..=100_000).contains(&value) && !excluded.contains(&value) {
                push_candidate(&mut candidates, &mut seen, value, CONF_NEAR_TODAY, None);
            }
        }
    }
    if let Some(index) = find_ascii_ci(&clean, "step") {
        let goal_nearby = window(&clean, index, 20, 20)
            .to_ascii_lowercase()
            .contains("goal");
        if !goal_nearby {
            for value in numbers_in(p, window(&clean, index, 30, 30)) {
                if (100..=100_000).contains(&value) && !excluded.contains(&value) {
                    push_candidate(&mut candidates, &mut seen, value, CONF_NEAR_STEP, None);
                }
            }
        }
    }

    candidates.sort_by(compare_candidates);

    select(&candidates)
}

fn select(candidates: &[Candidate]) -> u64 {
    // Tier 1: keyword-anchored near-certainty.
    if let Some(c) = candidates
        .iter()
        .find(|c| c.confidence >= SELECT_MIN_CONFIDENCE)
    {
        return c.value;
    }
    // Tier 2: visually dominant non-round token.
    if let Some(c) = candidates
        .iter()
        .find(|c| c.area.is_some_and(|a| a > MIN_PROMINENT_AREA) && c.value % 1000 != 0)
    {
        return c.value;
    }
    // Tier 3: non-round value in the typical daily range.
    if let Some(c) = candidates
        .iter()
        .find(|c| (100..=50_000).contains(&c.value) && c.value % 1000 != 0)
    {
        return c.value;
    }
    // Tier 4: any non-round value we scored above coin-flip.
    if let Some(c) = candidates
        .iter()
        .find(|c| c.value % 1000 != 0 && c.confidence > 0.5)
    {
        return c.value;
    }
    // Tier 5: whatever survived the passes, round or not.
    candidates.first().map(|c| c.value).unwrap_or(0)
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    if (a.confidence - b.confidence).abs() > CONFIDENCE_BAND {
        return b.confidence.total_cmp(&a.confidence);
    }
    if let (Some(a_area), Some(b_area)) = (a.area, b.area) {
        if (a_area - b_area).abs() > AREA_BAND {
            return b_area.total_cmp(&a_area);
        }
    }
    let a_round = a.value % 1000 == 0;
    let b_round = b.value % 1000 == 0;
    if a_round != b_round {
        return if a_round {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    b.value.cmp(&a.value)
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    seen: &mut HashSet<u64>,
    value: u64,
    confidence: f64,
    area: Option<f64>,
) {
    if seen.insert(value) {
        candidates.push(Candidate {
            value,
            confidence,
            area,
        });
    }
}

fn numbers_in(p: &Patterns, context: &str) -> Vec<u64> {
    p.any_number
        .find_iter(context)
        .filter_map(|m| parse_grouped(m.as_str()))
        .collect()
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn parse_grouped(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits.parse::<u64>().ok()
}

fn window(text: &str, center: usize, before: usize, after: usize) -> &str {
    let mut start = center.saturating_sub(before);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (center + after).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}
