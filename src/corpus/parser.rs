//! Heading-driven document parser.
//!
//! Parsing is a small state machine over lines. Heading lines move the
//! machine between sections; content lines are appended to the buffer of the
//! current section. Lines that arrive while no recognized section is open
//! stay in `raw_text` only. The parser is total: every input produces a
//! `Document`, possibly with empty structured fields.

use super::document::{DocId, Document};

/// Parser state: which section content lines currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Before any recognized section heading.
    Preamble,
    Symptoms,
    RootCause,
    Verify,
    Fix,
    /// Under a heading that is not a recognized section.
    Body,
}

impl ParseState {
    const fn collects(self) -> bool {
        !matches!(self, Self::Preamble | Self::Body)
    }
}

const TITLE_KEYS: &[&str] = &["title", "issue", "problem"];

// Checked in order; the first matching section wins.
const SECTION_KEYWORDS: &[(ParseState, &[&str])] = &[
    (ParseState::Symptoms, &["symptom", "signs", "observed"]),
    (ParseState::RootCause, &["root cause", "cause", "why"]),
    (
        ParseState::Verify,
        &["verif", "diagnos", "check", "confirm", "investigat"],
    ),
    (
        ParseState::Fix,
        &["fix", "remediat", "resolution", "solution", "mitigat", "resolve"],
    ),
];

/// Headings ending in `:` longer than this are treated as prose.
const MAX_COLON_HEADING_WORDS: usize = 6;

/// Keys of `Key: value` lines longer than this are not section keys.
const MAX_KEY_WORDS: usize = 4;

/// Map heading text to the section it introduces, if any.
pub fn section_for_heading(text: &str) -> Option<ParseState> {
    let lowered = text.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(state, _)| *state)
}

#[derive(Debug, Default)]
struct Buffers {
    title: String,
    symptoms: Vec<String>,
    root_causes: Vec<String>,
    verify_steps: Vec<String>,
    fix_steps: Vec<String>,
}

impl Buffers {
    fn section_mut(&mut self, state: ParseState) -> Option<&mut Vec<String>> {
        match state {
            ParseState::Symptoms => Some(&mut self.symptoms),
            ParseState::RootCause => Some(&mut self.root_causes),
            ParseState::Verify => Some(&mut self.verify_steps),
            ParseState::Fix => Some(&mut self.fix_steps),
            ParseState::Preamble | ParseState::Body => None,
        }
    }

    fn push(&mut self, state: ParseState, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        match self.section_mut(state) {
            Some(items) => {
                items.push(item.to_string());
                true
            }
            None => false,
        }
    }

    fn continue_last(&mut self, state: ParseState, text: &str) -> bool {
        match self.section_mut(state).and_then(|items| items.last_mut()) {
            Some(last) => {
                last.push(' ');
                last.push_str(text.trim());
                true
            }
            None => false,
        }
    }

    fn set_title(&mut self, title: &str) {
        if self.title.is_empty() {
            self.title = strip_emphasis(title).to_string();
        }
    }

    fn finish(self, id: DocId, raw: &str) -> Document {
        Document {
            id,
            title: self.title,
            symptoms: self.symptoms,
            root_causes: self.root_causes,
            verify_steps: self.verify_steps,
            fix_steps: self.fix_steps,
            raw_text: raw.to_string(),
        }
    }
}

/// A line classified before it is applied to the state machine.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Fence,
    Rule,
    /// Markdown heading with its level and text.
    Heading(usize, &'a str),
    /// Bold-only line.
    Label(&'a str),
    /// Short line ending in `:` whose text names no section.
    LeadIn,
    /// `Key: value` line with a recognized key.
    KeyValue(&'a str, &'a str),
    ListItem(&'a str),
    Continuation(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        return Line::Fence;
    }
    if is_rule(trimmed) {
        return Line::Rule;
    }
    if trimmed.starts_with('#') {
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        let text = trimmed[level..].trim().trim_end_matches('#').trim();
        if !text.is_empty() {
            return Line::Heading(level, strip_label(text));
        }
    }
    if let Some(item) = strip_list_marker(trimmed) {
        return Line::ListItem(item);
    }
    if let Some(inner) = bold_line(trimmed) {
        return Line::Label(strip_label(inner));
    }
    if let Some((key, value)) = trimmed.split_once(':') {
        let key = key.trim();
        let value = value.trim();
        if is_key(key) {
            let lowered = key.to_lowercase();
            let recognized = TITLE_KEYS.contains(&lowered.as_str())
                || section_for_heading(key).is_some();
            if recognized {
                return Line::KeyValue(key, value);
            }
            if value.is_empty() && key.split_whitespace().count() <= MAX_COLON_HEADING_WORDS {
                return Line::LeadIn;
            }
        }
    }
    if line.starts_with(char::is_whitespace) {
        return Line::Continuation(trimmed);
    }
    Line::Text(trimmed)
}

/// Parse one raw document into structured fields.
pub fn parse_document(id: DocId, raw: &str) -> Document {
    let mut buffers = Buffers::default();
    let mut state = ParseState::Preamble;
    let mut in_fence = false;
    let mut item_open = false;

    for line in raw.lines() {
        if in_fence {
            if matches!(classify(line), Line::Fence) {
                in_fence = false;
            } else {
                buffers.push(state, line);
            }
            item_open = false;
            continue;
        }

        match classify(line) {
            Line::Blank | Line::Rule => item_open = false,
            Line::Fence => {
                in_fence = true;
                item_open = false;
            }
            Line::Heading(level, text) => {
                let section = section_for_heading(text);
                let opens_section = section.is_some() && is_section_label(text);
                if level == 1 && buffers.title.is_empty() && !opens_section {
                    buffers.set_title(text);
                    state = ParseState::Preamble;
                } else {
                    state = section.unwrap_or(ParseState::Body);
                }
                item_open = false;
            }
            Line::Label(text) => {
                state = section_for_heading(text).unwrap_or(ParseState::Body);
                item_open = false;
            }
            // "Events show:" inside a section introduces more of the same list.
            Line::LeadIn => {
                if !state.collects() {
                    state = ParseState::Body;
                }
                item_open = false;
            }
            Line::KeyValue(key, value) => {
                if TITLE_KEYS.contains(&key.to_lowercase().as_str()) {
                    if buffers.title.is_empty() {
                        buffers.set_title(value);
                        item_open = false;
                    } else {
                        item_open = buffers.push(state, value);
                    }
                } else {
                    state = section_for_heading(key).unwrap_or(ParseState::Body);
                    item_open = buffers.push(state, value);
                }
            }
            Line::ListItem(text) | Line::Text(text) => {
                item_open = buffers.push(state, text);
            }
            Line::Continuation(text) => {
                if item_open && state.collects() {
                    buffers.continue_last(state, text);
                } else {
                    item_open = buffers.push(state, text);
                }
            }
        }
    }

    buffers.finish(id, raw)
}

/// Strip a leading bullet, enumeration or checkbox marker.
pub fn strip_list_marker(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let rest = ["- ", "* ", "+ ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .or_else(|| strip_enumeration(line))?;
    let rest = rest.trim_start();
    let rest = ["[ ] ", "[x] ", "[X] "]
        .iter()
        .find_map(|checkbox| rest.strip_prefix(checkbox))
        .unwrap_or(rest);
    Some(rest.trim())
}

fn strip_enumeration(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3
        && (line.chars().all(|c| c == '-')
            || line.chars().all(|c| c == '*')
            || line.chars().all(|c| c == '_')
            || line.chars().all(|c| c == '='))
}

fn bold_line(line: &str) -> Option<&str> {
    ["**", "__"].iter().find_map(|mark| {
        line.strip_prefix(mark)
            .and_then(|rest| rest.strip_suffix(mark))
            .map(str::trim)
            .filter(|inner| !inner.is_empty() && !inner.contains(*mark))
    })
}

/// A first `#` heading only opens a section when it reads like a section
/// name; "DNS resolution failures inside pods" is a title.
fn is_section_label(text: &str) -> bool {
    text.split_whitespace().count() <= MAX_KEY_WORDS
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key.split_whitespace().count() <= MAX_KEY_WORDS
        && key
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '/' || c == '-' || c == '&')
}

fn strip_label(text: &str) -> &str {
    strip_emphasis(text.trim().trim_end_matches(':')).trim_end_matches(':').trim()
}

fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches('*').trim_matches('_').trim()
}
