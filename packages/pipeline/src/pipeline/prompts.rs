//! LLM prompts for the summary stage.
//!
//! The summary prompt asks for a tag declaration line, a `---` separator
//! and the summary body. Parsing that shape lives in [`super::summarize`].

/// Prompt for a gears-level summary of one captured page.
pub const SUMMARY_PROMPT: &str = r#"Create a gears-level summary. Goal: knowledge transfer. The reader can run the model themselves.

REQUIREMENTS:
1. Extract ACTUAL ARGUMENTS, not meta-descriptions
   - BAD: "The author argues for X"
   - GOOD: "The argument: A because B. Mechanism: C. Predicts: D."

2. Structure:
   - Core thesis (1-2 sentences)
   - Key mechanisms (how does it work?)
   - Strongest evidence/example
   - Implications (what does this predict?)
   - Breaking conditions (when is this wrong?)

3. For non-content pages (applications, tools):
   - What is it?
   - Requirements/deadlines
   - Action required?

DO NOT include author/date/source header. That's in frontmatter.
DO NOT repeat tags in the summary body.
Keep it 200-400 words. Dense. No fluff.

{tag_instructions}

FORMAT:
TAGS: tag1, tag2, tag3
---
[Summary in markdown, starting directly with core thesis]

---
USER NOTE: {note}
URL: {url}
CONTENT:
{content}
"#;

/// Tag-selection block, included only when a tag vocabulary is configured.
pub const TAG_INSTRUCTIONS: &str = r#"
Select 3-5 tags from this library. Use exact names.

AVAILABLE TAGS:
{tag_library}
"#;

/// Placeholder for an absent user note.
pub const NO_NOTE: &str = "(none)";

/// Substitute `{key}` placeholders in one pass.
///
/// Values are inserted verbatim and never rescanned, so page content that
/// happens to contain `{url}` stays as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find_map(|(key, value)| {
            let end = key.len() + 2;
            (tail.len() >= end && tail[1..].starts_with(key) && tail[end - 1..].starts_with('}'))
                .then_some((end, *value))
        });
        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Format the tag instructions, or nothing for a blank vocabulary.
pub fn format_tag_instructions(tag_vocabulary: &str) -> String {
    if tag_vocabulary.trim().is_empty() {
        return String::new();
    }
    fill(TAG_INSTRUCTIONS, &[("tag_library", tag_vocabulary)])
}

/// Format the summary prompt.
pub fn format_summary_prompt(url: &str, content: &str, note: &str, tag_vocabulary: &str) -> String {
    let tag_instructions = format_tag_instructions(tag_vocabulary);
    let note = if note.trim().is_empty() { NO_NOTE } else { note };

    fill(
        SUMMARY_PROMPT,
        &[
            ("tag_instructions", tag_instructions.as_str()),
            ("note", note),
            ("url", url),
            ("content", content),
        ],
    )
}
