//! PR body rendering
//!
//! A composed body has three parts: metadata lines, the user's text, and a
//! generated stack block closed by a footer. [`extract_original_body`]
//! recovers the user's text so re-runs only rewrite the generated parts.

/// Marker opening the generated stack block
pub const STACK_MARKER: &str = "<!-- jjsp:stack -->";
/// Marker opening the footer
pub const FOOTER_MARKER: &str = "<!-- jjsp:footer -->";
const STACK_HEADING: &str = "### Stack";
const SECTION_MARKERS: &[&str] = &[STACK_MARKER, FOOTER_MARKER, STACK_HEADING];

const POSITION_PREFIX: &str = "**Stack position:**";
const BASE_PREFIX: &str = "**Base:**";
const DEPENDS_PREFIX: &str = "**Depends on:**";
const METADATA_PREFIXES: &[&str] = &[POSITION_PREFIX, BASE_PREFIX, DEPENDS_PREFIX];

const FOOTER: &str = "<sub>Stack managed by jjsp</sub>";

/// One chain member as shown in the stack block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Head bookmark
    pub bookmark: String,
    /// PR number, once the PR exists
    pub pr_number: Option<u64>,
}

/// Everything needed to render one PR body
#[derive(Debug, Clone, Copy)]
pub struct DescriptionContext<'a> {
    /// Branch the bottom PR targets
    pub base_branch: &'a str,
    /// Chain members, base to tip
    pub entries: &'a [StackEntry],
    /// Index of the PR being rendered in `entries`
    pub index: usize,
    /// User text: the preserved body, or the commit message
    pub body: &'a str,
}

fn pr_suffix(entry: &StackEntry) -> String {
    entry
        .pr_number
        .map(|n| format!(" #{n}"))
        .unwrap_or_default()
}

/// Render a PR body
pub fn compose_description(ctx: &DescriptionContext<'_>) -> String {
    let total = ctx.entries.len();
    let position = ctx.index + 1;
    let previous = ctx.index.checked_sub(1).and_then(|i| ctx.entries.get(i));
    let base = previous.map_or(ctx.base_branch, |p| p.bookmark.as_str());

    let mut lines: Vec<String> = vec![
        format!("{POSITION_PREFIX} {position} of {total}"),
        format!("{BASE_PREFIX} `{base}`"),
    ];
    if let Some(number) = previous.and_then(|p| p.pr_number) {
        lines.push(format!("{DEPENDS_PREFIX} #{number}"));
    }
    lines.push(String::new());

    if !ctx.body.trim().is_empty() {
        lines.push(ctx.body.to_string());
        lines.push(String::new());
    }

    lines.push(STACK_MARKER.to_string());
    lines.push("---".to_string());
    lines.push(STACK_HEADING.to_string());
    for (i, entry) in ctx.entries.iter().enumerate().rev() {
        let n = i + 1;
        let suffix = pr_suffix(entry);
        if i == ctx.index {
            lines.push(format!("{n}. **`{}`{suffix}** ← this PR", entry.bookmark));
        } else {
            lines.push(format!("{n}. `{}`{suffix}", entry.bookmark));
        }
    }
    lines.push(format!("→ `{}`", ctx.base_branch));
    lines.push(String::new());
    lines.push(FOOTER_MARKER.to_string());
    lines.push(FOOTER.to_string());

    lines.join("\n")
}

fn is_metadata(line: &str) -> bool {
    let trimmed = line.trim_start();
    METADATA_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

fn is_section_marker(line: &str) -> bool {
    SECTION_MARKERS.iter().any(|m| line.contains(m))
}

/// Recover the user's text from a PR body
///
/// Content starts at the first line that is neither blank nor metadata and
/// ends before the first section marker. Trailing blank lines are dropped.
/// A body this tool never composed comes back as written, minus leading
/// and trailing blank lines.
pub fn extract_original_body(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines
        .iter()
        .position(|l| !l.trim().is_empty() && !is_metadata(l))
    else {
        return String::new();
    };

    let end = lines[start..]
        .iter()
        .position(|l| is_section_marker(l))
        .map_or(lines.len(), |i| start + i);

    let mut content = &lines[start..end];
    while let Some((last, rest)) = content.split_last()
        && last.trim().is_empty()
    {
        content = rest;
    }
    content.join("\n")
}
