use regex::Regex;
use std::sync::OnceLock;

fn excess_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex is valid"))
}

fn empty_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(\s*\)").expect("static regex is valid"))
}

fn bare_bullet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]*$").expect("static regex is valid"))
}

/// Tidies converter output for LLM consumption
///
/// Trims trailing whitespace on every line, unwraps links with no target,
/// drops list bullets with no text and collapses runs of blank lines. Leading
/// indentation is kept so nested lists and code blocks survive.
///
/// # Example
///
/// ```
/// use web_context_builder::content::clean_markdown;
///
/// let raw = "# Title   \n\n\n\n* \n[home]()\n";
/// assert_eq!(clean_markdown(raw), "# Title\n\nhome");
/// ```
pub fn clean_markdown(markdown: &str) -> String {
    let trimmed: String = markdown
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    let unlinked = empty_link().replace_all(&trimmed, "$1");
    let unbulleted = bare_bullet().replace_all(&unlinked, "");
    let collapsed = excess_newlines().replace_all(&unbulleted, "\n\n");

    collapsed.trim().to_string()
}
