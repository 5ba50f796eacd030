//! Transcoding between the HTML subset Notes.app stores and a small Markdown
//! dialect: `# ` headings, `- [ ] ` / `- [x] ` checklist items, `- ` bullets,
//! `**bold**`, `*italic*`, `~~strike~~` and blank lines.
//!
//! Anything outside that subset is not an error. Unknown tags are stripped
//! when reading and unknown Markdown is carried through as paragraph text
//! when writing. Entities are decoded when reading and `&`, `<`, `>` are
//! encoded when writing, so plain text survives a round trip. Nested tags
//! of the same kind are not handled.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Inline style Notes uses for the large bold title line.
pub const HEADING_STYLE: &str = "font-size: 24px";

pub const LIST_OPEN: &str = "<ul>";
pub const LIST_CLOSE: &str = "</ul>";
pub const BLANK_LINE: &str = "<div><br></div>";

enum Replacement {
    Template(&'static str),
    With(fn(&Captures<'_>) -> String),
}

struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    fn template(name: &'static str, pattern: &str, template: &'static str) -> Self {
        Self {
            name,
            pattern: compile(pattern),
            replacement: Replacement::Template(template),
        }
    }

    fn with(name: &'static str, pattern: &str, f: fn(&Captures<'_>) -> String) -> Self {
        Self {
            name,
            pattern: compile(pattern),
            replacement: Replacement::With(f),
        }
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Template(t) => self.pattern.replace_all(text, *t),
            Replacement::With(f) => self.pattern.replace_all(text, |caps: &Captures<'_>| f(caps)),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid markup pattern {pattern:?}: {e}"))
}

static STRUCK_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?is)^\s*<strike>(.*)</strike>\s*(?:<br\s*/?>)?\s*$"));

/// A list item whose whole text is struck through is a ticked checklist item.
/// Other items are left for the next rule.
fn checked_item(caps: &Captures<'_>) -> String {
    match STRUCK_ITEM_RE.captures(&caps[1]) {
        Some(inner) if !inner[1].to_ascii_lowercase().contains("</strike>") => {
            format!("- [x] {}\n", &inner[1])
        }
        _ => caps[0].to_string(),
    }
}

/// HTML to Markdown rewrite rules. Order matters: each rule may assume the
/// tags consumed by earlier rules are gone.
static HTML_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::with("checked-item", r"(?is)<li(?:\s[^>]*)?>(.*?)</li>", checked_item),
        Rule::template(
            "list-item",
            r"(?is)<li(?:\s[^>]*)?>(.*?)(?:<br\s*/?>)?\s*</li>",
            "- [ ] ${1}\n",
        ),
        Rule::template(
            "heading",
            r#"(?is)<div[^>]*>\s*<b>\s*<span\s+style="font-size:\s*24px;?">(.*?)</span>\s*</b>\s*(?:<br\s*/?>)?\s*</div>"#,
            "# ${1}\n\n",
        ),
        Rule::template("bold", r"(?is)<b>(.*?)</b>", "**${1}**"),
        Rule::template("italic", r"(?is)<i>(.*?)</i>", "*${1}*"),
        Rule::template("strike", r"(?is)<strike>(.*?)</strike>", "~~${1}~~"),
        Rule::template(
            "paragraph",
            r"(?is)<div[^>]*>(.*?)(?:<br\s*/?>)?\s*</div>",
            "${1}\n",
        ),
        Rule::template("list-container", r"(?i)</?(?:ul|ol)(?:\s[^>]*)?>", ""),
        Rule::template("line-break", r"(?i)<br\s*/?>", "\n"),
        Rule::template("any-tag", r"(?s)<[^>]+>", ""),
    ]
});

/// Convert a Notes HTML body into the Markdown dialect.
pub fn html_to_markdown(html: &str) -> String {
    let mut text = html.to_string();
    for rule in HTML_RULES.iter() {
        let rewritten = match rule.apply(&text) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(rewritten) => rewritten,
        };
        tracing::trace!(rule = rule.name, "markup rule applied");
        text = rewritten;
    }
    html_escape::decode_html_entities(&text).trim().to_string()
}

/// Classification of one Markdown line. Variants carry the text after the
/// line's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading(&'a str),
    Checked(&'a str),
    Unchecked(&'a str),
    Bullet(&'a str),
    Paragraph(&'a str),
}

impl<'a> LineKind<'a> {
    pub fn classify(line: &'a str) -> Self {
        if let Some(text) = line.strip_prefix("# ") {
            return LineKind::Heading(text);
        }
        if let Some(text) = checkbox(line, &["- [x]", "- [X]"]) {
            return LineKind::Checked(text);
        }
        if let Some(text) = checkbox(line, &["- [ ]"]) {
            return LineKind::Unchecked(text);
        }
        if let Some(text) = line.strip_prefix("- ") {
            return LineKind::Bullet(text);
        }
        LineKind::Paragraph(line)
    }

    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            LineKind::Checked(_) | LineKind::Unchecked(_) | LineKind::Bullet(_)
        )
    }
}

/// `- [ ] text` or a bare `- [ ]` with nothing after it.
fn checkbox<'a>(line: &'a str, markers: &[&str]) -> Option<&'a str> {
    markers.iter().find_map(|marker| {
        let rest = line.strip_prefix(marker)?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix(' ')
        }
    })
}

static BOLD_RE: Lazy<Regex> = Lazy::new(|| compile(r"\*\*(.+?)\*\*"));
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| compile(r"\*(.+?)\*"));
static STRIKE_RE: Lazy<Regex> = Lazy::new(|| compile(r"~~(.+?)~~"));

/// Bold, then italic, then strikethrough. Bold goes first so `**` is not
/// read as two empty italics.
///
/// `&`, `<` and `>` in the text are encoded first, so literal angle brackets
/// survive a read and write back as text rather than becoming markup.
pub fn render_inline(text: &str) -> String {
    let text = html_escape::encode_text(text);
    let text = BOLD_RE.replace_all(&text, "<b>${1}</b>");
    let text = ITALIC_RE.replace_all(&text, "<i>${1}</i>");
    STRIKE_RE
        .replace_all(&text, "<strike>${1}</strike>")
        .into_owned()
}

/// Emits Notes HTML while tracking whether a `<ul>` is open.
#[derive(Default)]
struct HtmlWriter {
    out: String,
    list_open: bool,
}

impl HtmlWriter {
    fn line(&mut self, kind: LineKind<'_>) {
        if kind.is_list_item() {
            self.open_list();
        } else {
            self.close_list();
        }

        match kind {
            LineKind::Heading(text) => {
                self.out.push_str(&format!(
                    "<div><b><span style=\"{}\">{}</span></b></div>",
                    HEADING_STYLE,
                    html_escape::encode_text(text)
                ));
            }
            LineKind::Checked(text) => {
                self.out
                    .push_str(&format!("<li><strike>{}</strike></li>", render_inline(text)));
            }
            LineKind::Unchecked(text) | LineKind::Bullet(text) => {
                self.out.push_str(&format!("<li>{}</li>", render_inline(text)));
            }
            LineKind::Paragraph(text) if text.trim().is_empty() => {
                self.out.push_str(BLANK_LINE);
            }
            LineKind::Paragraph(text) => {
                self.out.push_str(&format!("<div>{}</div>", render_inline(text)));
            }
        }
    }

    fn open_list(&mut self) {
        if !self.list_open {
            self.out.push_str(LIST_OPEN);
            self.list_open = true;
        }
    }

    fn close_list(&mut self) {
        if self.list_open {
            self.out.push_str(LIST_CLOSE);
            self.list_open = false;
        }
    }

    fn finish(mut self) -> String {
        self.close_list();
        self.out
    }
}

/// Convert the Markdown dialect into Notes HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut writer = HtmlWriter::default();
    for line in markdown.lines() {
        writer.line(LineKind::classify(line));
    }
    writer.finish()
}
