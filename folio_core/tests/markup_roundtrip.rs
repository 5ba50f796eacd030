use folio_core::connectors::apple_notes::markup::{html_to_markdown, markdown_to_html};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn checklist_round_trip() {
    let md = "- [ ] unchecked\n- [x] checked";
    let html = markdown_to_html(md);
    assert_eq!(
        html,
        "<ul><li>unchecked</li><li><strike>checked</strike></li></ul>"
    );
    let back = html_to_markdown(&html);
    assert!(back.contains("- [ ] unchecked"));
    assert!(back.contains("- [x] checked"));
}

#[test]
fn inline_formatting_round_trip() {
    let back = html_to_markdown(&markdown_to_html("**bold** and *italic*"));
    assert!(back.contains("**bold**"));
    assert!(back.contains("*italic*"));
    assert_eq!(back, "**bold** and *italic*");
}

#[test]
fn strikethrough_in_paragraph_round_trip() {
    let html = markdown_to_html("keep ~~drop~~");
    assert_eq!(html, "<div>keep <strike>drop</strike></div>");
    assert_eq!(html_to_markdown(&html), "keep ~~drop~~");
}

#[test]
fn heading_round_trip() {
    let html = markdown_to_html("# My Title");
    assert_eq!(
        html,
        "<div><b><span style=\"font-size: 24px\">My Title</span></b></div>"
    );
    assert_eq!(html_to_markdown(&html), "# My Title");
}

#[test]
fn one_list_per_run_of_list_lines() {
    let md = "intro\n- a\n- [ ] b\n- [x] c\nmiddle\n- d\n\n- e";
    let html = markdown_to_html(md);
    assert_eq!(count(&html, "<ul>"), 3);
    assert_eq!(count(&html, "</ul>"), 3);
    assert_eq!(
        html,
        "<div>intro</div>\
         <ul><li>a</li><li>b</li><li><strike>c</strike></li></ul>\
         <div>middle</div>\
         <ul><li>d</li></ul>\
         <div><br></div>\
         <ul><li>e</li></ul>"
    );
}

#[test]
fn list_at_end_of_input_is_closed() {
    let html = markdown_to_html("- only");
    assert!(html.ends_with("</ul>"));
}

#[test]
fn lists_never_nest() {
    let html = markdown_to_html("- a\n# H\n- b\ntext\n- c");
    let mut depth = 0i32;
    let mut rest = html.as_str();
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos..];
        if rest.starts_with("<ul>") {
            depth += 1;
            assert_eq!(depth, 1, "nested list in {html}");
        } else if rest.starts_with("</ul>") {
            depth -= 1;
        }
        rest = &rest[1..];
    }
    assert_eq!(depth, 0);
}

#[test]
fn mixed_document_reads_back() {
    let md = "# Groceries\n\n- [ ] eggs\n- [x] milk\n\n**Notes**: buy *fresh*";
    let back = html_to_markdown(&markdown_to_html(md));
    assert_eq!(
        back,
        "# Groceries\n\n\n- [ ] eggs\n- [x] milk\n\n**Notes**: buy *fresh*"
    );
}

#[test]
fn notes_app_markup_reads_as_markdown() {
    let html = concat!(
        "<div><b><span style=\"font-size: 24px\">Trip</span></b><br></div>",
        "<div>Pack <i>light</i>&nbsp;&amp; early<br></div>",
        "<ul class=\"Apple-dash-list\">",
        "<li>passport<br></li>",
        "<li><strike>tickets</strike><br></li>",
        "</ul>",
        "<div><br></div>",
        "<div><font color=\"#ff0000\">red</font> text</div>"
    );
    assert_eq!(
        html_to_markdown(html),
        "# Trip\n\nPack *light*\u{a0}& early\n- [ ] passport\n- [x] tickets\n\nred text"
    );
}

#[test]
fn malformed_html_is_not_an_error() {
    let back = html_to_markdown("<div><b>unclosed <i>tags</div><ul><li>x");
    assert!(!back.contains('<'));
    assert!(back.contains("unclosed"));
}

#[test]
fn plain_text_without_markup_passes_through() {
    assert_eq!(html_to_markdown("just text"), "just text");
    assert_eq!(markdown_to_html("just text"), "<div>just text</div>");
}

#[test]
fn escaped_markup_in_text_survives_read_and_write_back() {
    let stored = "<div>use &lt;b&gt;x&lt;/b&gt; here</div>";
    let md = html_to_markdown(stored);
    assert_eq!(md, "use <b>x</b> here");
    assert_eq!(markdown_to_html(&md), stored);
}

#[test]
fn ampersand_and_angle_brackets_are_encoded() {
    assert_eq!(
        markdown_to_html("Tom & Jerry <3"),
        "<div>Tom &amp; Jerry &lt;3</div>"
    );
    assert_eq!(
        markdown_to_html("- [x] a > b"),
        "<ul><li><strike>a &gt; b</strike></li></ul>"
    );
}
