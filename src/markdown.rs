use pulldown_cmark::{Event, Options, Parser};

/// Renders Markdown to HTML. Raw HTML in the source is emitted as text, so
/// user supplied fields can be spliced into templates safely.
pub fn to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

/// Backslash-escapes Markdown punctuation so `text` renders literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.' | '!' | '|' | '>' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
