use pulldown_cmark::{html, Options, Parser};
use sohbet_core::Message;

/// Render markdown to HTML.
///
/// Raw HTML in the source passes through untouched: replies come from our
/// own backend and are rendered as-is.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// HTML for a transcript entry: users get escaped text, the assistant gets markdown
pub fn render_message_content(msg: &Message) -> String {
    if msg.is_user() {
        crate::utils::escape_html(&msg.content).replace('\n', "<br>")
    } else {
        render_markdown(&msg.content)
    }
}
