use include_dir::{include_dir, Dir};
use rocket::response::content::RawHtml;

use crate::error::VoteError;

static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const VOTE_PLACEHOLDER: &str = "{{Vote}}";

/// Renders the embedded page templates.
///
/// Templates are plain HTML with a single `{{Vote}}` placeholder.
#[derive(Debug, Clone, Copy)]
pub struct PageRenderer {
    templates: &'static Dir<'static>,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self { templates: &TEMPLATES }
    }
}

impl PageRenderer {
    pub fn render(&self, name: &str, vote: &str) -> Result<RawHtml<String>, VoteError> {
        let path = format!("{name}.html");
        let template = self
            .templates
            .get_file(&path)
            .and_then(|file| file.contents_utf8())
            .ok_or_else(|| VoteError::Render {
                name: name.to_string(),
                reason: format!("no template at templates/{path}"),
            })?;

        Ok(RawHtml(template.replace(VOTE_PLACEHOLDER, &escape_html(vote))))
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
