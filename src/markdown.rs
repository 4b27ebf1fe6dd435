use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format html: {0}")]
    Format(#[from] std::io::Error),
    #[error("rendered html is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn options() -> comrak::Options {
    let mut options = comrak::Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

/// Renders CommonMark (plus a few GFM extensions) to HTML. Raw HTML in the
/// source is escaped.
pub fn render(markdown: &str) -> Result<String, RenderError> {
    let options = options();
    let arena = comrak::Arena::new();
    let root = comrak::parse_document(&arena, markdown, &options);

    process_nodes(root);

    let mut html = Vec::new();
    comrak::format_html(root, &options, &mut html)?;
    Ok(String::from_utf8(html)?)
}

pub async fn render_async(markdown: String) -> Result<String, RenderError> {
    tokio::task::spawn_blocking(move || render(&markdown)).await?
}

fn process_nodes<'a>(node: &'a comrak::nodes::AstNode<'a>) {
    process_node(node);
    for child in node.children() {
        process_nodes(child);
    }
}

fn process_node<'a>(node: &'a comrak::nodes::AstNode<'a>) {
    match &mut node.data.borrow_mut().value {
        comrak::nodes::NodeValue::Image(link) => process_link(link),
        comrak::nodes::NodeValue::Link(link) => process_link(link),
        _ => (),
    }
}

// `post:some-slug` links to another post's public page
fn process_link(link: &mut comrak::nodes::NodeLink) {
    if let Some(slug) = link.url.strip_prefix("post:") {
        if crate::blog::is_valid_slug(slug) {
            link.url = format!("/posts/{slug}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_commonmark() {
        let html = render("# Hello\n\nSome *text*.").unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn renders_gfm_extensions() {
        let html = render("~~gone~~\n\n| a |\n|---|\n| b |\n").unwrap();
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn escapes_raw_html() {
        let html = render("<script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn rewrites_post_links() {
        let html = render("[other](post:other-post)").unwrap();
        assert!(html.contains(r#"href="/posts/other-post""#));
    }

    #[test]
    fn leaves_bad_post_links_alone() {
        let html = render("[other](post:../x)").unwrap();
        assert!(!html.contains("/posts/"));
    }

    #[test]
    fn reserved_slugs_are_not_post_links() {
        let html = render("[x](post:admin)").unwrap();
        assert!(!html.contains(r#"href="/posts/admin""#));
    }

    #[tokio::test]
    async fn renders_on_blocking_pool() {
        let html = render_async("plain".to_owned()).await.unwrap();
        assert_eq!(html.trim(), "<p>plain</p>");
    }
}
