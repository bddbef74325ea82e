//! HTML page templates.
//!
//! Every page shares one layout: the document tree on the left, the page body
//! in the middle and, for documents, the table of contents on the right.

use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use specview_renderer::{TocEntry, escape_html};
use specview_storage::DocEntry;

/// Characters escaped in the `file` query parameter. `/` stays readable.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Element id of the rendered document; the live reload client swaps its
/// content in place.
pub(crate) const CONTENT_ID: &str = "spec-content";

/// Everything the layout needs besides the page body.
pub(crate) struct PageData<'a> {
    pub(crate) title: &'a str,
    pub(crate) tree: &'a [DocEntry],
    /// Root-relative path of the open document.
    pub(crate) active: Option<&'a str>,
    pub(crate) toc: &'a [TocEntry],
    pub(crate) live_reload: bool,
}

/// Link to the full page view of a document.
pub(crate) fn view_href(path: &str) -> String {
    format!("/view?file={}", utf8_percent_encode(path, QUERY_ENCODE_SET))
}

/// Render a complete page around `body`.
pub(crate) fn render_page(page: &PageData<'_>, body: &str) -> String {
    let mut html = String::with_capacity(8192 + body.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{} - specview</title>", escape_html(page.title));
    html.push_str("<link rel=\"stylesheet\" href=\"/public/css/style.css\">\n");
    // Runs before first paint so a stored theme never flashes
    html.push_str("<script src=\"/public/js/theme.js\"></script>\n");
    html.push_str("</head>\n<body>\n<div class=\"layout\">\n");

    render_sidebar(&mut html, page.tree, page.active);

    html.push_str("<div class=\"content-scroll\">\n<main class=\"content\">\n");
    if page.active.is_some() {
        html.push_str(
            "<div class=\"doc-toolbar\"><button type=\"button\" id=\"copy-comments\" \
             class=\"copy-comments\" hidden>Copy comments as prompt</button></div>\n",
        );
    }
    html.push_str(body);
    html.push_str("\n</main>\n</div>\n");

    render_toc(&mut html, page.toc);

    html.push_str("</div>\n");
    if page.active.is_some() {
        html.push_str("<script src=\"/public/js/comments.js\"></script>\n");
    }
    if page.live_reload {
        html.push_str("<script src=\"/public/js/live-reload.js\"></script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Body of a document page. The id is what the live reload client replaces.
pub(crate) fn document_body(content: &str) -> String {
    format!("<article id=\"{CONTENT_ID}\" class=\"markdown-body\">\n{content}</article>")
}

/// Body of the home page.
pub(crate) fn welcome_body(tree: &[DocEntry]) -> String {
    let count = count_documents(tree);
    let mut html = String::from("<section class=\"welcome\">\n<h1>Specs</h1>\n");
    match count {
        0 => html.push_str("<p class=\"empty\">No markdown documents found in this folder.</p>\n"),
        1 => html.push_str("<p>1 document. Pick it from the sidebar.</p>\n"),
        n => {
            let _ = writeln!(html, "<p>{n} documents. Pick one from the sidebar.</p>");
        }
    }
    html.push_str("</section>");
    html
}

/// Standalone 404 page.
pub(crate) fn not_found_page() -> String {
    let body = "<section class=\"not-found\">\n<h1>Page not found</h1>\n\
                <p>The page you requested does not exist.</p>\n\
                <p><a href=\"/\">Back to home</a></p>\n</section>";
    render_page(
        &PageData {
            title: "Not found",
            tree: &[],
            active: None,
            toc: &[],
            live_reload: false,
        },
        body,
    )
}

fn render_sidebar(html: &mut String, tree: &[DocEntry], active: Option<&str>) {
    html.push_str(
        "<aside class=\"sidebar\">\n<div class=\"sidebar-header\">\n\
         <a href=\"/\" class=\"brand\">specview</a>\n\
         <button type=\"button\" id=\"theme-toggle\" class=\"theme-toggle\" \
         aria-label=\"Toggle dark mode\">&#9680;</button>\n</div>\n<nav>\n",
    );
    if tree.is_empty() {
        html.push_str("<p class=\"empty\">No documents</p>\n");
    } else {
        html.push_str("<ul class=\"tree\">\n");
        render_tree(html, tree, active);
        html.push_str("</ul>\n");
    }
    html.push_str("</nav>\n</aside>\n");
}

fn render_tree(html: &mut String, entries: &[DocEntry], active: Option<&str>) {
    for entry in entries {
        let name = escape_html(&entry.name);
        if entry.is_dir {
            let open = if active.is_some_and(|path| entry.contains(path)) {
                " open"
            } else {
                ""
            };
            let _ = writeln!(html, "<li>\n<details{open}>\n<summary>{name}</summary>");
            if !entry.children.is_empty() {
                html.push_str("<ul>\n");
                render_tree(html, &entry.children, active);
                html.push_str("</ul>\n");
            }
            html.push_str("</details>\n</li>\n");
        } else {
            let class = if active == Some(entry.path.as_str()) {
                " class=\"active\""
            } else {
                ""
            };
            let _ = writeln!(
                html,
                "<li><a href=\"{}\"{class}>{name}</a></li>",
                escape_html(&view_href(&entry.path))
            );
        }
    }
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"toc\">\n<p><strong>On this page</strong></p>\n<ul>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            escape_html(&entry.id),
            escape_html(&entry.title)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn count_documents(entries: &[DocEntry]) -> usize {
    entries
        .iter()
        .map(|e| {
            if e.is_dir {
                count_documents(&e.children)
            } else {
                1
            }
        })
        .sum()
}
