//! Markdown renderer with heading anchors.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::slug::{HeadingIds, slugify};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Text of the first H1 heading, if any.
    pub title: Option<String>,
    /// Every heading in document order.
    pub toc: Vec<TocEntry>,
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Plain heading text.
    pub title: String,
    /// Anchor id assigned to the heading.
    pub id: String,
}

/// Markdown to HTML renderer.
///
/// Headings get unique slug ids and are collected into the table of contents.
/// Raw HTML in the source is dropped.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    gfm: bool,
}

/// Heading whose events are held back until its text (and so its id) is known.
struct PendingHeading<'a> {
    level: HeadingLevel,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    text: String,
    events: Vec<Event<'a>>,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled the parser supports tables, strikethrough, task lists and
    /// footnotes.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown text.
    #[must_use]
    pub fn render(&self, markdown: &str) -> RenderResult {
        let mut ids = HeadingIds::default();
        let mut title = None;
        let mut toc = Vec::new();
        let mut events = Vec::new();
        let mut heading: Option<PendingHeading<'_>> = None;

        for event in Parser::new_ext(markdown, self.parser_options()) {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }) => {
                    heading = Some(PendingHeading {
                        level,
                        classes,
                        attrs,
                        text: String::new(),
                        events: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    let Some(pending) = heading.take() else {
                        continue;
                    };

                    let text = pending.text.trim().to_owned();
                    let id = ids.unique(slugify(&text));
                    if title.is_none() && pending.level == HeadingLevel::H1 {
                        title = Some(text.clone());
                    }
                    toc.push(TocEntry {
                        level: heading_level_to_num(pending.level),
                        title: text,
                        id: id.clone(),
                    });

                    events.push(Event::Start(Tag::Heading {
                        level: pending.level,
                        id: Some(CowStr::from(id)),
                        classes: pending.classes,
                        attrs: pending.attrs,
                    }));
                    events.extend(pending.events);
                    events.push(Event::End(TagEnd::Heading(pending.level)));
                }
                Event::Html(_) | Event::InlineHtml(_) => {}
                event => match heading.as_mut() {
                    Some(pending) => {
                        if let Event::Text(text) | Event::Code(text) = &event {
                            pending.text.push_str(text);
                        }
                        pending.events.push(event);
                    }
                    None => events.push(event),
                },
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());

        RenderResult {
            html: output,
            title,
            toc,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
