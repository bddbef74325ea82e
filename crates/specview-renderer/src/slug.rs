//! Heading anchor generation.

use std::collections::{HashMap, HashSet};

/// Convert heading text to an anchor slug.
///
/// Letters and digits are lowercased, runs of whitespace and dashes become a
/// single `-`, everything else is dropped. Text without any usable character
/// yields `"heading"`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "heading".to_owned()
    } else {
        slug
    }
}

/// Hands out anchor ids that are unique within one document.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    used: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl HeadingIds {
    /// Return `base` if unused, otherwise the first free `base-N`.
    pub(crate) fn unique(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }

        let counter = self.counters.entry(base.clone()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{base}-{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
