//! Embedded browser assets for specview.
//!
//! Everything under `public/` is compiled into the binary with `rust-embed`
//! and served below `/public/`: the stylesheet, the live reload client, the
//! theme toggle and the per-document comments.

use std::borrow::Cow;

#[derive(rust_embed::RustEmbed)]
#[folder = "public"]
struct Assets;

/// Get an asset by path (relative to `public/`, e.g. `js/live-reload.js`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[must_use]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Iterate all embedded asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Return the MIME type string for the given file path.
#[must_use]
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
