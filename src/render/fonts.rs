//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so chart text needs a registered
//! face. We ship no font asset; instead the first export scans a handful of
//! well-known system locations and registers the first match as
//! "sans-serif". Exports that need text fail with a clear error when no
//! font can be found.

use anyhow::{anyhow, Result};
use std::sync::OnceLock;

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/gnu-free/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register a system font as "sans-serif", once per process.
pub fn ensure_registered() -> Result<()> {
    let outcome = REGISTERED.get_or_init(|| {
        for path in CANDIDATES {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            // register_font wants 'static bytes; the font lives for the
            // rest of the process either way.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(
                "sans-serif",
                plotters::style::FontStyle::Normal,
                bytes,
            )
            .is_ok()
            {
                log::debug!("registered chart font from {path}");
                return Ok(());
            }
        }
        Err("no usable sans-serif font found on this system".to_string())
    });
    outcome.clone().map_err(|e| anyhow!(e))
}
