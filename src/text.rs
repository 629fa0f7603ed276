//! Vector text drawing on the vello scene.
//!
//! Glyph layout goes through skrifa (charmap + per-size advance widths),
//! glyph painting through `Scene::draw_glyphs`. Fonts come from system
//! paths; with no font found the app still runs, it just draws no text.

use tracing::warn;
use vello::peniko::{Color, Fill, FontData};
use vello::kurbo::Affine;
use vello::{Glyph, Scene};

/// Loaded font handles shared by every screen.
pub struct TextContext {
    pub body: Option<FontData>,
    pub mono: Option<FontData>,
}

impl TextContext {
    pub fn load() -> Self {
        let body = load_system_font(&[
            "Helvetica",
            "Arial",
            "DejaVuSans",
            "LiberationSans-Regular",
        ]);
        let mono = load_system_font(&[
            "Menlo",
            "Menlo-Regular",
            "Monaco",
            "DejaVuSansMono",
            "LiberationMono-Regular",
        ]);
        if body.is_none() {
            warn!(target: "text", "no body font found, text will not render");
        }
        Self { body, mono }
    }

    /// Draw one line at the baseline `(x, y)` with the body font.
    pub fn draw_line(
        &self,
        scene: &mut Scene,
        x: f64,
        y: f64,
        text: &str,
        color: Color,
        size: f32,
    ) {
        draw_with(scene, self.body.as_ref(), x, y, text, color, size);
    }

    /// Draw one line with the monospace font (code, tables).
    pub fn draw_mono(
        &self,
        scene: &mut Scene,
        x: f64,
        y: f64,
        text: &str,
        color: Color,
        size: f32,
    ) {
        draw_with(scene, self.mono.as_ref(), x, y, text, color, size);
    }

    /// Advance width of `text` at `size` in the body font.
    pub fn measure(&self, text: &str, size: f32) -> f64 {
        let Some(font) = &self.body else {
            return 0.0;
        };
        measure_with(font, text, size)
    }

    /// Monospace column width at `size`. Used for cursor placement.
    pub fn mono_advance(&self, size: f32) -> f64 {
        let Some(font) = &self.mono else {
            return size as f64 * 0.6;
        };
        let w = measure_with(font, "0", size);
        if w > 0.0 { w } else { size as f64 * 0.6 }
    }

    /// Word-wrap `text` into `max_width` starting at baseline `(x, y)`.
    /// Returns the y of the next free baseline.
    pub fn draw_wrapped(
        &self,
        scene: &mut Scene,
        x: f64,
        y: f64,
        max_width: f64,
        text: &str,
        color: Color,
        size: f32,
    ) -> f64 {
        let line_height = size as f64 * 1.4;
        let Some(font) = &self.body else {
            return y + line_height;
        };

        let space = measure_with(font, " ", size);
        let mut cursor_x = x;
        let mut cursor_y = y;
        let mut line_glyphs: Vec<Glyph> = Vec::new();

        for word in text.split_whitespace() {
            let word_width = measure_with(font, word, size);
            if cursor_x > x && cursor_x + space + word_width > x + max_width {
                flush_line(scene, font, &line_glyphs, color, size);
                line_glyphs.clear();
                cursor_x = x;
                cursor_y += line_height;
            } else if cursor_x > x {
                cursor_x += space;
            }
            append_glyphs(font, word, size, &mut cursor_x, cursor_y, &mut line_glyphs);
        }
        flush_line(scene, font, &line_glyphs, color, size);
        cursor_y + line_height
    }
}

fn flush_line(scene: &mut Scene, font: &FontData, glyphs: &[Glyph], color: Color, size: f32) {
    if glyphs.is_empty() {
        return;
    }
    scene
        .draw_glyphs(font)
        .font_size(size)
        .brush(&color)
        .transform(Affine::IDENTITY)
        .draw(Fill::NonZero, glyphs.iter().copied());
}

fn draw_with(
    scene: &mut Scene,
    font: Option<&FontData>,
    x: f64,
    y: f64,
    text: &str,
    color: Color,
    size: f32,
) {
    let Some(font) = font else { return };
    let mut cursor_x = x;
    let mut glyphs = Vec::new();
    append_glyphs(font, text, size, &mut cursor_x, y, &mut glyphs);
    flush_line(scene, font, &glyphs, color, size);
}

/// Map `text` to positioned glyphs, advancing `x` as it goes.
fn append_glyphs(
    font: &FontData,
    text: &str,
    size: f32,
    x: &mut f64,
    y: f64,
    out: &mut Vec<Glyph>,
) {
    let Ok(font_ref) = skrifa::FontRef::from_index(font.data.as_ref(), font.index) else {
        return;
    };
    use skrifa::MetadataProvider;
    let charmap = font_ref.charmap();
    let glyph_metrics = font_ref.glyph_metrics(
        skrifa::instance::Size::new(size),
        skrifa::instance::LocationRef::default(),
    );

    for ch in text.chars() {
        let gid = charmap.map(ch).unwrap_or_default();
        let advance = glyph_metrics.advance_width(gid).unwrap_or(size * 0.5) as f64;
        out.push(Glyph {
            id: gid.to_u32(),
            x: *x as f32,
            y: y as f32,
        });
        *x += advance;
    }
}

fn measure_with(font: &FontData, text: &str, size: f32) -> f64 {
    let Ok(font_ref) = skrifa::FontRef::from_index(font.data.as_ref(), font.index) else {
        return 0.0;
    };
    use skrifa::MetadataProvider;
    let charmap = font_ref.charmap();
    let glyph_metrics = font_ref.glyph_metrics(
        skrifa::instance::Size::new(size),
        skrifa::instance::LocationRef::default(),
    );
    text.chars()
        .map(|ch| {
            let gid = charmap.map(ch).unwrap_or_default();
            glyph_metrics.advance_width(gid).unwrap_or(size * 0.5) as f64
        })
        .sum()
}

/// Try to load a font from common system paths, first match wins.
fn load_system_font(font_names: &[&str]) -> Option<FontData> {
    let dirs = [
        "/System/Library/Fonts/",
        "/System/Library/Fonts/Supplemental/",
        "/Library/Fonts/",
        "/usr/share/fonts/truetype/dejavu/",
        "/usr/share/fonts/truetype/",
        "/usr/share/fonts/opentype/",
        "/usr/share/fonts/truetype/liberation/",
    ];
    let extensions = ["ttf", "otf", "ttc"];

    for name in font_names {
        for dir in &dirs {
            for ext in &extensions {
                let path = format!("{dir}{name}.{ext}");
                if let Ok(data) = std::fs::read(&path) {
                    return Some(FontData::new(data.into(), 0));
                }
            }
        }
    }
    None
}
