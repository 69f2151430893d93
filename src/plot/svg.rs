//! Render a [`Scene`] as SVG text.

use crate::plot::font;
use crate::plot::scene::{Scene, Shape, Text};

/// Escape text for use in SVG content and attributes.
///
/// ```rust
/// use maptree::plot::svg::escape;
/// assert_eq!(escape("A<B & 'C'"), "A&lt;B &amp; &apos;C&apos;");
/// ```
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Returns the scene as a standalone SVG document.
pub fn render(scene: &Scene) -> String {
    let (width, height) = scene.pixel_size();
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<style>
  text {{ font-family: 'DejaVu Sans Mono', 'Courier New', monospace; dominant-baseline: hanging; }}
</style>
<rect width="100%" height="100%" fill="{}"/>
"#,
        scene.background
    ));

    for shape in &scene.shapes {
        match shape {
            Shape::Line { from, to, width, color } => svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" stroke-width="{width}" stroke-linecap="square"/>"#,
                from.0, from.1, to.0, to.1
            )),
            Shape::Circle { center, radius, fill } => svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{radius}" fill="{fill}"/>"#,
                center.0, center.1
            )),
            Shape::Text(text) => svg.push_str(&render_text(text)),
        }
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_text(text: &Text) -> String {
    // a monospace font advances about 0.6 em, match the bitmap font advance
    let font_size = (font::ADVANCE * text.scale) as f32 / 0.6;
    let (x, y) = text.position;
    let style = match text.italic {
        true => r#" font-style="italic""#,
        false => "",
    };
    let transform = match text.vertical {
        true => format!(r#" transform="rotate(-90 {x:.2} {y:.2})""#),
        false => String::new(),
    };
    format!(
        r#"<text x="{x:.2}" y="{y:.2}" font-size="{font_size:.1}" fill="{}"{style}{transform}>{}</text>"#,
        text.color,
        escape(&text.text)
    )
}
