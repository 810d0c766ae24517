//! Minimal SVG document builder.
//!
//! Charts are emitted as self-contained SVG text (no fonts or images fetched at
//! render time) and embedded as base64 data URIs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt::Write;

/// Chart palette
pub mod palette {
    pub const PRIMARY: &str = "#00263A";
    pub const ACCENT: &str = "#00A4E4";
    pub const ORANGE: &str = "#FF6B35";
    pub const GRAY: &str = "#8B9697";
    pub const LIGHT_GRAY: &str = "#F5F7F8";

    /// Rotation for categorical series
    pub const SERIES: [&str; 5] = [PRIMARY, ACCENT, ORANGE, GRAY, "#5B7F95"];
}

const FONT: &str = "Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width as f64, height as f64, "#FFFFFF");
        canvas
    }

    pub fn width(&self) -> f64 {
        self.width as f64
    }

    pub fn height(&self) -> f64 {
        self.height as f64
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill
        );
        self
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{}"/>"#,
            x1, y1, x2, y2, stroke, width
        );
        self
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) -> &mut Self {
        let _ = writeln!(
            self.body,
            r##"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.8" stroke="#FFFFFF" stroke-width="2"/>"##,
            cx, cy, r, fill
        );
        self
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) -> &mut Self {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect();
        let _ = writeln!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            coords.join(" "),
            stroke,
            width
        );
        self
    }

    /// Pie slice from `start` to `end` radians, clockwise from 12 o'clock
    pub fn slice(&mut self, cx: f64, cy: f64, r: f64, start: f64, end: f64, fill: &str) -> &mut Self {
        let point = |angle: f64| (cx + r * angle.sin(), cy - r * angle.cos());
        let (x1, y1) = point(start);
        let (x2, y2) = point(end);
        let large = if end - start > std::f64::consts::PI { 1 } else { 0 };
        let _ = writeln!(
            self.body,
            r##"<path d="M {:.1} {:.1} L {:.1} {:.1} A {:.1} {:.1} 0 {} 1 {:.1} {:.1} Z" fill="{}" stroke="#FFFFFF" stroke-width="2"/>"##,
            cx, cy, x1, y1, r, r, large, x2, y2, fill
        );
        self
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: u32, anchor: Anchor, bold: bool) -> &mut Self {
        let _ = writeln!(
            self.body,
            r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{}" text-anchor="{}" font-weight="{}" fill="{}">{}</text>"#,
            x,
            y,
            FONT,
            size,
            anchor.as_str(),
            if bold { "bold" } else { "normal" },
            palette::PRIMARY,
            escape(content)
        );
        self
    }

    /// Chart title centered at the top
    pub fn title(&mut self, title: &str) -> &mut Self {
        let x = self.width() / 2.0;
        self.text(x, 36.0, title, 20, Anchor::Middle, true)
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

/// Escape text for inclusion in SVG/XML
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub const SVG_MIME: &str = "image/svg+xml";

pub fn to_data_uri(svg: &str) -> String {
    format!("data:{};base64,{}", SVG_MIME, BASE64.encode(svg.as_bytes()))
}

/// Recover the SVG text from a data URI produced by `to_data_uri`
pub fn from_data_uri(uri: &str) -> Option<String> {
    let encoded = uri.strip_prefix(&format!("data:{};base64,", SVG_MIME))?;
    let bytes = BASE64.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
