//! Minimal text-only PDF writer.
//!
//! Produces PDF 1.4 with the standard Helvetica fonts, so no font data is
//! embedded. Layout is a fixed-pitch column of lines: a bold title block
//! followed by body lines, continuing on a new page when the bottom margin
//! is reached.

use std::fmt::Write as _;

/// Page geometry and type sizes, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub title_size: f64,
    pub title_pitch: f64,
    /// Extra space between the title block and the first body line.
    pub title_gap: f64,
    pub body_size: f64,
    pub line_pitch: f64,
}

impl Default for PdfLayout {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 56.0,
            title_size: 16.0,
            title_pitch: 28.0,
            title_gap: 10.0,
            body_size: 12.0,
            line_pitch: 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }
}

/// A line positioned on a page.
#[derive(Debug, Clone, PartialEq)]
struct Placed {
    font: Font,
    size: f64,
    y: f64,
    text: String,
}

/// Escape text for a PDF literal string. Anything outside printable ASCII
/// is replaced with `?` because the base fonts use a single-byte encoding.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn paginate(title: &[&str], lines: &[String], layout: &PdfLayout) -> Vec<Vec<Placed>> {
    let top = layout.page_height - layout.margin;
    let mut pages = vec![Vec::new()];
    let mut y = top - layout.title_size;

    for line in title {
        pages[0].push(Placed {
            font: Font::Bold,
            size: layout.title_size,
            y,
            text: (*line).to_string(),
        });
        y -= layout.title_pitch;
    }
    if !title.is_empty() {
        y -= layout.title_gap;
    }

    for line in lines {
        if y < layout.margin {
            pages.push(Vec::new());
            y = top - layout.body_size;
        }
        if let Some(page) = pages.last_mut() {
            page.push(Placed {
                font: Font::Regular,
                size: layout.body_size,
                y,
                text: line.clone(),
            });
        }
        y -= layout.line_pitch;
    }
    pages
}

fn content_stream(page: &[Placed], layout: &PdfLayout) -> String {
    let mut s = String::new();
    for line in page {
        // writing into a String cannot fail
        let _ = writeln!(
            s,
            "BT {} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET",
            line.font.resource(),
            line.size,
            layout.margin,
            line.y,
            escape_text(&line.text)
        );
    }
    s
}

/// Render a document: `title` lines in bold, then one body line per entry.
pub fn render(title: &[&str], lines: &[String], layout: &PdfLayout) -> Vec<u8> {
    let pages = paginate(title, lines, layout);

    // 1 catalog, 2 page tree, 3/4 fonts, then a (page, content) pair per page
    let first_page_id = 5;
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| first_page_id + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (page, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>",
                layout.page_width, layout.page_height
            )
            .into_bytes(),
        );
        let stream = content_stream(page, layout);
        let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        obj.extend_from_slice(stream.as_bytes());
        obj.extend_from_slice(b"endstream");
        objects.push(obj);
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in &offsets {
        let _ = write!(xref, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}
