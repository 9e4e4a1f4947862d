//! Layout analysis for PDF pages.
//!
//! Decodes a page's content stream into positioned text spans, groups spans
//! into lines by baseline and lines into blocks by spacing, font size and
//! indentation. Every glyph keeps its own size and font so that later stages
//! can compute dominant and mean sizes per block.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{LayoutBlock, LayoutChar};

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated advance width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    /// Create a new text span. Width is estimated at half an em per glyph.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    fn glyphs(&self) -> impl Iterator<Item = LayoutChar> + '_ {
        self.text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| LayoutChar::new(c, self.font_size, self.font_name.as_str(), self.y))
    }
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Character-weighted mean font size
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(0.0)
        };

        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        let x = spans.first().map(|s| s.x).unwrap_or(0.0);

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text, with a space wherever two spans are visibly apart.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let needs_space = gap > span.font_size * 0.1
                    && !result.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace);
                if needs_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Extracts positioned text blocks from the pages of a loaded document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text blocks from one page.
    pub fn extract_page_blocks(&self, page_id: ObjectId) -> Result<Vec<LayoutBlock>> {
        let spans = self.extract_page_spans(page_id)?;
        let lines = group_spans_into_lines(spans);
        Ok(group_lines_into_blocks(lines))
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.page_content(page_id)?;
        self.parse_content_stream(&content, &fonts)
    }

    /// Get the decompressed page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content streams is blank.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            content.extend_from_slice(&stream_bytes(s));
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk the content stream operators, tracking font and text matrix state.
    fn parse_content_stream(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_resource: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix {
                        leading: matrix.leading,
                        ..TextMatrix::default()
                    };
                }
                "ET" => in_text = false,
                "Tf" if op.operands.len() >= 2 => {
                    if let Object::Name(name) = &op.operands[0] {
                        font_resource = name.clone();
                        font_name = fonts
                            .get(name)
                            .and_then(|f| f.get(b"BaseFont").ok())
                            .and_then(|o| o.as_name().ok())
                            .map(|n| String::from_utf8_lossy(n).to_string())
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                    }
                    font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        matrix.leading = leading;
                    }
                }
                "Td" | "TD" if op.operands.len() >= 2 => {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        matrix.leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
                "Tm" if op.operands.len() >= 6 => {
                    let n = |i: usize, default: f32| get_number(&op.operands[i]).unwrap_or(default);
                    matrix.set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line();
                    }
                    if !in_text {
                        continue;
                    }
                    let text = self.show_text(&op.operator, &op.operands, fonts.get(&font_resource));
                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(TextSpan::new(
                            text.nfc().collect(),
                            x,
                            y,
                            font_size * matrix.scale(),
                            font_name.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode the string operand(s) of a text-showing operator.
    fn show_text(
        &self,
        operator: &str,
        operands: &[Object],
        font: Option<&&lopdf::Dictionary>,
    ) -> String {
        let encoding = font.and_then(|f| f.get_font_encoding(self.doc).ok());
        let decode = |bytes: &[u8]| match &encoding {
            Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        };

        match operator {
            "TJ" => {
                let Some(Object::Array(items)) = operands.first() else {
                    return String::new();
                };
                // Kerning beyond 200/1000 em reads as a word break.
                let space_threshold = 200.0;
                let mut combined = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        other => {
                            let adjustment = -get_number(other).unwrap_or(0.0);
                            if adjustment > space_threshold
                                && !combined.is_empty()
                                && !combined.ends_with(char::is_whitespace)
                            {
                                combined.push(' ');
                            }
                        }
                    }
                }
                combined
            }
            _ => {
                let idx = if operator == "\"" { 2 } else { 0 };
                match operands.get(idx) {
                    Some(Object::String(bytes, _)) => decode(bytes),
                    _ => String::new(),
                }
            }
        }
    }
}

/// Group spans into lines: spans whose baselines differ by less than half
/// their font size share a line. Lines come out top to bottom.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        if let Some(y) = current_y {
            let tolerance = span.font_size.max(1.0) * 0.5;
            if (span.y - y).abs() > tolerance && !current.is_empty() {
                lines.push(TextLine::from_spans(std::mem::take(&mut current)));
            }
        }
        current_y = Some(span.y);
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks based on spacing, size changes and indentation.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<LayoutBlock> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(build_block(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(build_block(current));
    }

    blocks
}

fn build_block(lines: Vec<TextLine>) -> LayoutBlock {
    let text = lines
        .iter()
        .map(|l| l.text())
        .collect::<Vec<_>>()
        .join(" ");
    let y0 = lines
        .iter()
        .map(|l| l.y)
        .fold(f32::MAX, f32::min);
    let chars = lines
        .iter()
        .flat_map(|l| l.spans.iter())
        .flat_map(|s| s.glyphs())
        .collect();
    LayoutBlock::new(text, y0, chars)
}

/// Calculate average line spacing.
fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if a new block should start.
fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    // Large spacing indicates a new paragraph
    let spacing = (prev.y - curr.y).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    if (prev.font_size - curr.font_size).abs() > 1.0 {
        return true;
    }

    // Indentation change
    (prev.x - curr.x).abs() > 20.0
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Stream data with filters applied; unfiltered streams come back as stored.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
