pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<Vec<u8>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn current(&mut self) -> &mut Vec<u8> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        let page = self.current();
        page.extend_from_slice(
            format!("BT /{} {} Tf {} {} Td (", font.resource(), size, x, y).as_bytes(),
        );
        page.extend_from_slice(&encode_text(text));
        page.extend_from_slice(b") Tj ET\n");
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let page = self.current();
        page.extend_from_slice(format!("{} {} m {} {} l S\n", x1, y1, x2, y2).as_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::new();

        // catalog, page tree and fonts come first; each page then takes a
        // page object followed by its content stream
        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", 5 + 2 * i))
            .collect();

        write_object(&mut out, &mut offsets, b"<< /Type /Catalog /Pages 2 0 R >>");
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .as_bytes(),
        );
        for base_font in ["Helvetica", "Helvetica-Bold"] {
            write_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    base_font
                )
                .as_bytes(),
            );
        }

        for content in &self.pages {
            let content_id = offsets.len() + 2;
            write_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH, PAGE_HEIGHT, content_id
                )
                .as_bytes(),
            );

            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content);
            stream.extend_from_slice(b"\nendstream");
            write_object(&mut out, &mut offsets, &stream);
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        out
    }
}

fn write_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            '€' => out.push(0x80),
            '£' => out.push(0xA3),
            '¥' => out.push(0xA5),
            // no rupee glyph in the standard fonts
            '₹' => out.extend_from_slice(b"Rs"),
            _ => out.push(b'?'),
        }
    }
    out
}
