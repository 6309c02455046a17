use async_trait::async_trait;
use pdf_writer::{Content, Finish, Name, Pdf, Rect as PdfRect, Ref, Str};
use tracing::debug;

use super::DocumentRenderer;
use crate::error::RenderError;
use crate::layout::config::{Color, FontFace};
use crate::layout::instruction::{Align, DrawOp, LayoutPlan, PagePlan};
use crate::layout::metrics::text_width;

/// Стандартные шрифты Type 1: имя ресурса на странице и базовый шрифт
const FONTS: [(FontFace, Name<'static>, Name<'static>); 3] = [
    (FontFace::Regular, Name(b"F1"), Name(b"Helvetica")),
    (FontFace::Bold, Name(b"F2"), Name(b"Helvetica-Bold")),
    (FontFace::Italic, Name(b"F3"), Name(b"Helvetica-Oblique")),
];

/// доля кегля от базовой линии до верха прописных
const CAP_HEIGHT: f32 = 0.7;

/// Рисует план напрямую в PDF.
///
/// Результат детерминирован: одинаковый план - одинаковые байты.
#[derive(Debug, Clone, Default)]
pub struct CanvasRenderer;

impl CanvasRenderer {
    pub fn new() -> Self {
        CanvasRenderer
    }

    /// Синхронная версия [`DocumentRenderer::render`]
    pub fn render_plan(&self, plan: &LayoutPlan) -> Result<Vec<u8>, RenderError> {
        if plan.pages.is_empty() {
            return Err(RenderError::Pdf("layout plan has no pages".into()));
        }

        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let font_ids: Vec<Ref> = (0..FONTS.len() as i32).map(|i| Ref::new(3 + i)).collect();

        // на каждую страницу два объекта: сама страница и поток содержимого
        let first_page_ref = 3 + FONTS.len() as i32;
        let page_ids: Vec<(Ref, Ref)> = (0..plan.pages.len() as i32)
            .map(|i| (Ref::new(first_page_ref + 2 * i), Ref::new(first_page_ref + 2 * i + 1)))
            .collect();

        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page_id, _)| *page_id))
            .count(page_ids.len() as i32);

        for ((_, _, base_font), font_id) in FONTS.iter().zip(&font_ids) {
            pdf.type1_font(*font_id)
                .base_font(*base_font)
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        for (page, (page_id, content_id)) in plan.pages.iter().zip(&page_ids) {
            let mut page_writer = pdf.page(*page_id);
            page_writer.media_box(PdfRect::new(0.0, 0.0, plan.page_size.width, plan.page_size.height));
            page_writer.parent(tree_id);
            page_writer.contents(*content_id);
            {
                let mut resources = page_writer.resources();
                let mut fonts = resources.fonts();
                for ((_, resource_name, _), font_id) in FONTS.iter().zip(&font_ids) {
                    fonts.pair(*resource_name, *font_id);
                }
            }
            page_writer.finish();

            let content = draw_page(plan, page);
            pdf.stream(*content_id, &content);
        }

        let bytes = pdf.finish();
        debug!(pages = plan.pages.len(), bytes = bytes.len(), "pdf written");
        Ok(bytes)
    }
}

#[async_trait]
impl DocumentRenderer for CanvasRenderer {
    fn name(&self) -> &'static str {
        "canvas"
    }

    async fn render(&self, plan: &LayoutPlan) -> Result<Vec<u8>, RenderError> {
        self.render_plan(plan)
    }
}

fn draw_page(plan: &LayoutPlan, page: &PagePlan) -> Vec<u8> {
    let height = plan.page_size.height;
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            DrawOp::Rect { rect, fill, stroke } => {
                if fill.is_none() && stroke.is_none() {
                    continue;
                }
                content.save_state();
                content.rect(rect.x, height - rect.y - rect.height, rect.width, rect.height);
                match (fill, stroke) {
                    (Some(f), Some(s)) => {
                        set_fill(&mut content, *f);
                        set_stroke(&mut content, *s);
                        content.set_line_width(plan.stroke_width);
                        content.fill_nonzero_and_stroke();
                    }
                    (Some(f), None) => {
                        set_fill(&mut content, *f);
                        content.fill_nonzero();
                    }
                    (None, Some(s)) => {
                        set_stroke(&mut content, *s);
                        content.set_line_width(plan.stroke_width);
                        content.stroke();
                    }
                    (None, None) => {}
                }
                content.restore_state();
            }
            DrawOp::Line { from, to, color, width } => {
                content.save_state();
                set_stroke(&mut content, *color);
                content.set_line_width(*width);
                content.move_to(from.x, height - from.y);
                content.line_to(to.x, height - to.y);
                content.stroke();
                content.restore_state();
            }
            DrawOp::Text { text, rect, align, role } => {
                if text.is_empty() {
                    continue;
                }
                let font = plan.fonts.get(*role);
                let width = text_width(text, font.face, font.size);
                let x = match align {
                    Align::Left => rect.x,
                    Align::Right => rect.x + rect.width - width,
                    Align::Center => rect.x + (rect.width - width) / 2.0,
                };
                let baseline = rect.y + (rect.height + font.size * CAP_HEIGHT) / 2.0;
                let encoded = encode_win_ansi(text);

                set_fill(&mut content, plan.text_color);
                content.begin_text();
                content.set_font(font_resource(font.face), font.size);
                content.next_line(x, height - baseline);
                content.show(Str(&encoded));
                content.end_text();
            }
        }
    }

    content.finish().to_vec()
}

fn font_resource(face: FontFace) -> Name<'static> {
    FONTS
        .iter()
        .find(|(f, _, _)| *f == face)
        .map(|(_, name, _)| *name)
        .unwrap_or(FONTS[0].1)
}

fn set_fill(content: &mut Content, color: Color) {
    let (r, g, b) = color.to_unit();
    content.set_fill_rgb(r, g, b);
}

fn set_stroke(content: &mut Content, color: Color) {
    let (r, g, b) = color.to_unit();
    content.set_stroke_rgb(r, g, b);
}

/// Перекодирует текст в WinAnsi; то, чего в кодировке нет, заменяется на `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\t' | '\n' | '\r' => b' ',
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
