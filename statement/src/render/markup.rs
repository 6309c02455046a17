use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::DocumentRenderer;
use crate::error::RenderError;
use crate::layout::config::{Color, FontFace};
use crate::layout::instruction::{Align, DrawOp, LayoutPlan};

/// Внешний конвертер HTML -> PDF.
///
/// По умолчанию `wkhtmltopdf`: HTML читается из stdin, PDF пишется в stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        let args = [
            "--quiet",
            "--disable-smart-shrinking",
            "--page-size",
            "A4",
            "--orientation",
            "Portrait",
            "--margin-top",
            "0",
            "--margin-right",
            "0",
            "--margin-bottom",
            "0",
            "--margin-left",
            "0",
            "--encoding",
            "utf-8",
            "-",
            "-",
        ];
        ConverterConfig {
            program: "wkhtmltopdf".to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Собирает HTML из плана и конвертирует его внешней программой
#[derive(Debug, Clone, Default)]
pub struct MarkupRenderer {
    converter: ConverterConfig,
}

impl MarkupRenderer {
    pub fn new(converter: ConverterConfig) -> Self {
        MarkupRenderer { converter }
    }

    /// Прогоняет HTML через конвертер.
    ///
    /// Если future отменить до завершения, дочерний процесс будет убит.
    pub async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let program = &self.converter.program;
        debug!(program = %program, bytes = html.len(), "starting html converter");

        let mut child = Command::new(program)
            .args(&self.converter.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::ConverterSpawn {
                program: program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            RenderError::ConverterIo(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "converter stdin is not available",
            ))
        })?;

        // пишем и читаем одновременно, иначе большой документ упрётся в буфер пайпа
        let input = html.as_bytes().to_vec();
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await?;
            Ok::<(), io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(RenderError::ConverterIo)?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(RenderError::ConverterExit {
                status: output.status.to_string(),
                stderr,
            });
        }
        fed.map_err(RenderError::ConverterIo)?;

        if !stderr.is_empty() {
            warn!(program = %program, stderr = %stderr, "converter reported warnings");
        }

        if !output.stdout.starts_with(b"%PDF") {
            return Err(RenderError::InvalidOutput);
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl DocumentRenderer for MarkupRenderer {
    fn name(&self) -> &'static str {
        "markup"
    }

    async fn render(&self, plan: &LayoutPlan) -> Result<Vec<u8>, RenderError> {
        let html = render_markup(plan)?;
        self.convert(&html).await
    }
}

/// HTML-документ с теми же боксами, что и у PDF: по `div` на инструкцию
pub fn render_markup(plan: &LayoutPlan) -> Result<String, RenderError> {
    let mut writer = Writer::new(b"<!DOCTYPE html>\n".to_vec());

    start(&mut writer, "html", &[("lang", "en")])?;
    start(&mut writer, "head", &[])?;
    write(&mut writer, Event::Empty(element("meta", &[("charset", "utf-8")])))?;
    text_element(&mut writer, "title", "Account Statement")?;
    text_element(&mut writer, "style", &stylesheet(plan))?;
    end(&mut writer, "head")?;

    start(&mut writer, "body", &[])?;
    let page_style = format!(
        "width:{};height:{}",
        pt(plan.page_size.width),
        pt(plan.page_size.height)
    );
    for page in &plan.pages {
        start(&mut writer, "div", &[("class", "page"), ("style", page_style.as_str())])?;
        for op in &page.ops {
            write_op(&mut writer, plan, op)?;
        }
        end(&mut writer, "div")?;
    }
    end(&mut writer, "body")?;
    end(&mut writer, "html")?;

    String::from_utf8(writer.into_inner()).map_err(|e| RenderError::Markup(e.to_string()))
}

fn stylesheet(plan: &LayoutPlan) -> String {
    format!(
        "@page {{ size: {} {}; margin: 0 }} \
         html, body {{ margin: 0; padding: 0 }} \
         .page {{ position: relative; overflow: hidden; page-break-after: always }} \
         .page:last-child {{ page-break-after: auto }} \
         .t {{ position: absolute; white-space: nowrap; font-family: Helvetica, Arial, sans-serif; color: {} }} \
         .b {{ position: absolute; box-sizing: border-box }}",
        pt(plan.page_size.width),
        pt(plan.page_size.height),
        plan.text_color.to_hex(),
    )
}

fn write_op(writer: &mut Writer<Vec<u8>>, plan: &LayoutPlan, op: &DrawOp) -> Result<(), RenderError> {
    match op {
        DrawOp::Rect { rect, fill, stroke } => {
            let mut style = format!(
                "left:{};top:{};width:{};height:{}",
                pt(rect.x),
                pt(rect.y),
                pt(rect.width),
                pt(rect.height)
            );
            if let Some(fill) = fill {
                style.push_str(&format!(";background:{}", fill.to_hex()));
            }
            if let Some(stroke) = stroke {
                style.push_str(&format!(";border:{}", border(plan.stroke_width, *stroke)));
            }
            start(writer, "div", &[("class", "b"), ("style", style.as_str())])?;
            end(writer, "div")
        }
        DrawOp::Line { from, to, color, width } => {
            let dx = to.x - from.x;
            let dy = to.y - from.y;
            let length = (dx * dx + dy * dy).sqrt();
            let angle = dy.atan2(dx).to_degrees();
            let style = format!(
                "left:{};top:{};width:{};height:0;border-top:{};transform-origin:0 0;transform:rotate({angle:.2}deg)",
                pt(from.x),
                pt(from.y - width / 2.0),
                pt(length),
                border(*width, *color),
            );
            start(writer, "div", &[("class", "b"), ("style", style.as_str())])?;
            end(writer, "div")
        }
        DrawOp::Text { text, rect, align, role } => {
            let font = plan.fonts.get(*role);
            let (weight, font_style) = match font.face {
                FontFace::Regular => ("normal", "normal"),
                FontFace::Bold => ("bold", "normal"),
                FontFace::Italic => ("normal", "italic"),
            };
            let text_align = match align {
                Align::Left => "left",
                Align::Center => "center",
                Align::Right => "right",
            };
            let style = format!(
                "left:{};top:{};width:{};height:{};line-height:{};font-size:{};font-weight:{weight};font-style:{font_style};text-align:{text_align}",
                pt(rect.x),
                pt(rect.y),
                pt(rect.width),
                pt(rect.height),
                pt(rect.height),
                pt(font.size),
            );
            start(writer, "div", &[("class", "t"), ("style", style.as_str())])?;
            write(writer, Event::Text(BytesText::new(text)))?;
            end(writer, "div")
        }
    }
}

fn pt(value: f32) -> String {
    format!("{value:.2}pt")
}

fn border(width: f32, color: Color) -> String {
    format!("{} solid {}", pt(width), color.to_hex())
}

fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for attr in attrs {
        tag.push_attribute(*attr);
    }
    tag
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError::Markup(e.to_string()))
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
    write(writer, Event::Start(element(name, attrs)))
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), RenderError> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), RenderError> {
    start(writer, name, &[])?;
    write(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}
