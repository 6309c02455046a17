//! Раскладка выписки: шапка с реквизитами и таблица операций.
//!
//! Движок ничего не рисует сам. Результат - [`LayoutPlan`], список инструкций
//! по страницам, который потом исполняет один из рендереров.

pub mod config;
pub mod instruction;
pub mod metrics;
mod header;
mod table;

use tracing::debug;

use crate::error::RenderError;
use config::{FontRole, LayoutConfig, Pagination};
use instruction::{Align, DrawOp, LayoutPlan, PagePlan, Rect};

pub use config::COLUMN_COUNT;

/// Предупреждение о безопасности, печатается в каждой выписке
pub const SECURITY_NOTICE: &str = "Please do not share your ATM, Debit/Credit card number, PIN (Personal Identification Number) and OTP (One Time Password) with anyone over mail, SMS, phone call or any other media. Bank never asks for such information.";

/// Подвал, печатается в каждой выписке
pub const COMPUTER_GENERATED_FOOTER: &str =
    "**This is a computer generated statement and does not require a signature.";

/// Колонки таблицы операций в порядке вывода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TxnDate,
    ValueDate,
    Description,
    Reference,
    Debit,
    Credit,
    Balance,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::TxnDate,
        Column::ValueDate,
        Column::Description,
        Column::Reference,
        Column::Debit,
        Column::Credit,
        Column::Balance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Column::TxnDate => "Txn Date",
            Column::ValueDate => "Value Date",
            Column::Description => "Description",
            Column::Reference => "Ref No./Cheque No.",
            Column::Debit => "Debit",
            Column::Credit => "Credit",
            Column::Balance => "Balance",
        }
    }

    /// Суммы - вправо, остальное - влево
    pub fn align(self) -> Align {
        match self {
            Column::Debit | Column::Credit | Column::Balance => Align::Right,
            _ => Align::Left,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Пара "подпись - значение" в шапке. Значение может занимать несколько строк (адрес).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub label: String,
    pub lines: Vec<String>,
}

impl HeaderField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        HeaderField {
            label: label.into(),
            lines: vec![value.into()],
        }
    }

    pub fn multiline(label: impl Into<String>, lines: Vec<String>) -> Self {
        HeaderField {
            label: label.into(),
            lines,
        }
    }
}

/// Строка таблицы с уже отформатированными ячейками, по порядку [`Column::ALL`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: [String; COLUMN_COUNT],
}

impl TableRow {
    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }
}

/// Нормализованные данные выписки - вход движка раскладки.
///
/// Порядок `fields` и есть порядок строк шапки.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementView {
    pub title: String,
    pub fields: Vec<HeaderField>,
    pub balance_line: String,
    pub period_line: String,
    pub rows: Vec<TableRow>,
}

/// Движок раскладки
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        LayoutEngine { config }
    }

    /// Строит план документа
    pub fn plan(&self, view: &StatementView) -> Result<LayoutPlan, RenderError> {
        self.config.validate()?;

        let mut flow = Flow::new(&self.config);

        header::layout_header(&mut flow, view);
        table::layout_table(&mut flow, &view.rows);
        layout_notices(&mut flow);

        let pages = flow.finish();
        debug!(
            pages = pages.len(),
            rows = view.rows.len(),
            "statement layout computed"
        );

        Ok(LayoutPlan {
            page_size: self.config.page,
            text_color: self.config.text_color,
            stroke_width: self.config.border_width,
            fonts: self.config.fonts,
            pages,
        })
    }
}

/// Курсор вертикального потока по страницам
struct Flow<'a> {
    cfg: &'a LayoutConfig,
    pages: Vec<PagePlan>,
    y: f32,
}

impl<'a> Flow<'a> {
    fn new(cfg: &'a LayoutConfig) -> Self {
        Flow {
            cfg,
            pages: vec![PagePlan::default()],
            y: cfg.margins.top,
        }
    }

    fn push(&mut self, op: DrawOp) {
        // страница всегда есть: создаётся в new и в new_page
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn left(&self) -> f32 {
        self.cfg.margins.left
    }

    /// На текущей странице ещё ничего не размещено по вертикали
    fn at_page_top(&self) -> bool {
        self.y <= self.cfg.margins.top
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Нужен ли перенос перед блоком высотой `height`
    fn needs_break(&self, height: f32) -> bool {
        self.cfg.pagination == Pagination::PageBreaks
            && self.y + height > self.cfg.content_bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(PagePlan::default());
        self.y = self.cfg.margins.top;
    }

    fn finish(self) -> Vec<PagePlan> {
        self.pages
    }
}

fn layout_notices(flow: &mut Flow) {
    let cfg = flow.cfg;
    let font = cfg.fonts.footer;
    let width = cfg.content_width();
    let pitch = cfg.header_pitch;

    let notice = metrics::wrap_text(SECURITY_NOTICE, font.face, font.size, width);
    let footer = metrics::wrap_text(COMPUTER_GENERATED_FOOTER, font.face, font.size, width);
    let block_height = pitch * (1.0 + notice.len() as f32 + 0.5 + footer.len() as f32);

    if flow.needs_break(block_height) {
        flow.new_page();
    }

    flow.advance(pitch);
    for line in notice {
        let rect = Rect::new(flow.left(), flow.y, width, pitch);
        flow.push(DrawOp::text(line, rect, Align::Left, FontRole::Footer));
        flow.advance(pitch);
    }

    flow.advance(pitch / 2.0);
    for line in footer {
        let rect = Rect::new(flow.left(), flow.y, width, pitch);
        flow.push(DrawOp::text(line, rect, Align::Center, FontRole::Footer));
        flow.advance(pitch);
    }
}
