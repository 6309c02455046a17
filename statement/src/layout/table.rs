use super::config::{Color, FontRole};
use super::instruction::{DrawOp, Rect};
use super::metrics::wrap_text;
use super::{Column, Flow, TableRow};

/// Таблица операций: шапка с заливкой и строки в исходном порядке
pub(super) fn layout_table(flow: &mut Flow, rows: &[TableRow]) {
    let titles: [String; super::COLUMN_COUNT] = Column::ALL.map(|c| c.title().to_string());
    let fill = flow.cfg.header_fill;

    // шапка таблицы не остаётся внизу страницы без первой строки
    let header_height = row_height(flow, &wrap_cells(flow, &titles, FontRole::Header));
    let first_height = rows
        .first()
        .map(|row| row_height(flow, &wrap_cells(flow, &row.cells, FontRole::Body)))
        .unwrap_or(0.0);
    if !flow.at_page_top() && flow.needs_break(header_height + first_height) {
        flow.new_page();
    }

    draw_row(flow, &titles, FontRole::Header, Some(fill));

    let mut rows_on_page = 0usize;
    for row in rows {
        let lines = wrap_cells(flow, &row.cells, FontRole::Body);
        let height = row_height(flow, &lines);

        // на новой странице хотя бы одна строка рисуется, даже если не влезает
        if rows_on_page > 0 && flow.needs_break(height) {
            flow.new_page();
            draw_row(flow, &titles, FontRole::Header, Some(fill));
            rows_on_page = 0;
        }

        place_row(flow, &lines, height, FontRole::Body, None);
        rows_on_page += 1;
    }
}

fn draw_row(flow: &mut Flow, cells: &[String], role: FontRole, fill: Option<Color>) {
    let lines = wrap_cells(flow, cells, role);
    let height = row_height(flow, &lines);
    place_row(flow, &lines, height, role, fill);
}

/// Переносит текст каждой ячейки в пределах ширины колонки за вычетом отступов
fn wrap_cells(flow: &Flow, cells: &[String], role: FontRole) -> Vec<Vec<String>> {
    let font = flow.cfg.fonts.get(role);
    let padding = flow.cfg.cell_padding;

    cells
        .iter()
        .zip(flow.cfg.column_widths)
        .map(|(text, width)| wrap_text(text, font.face, font.size, width - 2.0 * padding))
        .collect()
}

/// Высота строки: постоянная, умноженная на число строк самой длинной ячейки
fn row_height(flow: &Flow, lines: &[Vec<String>]) -> f32 {
    let max_lines = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
    flow.cfg.row_height * max_lines as f32
}

fn place_row(flow: &mut Flow, lines: &[Vec<String>], height: f32, role: FontRole, fill: Option<Color>) {
    let cfg = flow.cfg;
    let padding = cfg.cell_padding;
    let top = flow.y;
    let mut x = flow.left();

    for ((column, width), cell_lines) in Column::ALL.iter().zip(cfg.column_widths).zip(lines) {
        flow.push(DrawOp::Rect {
            rect: Rect::new(x, top, width, height),
            fill,
            stroke: Some(cfg.divider_color),
        });

        for (idx, line) in cell_lines.iter().enumerate() {
            let rect = Rect::new(
                x + padding,
                top + cfg.row_height * idx as f32,
                width - 2.0 * padding,
                cfg.row_height,
            );
            flow.push(DrawOp::text(line.clone(), rect, column.align(), role));
        }

        x += width;
    }

    flow.advance(height);
}

#[cfg(test)]
mod tests {
    use super::super::config::{LayoutConfig, Pagination};
    use super::super::{HeaderField, LayoutEngine, StatementView};
    use super::*;

    fn single_row_view(narration: &str, debit: &str, credit: &str) -> StatementView {
        StatementView {
            rows: vec![TableRow {
                cells: [
                    "25 Jun 2023".into(),
                    "25 Jun 2023".into(),
                    narration.into(),
                    String::new(),
                    debit.into(),
                    credit.into(),
                    "6,731.21".into(),
                ],
            }],
            ..Default::default()
        }
    }

    fn cell_rects(view: &StatementView) -> Vec<(Rect, Option<Color>)> {
        let plan = LayoutEngine::default().plan(view).unwrap();
        plan.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, fill, .. } => Some((*rect, *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn header_row_is_shaded_and_columns_use_fixed_widths() {
        let cfg = LayoutConfig::default();
        let rects = cell_rects(&single_row_view("CREDIT INTEREST--", "", "46.00"));

        // 7 ячеек шапки + 7 ячеек строки
        assert_eq!(rects.len(), 14);
        for (idx, (rect, fill)) in rects.iter().enumerate() {
            assert!((rect.width - cfg.column_widths[idx % 7]).abs() < 1e-3);
            if idx < 7 {
                assert_eq!(*fill, Some(cfg.header_fill));
            } else {
                assert_eq!(*fill, None);
            }
        }
    }

    #[test]
    fn single_line_rows_use_constant_height() {
        let cfg = LayoutConfig::default();
        let rects = cell_rects(&single_row_view("CREDIT INTEREST--", "", "46.00"));
        assert!((rects[7].0.height - cfg.row_height).abs() < 1e-3);
    }

    #[test]
    fn long_narration_wraps_inside_its_column() {
        let cfg = LayoutConfig::default();
        let narration = "NEFT INWARD TRANSFER FROM ACME SOFTWARE SERVICES PRIVATE LIMITED SALARY FOR THE MONTH OF JUNE 2023";
        let rects = cell_rects(&single_row_view(narration, "", "46.00"));

        let description = rects[7 + Column::Description.index()].0;
        assert!((description.width - cfg.column_widths[Column::Description.index()]).abs() < 1e-3);
        assert!(description.height >= 2.0 * cfg.row_height);
        // вся строка одной высоты
        assert!((rects[7].0.height - description.height).abs() < 1e-3);
    }

    #[test]
    fn table_moves_to_next_page_when_header_block_fills_the_first() {
        let cfg = LayoutConfig {
            pagination: Pagination::PageBreaks,
            ..Default::default()
        };
        let mut view = single_row_view("R0", "", "46.00");
        view.title = "Account Statement".into();
        view.fields = (0..56).map(|i| HeaderField::new(format!("Field {i}"), "value")).collect();
        view.rows.push(view.rows[0].clone());
        view.rows.push(view.rows[0].clone());

        let plan = LayoutEngine::new(cfg.clone()).plan(&view).unwrap();
        assert!(plan.page_count() > 1);

        for page in &plan.pages {
            for op in &page.ops {
                if let DrawOp::Text { text, rect, .. } = op {
                    assert!(
                        rect.bottom() <= cfg.content_bottom() + 0.01,
                        "{text:?} ends at {} below {}",
                        rect.bottom(),
                        cfg.content_bottom()
                    );
                }
            }
        }

        // шапка таблицы и строки целиком на второй странице
        assert!(!plan.pages[0].texts().any(|t| t == "Txn Date"));
        assert!(plan.pages[1].texts().any(|t| t == "Txn Date"));
        assert_eq!(plan.pages[1].texts().filter(|t| *t == "R0").count(), 3);
    }

    #[test]
    fn blank_debit_produces_no_text() {
        let plan = LayoutEngine::default()
            .plan(&single_row_view("CREDIT INTEREST--", "", "46.00"))
            .unwrap();
        let body_texts: Vec<&str> = plan.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, role: FontRole::Body, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(
            body_texts,
            vec!["25 Jun 2023", "25 Jun 2023", "CREDIT INTEREST--", "46.00", "6,731.21"]
        );
    }
}
