use super::config::FontRole;
use super::instruction::{Align, DrawOp, Point, Rect};
use super::metrics::wrap_text;
use super::{Flow, StatementView};

/// Шапка: заголовок, реквизиты в две колонки, строка остатка, строка периода, разделитель
pub(super) fn layout_header(flow: &mut Flow, view: &StatementView) {
    let cfg = flow.cfg;
    let pitch = cfg.header_pitch;
    let left = flow.left();
    let content_width = cfg.content_width();

    if !view.title.is_empty() {
        let height = cfg.fonts.title.size * 1.6;
        let rect = Rect::new(left, flow.y, content_width, height);
        flow.push(DrawOp::text(view.title.clone(), rect, Align::Center, FontRole::Title));
        flow.advance(height + pitch / 2.0);
    }

    let body = cfg.fonts.body;
    let value_x = left + cfg.value_offset;
    let value_width = content_width - cfg.value_offset;

    for field in &view.fields {
        let label = Rect::new(left, flow.y, cfg.label_width, pitch);
        flow.push(DrawOp::text(field.label.clone(), label, Align::Left, FontRole::Header));

        // каждая строка значения переносится отдельно, шаг - кратный pitch
        let lines: Vec<String> = field
            .lines
            .iter()
            .flat_map(|line| wrap_text(line, body.face, body.size, value_width))
            .collect();

        for (idx, line) in lines.iter().enumerate() {
            let rect = Rect::new(value_x, flow.y + pitch * idx as f32, value_width, pitch);
            flow.push(DrawOp::text(line.clone(), rect, Align::Left, FontRole::Body));
        }

        flow.advance(pitch * lines.len().max(1) as f32);
    }

    flow.advance(pitch / 2.0);

    for line in [&view.balance_line, &view.period_line] {
        if line.is_empty() {
            continue;
        }
        let rect = Rect::new(left, flow.y, content_width, pitch);
        flow.push(DrawOp::text(line.clone(), rect, Align::Left, FontRole::Header));
        flow.advance(pitch);
    }

    let divider_y = flow.y + pitch / 2.0;
    flow.push(DrawOp::Line {
        from: Point { x: left, y: divider_y },
        to: Point {
            x: left + content_width,
            y: divider_y,
        },
        color: cfg.divider_color,
        width: cfg.border_width * 2.0,
    });
    flow.advance(pitch);
}

#[cfg(test)]
mod tests {
    use super::super::config::LayoutConfig;
    use super::super::{HeaderField, LayoutEngine};
    use super::*;

    fn value_ops(view: &StatementView) -> Vec<(String, Rect)> {
        let plan = LayoutEngine::default().plan(view).unwrap();
        plan.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, rect, role: FontRole::Body, .. } => Some((text.clone(), *rect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn values_start_at_fixed_offset_and_keep_field_order() {
        let cfg = LayoutConfig::default();
        let view = StatementView {
            fields: vec![
                HeaderField::new("Account Name", "MR RAVI KUMAR"),
                HeaderField::new("Account Number", "00000031529681353"),
            ],
            ..Default::default()
        };

        let ops = value_ops(&view);
        assert_eq!(ops[0].0, "MR RAVI KUMAR");
        assert_eq!(ops[1].0, "00000031529681353");

        let expected_x = cfg.margins.left + cfg.value_offset;
        assert!((ops[0].1.x - expected_x).abs() < 1e-3);
        assert!((ops[1].1.y - ops[0].1.y - cfg.header_pitch).abs() < 1e-3);
    }

    #[test]
    fn address_lines_advance_by_pitch_multiples() {
        let cfg = LayoutConfig::default();
        let view = StatementView {
            fields: vec![
                HeaderField::multiline(
                    "Address",
                    vec!["FLAT 12, SUNRISE APARTMENTS".into(), "MG ROAD, PUNE".into()],
                ),
                HeaderField::new("Date", "1 Jul 2025"),
            ],
            ..Default::default()
        };

        let ops = value_ops(&view);
        let first = ops[0].1.y;
        let date = ops.iter().find(|(t, _)| t == "1 Jul 2025").unwrap().1.y;
        assert!((date - first - 2.0 * cfg.header_pitch).abs() < 1e-3);
    }

    #[test]
    fn empty_values_still_take_one_row() {
        let cfg = LayoutConfig::default();
        let view = StatementView {
            fields: vec![
                HeaderField::new("Branch", ""),
                HeaderField::new("CIF No.", "12345678901"),
            ],
            ..Default::default()
        };

        let plan = LayoutEngine::default().plan(&view).unwrap();
        let label_y = |label: &str| {
            plan.pages[0].ops.iter().find_map(|op| match op {
                DrawOp::Text { text, rect, .. } if text == label => Some(rect.y),
                _ => None,
            })
        };
        let branch = label_y("Branch").unwrap();
        let cif = label_y("CIF No.").unwrap();
        assert!((cif - branch - cfg.header_pitch).abs() < 1e-3);
    }
}
