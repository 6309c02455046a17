use super::config::{Color, FontRole, FontRoles, Size};

/// Точка, начало координат в левом верхнем углу страницы
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Выравнивание текста внутри своего бокса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Инструкция рисования, не зависящая от бэкенда
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// прямоугольник с заливкой и/или обводкой
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    /// отрезок
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    /// одна строка текста, вертикально по центру бокса
    Text {
        text: String,
        rect: Rect,
        align: Align,
        role: FontRole,
    },
}

impl DrawOp {
    pub fn text(text: impl Into<String>, rect: Rect, align: Align, role: FontRole) -> Self {
        DrawOp::Text {
            text: text.into(),
            rect,
            align,
            role,
        }
    }

    /// Текст инструкции, если это текст
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Инструкции одной страницы в порядке рисования
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

impl PagePlan {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::as_text)
    }
}

/// Полный план документа
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub page_size: Size,
    pub text_color: Color,
    /// толщина обводки прямоугольников
    pub stroke_width: f32,
    /// шрифты по ролям, как их задала конфигурация
    pub fonts: FontRoles,
    pub pages: Vec<PagePlan>,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Все тексты документа по порядку
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(PagePlan::texts)
    }
}
