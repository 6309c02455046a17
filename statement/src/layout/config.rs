use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Число колонок таблицы операций
pub const COLUMN_COUNT: usize = 7;

/// A4, портрет, в пунктах
pub const A4_PORTRAIT: Size = Size {
    width: 595.28,
    height: 841.89,
};

/// Цвет в RGB, 0..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);

    /// Компоненты в диапазоне 0.0..=1.0
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Поля страницы
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Начертание шрифта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// Назначение текста, по которому выбирается шрифт
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    /// заголовок документа
    Title,
    /// шапка таблицы, подписи полей, строки периода и остатка
    Header,
    /// значения и ячейки таблицы
    Body,
    /// предупреждение и подвал
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: f32,
    pub face: FontFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRoles {
    pub title: FontSpec,
    pub header: FontSpec,
    pub body: FontSpec,
    pub footer: FontSpec,
}

impl Default for FontRoles {
    fn default() -> Self {
        FontRoles {
            title: FontSpec {
                size: 14.0,
                face: FontFace::Bold,
            },
            header: FontSpec {
                size: 8.5,
                face: FontFace::Bold,
            },
            body: FontSpec {
                size: 8.0,
                face: FontFace::Regular,
            },
            footer: FontSpec {
                size: 7.5,
                face: FontFace::Italic,
            },
        }
    }
}

impl FontRoles {
    pub fn get(&self, role: FontRole) -> FontSpec {
        match role {
            FontRole::Title => self.title,
            FontRole::Header => self.header,
            FontRole::Body => self.body,
            FontRole::Footer => self.footer,
        }
    }
}

/// Что делать, если таблица не помещается на страницу
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pagination {
    /// одна страница, строки ниже нижнего поля уходят за край
    #[default]
    Unbounded,
    /// перенос строк на следующую страницу с повтором шапки таблицы
    PageBreaks,
}

/// Неизменяемая геометрия выписки.
///
/// Ширины колонок - константы, от содержимого не зависят: длинный текст переносится
/// внутри колонки.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: Size,
    pub margins: Margins,

    /// ширина колонки подписей в шапке
    pub label_width: f32,
    /// смещение колонки значений от левого поля
    pub value_offset: f32,
    /// шаг строк шапки
    pub header_pitch: f32,

    /// ширины колонок: Txn Date, Value Date, Description, Ref No., Debit, Credit, Balance
    pub column_widths: [f32; COLUMN_COUNT],
    /// высота однострочной строки таблицы
    pub row_height: f32,
    pub cell_padding: f32,

    pub header_fill: Color,
    pub divider_color: Color,
    pub text_color: Color,
    pub border_width: f32,

    pub fonts: FontRoles,
    pub pagination: Pagination,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page: A4_PORTRAIT,
            margins: Margins::uniform(36.0),
            label_width: 130.0,
            value_offset: 140.0,
            header_pitch: 13.0,
            column_widths: [56.0, 56.0, 160.0, 84.0, 55.0, 55.0, 57.0],
            row_height: 16.0,
            cell_padding: 3.0,
            header_fill: Color(217, 217, 217),
            divider_color: Color(64, 64, 64),
            text_color: Color::BLACK,
            border_width: 0.5,
            fonts: FontRoles::default(),
            pagination: Pagination::Unbounded,
        }
    }
}

impl LayoutConfig {
    /// Ширина области между левым и правым полем
    pub fn content_width(&self) -> f32 {
        self.page.width - self.margins.left - self.margins.right
    }

    pub fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    /// Нижняя граница, ниже которой при переносе страниц рисовать нельзя
    pub fn content_bottom(&self) -> f32 {
        self.page.height - self.margins.bottom
    }

    /// Проверяет, что из конфигурации вообще можно построить страницу
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.page.width <= 0.0 || self.page.height <= 0.0 {
            return Err(RenderError::Layout("page size must be positive".into()));
        }
        if self.content_width() <= 0.0 || self.content_bottom() <= self.margins.top {
            return Err(RenderError::Layout("margins leave no room for content".into()));
        }
        if let Some(idx) = self.column_widths.iter().position(|w| *w <= 2.0 * self.cell_padding) {
            return Err(RenderError::Layout(format!(
                "column {idx} is narrower than its padding"
            )));
        }
        if self.row_height <= 0.0 || self.header_pitch <= 0.0 {
            return Err(RenderError::Layout("row height and pitch must be positive".into()));
        }
        if self.value_offset >= self.content_width() {
            return Err(RenderError::Layout(
                "header value column starts outside the page".into(),
            ));
        }
        Ok(())
    }
}
