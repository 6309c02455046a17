//! Рендереры: превращают [`LayoutPlan`] в байты PDF.
//!
//! Два взаимозаменяемых бэкенда за одним трейтом:
//! - [`CanvasRenderer`] рисует план напрямую векторными примитивами;
//! - [`MarkupRenderer`] собирает из того же плана HTML и отдаёт его внешнему конвертеру.

pub mod canvas;
pub mod markup;
pub mod naming;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::layout::instruction::LayoutPlan;

pub use crate::layout::{COMPUTER_GENERATED_FOOTER, SECURITY_NOTICE};
pub use canvas::CanvasRenderer;
pub use markup::{ConverterConfig, MarkupRenderer};
pub use naming::FileNaming;

/// Общий контракт рендереров
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Короткое имя бэкенда для логов
    fn name(&self) -> &'static str;

    /// Либо полный валидный документ, либо ошибка - частичный вывод не возвращается
    async fn render(&self, plan: &LayoutPlan) -> Result<Vec<u8>, RenderError>;
}

/// Выбор бэкенда в конфигурации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Canvas,
    Markup,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: Backend,
    /// используется только бэкендом `markup`
    pub converter: ConverterConfig,
}

impl RendererConfig {
    /// Создаёт рендерер по конфигурации
    pub fn build(&self) -> Box<dyn DocumentRenderer> {
        match self.backend {
            Backend::Canvas => Box::new(CanvasRenderer::new()),
            Backend::Markup => Box::new(MarkupRenderer::new(self.converter.clone())),
        }
    }
}
