use std::io::Error as IoError;
use thiserror::Error;

/// Ошибки генерации выписки
///
/// Ошибки уровня отдельных полей (кривая дата, нечисловая сумма) сюда не попадают:
/// такие значения просто выводятся как есть.
#[derive(Debug, Error)]
pub enum StatementError {
    /// не передана одна из обязательных входных структур
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// ошибка на этапе раскладки или сериализации документа
    #[error("statement generation failed: {0}")]
    Render(#[from] RenderError),

    /// ошибка чтения запроса или конфигурации
    #[error("failed to load: {0}")]
    Load(#[from] LoadError),
}

/// Ошибки входных данных
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("account info is required")]
    MissingAccountInfo,
    #[error("transactions are required")]
    MissingTransactions,
}

/// Ошибки рендеринга документа
#[derive(Debug, Error)]
pub enum RenderError {
    /// план раскладки не может быть построен
    #[error("layout error: {0}")]
    Layout(String),

    /// ошибка сборки PDF
    #[error("pdf error: {0}")]
    Pdf(String),

    /// ошибка сборки HTML-разметки
    #[error("markup error: {0}")]
    Markup(String),

    /// внешний конвертер не запустился
    #[error("failed to start converter `{program}`: {source}")]
    ConverterSpawn {
        program: String,
        #[source]
        source: IoError,
    },

    /// ошибка обмена данными с конвертером
    #[error("converter io error: {0}")]
    ConverterIo(#[source] IoError),

    /// конвертер завершился с ошибкой
    #[error("converter exited with {status}: {stderr}")]
    ConverterExit { status: String, stderr: String },

    /// конвертер отработал, но вернул не PDF
    #[error("converter produced no pdf output")]
    InvalidOutput,
}

/// Ошибки чтения входных файлов
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] IoError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<IoError> for StatementError {
    fn from(e: IoError) -> Self {
        StatementError::Load(LoadError::Io(e))
    }
}

impl StatementError {
    /// Ошибка на стороне вызывающего (а не сбой рендеринга)
    pub fn is_input(&self) -> bool {
        matches!(self, StatementError::Input(_))
    }
}
