use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Как назвать файл выписки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// `Statement_<номер счёта>.pdf`, без номера - как анонимная
    #[default]
    AccountNumber,
    /// `statement-<unix millis>-<случайный суффикс>.pdf`
    Anonymous,
}

impl FileNaming {
    pub fn filename(self, account_number: &str) -> String {
        let account_number = sanitize(account_number);

        match self {
            FileNaming::AccountNumber if !account_number.is_empty() => {
                format!("Statement_{account_number}.pdf")
            }
            _ => anonymous_filename(),
        }
    }
}

/// Имя для выписки без привязки к счёту
pub fn anonymous_filename() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("statement-{millis}-{suffix}.pdf")
}

// номер счёта попадает в имя файла - отсекаем всё, что похоже на путь
fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
