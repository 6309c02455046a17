use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// MIME-тип выдаваемого документа
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Значение денежной ячейки в том виде, в каком оно пришло на вход.
///
/// Сумма может прийти строкой (`"6685.21"`, `"6,685.21"`) или уже числом;
/// числа нормализатор не трогает.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// значение не передано
    #[default]
    Empty,
    /// текст
    Text(String),
    /// уже структурированное число
    Number(f64),
}

impl FieldValue {
    /// Пустое значение или строка из одних пробелов
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Любое JSON-значение превращается в ячейку, запрос из-за суммы не отклоняется:
/// булево значение становится текстом, массив или объект - пустой ячейкой.
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Lenient {
            Text(String),
            Number(f64),
            Flag(bool),
            Other(IgnoredAny),
        }

        let value = Option::<Lenient>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Lenient::Other(_)) => FieldValue::Empty,
            Some(Lenient::Text(s)) => FieldValue::Text(s),
            Some(Lenient::Number(v)) => FieldValue::Number(v),
            Some(Lenient::Flag(v)) => FieldValue::Text(v.to_string()),
        })
    }
}

/// Реквизиты счёта для шапки выписки.
///
/// Все поля - обычный текст, ни одно не обязательно.
/// Отсутствие самой структуры при этом считается ошибкой входных данных.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountInfo {
    /// владелец счёта
    #[serde(alias = "name", deserialize_with = "lenient_text")]
    pub account_name: String,
    /// номер счёта, обычно 15-18 цифр
    #[serde(deserialize_with = "lenient_text")]
    pub account_number: String,

    /// строки адреса, до четырёх
    #[serde(alias = "address1", deserialize_with = "lenient_text")]
    pub address_line1: String,
    #[serde(alias = "address2", deserialize_with = "lenient_text")]
    pub address_line2: String,
    #[serde(alias = "address3", deserialize_with = "lenient_text")]
    pub address_line3: String,
    #[serde(alias = "address4", deserialize_with = "lenient_text")]
    pub address_line4: String,

    /// дата формирования выписки
    #[serde(alias = "date", deserialize_with = "lenient_text")]
    pub statement_date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub account_description: String,
    #[serde(alias = "branchName", deserialize_with = "lenient_text")]
    pub branch: String,
    pub drawing_power: FieldValue,
    /// процентная ставка
    #[serde(deserialize_with = "lenient_text")]
    pub interest_rate: String,
    /// MOD / минимальный остаток
    #[serde(alias = "modBal")]
    pub mod_balance: FieldValue,
    #[serde(alias = "cif", alias = "cifNumber", deserialize_with = "lenient_text")]
    pub cif_no: String,
    /// пустая строка - CKYC не выводится
    #[serde(alias = "ckyc", alias = "ckycNumber", deserialize_with = "lenient_text")]
    pub ckyc_no: String,
    #[serde(alias = "ifsc", alias = "ifscCode", deserialize_with = "lenient_text")]
    pub ifs_code: String,
    #[serde(alias = "micr", deserialize_with = "lenient_text")]
    pub micr_code: String,
    /// признак зарегистрированного наследника, "true"/"false" или "Yes"/"No"
    #[serde(alias = "nominationRegistered", deserialize_with = "lenient_text")]
    pub nomination: String,

    /// дата входящего остатка
    #[serde(alias = "balanceAsOn", alias = "balanceDate", deserialize_with = "lenient_text")]
    pub opening_balance_date: String,
    /// входящий остаток
    pub opening_balance: FieldValue,

    /// начало периода выписки
    #[serde(alias = "fromDate", deserialize_with = "lenient_text")]
    pub start_date: String,
    /// конец периода выписки
    #[serde(alias = "toDate", deserialize_with = "lenient_text")]
    pub end_date: String,
}

impl AccountInfo {
    /// Непустые строки адреса по порядку
    pub fn address_lines(&self) -> impl Iterator<Item = &str> {
        [
            &self.address_line1,
            &self.address_line2,
            &self.address_line3,
            &self.address_line4,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    }
}

/// Одна строка операций по счёту.
///
/// Дебет и кредит взаимоисключающие, но любой из них может быть пустым.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRecord {
    /// дата операции
    #[serde(
        rename = "Date",
        alias = "Txn Date",
        alias = "txnDate",
        alias = "date",
        deserialize_with = "lenient_text"
    )]
    pub date: String,
    /// дата валютирования
    #[serde(
        rename = "Value Date",
        alias = "ValueDate",
        alias = "valueDate",
        deserialize_with = "lenient_text"
    )]
    pub value_date: String,
    /// текстовое описание
    #[serde(
        rename = "Narration",
        alias = "Description",
        alias = "narration",
        alias = "description",
        deserialize_with = "lenient_text"
    )]
    pub narration: String,
    /// номер чека или референс
    #[serde(
        rename = "Ref No./Cheque No.",
        alias = "Chq./Ref.No.",
        alias = "Reference",
        alias = "RefNo",
        alias = "reference",
        deserialize_with = "lenient_text"
    )]
    pub reference: String,
    #[serde(rename = "Debit", alias = "Withdrawal Amt.", alias = "debit")]
    pub debit: FieldValue,
    #[serde(rename = "Credit", alias = "Deposit Amt.", alias = "credit")]
    pub credit: FieldValue,
    /// остаток после операции
    #[serde(rename = "Balance", alias = "Closing Balance", alias = "balance")]
    pub balance: FieldValue,
}

/// Входная пара (реквизиты счёта, операции) в том виде, в каком она приходит извне.
///
/// Любая из частей может отсутствовать: решение об ошибке принимает сборщик выписки.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementRequest {
    #[serde(alias = "account_info")]
    pub account_info: Option<AccountInfo>,
    pub transactions: Option<Vec<TransactionRecord>>,
}

/// Готовый документ: байты, MIME-тип и рекомендуемое имя файла.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl RenderedDocument {
    /// Документ в формате PDF
    pub fn pdf(bytes: Vec<u8>, filename: String) -> Self {
        RenderedDocument {
            bytes,
            content_type: PDF_CONTENT_TYPE,
            filename,
        }
    }
}

/// Принимает строку, число, булево значение или null и всегда отдаёт строку
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
    }

    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(Lenient::Text(s)) => s,
        Some(Lenient::Int(v)) => v.to_string(),
        Some(Lenient::Float(v)) => v.to_string(),
        Some(Lenient::Flag(v)) => v.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_info_accepts_numbers_and_flags() {
        let json = r#"{
            "accountName": "MR TEST",
            "accountNumber": 31529681353,
            "nomination": true,
            "openingBalance": 6685.21,
            "unknownField": "ignored"
        }"#;
        let info: AccountInfo = serde_json::from_str(json).expect("valid account info");

        assert_eq!(info.account_name, "MR TEST");
        assert_eq!(info.account_number, "31529681353");
        assert_eq!(info.nomination, "true");
        assert_eq!(info.opening_balance, FieldValue::Number(6685.21));
        assert_eq!(info.drawing_power, FieldValue::Empty);
    }

    #[test]
    fn transaction_accepts_historical_keys() {
        let json = r#"{"Txn Date": "25/06/2023", "Description": "CREDIT INTEREST--", "Credit": "46", "Debit": null}"#;
        let tx: TransactionRecord = serde_json::from_str(json).expect("valid transaction");

        assert_eq!(tx.date, "25/06/2023");
        assert_eq!(tx.narration, "CREDIT INTEREST--");
        assert_eq!(tx.credit, FieldValue::from("46"));
        assert!(tx.debit.is_blank());
        assert!(tx.balance.is_blank());
    }

    #[test]
    fn odd_amount_values_do_not_reject_the_request() {
        let json = r#"{"accountNumber": "1", "drawingPower": false, "modBalance": [1, 2], "openingBalance": {"v": 1}}"#;
        let info: AccountInfo = serde_json::from_str(json).expect("account info with odd amounts");

        assert_eq!(info.drawing_power, FieldValue::from("false"));
        assert_eq!(info.mod_balance, FieldValue::Empty);
        assert_eq!(info.opening_balance, FieldValue::Empty);

        let tx: TransactionRecord =
            serde_json::from_str(r#"{"Debit": true, "Credit": 46, "Balance": null}"#).expect("transaction");
        assert_eq!(tx.debit, FieldValue::from("true"));
        assert_eq!(tx.credit, FieldValue::Number(46.0));
        assert_eq!(tx.balance, FieldValue::Empty);
    }

    #[test]
    fn address_lines_skip_blank() {
        let info = AccountInfo {
            address_line1: "12 MAIN ROAD".into(),
            address_line2: "  ".into(),
            address_line3: "PUNE".into(),
            ..Default::default()
        };
        let lines: Vec<&str> = info.address_lines().collect();
        assert_eq!(lines, vec!["12 MAIN ROAD", "PUNE"]);
    }
}
