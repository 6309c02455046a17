use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;
use crate::model::{FieldValue, TransactionRecord};

/// Строка таблицы операций.
///
/// Суммы читаются строками: иначе csv сам превратит `46` в число,
/// и нормализатор оставит его без форматирования.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRecord {
    #[serde(rename = "Date", alias = "Txn Date")]
    date: String,
    #[serde(rename = "Value Date")]
    value_date: String,
    #[serde(rename = "Narration", alias = "Description")]
    narration: String,
    #[serde(rename = "Ref No./Cheque No.", alias = "Chq./Ref.No.", alias = "Reference")]
    reference: String,
    #[serde(rename = "Debit", alias = "Withdrawal Amt.")]
    debit: String,
    #[serde(rename = "Credit", alias = "Deposit Amt.")]
    credit: String,
    #[serde(rename = "Balance", alias = "Closing Balance")]
    balance: String,
}

impl CsvRecord {
    fn is_blank(&self) -> bool {
        [
            &self.date,
            &self.value_date,
            &self.narration,
            &self.reference,
            &self.debit,
            &self.credit,
            &self.balance,
        ]
        .iter()
        .all(|s| s.is_empty())
    }

    fn into_transaction(self) -> TransactionRecord {
        TransactionRecord {
            date: self.date,
            value_date: self.value_date,
            narration: self.narration,
            reference: self.reference,
            debit: amount(self.debit),
            credit: amount(self.credit),
            balance: amount(self.balance),
        }
    }
}

fn amount(raw: String) -> FieldValue {
    if raw.is_empty() {
        FieldValue::Empty
    } else {
        FieldValue::Text(raw)
    }
}

/// Читает операции из CSV с заголовком.
///
/// Колонки ищутся по имени, порядок не важен, отсутствующие считаются пустыми.
/// Пустые строки пропускаются, остальные идут в исходном порядке.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();
    let mut skipped = 0usize;

    for row in rdr.deserialize::<CsvRecord>() {
        let record = row?;
        if record.is_blank() {
            skipped += 1;
            continue;
        }
        transactions.push(record.into_transaction());
    }

    debug!(rows = transactions.len(), skipped, "transactions csv read");
    Ok(transactions)
}
