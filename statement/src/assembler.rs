//! Сборка выписки: проверка входа, нормализация, раскладка, рендеринг.

use tracing::{debug, info, trace};

use crate::config::StatementConfig;
use crate::error::{InputError, StatementError};
use crate::layout::instruction::LayoutPlan;
use crate::layout::{HeaderField, LayoutEngine, StatementView, TableRow};
use crate::model::{AccountInfo, FieldValue, RenderedDocument, StatementRequest, TransactionRecord};
use crate::normalize::{
    normalize_flag, normalize_rate, try_normalize_currency, try_normalize_date, Normalized,
};
use crate::render::{DocumentRenderer, FileNaming};

/// Заголовок документа
pub const STATEMENT_TITLE: &str = "Account Statement";

/// Генератор выписок.
///
/// Состояния между вызовами нет, один экземпляр можно использовать из разных задач.
pub struct StatementAssembler {
    engine: LayoutEngine,
    renderer: Box<dyn DocumentRenderer>,
    naming: FileNaming,
}

impl Default for StatementAssembler {
    fn default() -> Self {
        Self::new(StatementConfig::default())
    }
}

impl StatementAssembler {
    pub fn new(config: StatementConfig) -> Self {
        let renderer = config.renderer.build();
        Self::with_renderer(config, renderer)
    }

    /// Сборщик с произвольным рендерером; бэкенд из конфигурации игнорируется
    pub fn with_renderer(config: StatementConfig, renderer: Box<dyn DocumentRenderer>) -> Self {
        StatementAssembler {
            engine: LayoutEngine::new(config.layout),
            renderer,
            naming: config.naming,
        }
    }

    /// Имя бэкенда рендеринга
    pub fn backend(&self) -> &'static str {
        self.renderer.name()
    }

    /// План документа без рендеринга
    pub fn plan(
        &self,
        account: Option<&AccountInfo>,
        transactions: Option<&[TransactionRecord]>,
    ) -> Result<LayoutPlan, StatementError> {
        let (account, transactions) = require(account, transactions)?;
        let view = build_view(account, transactions);
        Ok(self.engine.plan(&view)?)
    }

    /// Генерирует PDF-выписку.
    ///
    /// Либо возвращается полный документ, либо ошибка: байты частично собранного
    /// документа наружу не попадают.
    pub async fn generate(
        &self,
        account: Option<&AccountInfo>,
        transactions: Option<&[TransactionRecord]>,
    ) -> Result<RenderedDocument, StatementError> {
        let (account, transactions) = require(account, transactions)?;

        let view = build_view(account, transactions);
        let plan = self.engine.plan(&view)?;
        let bytes = self.renderer.render(&plan).await?;

        let filename = self.naming.filename(&account.account_number);
        info!(
            filename = %filename,
            backend = self.renderer.name(),
            pages = plan.page_count(),
            rows = transactions.len(),
            bytes = bytes.len(),
            "statement generated"
        );

        Ok(RenderedDocument::pdf(bytes, filename))
    }

    pub async fn generate_request(
        &self,
        request: &StatementRequest,
    ) -> Result<RenderedDocument, StatementError> {
        self.generate(request.account_info.as_ref(), request.transactions.as_deref())
            .await
    }
}

/// Генерация с настройками по умолчанию
pub async fn generate_statement(
    account: Option<&AccountInfo>,
    transactions: Option<&[TransactionRecord]>,
) -> Result<RenderedDocument, StatementError> {
    StatementAssembler::default().generate(account, transactions).await
}

fn require<'a>(
    account: Option<&'a AccountInfo>,
    transactions: Option<&'a [TransactionRecord]>,
) -> Result<(&'a AccountInfo, &'a [TransactionRecord]), InputError> {
    let account = account.ok_or(InputError::MissingAccountInfo)?;
    let transactions = transactions.ok_or(InputError::MissingTransactions)?;
    Ok((account, transactions))
}

/// Нормализует входные данные и раскладывает их по полям шапки и строкам таблицы.
///
/// Порядок полей фиксирован, строки таблицы идут в порядке входа, новых не добавляется.
pub fn build_view(account: &AccountInfo, transactions: &[TransactionRecord]) -> StatementView {
    let mut fields = vec![
        HeaderField::new("Account Name", account.account_name.trim()),
        HeaderField::multiline(
            "Address",
            account.address_lines().map(str::to_string).collect(),
        ),
        HeaderField::new("Date", date("statement_date", &account.statement_date)),
        HeaderField::new("Account Number", account.account_number.trim()),
        HeaderField::new("Account Description", account.account_description.trim()),
        HeaderField::new("Branch", account.branch.trim()),
        HeaderField::new("Drawing Power", currency("drawing_power", &account.drawing_power)),
        HeaderField::new("Interest Rate(% p.a.)", normalize_rate(&account.interest_rate)),
        HeaderField::new("MOD Balance", currency("mod_balance", &account.mod_balance)),
        HeaderField::new("CIF No.", account.cif_no.trim()),
    ];
    if !account.ckyc_no.trim().is_empty() {
        fields.push(HeaderField::new("CKYC Number", account.ckyc_no.trim()));
    }
    fields.extend([
        HeaderField::new("IFS Code", account.ifs_code.trim()),
        HeaderField::new("MICR Code", account.micr_code.trim()),
        HeaderField::new("Nomination Registered", normalize_flag(&account.nomination)),
    ]);

    let opening = currency("opening_balance", &account.opening_balance);
    let balance_line = if account.opening_balance_date.trim().is_empty() {
        format!("Opening Balance : {opening}")
    } else {
        let as_on = date("opening_balance_date", &account.opening_balance_date);
        format!("Balance as on {as_on} : {opening}")
    };

    let period_line = if account.start_date.trim().is_empty() && account.end_date.trim().is_empty() {
        String::new()
    } else {
        format!(
            "Account Statement from {} to {}",
            date("start_date", &account.start_date),
            date("end_date", &account.end_date)
        )
    };

    let rows: Vec<TableRow> = transactions.iter().map(table_row).collect();
    debug!(fields = fields.len(), rows = rows.len(), "statement view built");

    StatementView {
        title: STATEMENT_TITLE.to_string(),
        fields,
        balance_line,
        period_line,
        rows,
    }
}

fn table_row(tx: &TransactionRecord) -> TableRow {
    TableRow {
        cells: [
            date("date", &tx.date),
            date("value_date", &tx.value_date),
            tx.narration.clone(),
            tx.reference.clone(),
            currency("debit", &tx.debit),
            currency("credit", &tx.credit),
            currency("balance", &tx.balance),
        ],
    }
}

fn date(field: &'static str, raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    passthrough_trace(field, try_normalize_date(raw))
}

fn currency(field: &'static str, raw: &FieldValue) -> String {
    if raw.is_blank() {
        return String::new();
    }
    passthrough_trace(field, try_normalize_currency(raw))
}

fn passthrough_trace(field: &'static str, normalized: Normalized) -> String {
    if !normalized.applied {
        trace!(field, value = %normalized.value, "value kept as is");
    }
    normalized.value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::layout::Column;
    use async_trait::async_trait;

    fn sample_account() -> AccountInfo {
        AccountInfo {
            account_name: "MR TEST HOLDER".into(),
            account_number: "00000031529681353".into(),
            address_line1: "12 MAIN ROAD".into(),
            address_line2: "PUNE".into(),
            statement_date: "01/04/2025".into(),
            opening_balance_date: "01/04/2025".into(),
            opening_balance: FieldValue::from("6685.21"),
            start_date: "01-Apr-25".into(),
            end_date: "30/06/2025".into(),
            nomination: "true".into(),
            ..Default::default()
        }
    }

    fn sample_transactions() -> Vec<TransactionRecord> {
        vec![TransactionRecord {
            date: "25 Jun 2023".into(),
            narration: "CREDIT INTEREST--".into(),
            credit: FieldValue::from("46"),
            balance: FieldValue::from("6731.21"),
            ..Default::default()
        }]
    }

    #[test]
    fn view_normalizes_header_and_rows() {
        let view = build_view(&sample_account(), &sample_transactions());

        assert_eq!(view.title, "Account Statement");
        assert_eq!(view.balance_line, "Balance as on 1 Apr 2025 : 6,685.21");
        assert_eq!(view.period_line, "Account Statement from 1 Apr 2025 to 30 Jun 2025");

        let row = &view.rows[0];
        assert_eq!(row.cell(Column::TxnDate), "25 Jun 2023");
        assert_eq!(row.cell(Column::Debit), "");
        assert_eq!(row.cell(Column::Credit), "46.00");
        assert_eq!(row.cell(Column::Balance), "6,731.21");

        let nomination = view.fields.iter().find(|f| f.label == "Nomination Registered").unwrap();
        assert_eq!(nomination.lines, vec!["Yes"]);
    }

    #[test]
    fn header_fields_keep_fixed_order() {
        let view = build_view(&sample_account(), &[]);
        let labels: Vec<&str> = view.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Account Name",
                "Address",
                "Date",
                "Account Number",
                "Account Description",
                "Branch",
                "Drawing Power",
                "Interest Rate(% p.a.)",
                "MOD Balance",
                "CIF No.",
                "IFS Code",
                "MICR Code",
                "Nomination Registered",
            ]
        );
    }

    #[test]
    fn ckyc_is_printed_only_when_present() {
        let mut account = sample_account();
        account.ckyc_no = "12345678901234".into();
        let view = build_view(&account, &[]);

        let idx = view.fields.iter().position(|f| f.label == "CKYC Number").unwrap();
        assert_eq!(view.fields[idx - 1].label, "CIF No.");
        assert_eq!(view.fields[idx + 1].label, "IFS Code");
    }

    #[test]
    fn balance_line_without_date() {
        let mut account = sample_account();
        account.opening_balance_date.clear();
        let view = build_view(&account, &[]);
        assert_eq!(view.balance_line, "Opening Balance : 6,685.21");
    }

    #[test]
    fn malformed_values_degrade_into_output() {
        let tx = TransactionRecord {
            date: "yesterday".into(),
            debit: FieldValue::from("N/A"),
            credit: FieldValue::Number(46.0),
            balance: FieldValue::from("1,000.00"),
            ..Default::default()
        };
        let view = build_view(&sample_account(), &[tx]);
        let row = &view.rows[0];

        assert_eq!(row.cell(Column::TxnDate), "yesterday");
        assert_eq!(row.cell(Column::Debit), "N/A");
        assert_eq!(row.cell(Column::Credit), "46");
        assert_eq!(row.cell(Column::Balance), "1,000.00");
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let account = sample_account();
        let txs = sample_transactions();
        let assembler = StatementAssembler::default();

        let doc = assembler.generate(Some(&account), Some(&txs)).await.unwrap();
        assert_eq!(doc.filename, "Statement_00000031529681353.pdf");
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.bytes.starts_with(b"%PDF-"));

        let plan = assembler.plan(Some(&account), Some(&txs)).unwrap();
        let texts: Vec<&str> = plan.texts().collect();
        assert!(texts.iter().any(|t| t.contains("6,685.21")));
        assert!(texts.contains(&"46.00"));
        assert!(texts.contains(&"6,731.21"));
    }

    #[tokio::test]
    async fn same_input_gives_same_bytes() {
        let account = sample_account();
        let txs = sample_transactions();
        let a = generate_statement(Some(&account), Some(&txs)).await.unwrap();
        let b = generate_statement(Some(&account), Some(&txs)).await.unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn missing_structures_are_input_errors() {
        let account = sample_account();
        let txs = sample_transactions();

        let err = generate_statement(None, Some(&txs)).await.unwrap_err();
        assert!(matches!(err, StatementError::Input(InputError::MissingAccountInfo)));

        let err = generate_statement(Some(&account), None).await.unwrap_err();
        assert!(matches!(err, StatementError::Input(InputError::MissingTransactions)));
        assert!(err.is_input());
    }

    #[tokio::test]
    async fn empty_transactions_still_render() {
        let none: &[TransactionRecord] = &[];
        let doc = generate_statement(Some(&sample_account()), Some(none)).await.unwrap();
        assert!(doc.bytes.starts_with(b"%PDF-"));
    }

    struct FailingRenderer;

    #[async_trait]
    impl DocumentRenderer for FailingRenderer {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn render(&self, _plan: &LayoutPlan) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Pdf("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn render_failure_is_reported_without_bytes() {
        let assembler =
            StatementAssembler::with_renderer(StatementConfig::default(), Box::new(FailingRenderer));
        let err = assembler
            .generate(Some(&sample_account()), Some(&sample_transactions()))
            .await
            .unwrap_err();

        assert!(matches!(err, StatementError::Render(RenderError::Pdf(_))));
        assert!(!err.is_input());
    }

    #[test]
    fn assembler_is_shareable_between_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StatementAssembler>();
    }
}
