mod logger;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use statement::layout::instruction::LayoutPlan;
use statement::render::markup::render_markup;
use statement::{
    Backend, FileNaming, LoadError, StatementAssembler, StatementConfig, StatementError,
    StatementRequest, read_transactions_csv,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "cli_render",
    version,
    about = "Генерирует PDF-выписку по реквизитам счёта и списку операций.",
    long_about = None,
)]
struct Args {
    /// JSON с `accountInfo` и `transactions`
    #[arg(long)]
    request: PathBuf,

    /// CSV с операциями; заменяет `transactions` из запроса
    #[arg(long)]
    transactions_csv: Option<PathBuf>,

    /// TOML-конфигурация
    #[arg(long)]
    config: Option<PathBuf>,

    /// Бэкенд рендеринга, перекрывает конфигурацию
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Схема имени файла, перекрывает конфигурацию
    #[arg(long, value_enum)]
    naming: Option<NamingArg>,

    /// Каталог для готового PDF
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Дополнительно сохранить HTML-вариант выписки
    #[arg(long)]
    emit_html: Option<PathBuf>,

    /// Подробные логи
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackendArg {
    Canvas,
    Markup,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum NamingArg {
    Account,
    Anonymous,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), StatementError> {
    let mut config = match &args.config {
        Some(path) => StatementConfig::load(path)?,
        None => StatementConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.renderer.backend = match backend {
            BackendArg::Canvas => Backend::Canvas,
            BackendArg::Markup => Backend::Markup,
        };
    }
    if let Some(naming) = args.naming {
        config.naming = match naming {
            NamingArg::Account => FileNaming::AccountNumber,
            NamingArg::Anonymous => FileNaming::Anonymous,
        };
    }
    debug!(?config, "configuration resolved");

    let mut request = read_request(&args.request)?;
    if let Some(path) = &args.transactions_csv {
        let file = File::open(path).map_err(LoadError::from)?;
        request.transactions = Some(read_transactions_csv(BufReader::new(file))?);
    }

    let assembler = StatementAssembler::new(config);
    debug!(backend = assembler.backend(), "renderer selected");

    if let Some(path) = &args.emit_html {
        let plan = assembler.plan(
            request.account_info.as_ref(),
            request.transactions.as_deref(),
        )?;
        write_html(&plan, path)?;
    }

    let document = assembler.generate_request(&request).await?;

    fs::create_dir_all(&args.out_dir)?;
    let out_path = args.out_dir.join(&document.filename);
    fs::write(&out_path, &document.bytes)?;

    info!(
        path = %out_path.display(),
        backend = assembler.backend(),
        bytes = document.bytes.len(),
        "statement written"
    );
    println!("{}", out_path.display());

    Ok(())
}

fn read_request(path: &Path) -> Result<StatementRequest, LoadError> {
    let file = File::open(path)?;
    StatementRequest::from_json_reader(BufReader::new(file))
}

fn write_html(plan: &LayoutPlan, path: &Path) -> Result<(), StatementError> {
    let html = render_markup(plan)?;
    fs::write(path, html)?;
    info!(path = %path.display(), "html preview written");
    Ok(())
}
