use clap::{Parser, Subcommand};
use parquet_import::runner::{ImportArgs, ImportResult, run_import};
use std::path::PathBuf;

#[derive(Parser, Clone)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Import Parquet files into SQLite tables named after the files
    Import {
        /// Destination database URL (e.g. sqlite://imports.db)
        #[arg(short, long)]
        database: String,

        /// Parquet files to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Rows decoded per record batch
        #[arg(short, long, default_value = "1024")]
        batch_size: usize,

        /// Quiet mode - no progress bar, only warnings and the summary
        #[arg(short, long)]
        quiet: bool,

        /// Print the table descriptors as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Import {
            database,
            paths,
            batch_size,
            quiet,
            json,
        } => {
            init_tracing(quiet);

            let results = run_import(ImportArgs {
                database_url: database,
                paths,
                batch_size,
                quiet,
            })
            .await?;

            if json {
                print_json(&results)?;
            } else {
                print_summary(&results);
            }
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("parquet_import=warn,sqlx=off")
        } else {
            EnvFilter::new("parquet_import=info,sqlx=warn")
        }
    });
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn print_summary(results: &[ImportResult]) {
    println!();
    println!("Import Summary");
    println!("==============");
    for result in results {
        let secs = result.duration.as_secs_f64();
        println!("{}", result.path.display());
        println!("  Table: {}", result.metadata.table_name);
        println!("  Columns: {}", result.metadata.num_columns());
        println!("  Rows inserted: {}", result.rows_inserted);
        println!("  Duration: {:.2}s", secs);
        if secs > 0.0 {
            println!(
                "  Throughput: {:.2} rows/sec",
                result.rows_inserted as f64 / secs
            );
        }
    }
}

fn print_json(results: &[ImportResult]) -> anyhow::Result<()> {
    let descriptors: Vec<_> = results.iter().map(|r| &r.metadata).collect();
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}
