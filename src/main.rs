//! Hostel billing office CLI
//!
//! ```bash
//! hostel-billing dues 101            # what a student owes
//! hostel-billing bill 101            # export bill_101.pdf
//! hostel-billing set 101 "Total Paid" 4500
//! hostel-billing list --json
//! hostel-billing sync                # pull the published sheet, if enabled
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hostel_billing::{format_amount, AppConfig, BillingService, DuesSummary, SyncOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hostel-billing")]
#[command(version = hostel_billing::VERSION)]
#[command(about = "Hostel and mess dues: lookup, admin edits and PDF bills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Billing sheet (overrides HOSTEL_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Directory for exported bills (overrides HOSTEL_BILL_DIR)
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Print JSON instead of text where supported
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show payable, paid, due and refund for a student
    Dues { reg_no: String },

    /// Export the student's bill as PDF
    Bill { reg_no: String },

    /// Check a registration number / date of birth pair
    Login { reg_no: String, dob: String },

    /// Admin: overwrite one field of one student
    Set {
        reg_no: String,
        field: String,
        value: String,
    },

    /// All students with their dues
    List,

    /// Refresh the local sheet from the remote spreadsheet
    Sync,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::from_env().context("Failed to read configuration")?;
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }
    if let Some(dir) = cli.out_dir {
        config.output_dir = dir;
    }

    let service = BillingService::from_config(&config).context("Failed to set up billing service")?;

    match cli.command {
        Commands::Dues { reg_no } => {
            let (record, dues) = service.dues(&reg_no)?;
            if cli.json {
                let out = serde_json::json!({ "student": record, "dues": dues });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("🧾 {}", record.reg_no());
                print_dues(&dues);
            }
        }

        Commands::Bill { reg_no } => {
            let path = service
                .export_bill(&reg_no)
                .with_context(|| format!("Failed to export bill for {}", reg_no))?;
            println!("✓ Bill written to {}", path.display());
        }

        Commands::Login { reg_no, dob } => match service.login(&reg_no, &dob)? {
            Some(record) => println!("✓ Login OK for {}", record.reg_no()),
            None => {
                println!("✗ Invalid login");
                return Ok(ExitCode::FAILURE);
            }
        },

        Commands::Set {
            reg_no,
            field,
            value,
        } => {
            let record = service.update_field(&reg_no, &field, &value)?;
            println!("✓ {} → {} = {}", record.reg_no(), field, value);
        }

        Commands::List => {
            let roster = service.roster()?;
            if cli.json {
                let out: Vec<_> = roster
                    .iter()
                    .map(|(record, dues)| serde_json::json!({ "student": record, "dues": dues }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("📊 {} students", roster.len());
                println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                for (record, dues) in &roster {
                    println!(
                        "{:<12} payable {:>10}  paid {:>10}  due {:>10}  refund {:>10}",
                        record.reg_no(),
                        format_amount(dues.total_payable),
                        format_amount(dues.total_paid),
                        format_amount(dues.due),
                        format_amount(dues.refund),
                    );
                }
            }
        }

        Commands::Sync => match service.sync()? {
            SyncOutcome::Skipped => {
                println!("⏭️  Remote sync is disabled (set HOSTEL_SYNC_ENABLED and HOSTEL_SYNC_URL)");
            }
            SyncOutcome::Refreshed { records } => {
                println!("✓ Synced {} students into {}", records, config.data_file.display());
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn print_dues(dues: &DuesSummary) {
    println!("   Total Payable: {}", format_amount(dues.total_payable));
    println!("   Paid:          {}", format_amount(dues.total_paid));
    println!("   Due:           {}", format_amount(dues.due));
    println!("   Refund:        {}", format_amount(dues.refund));
}
