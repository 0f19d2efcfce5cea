use clap::Parser;
use roster_sync::app::{commands, review};
use roster_sync::config::cli::{Command, LogFormat};
use roster_sync::config::{self, CliConfig};
use roster_sync::utils::error::{ErrorSeverity, SyncError};
use roster_sync::utils::logger;

fn main() {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting roster-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ roster-sync failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(cli: &CliConfig) -> Result<(), SyncError> {
    let config = config::load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Detect(args) => {
            let outcome = commands::detect(&config, args)?;
            print_skipped(&outcome.import);
            println!("{}", review::render_table(&outcome.changes));
            println!("{}", outcome.changes.summary());
            if let Some(out) = &outcome.written_to {
                println!("📁 Review batch saved to: {}", out);
            }
        }
        Command::Apply(args) => {
            let report = commands::apply(&config, args)?;
            println!(
                "✅ Applied {} change(s) ({} inserted, {} updated, {} deactivated, {} skipped)",
                report.applied, report.inserted, report.updated, report.deactivated, report.skipped
            );
        }
        Command::Sync(args) => {
            let outcome = commands::sync(&config, args)?;
            print_skipped(&outcome.import);
            println!("{}", review::render_table(&outcome.changes));
            println!("{}", outcome.changes.summary());
            match outcome.report {
                Some(report) => println!("✅ Applied {} change(s)", report.applied),
                None => println!("🔍 Dry run: nothing applied"),
            }
        }
    }

    Ok(())
}

fn print_skipped(import: &roster_sync::adapters::RosterImport) {
    for row in &import.skipped {
        eprintln!("⚠️  roster line {} skipped: {}", row.line, row.reason);
    }
}
