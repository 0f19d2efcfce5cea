use crate::adapters::roster::{RosterImport, RosterReader};
use crate::adapters::storage::CsvFileStore;
use crate::app::review::ReviewBatch;
use crate::config::cli::{ApplyArgs, DetectArgs, SyncArgs};
use crate::config::SyncConfig;
use crate::core::applier::ApplyReport;
use crate::core::engine::Reconciler;
use crate::domain::change::ChangeSet;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;

#[derive(Debug)]
pub struct DetectOutcome {
    pub import: RosterImport,
    pub changes: ChangeSet,
    pub written_to: Option<String>,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub import: RosterImport,
    pub changes: ChangeSet,
    /// `None` on a dry run.
    pub report: Option<ApplyReport>,
}

/// A command-line value wins over the configured one.
fn resolve(flag: &Option<String>, configured: &Option<String>, field: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value.clone()),
        None => validate_required_field(field, configured).cloned(),
    }
}

fn reconciler(config: &SyncConfig, store_path: &str) -> Result<Reconciler<CsvFileStore>> {
    let store = CsvFileStore::open(store_path)?;
    Ok(Reconciler::with_matcher(store, config.matcher()))
}

fn read_roster(config: &SyncConfig, roster_path: &str) -> Result<RosterImport> {
    RosterReader::from_config(&config.roster)?.read_path(roster_path)
}

pub fn detect(config: &SyncConfig, args: &DetectArgs) -> Result<DetectOutcome> {
    let roster_path = resolve(&args.roster, &config.roster.path, "roster.path")?;
    let store_path = resolve(&args.store, &config.store.path, "store.path")?;

    let import = read_roster(config, &roster_path)?;
    let changes = reconciler(config, &store_path)?.detect(&import.records)?;

    let written_to = args.out.clone().or_else(|| config.review.output.clone());
    if let Some(out) = &written_to {
        ReviewBatch::from_changes(&roster_path, &store_path, &changes).write_to_path(out)?;
        tracing::info!("Review batch written to {}", out);
    }

    Ok(DetectOutcome {
        import,
        changes,
        written_to,
    })
}

pub fn apply(config: &SyncConfig, args: &ApplyArgs) -> Result<ApplyReport> {
    let store_path = resolve(&args.store, &config.store.path, "store.path")?;

    let mut batch = ReviewBatch::read_from_path(&args.changes)?;
    tracing::info!(
        "Loaded review batch from {} (generated {} from {})",
        args.changes,
        batch.generated_at.to_rfc3339(),
        batch.source
    );
    batch.ensure_applicable(&store_path)?;
    let mut changes = batch.clone().into_change_set()?;

    if args.accept_all {
        changes.accept_all();
    }
    if args.reject_all {
        changes.reject_all();
    }
    for &index in &args.accept {
        changes.set_accepted(index, true)?;
    }
    for &index in &args.reject {
        changes.set_accepted(index, false)?;
    }

    let report = reconciler(config, &store_path)?.apply(&changes)?;

    batch.mark_applied();
    batch.write_to_path(&args.changes)?;
    tracing::info!("Marked review batch {} as applied", args.changes);

    Ok(report)
}

pub fn sync(config: &SyncConfig, args: &SyncArgs) -> Result<SyncOutcome> {
    let roster_path = resolve(&args.roster, &config.roster.path, "roster.path")?;
    let store_path = resolve(&args.store, &config.store.path, "store.path")?;

    let import = read_roster(config, &roster_path)?;
    let mut engine = reconciler(config, &store_path)?;
    let mut changes = engine.detect(&import.records)?;

    changes.accept_all();
    for &index in &args.reject {
        changes.set_accepted(index, false)?;
    }

    let report = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - store left unchanged");
        None
    } else {
        Some(engine.apply(&changes)?)
    };

    Ok(SyncOutcome {
        import,
        changes,
        report,
    })
}
