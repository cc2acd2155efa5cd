//! Subcommand implementations.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use codepick_engine::{
    load_catalog_dir, CodeStore, CodepickResult, SearchConfig, SelectionEngine,
};
use codepick_types::{CodeFamily, CodeRecord, GroupId};

use crate::cli::{ImportArgs, SearchArgs, SelectArgs};

/// Loads a catalog directory into a shared store.
pub fn load_store(data_path: &Path) -> CodepickResult<Arc<CodeStore>> {
    tracing::info!("Loading catalog from: {}", data_path.display());
    let catalog = load_catalog_dir(data_path)?;
    let store = CodeStore::from_catalog(&catalog);
    tracing::info!(
        "Indexed {} records ({} categories)",
        store.len(),
        store.categories().len()
    );
    Ok(Arc::new(store))
}

pub fn run_search(
    store: Arc<CodeStore>,
    args: &SearchArgs,
    out: &mut dyn Write,
) -> CodepickResult<()> {
    let config = SearchConfig {
        display_limit: args.limit.unwrap_or(SearchConfig::default().display_limit),
    };
    let mut engine = SelectionEngine::with_config(store, config);
    engine.set_query(args.query.as_str());
    engine.set_filter(args.code_type.into());

    let results = engine.results();
    let counts = results.counts;
    writeln!(
        out,
        "all: {}  icd10cm: {}  hcpcs: {}  ndc: {}",
        counts.all, counts.diagnosis, counts.procedure, counts.drug
    )?;

    let shown = results.displayed(engine.config().display_limit);
    for &idx in shown {
        if let Some(record) = engine.store().get(idx) {
            writeln!(out, "{}", format_record(record))?;
        }
    }
    if shown.len() < results.len() {
        writeln!(out, "... {} more", results.len() - shown.len())?;
    }

    Ok(())
}

pub fn run_select(
    store: Arc<CodeStore>,
    args: &SelectArgs,
    out: &mut dyn Write,
) -> CodepickResult<()> {
    let mut engine = SelectionEngine::new(store);

    if let Some(query) = &args.all_matching {
        engine.set_query(query.as_str());
        engine.set_filter(args.code_type.into());
        engine.select_all();
    }
    for identifier in &args.identifiers {
        engine.toggle(identifier);
    }

    print_groups(&engine, out)?;
    if let Some(path) = &args.export {
        export_to(&engine, path)?;
    }
    Ok(())
}

pub fn run_import(
    store: Arc<CodeStore>,
    args: &ImportArgs,
    out: &mut dyn Write,
) -> CodepickResult<()> {
    let mut engine = SelectionEngine::new(store);
    let reader = BufReader::new(File::open(&args.input)?);
    let summary = engine.import_csv(reader)?;

    writeln!(
        out,
        "matched {} of {} rows ({} dropped), filter: {}",
        summary.matched, summary.stats.total_rows, summary.stats.dropped_rows, summary.filter
    )?;
    if !summary.unmatched.is_empty() {
        writeln!(out, "unmatched: {}", summary.unmatched.join(", "))?;
    }

    print_groups(&engine, out)?;
    if let Some(path) = &args.export {
        export_to(&engine, path)?;
    }
    Ok(())
}

pub fn run_stats(store: &CodeStore, out: &mut dyn Write) -> CodepickResult<()> {
    writeln!(out, "records: {}", store.len())?;
    for family in CodeFamily::ALL {
        writeln!(out, "{}: {}", family, store.family_count(family))?;
    }
    writeln!(out, "categories: {}", store.categories().len())?;
    for category in store.categories() {
        writeln!(out, "  {} ({})", category.label, category.members.len())?;
    }
    Ok(())
}

fn print_groups(engine: &SelectionEngine, out: &mut dyn Write) -> CodepickResult<()> {
    for group in GroupId::ALL {
        let codes = engine.group(group);
        writeln!(out, "group{} ({}): {}", group, codes.len(), codes.join(" "))?;
    }
    Ok(())
}

fn export_to(engine: &SelectionEngine, path: &Path) -> CodepickResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    let rows = engine.export_csv(writer)?;
    tracing::info!("Exported {} codes to {}", rows, path.display());
    Ok(())
}

fn format_record(record: &CodeRecord) -> String {
    let detail = match record.family {
        CodeFamily::Diagnosis => format!("level {}", record.level.unwrap_or(1)),
        CodeFamily::Procedure => record.category.clone().unwrap_or_default(),
        CodeFamily::DrugProduct => record.manufacturer.clone().unwrap_or_default(),
    };
    format!(
        "{:<6} {:<14} {} [{}]",
        record.family.display_name(),
        record.code,
        record.name,
        detail
    )
}
