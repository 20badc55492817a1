//! Replay command: session log in, tree view out

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tabtree::application::ReplaySummary;
use tabtree::config::EngineConfig;
use tabtree::domain::ports::{NoopHost, SnapshotRepository, TabHost};
use tabtree::domain::services::VisibleNode;
use tabtree::infrastructure::{NdjsonCommandSink, NdjsonFeed};
use tabtree::presentation::factory::{create_replay, create_snapshot_repository};
use tabtree::presentation::{detect_capabilities, render_view, RenderStyle};

pub struct ReplayArgs {
    pub events: PathBuf,
    pub snapshot: Option<PathBuf>,
    pub save: Option<PathBuf>,
    pub search: Option<String>,
    pub commands: Option<PathBuf>,
}

pub fn cmd_replay(config: EngineConfig, args: ReplayArgs, json: bool, quiet: bool) -> Result<()> {
    let host: Arc<dyn TabHost> = match &args.commands {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Arc::new(NdjsonCommandSink::with_writer(file))
        }
        None => Arc::new(NoopHost),
    };
    let repository = create_snapshot_repository();
    let (mut engine, mut replayer) = create_replay(config, host);

    if let Some(path) = &args.snapshot {
        let Some(forest) = repository
            .load(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?
        else {
            bail!("No snapshot at {}", path.display());
        };
        let report = engine
            .restore(&forest)
            .with_context(|| format!("Failed to restore {}", path.display()))?;
        tracing::info!(nodes = report.nodes, repaired = report.repaired, "snapshot restored");
    }

    for entry in NdjsonFeed::new(open_feed(&args.events)?) {
        let (line, item) = entry.with_context(|| format!("In {}", args.events.display()))?;
        replayer.apply(&mut engine, line, &item);
    }
    engine
        .check_invariants()
        .context("Replay left the forest inconsistent")?;

    if let Some(text) = args.search {
        engine.set_search(text);
    }
    let view = engine.get_visible_nodes();

    if let Some(path) = &args.save {
        repository
            .save(&engine.snapshot(), path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
    }

    let summary = replayer.finish();
    if json {
        print_json(&view, &summary, engine.store().len())?;
    } else {
        let style = RenderStyle::from_capabilities(detect_capabilities());
        print!("{}", render_view(&view, engine.store().focused_window(), style));
        if !quiet {
            print_summary(&summary);
        }
    }
    Ok(())
}

fn open_feed(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn print_json(view: &[VisibleNode], summary: &ReplaySummary, total: usize) -> Result<()> {
    let out = serde_json::json!({
        "total_nodes": total,
        "visible": view,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_summary(summary: &ReplaySummary) {
    eprintln!(
        "replayed {} events, {} results, {} actions",
        summary.events, summary.results, summary.actions
    );
    if summary.unconfirmed > 0 {
        eprintln!("{} close(s) left waiting for confirmation", summary.unconfirmed);
    }
    for rejected in &summary.rejected {
        eprintln!("rejected line {}: {}", rejected.line, rejected.message);
    }
}
