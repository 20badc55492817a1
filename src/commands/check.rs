//! Check command: verify a snapshot file

use std::path::Path;

use anyhow::{bail, Context, Result};

use tabtree::domain::ports::SnapshotRepository;
use tabtree::domain::services::decode;
use tabtree::presentation::factory::create_snapshot_repository;

pub fn cmd_check(path: &Path, json: bool) -> Result<()> {
    let repository = create_snapshot_repository();
    let Some(forest) = repository
        .load(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?
    else {
        bail!("No snapshot at {}", path.display());
    };

    let restored = decode(&forest).with_context(|| format!("Cannot restore {}", path.display()))?;
    restored
        .store
        .check_invariants()
        .context("Restored forest is inconsistent")?;

    let store = &restored.store;
    let windows = store.windows().count();
    let awaiting = store.nodes().filter(|node| node.awaiting_host()).count();
    let healthy = restored.repaired == 0;

    if json {
        let out = serde_json::json!({
            "event": "complete",
            "command": "check",
            "version": forest.version,
            "saved_at": forest.saved_at,
            "nodes": store.len(),
            "windows": windows,
            "collapsed": restored.collapsed.len(),
            "awaiting_host": awaiting,
            "repaired": restored.repaired,
            "success": healthy,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{}: {} nodes in {} windows (saved {})",
            path.display(),
            store.len(),
            windows,
            forest.saved_at.to_rfc3339()
        );
        if awaiting > 0 {
            println!("  {} node(s) waiting for the host to recreate their tab", awaiting);
        }
        if healthy {
            println!("  ok");
        } else {
            println!("  {} link(s) needed repair", restored.repaired);
        }
    }

    if !healthy {
        std::process::exit(1);
    }
    Ok(())
}
