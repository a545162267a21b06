use super::{render, AppContext};
use crate::output::Output;
use color_eyre::Result;
use serde_json::json;
use shelf_core::LoadOutcome;

pub async fn run_fetch(username: &str, refresh: bool, output: &Output) -> Result<()> {
    tracing::debug!(username = %username, refresh, "Fetch command started");

    let ctx = AppContext::load()?;
    let session = ctx.open_session()?;
    session.restore();

    let outcome = if refresh {
        session.reload_user(username).await?
    } else {
        session.load_user(username).await?
    };

    let snapshot = session.snapshot();
    let name = snapshot.username.clone().unwrap_or_default();
    match outcome {
        LoadOutcome::Fetched(count) => output.success(format!("Loaded {} entries for {}", count, name)),
        LoadOutcome::Cached(count) => output.info(format!(
            "{} entries for {} from cache (fresh for {}s, use --refresh to fetch again)",
            count,
            name,
            ctx.config.cache.freshness_secs
        )),
        LoadOutcome::Superseded => output.warn("Load was superseded by a newer request"),
    }

    let resolver = ctx.palette_resolver();
    let mut palettes = Vec::with_capacity(snapshot.entries.len());
    for (index, entry) in snapshot.entries.iter().enumerate() {
        palettes.push(resolver.resolve(entry, index).await);
    }

    if output.is_human() {
        println!("{}", render::shelf_table(&snapshot.entries, &palettes));
    }
    output.json(&json!({
        "username": snapshot.username,
        "source": if matches!(outcome, LoadOutcome::Cached(_)) { "cache" } else { "network" },
        "entries": snapshot
            .entries
            .iter()
            .zip(&palettes)
            .map(|(entry, palette)| render::entry_json(entry, palette))
            .collect::<Vec<_>>(),
    }));
    Ok(())
}
