use super::{render, AppContext};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;

/// `id` is an entry id, or a 1-based shelf position as printed by `fetch`.
pub async fn run_show(id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let session = ctx.open_session()?;

    if session.restore() == 0 {
        return Err(eyre!(
            "No fresh shelf cached. Run 'cataboxd fetch <username>' first."
        ));
    }

    let selected = session.select(id)
        || id
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .is_some_and(|index| session.select_index(index));
    if !selected {
        return Err(eyre!("No entry '{}' on the cached shelf", id));
    }

    let (Some(entry), Some(index)) = (session.selected_entry(), session.selected_index()) else {
        return Err(eyre!("No entry '{}' on the cached shelf", id));
    };
    let palette = ctx.palette_resolver().resolve(&entry, index).await;

    if output.is_human() {
        println!("{}", render::entry_detail(&entry, &palette));
    }
    output.json(&render::entry_json(&entry, &palette));
    Ok(())
}
