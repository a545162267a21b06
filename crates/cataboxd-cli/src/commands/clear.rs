use super::AppContext;
use crate::output::Output;
use color_eyre::Result;

pub fn run_clear(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let session = ctx.open_session()?;

    session.restore();
    let previous = session.snapshot().username;
    session.clear_user();

    match previous {
        Some(username) => output.success(format!("Cleared shelf and cache for {}", username)),
        None => output.success("Cleared session cache"),
    }
    Ok(())
}
