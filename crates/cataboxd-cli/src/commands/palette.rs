use super::render;
use crate::output::Output;
use color_eyre::Result;
use shelf_core::palette_for;

pub fn run_palette(title: &str, output: &Output) -> Result<()> {
    let palette = palette_for(title);

    if output.is_human() {
        println!("{}", render::palette_line(title, &palette));
    }
    output.json(&render::palette_json(&palette));
    Ok(())
}
