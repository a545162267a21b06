use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use shelf_models::{Entry, Palette, Rgb};

const SWATCH: &str = "██";

fn swatch(color: Rgb) -> String {
    SWATCH.truecolor(color.r, color.g, color.b).to_string()
}

fn cell_color(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

pub fn palette_line(label: &str, palette: &Palette) -> String {
    format!(
        "{} {} {}  {} {}  {}",
        swatch(palette.background),
        palette.background,
        palette.background.to_hex().bright_black(),
        swatch(palette.accent),
        palette.accent,
        label.bold(),
    )
}

pub fn palette_json(palette: &Palette) -> Value {
    json!({
        "background": { "rgb": palette.background.to_string(), "hex": palette.background.to_hex() },
        "accent": { "rgb": palette.accent.to_string(), "hex": palette.accent.to_hex() },
    })
}

/// Short markers for the rewatch/liked flags.
pub fn flags(entry: &Entry) -> String {
    let mut flags = Vec::new();
    if entry.is_liked {
        flags.push("♥ liked");
    }
    if entry.is_rewatch {
        flags.push("↻ rewatch");
    }
    if entry.has_review() {
        flags.push("✎ review");
    }
    flags.join("  ")
}

fn year_text(entry: &Entry) -> String {
    if entry.year > 0 {
        entry.year.to_string()
    } else {
        String::new()
    }
}

pub fn shelf_table(entries: &[Entry], palettes: &[Palette]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("Watched").add_attribute(Attribute::Bold),
        Cell::new("").add_attribute(Attribute::Bold),
    ]);

    for (index, (entry, palette)) in entries.iter().zip(palettes).enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(SWATCH).fg(cell_color(palette.background)),
            Cell::new(&entry.title).fg(cell_color(palette.accent)),
            Cell::new(year_text(entry)),
            Cell::new(entry.rating.glyphs()),
            Cell::new(&entry.watched_date),
            Cell::new(flags(entry)),
        ]);
    }
    table
}

pub fn entry_detail(entry: &Entry, palette: &Palette) -> String {
    let mut lines = vec![
        format!("{} {}", swatch(palette.background), entry.display_title().bold()),
        String::new(),
    ];

    if entry.rating.is_rated() {
        lines.push(format!("Rating   {} ({})", entry.rating.glyphs(), entry.rating.stars()));
    }
    if !entry.watched_date.is_empty() {
        lines.push(format!("Watched  {}", entry.watched_date));
    }
    let flags = flags(entry);
    if !flags.is_empty() {
        lines.push(format!("         {}", flags));
    }
    if entry.has_poster() {
        lines.push(format!("Poster   {}", entry.poster_url));
    }
    if !entry.link.is_empty() {
        lines.push(format!("Link     {}", entry.link.bright_black()));
    }
    lines.push(format!("Palette  {}", palette_line("", palette).trim_end()));

    if entry.has_review() {
        lines.push(String::new());
        lines.push(entry.review.clone());
    }
    lines.join("\n")
}

pub fn entry_json(entry: &Entry, palette: &Palette) -> Value {
    let mut value = serde_json::to_value(entry).unwrap_or_else(|_| json!({ "id": entry.id }));
    if let Value::Object(map) = &mut value {
        map.insert("palette".to_string(), palette_json(palette));
    }
    value
}
