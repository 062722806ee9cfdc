//! `haven personas` - list the companion personas.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use haven_types::persona::{Persona, PersonaInfo};

pub fn list_personas(json: bool) -> Result<()> {
    if json {
        let personas: Vec<PersonaInfo> = Persona::ALL.into_iter().map(PersonaInfo::from).collect();
        println!("{}", serde_json::to_string_pretty(&personas)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Slug").fg(Color::White),
        Cell::new("Persona").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for persona in Persona::ALL {
        let name = if persona == Persona::default() {
            format!("{} (default)", persona.display_name())
        } else {
            persona.display_name().to_string()
        };
        table.add_row(vec![
            Cell::new(persona.slug()).fg(Color::Yellow),
            Cell::new(name).fg(Color::Cyan),
            Cell::new(persona.description()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  Pick one with {} or switch mid-chat with {}",
        style("haven chat <user> --persona <slug>").yellow(),
        style("/persona <slug>").yellow()
    );
    println!();

    Ok(())
}
