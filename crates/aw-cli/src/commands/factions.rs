use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use aw_core::{Faction, FactionTable, Relation};

pub fn run() -> Result<(), String> {
    let factions = FactionTable::standard();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["From \\ To".to_string()];
    header.extend(Faction::ALL.iter().map(|f| f.key().to_string()));
    table.set_header(header);

    for from in Faction::ALL {
        let mut row = vec![from.display_name().to_string()];
        for to in Faction::ALL {
            row.push(if from == to {
                "--".to_string()
            } else {
                factions.relation(from, to).to_string()
            });
        }
        table.add_row(row);
    }

    println!("{table}");
    println!();
    println!(
        "  Damage multipliers: allied x{}, neutral x{}, hostile x{}",
        Relation::Allied.damage_multiplier(),
        Relation::Neutral.damage_multiplier(),
        Relation::Hostile.damage_multiplier()
    );
    for (a, b) in factions.asymmetries() {
        println!("  {} {a} and {b} disagree", "WARN".yellow().bold());
    }
    Ok(())
}
