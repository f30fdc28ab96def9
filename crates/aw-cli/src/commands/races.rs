use comfy_table::{ContentArrangement, Table};

use aw_core::RaceTable;
use aw_mechanics::WeaponBonusTable;

const WEAPONS: [&str; 3] = ["rusty_sword", "m4", "glock"];

pub fn run() -> Result<(), String> {
    let races = RaceTable::standard();
    let bonus = WeaponBonusTable::standard();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["Race", "Key", "STR", "AGI", "INT", "STL", "DIP"];
    header.extend(WEAPONS);
    table.set_header(header);

    let mut rows: Vec<_> = races.iter().collect();
    rows.sort_by_key(|(race, _)| *race);
    for (race, stats) in rows {
        let mut row = vec![
            race.display_name().to_string(),
            race.key().to_string(),
            stats.strength.to_string(),
            stats.agility.to_string(),
            stats.intelligence.to_string(),
            stats.stealth.to_string(),
            stats.diplomacy.to_string(),
        ];
        row.extend(
            WEAPONS
                .iter()
                .map(|w| format!("x{:.1}", bonus.multiplier(Some(race), w))),
        );
        table.add_row(row);
    }

    println!("{table}");
    println!();
    println!("  {} races", races.iter().count());
    Ok(())
}
