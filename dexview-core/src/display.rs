///! Presentation helpers derived from record data
use crate::types::PokemonRecord;

/// Accent color for a type name. Unknown types get a neutral teal.
pub fn type_color(type_name: &str) -> &'static str {
    match type_name {
        "normal" => "#A8A878",
        "fire" => "#F08030",
        "water" => "#6890F0",
        "electric" => "#F8D030",
        "grass" => "#78C850",
        "ice" => "#98D8D8",
        "fighting" => "#C03028",
        "poison" => "#A040A0",
        "ground" => "#E0C068",
        "flying" => "#A890F0",
        "psychic" => "#F85888",
        "bug" => "#A8B820",
        "rock" => "#B8A038",
        "ghost" => "#705898",
        "dragon" => "#7038F8",
        "dark" => "#705848",
        "steel" => "#B8B8D0",
        "fairy" => "#EE99AC",
        _ => "#68A090",
    }
}

fn type_weaknesses(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "normal" => &["fighting"],
        "fire" => &["water", "ground", "rock"],
        "water" => &["electric", "grass"],
        "electric" => &["ground"],
        "grass" => &["fire", "ice", "poison", "flying", "bug"],
        "ice" => &["fire", "fighting", "rock", "steel"],
        "fighting" => &["flying", "psychic", "fairy"],
        "poison" => &["ground", "psychic"],
        "ground" => &["water", "ice", "grass"],
        "flying" => &["electric", "ice", "rock"],
        "psychic" => &["bug", "ghost", "dark"],
        "bug" => &["fire", "flying", "rock"],
        "rock" => &["water", "grass", "fighting", "ground", "steel"],
        "ghost" => &["ghost", "dark"],
        "dragon" => &["ice", "dragon", "fairy"],
        "dark" => &["fighting", "bug", "fairy"],
        "steel" => &["fire", "fighting", "ground"],
        "fairy" => &["poison", "steel"],
        _ => &[],
    }
}

/// Weaknesses across all of a record's types, deduplicated, first-seen
/// order.
pub fn weaknesses(record: &PokemonRecord) -> Vec<&'static str> {
    let mut seen = Vec::new();
    for slot in &record.types {
        for &weakness in type_weaknesses(&slot.kind.name) {
            if !seen.contains(&weakness) {
                seen.push(weakness);
            }
        }
    }
    seen
}

/// Zero-padded three-digit dex number, e.g. `7` -> `"007"`.
pub fn format_dex_id(id: u32) -> String {
    format!("{:03}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::record;
    use crate::types::{NamedRef, TypeSlot};

    fn typed(names: &[&str]) -> PokemonRecord {
        let mut rec = record("test", 1);
        rec.types = names
            .iter()
            .enumerate()
            .map(|(index, name)| TypeSlot {
                slot: index as u32 + 1,
                kind: NamedRef {
                    name: name.to_string(),
                    url: "u".to_string(),
                },
            })
            .collect();
        rec
    }

    #[test]
    fn test_weaknesses_dedup_preserving_order() {
        // grass and poison both fear ground-adjacent threats; the overlap
        // must not repeat.
        let rec = typed(&["grass", "poison"]);
        assert_eq!(
            weaknesses(&rec),
            vec!["fire", "ice", "poison", "flying", "bug", "ground", "psychic"]
        );
    }

    #[test]
    fn test_unknown_type_has_no_weaknesses_and_neutral_color() {
        let rec = typed(&["shadow"]);
        assert!(weaknesses(&rec).is_empty());
        assert_eq!(type_color("shadow"), "#68A090");
    }

    #[test]
    fn test_format_dex_id_pads_to_three_digits() {
        assert_eq!(format_dex_id(7), "007");
        assert_eq!(format_dex_id(25), "025");
        assert_eq!(format_dex_id(1000), "1000");
    }
}
