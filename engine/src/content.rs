//! Built-in fixture rosters, embedded at compile time the way the teacher
//! embeds its bundled JSON content. Used by tests and by the `cli` crate's
//! `--builtin` convenience flag; a real deployment's bestiary ingestion is
//! an external loader, not the engine.

use crate::descriptor::{EnemyDescriptor, PlayerDescriptor};

const PARTY_JSON: &str = include_str!("../content/party.json");
const ENEMIES_JSON: &str = include_str!("../content/enemies.json");

pub fn builtin_party() -> Vec<PlayerDescriptor> {
    serde_json::from_str(PARTY_JSON).expect("bundled party.json must parse")
}

pub fn builtin_enemies() -> Vec<EnemyDescriptor> {
    serde_json::from_str(ENEMIES_JSON).expect("bundled enemies.json must parse")
}
