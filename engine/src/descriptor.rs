//! Input/output shapes that cross the engine's boundary (spec §6).
//!
//! These are the only types the host application (CLI, FFI, or anything
//! else) needs to know about. Everything in `creature`/`action`/`encounter`
//! is internal and is rebuilt from these descriptors at the start of every
//! simulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttributeModifiers {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AttributeModifiers {
    pub fn of(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Saves {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Defenses {
    pub armor_class: i32,
    pub saves: Saves,
}

/// Governing attribute for each of the seventeen skills, used to default a
/// missing skill modifier at construction time.
pub const SKILL_NAMES: [(&str, Attribute); 17] = [
    ("acrobatics", Attribute::Dexterity),
    ("arcana", Attribute::Intelligence),
    ("athletics", Attribute::Strength),
    ("crafting", Attribute::Intelligence),
    ("deception", Attribute::Charisma),
    ("diplomacy", Attribute::Charisma),
    ("intimidation", Attribute::Charisma),
    ("lore", Attribute::Intelligence),
    ("medicine", Attribute::Wisdom),
    ("nature", Attribute::Wisdom),
    ("occultism", Attribute::Intelligence),
    ("performance", Attribute::Charisma),
    ("religion", Attribute::Wisdom),
    ("society", Attribute::Intelligence),
    ("stealth", Attribute::Dexterity),
    ("survival", Attribute::Wisdom),
    ("thievery", Attribute::Dexterity),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackDescriptor {
    pub name: String,
    pub attack_bonus: i32,
    /// `"NdS"` or `"NdS+B"`/`"NdS-B"`.
    pub damage: String,
    pub damage_type: String,
    #[serde(default)]
    pub range: Option<i32>,
    #[serde(default)]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AreaDescriptor {
    #[serde(rename = "type")]
    pub shape: String,
    pub value: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpellDescriptor {
    pub name: String,
    pub slots: i32,
    pub level: i32,
    pub damage_roll: String,
    pub damage_type: String,
    pub range: i32,
    #[serde(default)]
    pub area: Option<AreaDescriptor>,
    #[serde(default)]
    pub save: Option<String>,
    #[serde(default)]
    pub targets: Option<i32>,
    /// `"N ..."` — the action-point cost is the leading integer.
    pub actions: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActionsDescriptor {
    #[serde(default)]
    pub attacks: Vec<AttackDescriptor>,
    #[serde(default)]
    pub spells: Vec<SpellDescriptor>,
    #[serde(default)]
    pub heals: Option<i32>,
    #[serde(default)]
    pub shield: Option<i32>,
    #[serde(default)]
    pub sneak_attack: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreatureDescriptor {
    pub name: String,
    pub level: i32,
    pub perception: i32,
    pub max_hit_points: i32,
    pub speed: i32,
    pub defenses: Defenses,
    pub attribute_modifiers: AttributeModifiers,
    #[serde(default)]
    pub skills: HashMap<String, i32>,
    #[serde(default)]
    pub spell_attack_bonus: Option<i32>,
    #[serde(default)]
    pub spell_dc: Option<i32>,
    #[serde(default)]
    pub actions: ActionsDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlayerDescriptor {
    #[serde(flatten)]
    pub base: CreatureDescriptor,
    pub ancestry: String,
    pub class: String,
    #[serde(default)]
    pub heritage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnemyDescriptor {
    #[serde(flatten)]
    pub base: CreatureDescriptor,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub immunities: Vec<String>,
    #[serde(default)]
    pub weaknesses: HashMap<String, i32>,
    #[serde(default)]
    pub resistances: HashMap<String, i32>,
}

/// One line of a host's enemy roster request: resolve `enemy_id` against a
/// content pack, then pass `quantity` copies into the engine. Resolution
/// itself is a host/loader concern (spec §6); the engine only ever sees the
/// already-expanded `EnemyDescriptor` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnemyRequestItem {
    pub enemy_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationRequest {
    pub enemies: Vec<EnemyRequestItem>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationRecord {
    pub sim_num: u32,
    pub winner: String,
    pub rounds: u32,
    pub players_killed: u32,
    pub total_players: u32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationResult {
    pub total_sims: u32,
    pub wins: u32,
    pub wins_ratio: f64,
    pub average_deaths: f64,
    pub average_rounds: f64,
    pub sim_data: Vec<SimulationRecord>,
}
