//! Polymorphic action objects: Strike, Spell, Heal, Raise Shield.
//!
//! Each variant exposes `weight` (used for selection) and is resolved by
//! the turn-taking code in `creature`, which owns the `&mut Encounter`
//! access that resolution needs.

use serde::{Deserialize, Serialize};

use crate::creature::Creature;
use crate::descriptor::{AttackDescriptor, SpellDescriptor};
use crate::dice::Dice;
use crate::error::EngineError;

/// A damage (or weakness/resistance/immunity) type. Kept as a normalized
/// string rather than a closed enum: the descriptor shape treats damage
/// types as free-form strings, and weaknesses/resistances/immunities are
/// keyed the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageType(String);

impl DamageType {
    pub fn new(raw: &str) -> Self {
        DamageType(raw.trim().to_ascii_lowercase())
    }

    pub fn is_vitality(&self) -> bool {
        self.0 == "vitality"
    }

    pub fn is_all_damage(&self) -> bool {
        self.0 == "all-damage"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Fortitude,
    Reflex,
    Will,
}

impl SaveKind {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fortitude" => Ok(SaveKind::Fortitude),
            "reflex" => Ok(SaveKind::Reflex),
            "will" => Ok(SaveKind::Will),
            other => Err(EngineError::InvalidState(format!(
                "unknown save type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaShape {
    Burst,
    Cone,
    Emanation,
    Line,
}

impl AreaShape {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "burst" => Some(AreaShape::Burst),
            "cone" => Some(AreaShape::Cone),
            "emanation" => Some(AreaShape::Emanation),
            "line" => Some(AreaShape::Line),
            _ => None,
        }
    }

    /// The divisor used both for the weight's area-size term and for the
    /// number of potential targets an area spell can reach.
    fn size_divisor(self) -> i32 {
        match self {
            AreaShape::Burst | AreaShape::Emanation => 5,
            AreaShape::Cone => 10,
            AreaShape::Line => 30,
        }
    }
}

/// `NdS`, `NdS+B`, or `NdS-B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageExpr {
    pub n: i32,
    pub d: i32,
    pub b: i32,
}

impl DamageExpr {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let bad = || EngineError::Construction {
            subject: raw.to_string(),
            reason: "malformed damage expression, expected NdS, NdS+B, or NdS-B".to_string(),
        };

        let parts: Vec<&str> = raw.split(['d', '+', '-']).collect();
        let n: i32 = parts.first().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
        let d: i32 = parts.get(1).ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
        let b: i32 = match parts.get(2) {
            Some(tok) => tok.trim().parse().map_err(|_| bad())?,
            None => 0,
        };
        Ok(DamageExpr { n, d, b })
    }

    pub fn roll(&self, dice: &mut Dice) -> i32 {
        dice.roll_sum(self.n.max(0) as u32, self.d.max(1) as u32) + self.b
    }

    pub fn flat_weight_term(&self) -> f64 {
        (self.n * self.d + self.b) as f64
    }
}

#[derive(Debug, Clone)]
pub struct StrikeAction {
    pub name: String,
    pub attack_bonus: i32,
    pub damage: DamageExpr,
    pub damage_type: DamageType,
    pub range: i32,
    pub traits: Vec<String>,
}

impl StrikeAction {
    pub fn from_descriptor(d: &AttackDescriptor) -> Result<Self, EngineError> {
        Ok(StrikeAction {
            name: d.name.trim().to_string(),
            attack_bonus: d.attack_bonus,
            damage: DamageExpr::parse(&d.damage)?,
            damage_type: DamageType::new(&d.damage_type),
            range: d.range.unwrap_or(5),
            traits: d.traits.clone(),
        })
    }

    pub fn is_agile(&self) -> bool {
        self.traits.iter().any(|t| t == "agile")
    }

    pub fn is_finesse(&self) -> bool {
        self.traits.iter().any(|t| t == "finesse")
    }

    pub fn is_ranged(&self) -> bool {
        self.range > 5
    }

    /// Deadly dX trait, if present, e.g. `"deadly-d8"` -> `Die(8)`.
    pub fn deadly_die(&self) -> Option<crate::dice::Die> {
        self.traits.iter().find_map(|t| {
            t.strip_prefix("deadly-d")
                .and_then(|sides| sides.parse::<u32>().ok())
                .map(crate::dice::Die)
        })
    }

    pub fn map_penalty(&self) -> i32 {
        if self.is_agile() {
            4
        } else {
            5
        }
    }
}

#[derive(Debug, Clone)]
pub enum SpellTargeting {
    Targets(i32),
    Area { shape: AreaShape, size: i32 },
}

#[derive(Debug, Clone)]
pub struct SpellAction {
    pub name: String,
    /// Remaining uses. Cantrips (`level == 0`) are never decremented.
    pub slots: i32,
    pub level: i32,
    pub damage: DamageExpr,
    pub damage_type: DamageType,
    pub range: i32,
    pub save: Option<SaveKind>,
    pub targeting: SpellTargeting,
    pub cost: i32,
    pub spell_attack_bonus: i32,
}

impl SpellAction {
    pub fn from_descriptor(d: &SpellDescriptor, spell_attack_bonus: i32) -> Result<Self, EngineError> {
        let cost: i32 = d
            .actions
            .split_whitespace()
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| EngineError::Construction {
                subject: d.name.clone(),
                reason: format!("could not parse action cost from '{}'", d.actions),
            })?;

        let targeting = if let Some(area) = &d.area {
            let shape = AreaShape::parse(&area.shape).ok_or_else(|| EngineError::Construction {
                subject: d.name.clone(),
                reason: format!("unknown area shape '{}'", area.shape),
            })?;
            SpellTargeting::Area {
                shape,
                size: area.value,
            }
        } else {
            SpellTargeting::Targets(d.targets.unwrap_or(1).max(1))
        };

        let save = d
            .save
            .as_deref()
            .filter(|s| !s.eq_ignore_ascii_case("none"))
            .map(SaveKind::parse)
            .transpose()?;

        Ok(SpellAction {
            name: d.name.trim().to_string(),
            slots: d.slots,
            level: d.level,
            damage: DamageExpr::parse(&d.damage_roll)?,
            damage_type: DamageType::new(&d.damage_type),
            range: d.range,
            save,
            targeting,
            cost,
            spell_attack_bonus,
        })
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn is_autohit(&self) -> bool {
        matches!(self.name.to_ascii_lowercase().as_str(), "force barrage" | "force bolt")
    }

    pub fn area(&self) -> Option<(AreaShape, i32)> {
        match self.targeting {
            SpellTargeting::Area { shape, size } => Some((shape, size)),
            SpellTargeting::Targets(_) => None,
        }
    }

    /// Number of opponents an area spell can reach, per spec §4.2's area
    /// size/shape bucketing (shared with the weight formula's area term).
    pub fn area_potential_targets(&self) -> usize {
        match self.targeting {
            SpellTargeting::Area { shape, size } => ((size / shape.size_divisor()).max(1)) as usize,
            SpellTargeting::Targets(n) => n.max(1) as usize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealAction {
    pub slots: i32,
    pub bonus: i32,
    pub range: i32,
}

#[derive(Debug, Clone)]
pub struct RaiseShieldAction {
    pub bonus: i32,
}

#[derive(Debug, Clone)]
pub enum Action {
    Strike(StrikeAction),
    Spell(SpellAction),
    Heal(HealAction),
    RaiseShield(RaiseShieldAction),
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Action::Strike(s) => &s.name,
            Action::Spell(s) => &s.name,
            Action::Heal(_) => "Heal",
            Action::RaiseShield(_) => "Raise Shield",
        }
    }

    pub fn cost(&self) -> i32 {
        match self {
            Action::Strike(_) => 1,
            Action::Spell(s) => s.cost,
            Action::Heal(_) => 2,
            Action::RaiseShield(_) => 1,
        }
    }

    pub fn damage_type(&self) -> Option<&DamageType> {
        match self {
            Action::Strike(s) => Some(&s.damage_type),
            Action::Spell(s) => Some(&s.damage_type),
            Action::Heal(_) | Action::RaiseShield(_) => None,
        }
    }
}

/// Context passed into `weight`: everything the formulas in spec §4.2 need
/// beyond the action's own fields.
pub struct WeightContext<'a> {
    pub multi_attack: u32,
    pub actions_remaining: i32,
    pub in_melee: bool,
    pub self_creature: &'a Creature,
    pub opponents: &'a [&'a Creature],
}

/// Whether `damage_type` can plausibly hurt `target` at all — immunity, or
/// vitality damage against a non-undead target.
pub fn damage_type_valid_for(damage_type: &DamageType, target: &Creature) -> bool {
    if target.immunities.contains(damage_type) {
        return false;
    }
    if damage_type.is_vitality() && !target.traits.iter().any(|t| t == "undead") {
        return false;
    }
    true
}

fn any_valid_target(damage_type: &DamageType, opponents: &[&Creature]) -> bool {
    opponents.iter().any(|o| damage_type_valid_for(damage_type, o))
}

impl Action {
    /// Returns `f64::NEG_INFINITY` for "never pick".
    pub fn weight(&self, ctx: &WeightContext) -> f64 {
        if self.cost() > ctx.actions_remaining {
            return f64::NEG_INFINITY;
        }
        if let Some(dt) = self.damage_type() {
            if !ctx.opponents.is_empty() && !any_valid_target(dt, ctx.opponents) {
                return f64::NEG_INFINITY;
            }
        }

        match self {
            Action::Strike(s) => strike_weight(s, ctx),
            Action::Spell(s) => spell_weight(s, ctx),
            // Heal's weight depends on the caster's ally list, which this
            // context doesn't carry; callers must use `weight_with_allies`.
            Action::Heal(_) => f64::NEG_INFINITY,
            Action::RaiseShield(_) => {
                if ctx.self_creature.shield_raised {
                    f64::NEG_INFINITY
                } else {
                    10.0
                }
            }
        }
    }
}

fn strike_weight(s: &StrikeAction, ctx: &WeightContext) -> f64 {
    let base = s.damage.flat_weight_term() + s.attack_bonus as f64 + s.range as f64 / 10.0;
    let penalty = (s.map_penalty() * ctx.multi_attack as i32) as f64;
    let mut effective = base - penalty;

    if ctx.in_melee && s.is_ranged() {
        effective = effective.max(0.0);
    }

    if penalty >= 8.0 {
        effective *= 0.5;
    }

    effective
}

fn spell_weight(s: &SpellAction, ctx: &WeightContext) -> f64 {
    if s.slots == 0 && !s.is_cantrip() {
        return f64::NEG_INFINITY;
    }

    let (targets, area_size) = match s.targeting {
        SpellTargeting::Targets(n) => (n as f64, 0.0),
        SpellTargeting::Area { size, .. } => (0.0, size as f64),
    };

    let base = s.damage.flat_weight_term() + 3.0 * area_size + targets + s.range as f64 / 5.0;
    let mut weight = if s.is_cantrip() {
        base * 1.5
    } else {
        base * s.slots as f64
    };

    if s.is_autohit() {
        weight += 20.0;
    } else {
        weight += s.spell_attack_bonus as f64;
    }

    if let SpellTargeting::Area { shape, size } = s.targeting {
        weight += size as f64 / shape.size_divisor() as f64;
    }

    weight
}

impl Action {
    /// Like `weight`, but for Heal supplies the caster's actual ally list
    /// (the plain `weight` cannot see allies, only `ctx.opponents`).
    pub fn weight_with_allies(&self, ctx: &WeightContext, allies: &[&Creature]) -> f64 {
        if let Action::Heal(h) = self {
            if self.cost() > ctx.actions_remaining {
                return f64::NEG_INFINITY;
            }
            if h.slots <= 0 {
                return f64::NEG_INFINITY;
            }
            return match allies.iter().map(|a| a.current_hit_points).min() {
                Some(hp) => 25.0 - hp as f64,
                None => f64::NEG_INFINITY,
            };
        }
        self.weight(ctx)
    }
}
