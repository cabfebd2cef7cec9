//! One combatant: state, turn loop, targeting, movement, damage intake.
//!
//! `Creature` itself never talks back to its `Encounter`: every operation
//! that needs to see the other side of the fight (`take_turn`, `pick_target`,
//! damage application, death) is a free function taking `&mut Encounter`
//! plus the acting creature's `CreatureId`, mirroring the closure-passing
//! style the engine uses elsewhere instead of a stored back-pointer.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::action::{
    damage_type_valid_for, Action, DamageExpr, DamageType, HealAction, RaiseShieldAction, SaveKind, SpellAction,
    StrikeAction, WeightContext,
};
use crate::descriptor::{CreatureDescriptor, EnemyDescriptor, PlayerDescriptor, SKILL_NAMES};
use crate::dice::{degree_of_success, Dice, DegreeOfSuccess};
use crate::encounter::Encounter;
use crate::error::EngineError;

/// Fixed Heal bonus, independent of any spell-attack stat.
const HEAL_BONUS: i32 = 8;

/// Stable, non-shifting index into `Encounter::creatures`. Never a second
/// strong ownership edge onto the creature it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreatureId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn opposing(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    /// Team 2 (enemies) wins initiative ties, so it sorts as "greater".
    pub fn tiebreak_rank(self) -> u8 {
        match self {
            Team::Player => 1,
            Team::Enemy => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Saves {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

impl Saves {
    pub fn of(&self, kind: SaveKind) -> i32 {
        match kind {
            SaveKind::Fortitude => self.fortitude,
            SaveKind::Reflex => self.reflex,
            SaveKind::Will => self.will,
        }
    }
}

pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub level: i32,
    pub team: Team,

    pub attribute_modifiers: crate::descriptor::AttributeModifiers,
    pub skills: HashMap<String, i32>,
    pub saves: Saves,
    pub perception: i32,

    pub armor_class: i32,
    pub max_hit_points: i32,
    pub current_hit_points: i32,
    pub speed: i32,

    pub spell_attack_bonus: Option<i32>,
    pub spell_dc: Option<i32>,

    pub immunities: HashSet<DamageType>,
    pub weaknesses: HashMap<DamageType, i32>,
    pub resistances: HashMap<DamageType, i32>,
    pub traits: Vec<String>,
    pub sneak_attack: bool,

    pub ancestry: Option<String>,
    pub class: Option<String>,

    pub actions: Vec<Action>,

    pub x: i32,
    pub y: i32,

    pub num_actions: i32,
    pub multi_attack: u32,
    pub shield_raised: bool,
    pub shield_bonus: i32,
    pub initiative: i32,
    pub is_dead: bool,
}

impl Creature {
    fn from_base(
        id: CreatureId,
        team: Team,
        base: &CreatureDescriptor,
        traits: Vec<String>,
        immunities: HashSet<DamageType>,
        weaknesses: HashMap<DamageType, i32>,
        resistances: HashMap<DamageType, i32>,
        ancestry: Option<String>,
        class: Option<String>,
    ) -> Result<Self, EngineError> {
        let mut skills = HashMap::with_capacity(SKILL_NAMES.len());
        for (name, governing) in SKILL_NAMES {
            let modifier = base
                .skills
                .get(name)
                .copied()
                .unwrap_or_else(|| base.attribute_modifiers.of(governing));
            skills.insert(name.to_string(), modifier);
        }

        let mut actions = Vec::new();
        for attack in &base.actions.attacks {
            match StrikeAction::from_descriptor(attack) {
                Ok(strike) => actions.push(Action::Strike(strike)),
                Err(e) => debug!(error = %e, "dropping malformed strike"),
            }
        }
        for spell in &base.actions.spells {
            let spell_attack_bonus = base.spell_attack_bonus.unwrap_or(0);
            match SpellAction::from_descriptor(spell, spell_attack_bonus) {
                Ok(spell) => actions.push(Action::Spell(spell)),
                Err(e) => debug!(error = %e, "dropping malformed spell"),
            }
        }
        if let Some(heals) = base.actions.heals.filter(|n| *n > 0) {
            actions.push(Action::Heal(HealAction {
                slots: heals,
                bonus: HEAL_BONUS,
                range: 30,
            }));
        }
        if let Some(shield) = base.actions.shield.filter(|v| *v > 0) {
            actions.push(Action::RaiseShield(RaiseShieldAction {
                bonus: shield.max(1),
            }));
        }

        Ok(Creature {
            id,
            name: base.name.clone(),
            level: base.level,
            team,
            attribute_modifiers: base.attribute_modifiers,
            skills,
            saves: Saves {
                fortitude: base.defenses.saves.fortitude,
                reflex: base.defenses.saves.reflex,
                will: base.defenses.saves.will,
            },
            perception: base.perception,
            armor_class: base.defenses.armor_class,
            max_hit_points: base.max_hit_points,
            current_hit_points: base.max_hit_points,
            speed: base.speed,
            spell_attack_bonus: base.spell_attack_bonus,
            spell_dc: base.spell_dc,
            immunities,
            weaknesses,
            resistances,
            traits,
            sneak_attack: base.actions.sneak_attack.unwrap_or(false),
            ancestry,
            class,
            actions,
            x: 0,
            y: 0,
            num_actions: 0,
            multi_attack: 0,
            shield_raised: false,
            shield_bonus: 0,
            initiative: 0,
            is_dead: false,
        })
    }

    pub fn from_player(id: CreatureId, descriptor: &PlayerDescriptor) -> Result<Self, EngineError> {
        Self::from_base(
            id,
            Team::Player,
            &descriptor.base,
            Vec::new(),
            HashSet::new(),
            HashMap::new(),
            HashMap::new(),
            Some(descriptor.ancestry.clone()),
            Some(descriptor.class.clone()),
        )
    }

    pub fn from_enemy(id: CreatureId, descriptor: &EnemyDescriptor) -> Result<Self, EngineError> {
        let immunities = descriptor.immunities.iter().map(|s| DamageType::new(s)).collect();
        let weaknesses = descriptor
            .weaknesses
            .iter()
            .map(|(k, v)| (DamageType::new(k), *v))
            .collect();
        let resistances = descriptor
            .resistances
            .iter()
            .map(|(k, v)| (DamageType::new(k), *v))
            .collect();
        Self::from_base(
            id,
            Team::Enemy,
            &descriptor.base,
            descriptor.traits.clone(),
            immunities,
            weaknesses,
            resistances,
            None,
            None,
        )
    }

    /// `d20 + max(perception, stealth)`.
    pub fn roll_initiative(&mut self, dice: &mut Dice) {
        let stealth = self.skills.get("stealth").copied().unwrap_or(0);
        let bonus = self.perception.max(stealth);
        self.initiative = dice.d20() + bonus;
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Euclidean distance in square coordinates, scaled to feet and rounded
    /// to the nearest 5.
    pub fn distance_feet(&self, other: &Creature) -> i32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let squares = (dx * dx + dy * dy).sqrt();
        let feet = squares * 5.0;
        ((feet / 5.0).round() * 5.0) as i32
    }

    fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t == name)
    }
}

/// Resolves two distinct, simultaneously-mutable references into the
/// creature vector, relying on indices that never shift (tombstoned dead
/// creatures stay in place).
pub fn get_two_mut(creatures: &mut [Creature], a: CreatureId, b: CreatureId) -> (&mut Creature, &mut Creature) {
    assert_ne!(a.0, b.0, "get_two_mut requires distinct ids");
    if a.0 < b.0 {
        let (left, right) = creatures.split_at_mut(b.0);
        (&mut left[a.0], &mut right[0])
    } else {
        let (left, right) = creatures.split_at_mut(a.0);
        (&mut right[0], &mut left[b.0])
    }
}

/// Runs one creature's turn. Entirely self-contained: dies, moves, attacks,
/// and removals are all applied through `encounter` before returning.
pub fn take_turn(encounter: &mut Encounter, actor: CreatureId, dice: &mut Dice, players_killed: &mut u32) {
    if encounter.creature(actor).is_dead || encounter.creature(actor).actions.is_empty() {
        let name = encounter.creature(actor).name.clone();
        encounter.log(format!("{name} has nothing to do and passes."));
        return;
    }

    {
        let me = encounter.creature_mut(actor);
        if me.shield_raised {
            me.armor_class -= me.shield_bonus;
            me.shield_raised = false;
            me.shield_bonus = 0;
        }
        me.num_actions = 3;
        me.multi_attack = 0;
    }

    loop {
        let me_team = encounter.creature(actor).team;
        if encounter.creature(actor).num_actions <= 0 {
            break;
        }
        if encounter.alive_ids(me_team).is_empty() || encounter.alive_ids(me_team.opposing()).is_empty() {
            break;
        }

        let in_melee = encounter
            .alive_ids(me_team.opposing())
            .iter()
            .any(|&opp| encounter.creature(actor).distance_feet(encounter.creature(opp)) <= 5);

        let chosen = select_action(encounter, actor, in_melee);
        let Some(action_index) = chosen else {
            let name = encounter.creature(actor).name.clone();
            encounter.log(format!("{name} finds nothing worth doing and holds."));
            break;
        };

        let cost = encounter.creature(actor).actions[action_index].cost();
        resolve_action(encounter, actor, action_index, dice, players_killed);
        let me = encounter.creature_mut(actor);
        me.num_actions -= cost;
    }
}

fn select_action(encounter: &Encounter, actor: CreatureId, in_melee: bool) -> Option<usize> {
    let me = encounter.creature(actor);
    let opponent_ids = encounter.alive_ids(me.team.opposing());
    let opponents: Vec<&Creature> = opponent_ids.iter().map(|&id| encounter.creature(id)).collect();
    let ally_ids = encounter.alive_ids(me.team);
    let allies: Vec<&Creature> = ally_ids.iter().map(|&id| encounter.creature(id)).collect();

    let ctx = WeightContext {
        multi_attack: me.multi_attack,
        actions_remaining: me.num_actions,
        in_melee,
        self_creature: me,
        opponents: &opponents,
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, action) in me.actions.iter().enumerate() {
        let w = action.weight_with_allies(&ctx, &allies);
        if w == f64::NEG_INFINITY {
            continue;
        }
        match best {
            Some((_, best_w)) if w <= best_w => {}
            _ => best = Some((i, w)),
        }
    }
    best.map(|(i, _)| i)
}

fn resolve_action(
    encounter: &mut Encounter,
    actor: CreatureId,
    action_index: usize,
    dice: &mut Dice,
    players_killed: &mut u32,
) {
    let action = encounter.creature(actor).actions[action_index].clone_for_resolution();
    match action {
        ResolvedAction::Strike(strike) => resolve_strike(encounter, actor, action_index, &strike, dice, players_killed),
        ResolvedAction::TargetedSpell(spell) => {
            resolve_targeted_spell(encounter, actor, action_index, &spell, dice, players_killed)
        }
        ResolvedAction::AreaSpell(spell) => {
            resolve_area_spell(encounter, actor, action_index, &spell, dice, players_killed)
        }
        ResolvedAction::Heal(heal) => resolve_heal(encounter, actor, action_index, &heal, dice),
        ResolvedAction::RaiseShield(shield) => resolve_raise_shield(encounter, actor, &shield),
    }
}

/// A cheap clone of just the fields resolution needs, so `resolve_action`
/// doesn't hold a borrow of `encounter.creature(actor).actions` across the
/// mutations that follow.
enum ResolvedAction {
    Strike(StrikeAction),
    TargetedSpell(SpellAction),
    AreaSpell(SpellAction),
    Heal(HealAction),
    RaiseShield(RaiseShieldAction),
}

impl Action {
    fn clone_for_resolution(&self) -> ResolvedAction {
        match self {
            Action::Strike(s) => ResolvedAction::Strike(s.clone()),
            Action::Spell(s) => {
                if s.area().is_some() {
                    ResolvedAction::AreaSpell(s.clone())
                } else {
                    ResolvedAction::TargetedSpell(s.clone())
                }
            }
            Action::Heal(h) => ResolvedAction::Heal(h.clone()),
            Action::RaiseShield(r) => ResolvedAction::RaiseShield(r.clone()),
        }
    }
}

/// Picks the best opponent for a targeted (non-area) action, per spec
/// §4.3's targeting rule.
fn pick_target(encounter: &Encounter, actor: CreatureId, damage_type: Option<&DamageType>, range: i32) -> Option<CreatureId> {
    let me = encounter.creature(actor);
    let opponent_ids = encounter.alive_ids(me.team.opposing());
    if opponent_ids.is_empty() {
        return None;
    }

    let in_range: Vec<CreatureId> = opponent_ids
        .iter()
        .copied()
        .filter(|&id| me.distance_feet(encounter.creature(id)) <= range)
        .collect();
    let (candidates, restrict_by_range) = if in_range.is_empty() {
        (opponent_ids.clone(), false)
    } else {
        (in_range, true)
    };

    let mut best: Option<(CreatureId, f64)> = None;
    for id in candidates {
        let target = encounter.creature(id);
        let mut weight = ((target.max_hit_points - target.current_hit_points) * me.level) as f64;
        if !restrict_by_range {
            weight -= me.distance_feet(target) as f64 / 5.0;
        }
        if target.team == Team::Enemy {
            if let Some(dt) = damage_type {
                if target.immunities.contains(dt) {
                    weight -= 100.0;
                } else if target.resistances.contains_key(dt) || target.resistances.contains_key(&DamageType::new("all-damage")) {
                    weight *= 0.5;
                } else if target.weaknesses.contains_key(dt) {
                    weight *= 2.0;
                }
            }
        }
        if let Some(dt) = damage_type {
            if !damage_type_valid_for(dt, target) {
                weight = f64::NEG_INFINITY;
            }
        }
        if weight == f64::NEG_INFINITY {
            continue;
        }
        match best {
            Some((_, best_w)) if weight <= best_w => {}
            _ => best = Some((id, weight)),
        }
    }
    best.map(|(id, _)| id)
}

/// Moves `actor` toward `target` using Stride actions until within
/// `action_range`, deducting actions and speed as it goes. Returns `true`
/// if the actor ended up in range (false if it ran out of actions first).
fn move_to(encounter: &mut Encounter, actor: CreatureId, target: CreatureId, action_range: i32) -> bool {
    loop {
        if encounter.creature(actor).distance_feet(encounter.creature(target)) <= action_range {
            return true;
        }
        if encounter.creature(actor).num_actions <= 0 {
            return false;
        }

        encounter.creature_mut(actor).num_actions -= 1;
        let mut remaining_speed = encounter.creature(actor).speed;
        let mut diagonals_this_stride = 0u32;

        while remaining_speed > 0 {
            let (ax, ay) = (encounter.creature(actor).x, encounter.creature(actor).y);
            let (tx, ty) = (encounter.creature(target).x, encounter.creature(target).y);
            let dist = encounter.creature(actor).distance_feet(encounter.creature(target));
            if dist <= action_range {
                return true;
            }

            let dx = (tx - ax).abs();
            let dy = (ty - ay).abs();
            let x_out_of_range = dx > 1;
            let y_out_of_range = dy > 1;

            if x_out_of_range && y_out_of_range {
                let extra = diagonals_this_stride % 2 == 1;
                let cost = if extra { 10 } else { 5 };
                if remaining_speed < cost {
                    break;
                }
                let me = encounter.creature_mut(actor);
                me.x += (tx - ax).signum();
                me.y += (ty - ay).signum();
                remaining_speed -= cost;
                diagonals_this_stride += 1;
            } else if x_out_of_range {
                if remaining_speed < 5 {
                    break;
                }
                encounter.creature_mut(actor).x += (tx - ax).signum();
                remaining_speed -= 5;
            } else if y_out_of_range {
                if remaining_speed < 5 {
                    break;
                }
                encounter.creature_mut(actor).y += (ty - ay).signum();
                remaining_speed -= 5;
            } else {
                return true;
            }
        }
    }
}

fn attack_roll_total(attacker: &Creature, bonus: i32, penalty: i32, dice: &mut Dice) -> (i32, i32) {
    let roll = dice.d20();
    let total = (roll + bonus - penalty).max(1);
    let _ = attacker;
    (roll, total)
}

fn resolve_strike(
    encounter: &mut Encounter,
    actor: CreatureId,
    action_index: usize,
    strike: &StrikeAction,
    dice: &mut Dice,
    players_killed: &mut u32,
) {
    let Some(target_id) = pick_target(encounter, actor, Some(&strike.damage_type), strike.range) else {
        encounter.creature_mut(actor).multi_attack += 1;
        return;
    };

    if !move_to(encounter, actor, target_id, strike.range.max(5)) {
        return;
    }

    let attacker_name = encounter.creature(actor).name.clone();
    let target_name = encounter.creature(target_id).name.clone();

    let penalty = strike.map_penalty() * encounter.creature(actor).multi_attack as i32;
    let (roll, total) = attack_roll_total(encounter.creature(actor), strike.attack_bonus, penalty, dice);
    encounter.creature_mut(actor).multi_attack += 1;

    let target_ac = encounter.creature(target_id).armor_class;
    let dos = degree_of_success(roll, total, target_ac);

    if dos <= DegreeOfSuccess::Failure {
        encounter.log(format!(
            "{attacker_name} attacks {target_name} with {} and misses (roll {roll}, total {total} vs AC {target_ac}).",
            strike.name
        ));
        return;
    }

    let sneak = encounter.creature(actor).sneak_attack && strike.is_finesse();
    let mut damage = strike.damage.roll(dice);
    if sneak {
        damage += crate::dice::D6.roll(dice);
    }
    if dos == DegreeOfSuccess::CriticalSuccess {
        damage *= 2;
        if let Some(die) = strike.deadly_die() {
            damage += die.roll(dice);
        }
    }

    encounter.log(format!(
        "{attacker_name} hits {target_name} with {} for {damage} {} damage (roll {roll}, total {total}).",
        strike.name, strike.damage_type
    ));

    let _ = action_index;
    apply_damage(encounter, target_id, damage, &strike.damage_type, players_killed);
}

fn resolve_targeted_spell(
    encounter: &mut Encounter,
    actor: CreatureId,
    _action_index: usize,
    spell: &SpellAction,
    dice: &mut Dice,
    players_killed: &mut u32,
) {
    let target_id = pick_target(encounter, actor, Some(&spell.damage_type), spell.range);
    let Some(target_id) = target_id else {
        return;
    };

    if !move_to(encounter, actor, target_id, spell.range.max(5)) {
        return;
    }
    if encounter.creature(actor).num_actions < spell.cost {
        return;
    }

    let caster_name = encounter.creature(actor).name.clone();
    let target_name = encounter.creature(target_id).name.clone();

    let (dos, roll, total) = if spell.is_autohit() {
        (DegreeOfSuccess::Success, 0, 0)
    } else {
        let target_ac = encounter.creature(target_id).armor_class;
        let (roll, total) = attack_roll_total(encounter.creature(actor), spell.spell_attack_bonus, 0, dice);
        (degree_of_success(roll, total, target_ac), roll, total)
    };

    if dos <= DegreeOfSuccess::Failure {
        encounter.log(format!(
            "{caster_name} casts {} at {target_name} and it fails to connect (roll {roll}, total {total}).",
            spell.name
        ));
        decrement_spell(encounter, actor, spell);
        return;
    }

    let mut damage = spell.damage.roll(dice);
    if dos == DegreeOfSuccess::CriticalSuccess {
        damage *= 2;
    }

    encounter.log(format!(
        "{caster_name} hits {target_name} with {} for {damage} {} damage.",
        spell.name, spell.damage_type
    ));

    apply_damage(encounter, target_id, damage, &spell.damage_type, players_killed);
    decrement_spell(encounter, actor, spell);
}

fn resolve_area_spell(
    encounter: &mut Encounter,
    actor: CreatureId,
    _action_index: usize,
    spell: &SpellAction,
    dice: &mut Dice,
    players_killed: &mut u32,
) {
    let me = encounter.creature(actor);
    let opponent_ids = encounter.alive_ids(me.team.opposing());
    let num_targets = spell.area_potential_targets();
    let chosen = dice.choose_indices(opponent_ids.len(), num_targets);
    let targets: Vec<CreatureId> = chosen.into_iter().map(|i| opponent_ids[i]).collect();

    let caster_name = encounter.creature(actor).name.clone();
    let dc = encounter.creature(actor).spell_dc.unwrap_or(10);
    let damage = spell.damage.roll(dice);

    let save_kind = spell.save.unwrap_or(SaveKind::Reflex);
    encounter.log(format!(
        "{caster_name} casts {} in a burst, rolling {damage} {} damage against {} targets.",
        spell.name,
        spell.damage_type,
        targets.len()
    ));

    for target_id in targets {
        let save_mod = encounter.creature(target_id).saves.of(save_kind);
        let roll = dice.d20();
        let total = roll + save_mod;
        let target_dc = dc;
        let dos = degree_of_success(roll, total, target_dc);
        let taken = match dos {
            DegreeOfSuccess::CriticalSuccess => 0,
            DegreeOfSuccess::Success => damage / 2,
            DegreeOfSuccess::Failure => damage,
            DegreeOfSuccess::CriticalFailure => damage * 2,
        };
        apply_damage(encounter, target_id, taken, &spell.damage_type, players_killed);
    }

    decrement_spell(encounter, actor, spell);
}

fn decrement_spell(encounter: &mut Encounter, actor: CreatureId, spell: &SpellAction) {
    if spell.is_cantrip() {
        return;
    }
    let me = encounter.creature_mut(actor);
    if let Some(pos) = me.actions.iter().position(|a| matches!(a, Action::Spell(s) if s.name == spell.name)) {
        if let Action::Spell(s) = &mut me.actions[pos] {
            s.slots -= 1;
            if s.slots <= 0 {
                me.actions.remove(pos);
            }
        }
    }
}

fn resolve_heal(encounter: &mut Encounter, actor: CreatureId, _action_index: usize, heal: &HealAction, dice: &mut Dice) {
    let me = encounter.creature(actor);
    let ally_ids = encounter.alive_ids(me.team);
    let target_id = ally_ids.iter().copied().min_by_key(|&id| encounter.creature(id).current_hit_points);
    let Some(target_id) = target_id else {
        return;
    };

    if !move_to(encounter, actor, target_id, heal.range) {
        return;
    }

    let healed = crate::dice::D8.roll(dice) + heal.bonus;
    let caster_name = encounter.creature(actor).name.clone();
    let target = encounter.creature_mut(target_id);
    target.current_hit_points = (target.current_hit_points + healed).min(target.max_hit_points);
    let target_name = target.name.clone();
    encounter.log(format!("{caster_name} heals {target_name} for {healed} hit points."));

    let me = encounter.creature_mut(actor);
    if let Some(pos) = me.actions.iter().position(|a| matches!(a, Action::Heal(_))) {
        if let Action::Heal(h) = &mut me.actions[pos] {
            h.slots -= 1;
            if h.slots <= 0 {
                me.actions.remove(pos);
            }
        }
    }
}

fn resolve_raise_shield(encounter: &mut Encounter, actor: CreatureId, shield: &RaiseShieldAction) {
    let me = encounter.creature_mut(actor);
    me.shield_raised = true;
    me.shield_bonus = shield.bonus;
    me.armor_class += shield.bonus;
    let name = me.name.clone();
    encounter.log(format!("{name} raises its shield."));
}

/// Applies damage to `target`, transforming it through the enemy
/// immunity/weakness/resistance pipeline first. Handles death, including
/// the player `players_killed` counter and removal from the encounter.
pub fn apply_damage(encounter: &mut Encounter, target_id: CreatureId, raw: i32, damage_type: &DamageType, players_killed: &mut u32) {
    let target = encounter.creature(target_id);

    if damage_type.is_vitality() && !target.has_trait("undead") {
        return;
    }

    let mut amount = raw;
    if target.team == Team::Enemy {
        if target.immunities.contains(damage_type) {
            let name = target.name.clone();
            encounter.log(format!("{name} is immune to {damage_type} damage."));
            return;
        }
        if let Some(w) = target.weaknesses.get(damage_type) {
            amount += w;
        } else {
            let resist = target
                .resistances
                .get(damage_type)
                .or_else(|| target.resistances.get(&DamageType::new("all-damage")));
            if let Some(r) = resist {
                amount = (amount - r).max(1);
            }
        }
    }

    let target = encounter.creature_mut(target_id);
    target.current_hit_points = (target.current_hit_points - amount).max(0);
    let died = target.current_hit_points == 0;
    let name = target.name.clone();
    let team = target.team;

    if died {
        encounter.creature_mut(target_id).is_dead = true;
        encounter.log(format!("{name} falls."));
        if team == Team::Player {
            *players_killed += 1;
        }
        encounter.remove_creature(target_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saves() -> Saves {
        Saves {
            fortitude: 0,
            reflex: 0,
            will: 0,
        }
    }

    fn bare_creature(id: usize, team: Team, hp: i32) -> Creature {
        Creature {
            id: CreatureId(id),
            name: format!("c{id}"),
            level: 1,
            team,
            attribute_modifiers: crate::descriptor::AttributeModifiers {
                strength: 0,
                dexterity: 0,
                constitution: 0,
                intelligence: 0,
                wisdom: 0,
                charisma: 0,
            },
            skills: HashMap::new(),
            saves: saves(),
            perception: 0,
            armor_class: 15,
            max_hit_points: hp,
            current_hit_points: hp,
            speed: 25,
            spell_attack_bonus: None,
            spell_dc: None,
            immunities: HashSet::new(),
            weaknesses: HashMap::new(),
            resistances: HashMap::new(),
            traits: Vec::new(),
            sneak_attack: false,
            ancestry: None,
            class: None,
            actions: Vec::new(),
            x: 0,
            y: 0,
            num_actions: 3,
            multi_attack: 0,
            shield_raised: false,
            shield_bonus: 0,
            initiative: 0,
            is_dead: false,
        }
    }

    #[test]
    fn distance_rounds_to_nearest_five_feet() {
        let mut a = bare_creature(0, Team::Player, 10);
        let mut b = bare_creature(1, Team::Enemy, 10);
        a.x = 0;
        a.y = 0;
        b.x = 2;
        b.y = 0;
        assert_eq!(a.distance_feet(&b), 10);
    }

    #[test]
    fn get_two_mut_returns_distinct_references() {
        let mut creatures = vec![bare_creature(0, Team::Player, 10), bare_creature(1, Team::Enemy, 10)];
        let (a, b) = get_two_mut(&mut creatures, CreatureId(0), CreatureId(1));
        a.current_hit_points = 1;
        b.current_hit_points = 2;
        assert_eq!(creatures[0].current_hit_points, 1);
        assert_eq!(creatures[1].current_hit_points, 2);
    }

    #[test]
    fn damage_expr_unused_import_guard() {
        let _ = DamageExpr::parse("1d4+1");
    }
}
