use std::collections::{HashMap, HashSet};

use engine::action::{Action, DamageExpr, DamageType, StrikeAction, WeightContext};
use engine::creature::{Creature, CreatureId, Saves, Team};

fn bare_creature(id: usize, team: Team) -> Creature {
    Creature {
        id: CreatureId(id),
        name: format!("c{id}"),
        level: 1,
        team,
        attribute_modifiers: engine::descriptor::AttributeModifiers {
            strength: 0,
            dexterity: 0,
            constitution: 0,
            intelligence: 0,
            wisdom: 0,
            charisma: 0,
        },
        skills: HashMap::new(),
        saves: Saves {
            fortitude: 0,
            reflex: 0,
            will: 0,
        },
        perception: 0,
        armor_class: 15,
        max_hit_points: 10,
        current_hit_points: 10,
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

fn strike(damage: &str, attack_bonus: i32, range: i32, traits: Vec<&str>) -> StrikeAction {
    StrikeAction {
        name: "Test Strike".to_string(),
        attack_bonus,
        damage: DamageExpr::parse(damage).unwrap(),
        damage_type: DamageType::new("slashing"),
        range,
        traits: traits.into_iter().map(String::from).collect(),
    }
}

/// Scenario 3: third attack penalty on a non-agile strike halves the
/// weight relative to a first attack.
#[test]
fn third_attack_penalty_halves_weight_and_applies_a_penalty_of_ten() {
    let action = Action::Strike(strike("1d8+4", 10, 5, vec![]));
    let attacker = bare_creature(0, Team::Player);
    let enemy = bare_creature(1, Team::Enemy);
    let opponents = [&enemy];

    let first_ctx = WeightContext {
        multi_attack: 0,
        actions_remaining: 3,
        in_melee: true,
        self_creature: &attacker,
        opponents: &opponents,
    };
    let third_ctx = WeightContext {
        multi_attack: 2,
        actions_remaining: 1,
        in_melee: true,
        self_creature: &attacker,
        opponents: &opponents,
    };

    let first_weight = action.weight(&first_ctx);
    let third_weight = action.weight(&third_ctx);

    // Base weight without penalty: 1*8+4 + 10 + 5/10 = 22.5
    assert!((first_weight - 22.5).abs() < 1e-9);
    // Third-attack penalty is 5*2 = 10, triggering the >= 8 halving rule.
    assert!((third_weight - ((22.5 - 10.0) * 0.5)).abs() < 1e-9);
}

/// Scenario 5: vitality damage with no undead target is never picked.
#[test]
fn vitality_damage_against_non_undead_is_never_picked() {
    let vitality_strike = StrikeAction {
        damage_type: DamageType::new("vitality"),
        ..strike("1d6", 5, 5, vec![])
    };
    let action = Action::Strike(vitality_strike);
    let attacker = bare_creature(0, Team::Player);
    let living_enemy = bare_creature(1, Team::Enemy);
    let opponents = [&living_enemy];

    let ctx = WeightContext {
        multi_attack: 0,
        actions_remaining: 3,
        in_melee: true,
        self_creature: &attacker,
        opponents: &opponents,
    };
    assert_eq!(action.weight(&ctx), f64::NEG_INFINITY);
}

#[test]
fn ranged_strike_in_melee_is_floored_at_zero() {
    let action = Action::Strike(strike("1d4", 0, 60, vec![]));
    let attacker = bare_creature(0, Team::Player);
    let enemy = bare_creature(1, Team::Enemy);
    let opponents = [&enemy];

    let ctx = WeightContext {
        multi_attack: 2,
        actions_remaining: 1,
        in_melee: true,
        self_creature: &attacker,
        opponents: &opponents,
    };
    assert!(action.weight(&ctx) >= 0.0);
}
