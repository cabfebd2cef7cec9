//! Runs the fixed batch of independent simulations and aggregates the
//! result (spec §4.6): the product's reporting is defined in terms of
//! exactly 100 runs, so the count is not a parameter.

use crate::descriptor::{EnemyDescriptor, PlayerDescriptor, SimulationResult};
use crate::dice::Dice;
use crate::error::EngineError;
use crate::simulation::Simulation;

const TOTAL_SIMS: u32 = 100;

/// The engine's single entry point. Runs `TOTAL_SIMS` independent
/// simulations serially, each with its own isolated `Dice` and object
/// graph, and aggregates the win rate, average deaths, and average round
/// count.
///
/// `seed`, if given, seeds simulation `n` with `seed + n` so a batch is
/// reproducible; otherwise each simulation draws from process entropy.
pub fn run_simulations(
    players: &[PlayerDescriptor],
    enemies: &[EnemyDescriptor],
    seed: Option<u64>,
) -> Result<SimulationResult, EngineError> {
    let total_players = players.len() as u32;
    let mut wins = 0u32;
    let mut total_deaths = 0u64;
    let mut total_rounds = 0u64;
    let mut sim_data = Vec::with_capacity(TOTAL_SIMS as usize);

    for sim_num in 1..=TOTAL_SIMS {
        let mut dice = match seed {
            Some(s) => Dice::from_seed(s.wrapping_add(sim_num as u64)),
            None => Dice::from_entropy(),
        };
        let record = Simulation::new(sim_num, total_players).run(players, enemies, &mut dice)?;
        if record.winner == "players" {
            wins += 1;
        }
        total_deaths += record.players_killed as u64;
        total_rounds += record.rounds as u64;
        sim_data.push(record);
    }

    Ok(SimulationResult {
        total_sims: TOTAL_SIMS,
        wins,
        wins_ratio: 100.0 * wins as f64 / TOTAL_SIMS as f64,
        average_deaths: total_deaths as f64 / TOTAL_SIMS as f64,
        average_rounds: total_rounds as f64 / TOTAL_SIMS as f64,
        sim_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::*;
    use std::collections::HashMap;

    fn trivial_player() -> PlayerDescriptor {
        PlayerDescriptor {
            base: CreatureDescriptor {
                name: "Hero".into(),
                level: 3,
                perception: 5,
                max_hit_points: 30,
                speed: 25,
                defenses: Defenses {
                    armor_class: 18,
                    saves: Saves {
                        fortitude: 8,
                        reflex: 6,
                        will: 5,
                    },
                },
                attribute_modifiers: AttributeModifiers {
                    strength: 4,
                    dexterity: 2,
                    constitution: 3,
                    intelligence: 0,
                    wisdom: 1,
                    charisma: 0,
                },
                skills: HashMap::new(),
                spell_attack_bonus: None,
                spell_dc: None,
                actions: ActionsDescriptor {
                    attacks: vec![AttackDescriptor {
                        name: "Longsword".into(),
                        attack_bonus: 11,
                        damage: "1d8+4".into(),
                        damage_type: "slashing".into(),
                        range: Some(5),
                        traits: Vec::new(),
                    }],
                    ..Default::default()
                },
            },
            ancestry: "human".into(),
            class: "fighter".into(),
            heritage: None,
        }
    }

    fn trivial_enemy() -> EnemyDescriptor {
        EnemyDescriptor {
            base: CreatureDescriptor {
                name: "Goblin".into(),
                level: 1,
                perception: 2,
                max_hit_points: 12,
                speed: 25,
                defenses: Defenses {
                    armor_class: 15,
                    saves: Saves {
                        fortitude: 3,
                        reflex: 5,
                        will: 2,
                    },
                },
                attribute_modifiers: AttributeModifiers {
                    strength: 2,
                    dexterity: 3,
                    constitution: 1,
                    intelligence: 0,
                    wisdom: 0,
                    charisma: 0,
                },
                skills: HashMap::new(),
                spell_attack_bonus: None,
                spell_dc: None,
                actions: ActionsDescriptor {
                    attacks: vec![AttackDescriptor {
                        name: "Shortsword".into(),
                        attack_bonus: 7,
                        damage: "1d6+2".into(),
                        damage_type: "piercing".into(),
                        range: Some(5),
                        traits: Vec::new(),
                    }],
                    ..Default::default()
                },
            },
            traits: Vec::new(),
            immunities: Vec::new(),
            weaknesses: HashMap::new(),
            resistances: HashMap::new(),
        }
    }

    #[test]
    fn driver_runs_exactly_one_hundred_simulations_in_order() {
        let players = vec![trivial_player()];
        let enemies = vec![trivial_enemy()];
        let result = run_simulations(&players, &enemies, Some(7)).unwrap();

        assert_eq!(result.total_sims, 100);
        assert_eq!(result.sim_data.len(), 100);
        for (i, record) in result.sim_data.iter().enumerate() {
            assert_eq!(record.sim_num, (i + 1) as u32);
        }
        assert!(result.wins <= 100);
        assert!((result.wins_ratio - 100.0 * result.wins as f64 / 100.0).abs() < 1e-9);
        assert!(result.average_deaths >= 0.0 && result.average_deaths <= 1.0);
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let players = vec![trivial_player()];
        let enemies = vec![trivial_enemy()];
        let a = run_simulations(&players, &enemies, Some(99)).unwrap();
        let b = run_simulations(&players, &enemies, Some(99)).unwrap();
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.average_rounds, b.average_rounds);
    }
}
