//! Initiative, round loop, win detection, creature removal.

use tracing::debug;

use crate::creature::{take_turn, Creature, CreatureId, Team};
use crate::descriptor::{EnemyDescriptor, PlayerDescriptor};
use crate::dice::Dice;
use crate::error::EngineError;

/// Round cap preventing a pathological loop from running forever; on
/// reaching it the encounter declares a draw (spec §5/§9).
const ROUND_CAP: u32 = 1_000;

pub struct Encounter {
    creatures: Vec<Creature>,
    player_ids: Vec<CreatureId>,
    enemy_ids: Vec<CreatureId>,
    turn_order: Vec<CreatureId>,
    log: Vec<String>,
    pub rounds: u32,
    pub winner: Option<String>,
}

impl Encounter {
    pub fn new(
        players: &[PlayerDescriptor],
        enemies: &[EnemyDescriptor],
        dice: &mut Dice,
    ) -> Result<Self, EngineError> {
        let mut creatures = Vec::with_capacity(players.len() + enemies.len());
        let mut player_ids = Vec::with_capacity(players.len());
        let mut enemy_ids = Vec::with_capacity(enemies.len());

        for (i, descriptor) in players.iter().enumerate() {
            let id = CreatureId(creatures.len());
            let mut c = Creature::from_player(id, descriptor).map_err(|e| EngineError::MalformedCreature {
                name: descriptor.base.name.clone(),
                reason: e.to_string(),
            })?;
            c.x = 0;
            c.y = i as i32;
            player_ids.push(id);
            creatures.push(c);
        }
        for (i, descriptor) in enemies.iter().enumerate() {
            let id = CreatureId(creatures.len());
            let mut c = Creature::from_enemy(id, descriptor).map_err(|e| EngineError::MalformedCreature {
                name: descriptor.base.name.clone(),
                reason: e.to_string(),
            })?;
            c.x = 10;
            c.y = i as i32;
            enemy_ids.push(id);
            creatures.push(c);
        }

        for c in creatures.iter_mut() {
            c.roll_initiative(dice);
        }

        let mut turn_order: Vec<CreatureId> = player_ids.iter().chain(enemy_ids.iter()).copied().collect();
        turn_order.sort_by(|&a, &b| {
            let ca = &creatures[a.0];
            let cb = &creatures[b.0];
            cb.initiative
                .cmp(&ca.initiative)
                .then(cb.team.tiebreak_rank().cmp(&ca.team.tiebreak_rank()))
        });

        Ok(Encounter {
            creatures,
            player_ids,
            enemy_ids,
            turn_order,
            log: Vec::new(),
            rounds: 0,
            winner: None,
        })
    }

    pub fn creature(&self, id: CreatureId) -> &Creature {
        &self.creatures[id.0]
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> &mut Creature {
        &mut self.creatures[id.0]
    }

    pub fn alive_ids(&self, team: Team) -> Vec<CreatureId> {
        let side = match team {
            Team::Player => &self.player_ids,
            Team::Enemy => &self.enemy_ids,
        };
        side.iter().copied().filter(|&id| self.creatures[id.0].is_alive()).collect()
    }

    pub fn log(&mut self, line: String) {
        self.log.push(line);
    }

    pub fn take_log(self) -> Vec<String> {
        self.log
    }

    pub fn logs(&self) -> &[String] {
        &self.log
    }

    pub fn check_winner(&self) -> Option<&'static str> {
        if self.alive_ids(Team::Player).is_empty() {
            Some("enemies")
        } else if self.alive_ids(Team::Enemy).is_empty() {
            Some("players")
        } else {
            None
        }
    }

    /// Removes `id` from its side's alive list. The backing `creatures`
    /// vector never shrinks — indices must stay stable for every other
    /// `CreatureId` in play — so this only trims the side lists.
    pub fn remove_creature(&mut self, id: CreatureId) {
        let side = match self.creatures[id.0].team {
            Team::Player => &mut self.player_ids,
            Team::Enemy => &mut self.enemy_ids,
        };
        side.retain(|&existing| existing.0 != id.0);
    }

    fn log_setup(&mut self) {
        let party: Vec<String> = self.player_ids.iter().map(|&id| self.creatures[id.0].name.clone()).collect();
        let foes: Vec<String> = self.enemy_ids.iter().map(|&id| self.creatures[id.0].name.clone()).collect();
        let order: Vec<String> = self.turn_order.iter().map(|&id| self.creatures[id.0].name.clone()).collect();
        self.log(format!("Party: {}", party.join(", ")));
        self.log(format!("Enemies: {}", foes.join(", ")));
        self.log(format!("Initiative order: {}", order.join(", ")));
    }

    /// Runs the round loop until a side is wiped out or the round cap is
    /// hit, returning the winner string (`"players"`, `"enemies"`, or
    /// `"draw"`).
    pub fn run(&mut self, dice: &mut Dice, players_killed: &mut u32) -> String {
        self.log_setup();

        loop {
            if let Some(winner) = self.check_winner() {
                self.winner = Some(winner.to_string());
                return winner.to_string();
            }
            self.rounds += 1;
            if self.rounds > ROUND_CAP {
                debug!(rounds = self.rounds, "round cap reached, declaring a draw");
                self.winner = Some("draw".to_string());
                return "draw".to_string();
            }

            let round_start_order = self.turn_order.clone();
            for id in round_start_order {
                if self.creatures[id.0].is_dead {
                    continue;
                }
                if let Some(winner) = self.check_winner() {
                    self.winner = Some(winner.to_string());
                    return winner.to_string();
                }
                take_turn(self, id, dice, players_killed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::*;
    use std::collections::HashMap;

    fn minimal_creature(name: &str, ac: i32, hp: i32) -> CreatureDescriptor {
        CreatureDescriptor {
            name: name.to_string(),
            level: 1,
            perception: 0,
            max_hit_points: hp,
            speed: 25,
            defenses: Defenses {
                armor_class: ac,
                saves: Saves {
                    fortitude: 0,
                    reflex: 0,
                    will: 0,
                },
            },
            attribute_modifiers: AttributeModifiers {
                strength: 0,
                dexterity: 0,
                constitution: 0,
                intelligence: 0,
                wisdom: 0,
                charisma: 0,
            },
            skills: HashMap::new(),
            spell_attack_bonus: None,
            spell_dc: None,
            actions: ActionsDescriptor::default(),
        }
    }

    #[test]
    fn initiative_tie_goes_to_enemy() {
        let player = PlayerDescriptor {
            base: minimal_creature("Hero", 15, 10),
            ancestry: "human".into(),
            class: "fighter".into(),
            heritage: None,
        };
        let enemy = EnemyDescriptor {
            base: minimal_creature("Goblin", 15, 6),
            traits: Vec::new(),
            immunities: Vec::new(),
            weaknesses: HashMap::new(),
            resistances: HashMap::new(),
        };

        // A seed where both end up rolling the same d20 face is not
        // guaranteed, so force the tie directly instead.
        let mut dice = Dice::from_seed(1);
        let mut enc = Encounter::new(&[player], &[enemy], &mut dice).unwrap();
        for c in enc.creatures.iter_mut() {
            c.initiative = 15;
        }
        enc.turn_order.sort_by(|&a, &b| {
            let ca = &enc.creatures[a.0];
            let cb = &enc.creatures[b.0];
            cb.initiative
                .cmp(&ca.initiative)
                .then(cb.team.tiebreak_rank().cmp(&ca.team.tiebreak_rank()))
        });
        assert_eq!(enc.creatures[enc.turn_order[0].0].team, Team::Enemy);
    }

    #[test]
    fn check_winner_reports_enemies_when_players_wiped() {
        let player = PlayerDescriptor {
            base: minimal_creature("Hero", 15, 10),
            ancestry: "human".into(),
            class: "fighter".into(),
            heritage: None,
        };
        let enemy = EnemyDescriptor {
            base: minimal_creature("Goblin", 15, 6),
            traits: Vec::new(),
            immunities: Vec::new(),
            weaknesses: HashMap::new(),
            resistances: HashMap::new(),
        };
        let mut dice = Dice::from_seed(2);
        let mut enc = Encounter::new(&[player], &[enemy], &mut dice).unwrap();
        let pid = enc.player_ids[0];
        enc.creature_mut(pid).is_dead = true;
        enc.remove_creature(pid);
        assert_eq!(enc.check_winner(), Some("enemies"));
    }
}
