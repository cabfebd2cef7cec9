//! One complete encounter run: builds creatures from descriptors, delegates
//! to a single `Encounter`, and surfaces the result as a `SimulationRecord`.

use tracing::info_span;

use crate::descriptor::{EnemyDescriptor, PlayerDescriptor, SimulationRecord};
use crate::dice::Dice;
use crate::encounter::Encounter;
use crate::error::EngineError;

pub struct Simulation {
    pub sim_num: u32,
    pub total_players: u32,
}

impl Simulation {
    pub fn new(sim_num: u32, total_players: u32) -> Self {
        Simulation { sim_num, total_players }
    }

    /// Builds a fresh `Encounter` from the given rosters and runs it to
    /// completion, producing one narration log and result record. Nothing
    /// from this run persists past the call.
    pub fn run(
        &self,
        players: &[PlayerDescriptor],
        enemies: &[EnemyDescriptor],
        dice: &mut Dice,
    ) -> Result<SimulationRecord, EngineError> {
        let span = info_span!("simulation", sim_num = self.sim_num);
        let _guard = span.enter();

        let mut encounter = Encounter::new(players, enemies, dice)?;
        let mut players_killed = 0u32;
        let winner = encounter.run(dice, &mut players_killed);

        Ok(SimulationRecord {
            sim_num: self.sim_num,
            winner,
            rounds: encounter.rounds,
            players_killed,
            total_players: self.total_players,
            log: encounter.take_log(),
        })
    }
}
