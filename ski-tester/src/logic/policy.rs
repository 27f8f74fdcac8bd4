use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use ski_game::{Command, GameSession, Input, Player, Slope};

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the command for the next turn.
    fn next_command(&mut self, session: &GameSession) -> Command;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Cruiser,
    Jumper,
    Gunner,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Cruiser, Self::Jumper, Self::Gunner, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cruiser => "cruiser",
            Self::Jumper => "jumper",
            Self::Gunner => "gunner",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cruiser => "Cruiser",
            Self::Jumper => "Jumper",
            Self::Gunner => "Gunner",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cruiser => "Keeps skiing and steers around hazards ahead",
            Self::Jumper => "Jumps over hazards and hops away from a close Yeti",
            Self::Gunner => "Launches ICBMs or summons the Fire Demon once a Yeti shows up",
            Self::Random => "Seeded random commands, mostly blank turns",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(token.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Cruiser => Box::new(CruiserPolicy),
            Self::Jumper => Box::new(JumperPolicy),
            Self::Gunner => Box::new(GunnerPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CruiserPolicy;
struct JumperPolicy;
struct GunnerPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Replays a fixed list of input tokens, then keeps skiing.
pub struct ScriptedPolicy {
    /// Each entry is a command and how many turns it is issued for.
    runs: Vec<(Command, u32)>,
    cursor: usize,
    issued: u32,
}

impl ScriptedPolicy {
    /// Numeric tokens become that many blank turns, issued one turn at a time.
    #[must_use]
    pub fn from_tokens(tokens: &[String]) -> Self {
        let runs = tokens
            .iter()
            .map(|token| match Input::parse(token) {
                Input::Command(command) => (command, 1),
                Input::Repeat(count) => (Command::KeepSkiing, count),
            })
            .filter(|&(_, count)| count > 0)
            .collect();
        Self {
            runs,
            cursor: 0,
            issued: 0,
        }
    }

    /// Scripted turns, counting each repeat.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.runs.iter().map(|&(_, count)| u64::from(count)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Cell the player will land on next turn at the current speed.
fn next_cell(slope: &Slope, player: &Player) -> i64 {
    slope.wrap(slope.player_pos() + player.player_speed())
}

fn hazard_ahead(slope: &Slope, player: &Player) -> bool {
    slope.terrain_at(next_cell(slope, player)).is_hazard()
}

fn steer(slope: &Slope, player: &Player) -> Command {
    if !hazard_ahead(slope, player) {
        return Command::KeepSkiing;
    }
    let ahead = next_cell(slope, player);
    if !slope.terrain_at(ahead + 1).is_hazard() {
        Command::Right
    } else if !slope.terrain_at(ahead - 1).is_hazard() {
        Command::Left
    } else {
        Command::KeepSkiing
    }
}

fn yeti_distance(slope: &Slope) -> Option<i64> {
    slope
        .yeti_pos()
        .map(|pos| (pos - slope.player_pos()).abs())
}

fn cruise(slope: &Slope, player: &Player) -> Command {
    steer(slope, player)
}

fn jump(slope: &Slope, player: &Player) -> Command {
    if yeti_distance(slope).is_some_and(|d| d <= 3) {
        Command::Hop
    } else if hazard_ahead(slope, player) {
        Command::Jump
    } else {
        Command::KeepSkiing
    }
}

fn gun(slope: &Slope, player: &Player) -> Command {
    match yeti_distance(slope) {
        Some(_) if slope.icbm_pos().is_some() || slope.demon_pos().is_some() => {
            steer(slope, player)
        }
        Some(d) if d > slope.config().icbm_range => Command::LaunchIcbm,
        Some(_) => Command::SummonDemon,
        None => steer(slope, player),
    }
}

impl PlayerPolicy for CruiserPolicy {
    fn name(&self) -> &'static str {
        "Cruiser"
    }

    fn next_command(&mut self, session: &GameSession) -> Command {
        cruise(session.slope(), session.player())
    }
}

impl PlayerPolicy for JumperPolicy {
    fn name(&self) -> &'static str {
        "Jumper"
    }

    fn next_command(&mut self, session: &GameSession) -> Command {
        jump(session.slope(), session.player())
    }
}

impl PlayerPolicy for GunnerPolicy {
    fn name(&self) -> &'static str {
        "Gunner"
    }

    fn next_command(&mut self, session: &GameSession) -> Command {
        gun(session.slope(), session.player())
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn next_command(&mut self, _session: &GameSession) -> Command {
        // Blank turns dominate so runs last long enough to be interesting.
        if self.rng.gen_bool(0.6) {
            return Command::KeepSkiing;
        }
        let idx = self.rng.gen_range(0..Command::ALL.len());
        Command::ALL[idx]
    }
}

impl PlayerPolicy for ScriptedPolicy {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn next_command(&mut self, _session: &GameSession) -> Command {
        let Some(&(command, count)) = self.runs.get(self.cursor) else {
            return Command::KeepSkiing;
        };
        self.issued += 1;
        if self.issued >= count {
            self.cursor += 1;
            self.issued = 0;
        }
        command
    }
}
