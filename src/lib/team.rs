//! A team's game log, kept in a [`BstMap`] keyed by game timestamp, and the
//! per-player aggregates computed over it.

use crate::{BstMap, Error, Result};
use log::{debug, info};
use std::fmt;

/// Position a player is fielded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Defends the team's own zone.
    Defender,
    /// Plays up front and scores.
    Forward,
    /// Guards the net.
    Goalkeeper,
}

impl Role {
    /// Every role, in key order.
    pub const ALL: [Role; 3] = [Role::Defender, Role::Forward, Role::Goalkeeper];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Defender => "Defender",
            Role::Forward => "Forward",
            Role::Goalkeeper => "Goalkeeper",
        };
        f.write_str(name)
    }
}

/// A player's line in one game. Times are in minutes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    /// Full name; players are matched across games by it.
    pub name: String,
    /// Role in this game.
    pub role: Role,
    /// Minutes on the ice.
    pub game_time: usize,
    /// Minutes in the penalty box.
    pub penalty_time: usize,
}

impl Player {
    /// A player line.
    pub fn new(name: impl Into<String>, role: Role, game_time: usize, penalty_time: usize) -> Self {
        Player {
            name: name.into(),
            role,
            game_time,
            penalty_time,
        }
    }
}

/// One game: when, against whom, the attendance and who played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    /// Seconds since the Unix epoch; the game's key in [`Team`].
    pub date: u64,
    /// The opposing team.
    pub opponent: String,
    /// Attendance.
    pub quantity: usize,
    players: Vec<Player>,
}

impl Game {
    /// A game with an empty line-up.
    pub fn new(date: u64, opponent: impl Into<String>, quantity: usize) -> Self {
        Game {
            date,
            opponent: opponent.into(),
            quantity,
            players: Vec::new(),
        }
    }

    /// Builder-style [`Game::add_player`].
    pub fn with_player(mut self, player: Player) -> Self {
        self.add_player(player);
        self
    }

    /// Everyone who played, in the order they were added.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Adds `player` to the line-up.
    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Drops the first player called `name` from the line-up.
    pub fn remove_player(&mut self, name: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.name == name)?;
        Some(self.players.remove(idx))
    }

    /// Sum of the penalty minutes of everyone who played.
    pub fn total_penalty_time(&self) -> usize {
        self.players.iter().map(|p| p.penalty_time).sum()
    }
}

/// A team and its games in chronological order.
pub struct Team {
    name: String,
    coach: String,
    games: BstMap<u64, Game>,
}

impl Team {
    /// A team with no games recorded.
    pub fn new(name: impl Into<String>, coach: impl Into<String>) -> Self {
        Team {
            name: name.into(),
            coach: coach.into(),
            games: BstMap::new(),
        }
    }

    /// The team's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The head coach's full name.
    pub fn coach(&self) -> &str {
        &self.coach
    }

    /// All games, ordered by date.
    pub fn games(&self) -> &BstMap<u64, Game> {
        &self.games
    }

    /// Records `game`. Only one game can be recorded per timestamp.
    pub fn add_game(&mut self, game: Game) -> Result<()> {
        let date = game.date;
        let (_, inserted) = self.games.insert(date, game);
        if !inserted {
            return Err(Error::DuplicateGame(date));
        }
        info!("{}: recorded game at {}", self.name, date);
        Ok(())
    }

    /// Removes the game at `date` and hands it back.
    pub fn remove_game(&mut self, date: u64) -> Result<Game> {
        let game = self.games.remove(&date).ok_or(Error::GameNotFound(date))?;
        info!("{}: removed game at {}", self.name, date);
        Ok(game)
    }

    /// The game at `date`, if one was recorded.
    pub fn find_game(&self, date: u64) -> Option<&Game> {
        self.games.get(&date)
    }

    /// Changes the opponent and attendance of the game at `date`.
    pub fn modify_game(&mut self, date: u64, opponent: impl Into<String>, quantity: usize) -> Result<()> {
        let game = self
            .games
            .at_mut(&date)
            .map_err(|_| Error::GameNotFound(date))?;
        game.opponent = opponent.into();
        game.quantity = quantity;
        debug!("{}: game at {} now against {} ({})", self.name, date, game.opponent, quantity);
        Ok(())
    }

    /// Penalty minutes collected by the team in the game at `date`.
    pub fn total_penalty_time(&self, date: u64) -> Result<usize> {
        self.find_game(date)
            .map(Game::total_penalty_time)
            .ok_or(Error::GameNotFound(date))
    }

    /// Game time per player name over every game. A player's role is the one
    /// they had in their earliest game.
    pub fn player_totals(&self) -> BstMap<String, (Role, usize)> {
        let mut totals = BstMap::new();
        for game in self.games.values() {
            for player in game.players() {
                let (pos, inserted) = totals.insert(player.name.clone(), (player.role, player.game_time));
                if !inserted {
                    if let Some((_, (_, total))) = totals.entry_at_mut(pos) {
                        *total += player.game_time;
                    }
                }
            }
        }
        debug!("{}: aggregated {} players over {} games", self.name, totals.len(), self.games.len());
        totals
    }

    /// For each role, the player with the most accumulated game time.
    ///
    /// A role nobody played maps to `("", 0)`. On a tie the name that sorts
    /// first wins.
    pub fn most_active_players(&self) -> BstMap<Role, (String, usize)> {
        let mut best: BstMap<Role, (String, usize)> =
            Role::ALL.into_iter().map(|role| (role, (String::new(), 0))).collect();
        for (name, (role, total)) in &self.player_totals() {
            let slot = best.get_or_insert_default(*role);
            if slot.1 < *total {
                *slot = (name.clone(), *total);
            }
        }
        best
    }
}
