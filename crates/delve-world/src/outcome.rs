//! Win detection.

use delve_protocol::{PlayerId, Response};

use crate::Player;

/// The final verdict once every treasure has been collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// One player holds the highest score.
    Winner { player: PlayerId, score: u32 },
    /// Several players share the highest score. `players` is sorted by id.
    ///
    /// Also used, with an empty list, if nobody is registered when the
    /// game ends.
    Tie { players: Vec<PlayerId>, score: u32 },
}

impl Outcome {
    /// Decides the outcome from the players registered at the moment the
    /// last treasure was taken.
    pub fn decide<'a>(players: impl IntoIterator<Item = &'a Player>) -> Self {
        let mut best = 0;
        let mut leaders: Vec<PlayerId> = Vec::new();
        for player in players {
            if leaders.is_empty() || player.score > best {
                best = player.score;
                leaders.clear();
                leaders.push(player.id);
            } else if player.score == best {
                leaders.push(player.id);
            }
        }
        leaders.sort();

        match leaders.as_slice() {
            [only] => Self::Winner {
                player: *only,
                score: best,
            },
            _ => Self::Tie {
                players: leaders,
                score: best,
            },
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Self::Tie { .. })
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            Self::Winner { player, .. } => Some(*player),
            Self::Tie { .. } => None,
        }
    }

    /// The top score.
    pub fn score(&self) -> u32 {
        match self {
            Self::Winner { score, .. } | Self::Tie { score, .. } => *score,
        }
    }
}

impl From<&Outcome> for Response {
    fn from(outcome: &Outcome) -> Self {
        Response::GameOver {
            winner: outcome.winner(),
            tied: match outcome {
                Outcome::Winner { .. } => Vec::new(),
                Outcome::Tie { players, .. } => players.clone(),
            },
            score: outcome.score(),
        }
    }
}
