//! World generation settings.

use std::ops::RangeInclusive;

use crate::GameError;

/// Dimensions and treasure placement for a new world.
///
/// The defaults describe an 8×8 main area with 15 treasures worth 1–9 and
/// a 4×4 treasure room holding 5 treasures worth 5–15, for 20 treasures in
/// total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldConfig {
    pub rows: usize,
    pub cols: usize,
    /// Treasures placed in the main area.
    pub treasures: usize,
    pub treasure_values: RangeInclusive<u32>,
    pub room_rows: usize,
    pub room_cols: usize,
    /// Treasures placed in the treasure room.
    pub room_treasures: usize,
    pub room_treasure_values: RangeInclusive<u32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            treasures: 15,
            treasure_values: 1..=9,
            room_rows: 4,
            room_cols: 4,
            room_treasures: 5,
            room_treasure_values: 5..=15,
        }
    }
}

impl WorldConfig {
    /// Checks that generation can terminate and the world is playable.
    ///
    /// Rules:
    /// - both grids are non-empty;
    /// - the main area fits every treasure, the entrance, and at least one
    ///   free cell for a player to spawn on;
    /// - the room fits every treasure next to its entry cell;
    /// - the room holds at least one treasure (otherwise there is no room);
    /// - value ranges are non-empty and start at 1 or more.
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.rows == 0 || self.cols == 0 {
            return invalid(format!("main grid {}x{} is empty", self.rows, self.cols));
        }
        if self.room_rows == 0 || self.room_cols == 0 {
            return invalid(format!(
                "room grid {}x{} is empty",
                self.room_rows, self.room_cols
            ));
        }

        let area = self.rows * self.cols;
        if self.treasures + 2 > area {
            return invalid(format!(
                "{} treasures, the entrance and a spawn cell do not fit in {area} cells",
                self.treasures
            ));
        }
        let room_area = self.room_rows * self.room_cols;
        if self.room_treasures == 0 {
            return invalid("the treasure room needs at least one treasure".into());
        }
        if self.room_treasures + 1 > room_area {
            return invalid(format!(
                "{} room treasures and the entry cell do not fit in {room_area} cells",
                self.room_treasures
            ));
        }

        for (name, range) in [
            ("treasure_values", &self.treasure_values),
            ("room_treasure_values", &self.room_treasure_values),
        ] {
            if range.is_empty() || *range.start() == 0 {
                return invalid(format!("{name} {range:?} must be non-empty and positive"));
            }
        }
        Ok(())
    }

    /// Sum of main and room treasure counts: the win threshold.
    pub fn total_treasures(&self) -> usize {
        self.treasures + self.room_treasures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_with_twenty_treasures() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_treasures(), 20);
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let config = WorldConfig {
            rows: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_overfull_main_grid() {
        // 3x3 = 9 cells: 8 treasures + entrance leaves no spawn cell.
        let config = WorldConfig {
            rows: 3,
            cols: 3,
            treasures: 8,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WorldConfig {
            treasures: 7,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overfull_room() {
        let config = WorldConfig {
            room_rows: 2,
            room_cols: 2,
            room_treasures: 4,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_room() {
        let config = WorldConfig {
            room_treasures: 0,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_valued_treasure() {
        let config = WorldConfig {
            treasure_values: 0..=9,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());

        #[allow(clippy::reversed_empty_ranges)]
        let config = WorldConfig {
            room_treasure_values: 9..=5,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
