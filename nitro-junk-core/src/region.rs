use serde::{Deserialize, Serialize};

/// Market a cartridge was released for, from the last game-code character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Japan,
    Usa,
    Europe,
    Australia,
    Korea,
    China,
    /// Multi-region or region-free releases
    World,
}

/// Game-code letter, region, and the market it usually denotes.
/// European letters are split by language.
const GAME_CODE_REGIONS: &[(char, Region, &str)] = &[
    ('J', Region::Japan, "Japan"),
    ('E', Region::Usa, "North America"),
    ('P', Region::Europe, "Europe"),
    ('D', Region::Europe, "Germany"),
    ('F', Region::Europe, "France"),
    ('S', Region::Europe, "Spain"),
    ('I', Region::Europe, "Italy"),
    ('H', Region::Europe, "Netherlands"),
    ('X', Region::Europe, "Europe (alt)"),
    ('Y', Region::Europe, "Europe (alt)"),
    ('U', Region::Australia, "Australia"),
    ('K', Region::Korea, "Korea"),
    ('C', Region::China, "China"),
    ('A', Region::World, "Asia / all regions"),
    ('W', Region::World, "World"),
];

impl Region {
    /// Three-letter abbreviation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Japan => "JPN",
            Self::Usa => "USA",
            Self::Europe => "EUR",
            Self::Australia => "AUS",
            Self::Korea => "KOR",
            Self::China => "CHN",
            Self::World => "WLD",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::World => "World",
            _ => self.market_name(),
        }
    }

    fn market_name(&self) -> &'static str {
        GAME_CODE_REGIONS
            .iter()
            .find(|(_, region, _)| region == self)
            .map_or("Unknown", |(_, _, label)| label)
    }

    /// Region for the last character of a four-character game code.
    /// Lowercase letters never appear in real codes and are rejected.
    pub fn from_game_code_char(c: char) -> Option<Self> {
        GAME_CODE_REGIONS
            .iter()
            .find(|(letter, _, _)| *letter == c)
            .map(|(_, region, _)| *region)
    }

    /// Market label for a game-code character, e.g. `'D'` is "Germany".
    pub fn market_for_game_code_char(c: char) -> Option<&'static str> {
        GAME_CODE_REGIONS
            .iter()
            .find(|(letter, _, _)| *letter == c)
            .map(|(_, _, label)| *label)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_code_letters() {
        assert_eq!(Region::from_game_code_char('E'), Some(Region::Usa));
        assert_eq!(Region::from_game_code_char('D'), Some(Region::Europe));
        assert_eq!(Region::from_game_code_char('K'), Some(Region::Korea));
        assert_eq!(Region::from_game_code_char('e'), None);
        assert_eq!(Region::from_game_code_char('Z'), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(Region::Europe.to_string(), "Europe");
        assert_eq!(Region::Usa.code(), "USA");
        assert_eq!(Region::World.name(), "World");
        assert_eq!(Region::market_for_game_code_char('F'), Some("France"));
    }
}
