use core::fmt;

/// Unique identifier for a combatant within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side a combatant fights on. Player-side entities act through the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub const fn opponent(self) -> Self {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    #[inline]
    pub const fn is_player(self) -> bool {
        matches!(self, Team::Player)
    }
}

/// Elemental affinity shared by combatants, actions, tiles and break gauges.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Element {
    Fire,
    Water,
    Leaf,
    Light,
    Dark,
    #[default]
    #[strum(serialize = "none")]
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    Neutral,
}

impl Element {
    pub const fn is_neutral(self) -> bool {
        matches!(self, Element::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn element_parses_data_names() {
        assert_eq!(Element::from_str("fire"), Ok(Element::Fire));
        assert_eq!(Element::from_str("None"), Ok(Element::Neutral));
        assert_eq!(Element::Leaf.to_string(), "leaf");
    }

    #[test]
    fn teams_oppose_each_other() {
        assert_eq!(Team::Player.opponent(), Team::Enemy);
        assert!(!Team::Enemy.is_player());
    }
}
