use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr, IntoStaticStr};

/// Warp pools exposed by the gacha log API.
///
/// The discriminant is the `gacha_type` code sent to the API; the strum name
/// doubles as the store table name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum GachaCategory {
    Stellar = 1,
    Departure = 2,
    Character = 11,
    LightCone = 12,
}

impl GachaCategory {
    /// All categories, in the order they are crawled and searched for a uid.
    pub const ALL: [GachaCategory; 4] = [
        GachaCategory::Stellar,
        GachaCategory::Departure,
        GachaCategory::Character,
        GachaCategory::LightCone,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::from_repr(code)
    }

    /// Parse a `gacha_type` value as it appears in API payloads ("11").
    pub fn from_gacha_type(gacha_type: &str) -> Option<Self> {
        gacha_type.trim().parse::<u8>().ok().and_then(Self::from_code)
    }

    /// Store table holding this category's draws.
    pub fn table_name(&self) -> &'static str {
        self.into()
    }

    /// Get the in-game pool name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Stellar => "Stellar Warp",
            Self::Departure => "Departure Warp",
            Self::Character => "Character Event Warp",
            Self::LightCone => "Light Cone Event Warp",
        }
    }

    /// Position of this category in [`GachaCategory::ALL`].
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Stellar => 0,
            Self::Departure => 1,
            Self::Character => 2,
            Self::LightCone => 3,
        }
    }
}
