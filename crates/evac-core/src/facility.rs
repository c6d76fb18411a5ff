//! Facility archetypes and their shelter profiles.

use serde::{Deserialize, Serialize};

/// Kind of facility a safe zone represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Hospital,
    FireStation,
    Police,
    School,
    CommunityCenter,
}

/// Static shelter characteristics for a facility kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacilityProfile {
    pub capacity: u32,
    pub radius_m: f64,
    pub safety_level: u8,
    pub resources: &'static [&'static str],
}

impl FacilityKind {
    /// Kinds queried from places search, in merge order.
    pub const SEARCHABLE: [FacilityKind; 4] = [
        Self::Hospital,
        Self::FireStation,
        Self::Police,
        Self::School,
    ];

    /// Archetypes used for synthetic zones.
    pub const SYNTHETIC: [FacilityKind; 3] = [Self::Hospital, Self::School, Self::CommunityCenter];

    /// Places-search `type` parameter.
    pub fn place_type(self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::FireStation => "fire_station",
            Self::Police => "police",
            Self::School => "school",
            Self::CommunityCenter => "community_center",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::FireStation => "Fire Station",
            Self::Police => "Police Station",
            Self::School => "School",
            Self::CommunityCenter => "Community Center",
        }
    }

    pub fn profile(self) -> FacilityProfile {
        match self {
            Self::Hospital => FacilityProfile {
                capacity: 500,
                radius_m: 200.0,
                safety_level: 5,
                resources: &["medical", "water", "food", "power", "shelter"],
            },
            Self::FireStation => FacilityProfile {
                capacity: 50,
                radius_m: 100.0,
                safety_level: 4,
                resources: &["first_aid", "water", "communications"],
            },
            Self::Police => FacilityProfile {
                capacity: 75,
                radius_m: 100.0,
                safety_level: 4,
                resources: &["security", "communications", "first_aid"],
            },
            Self::School => FacilityProfile {
                capacity: 300,
                radius_m: 150.0,
                safety_level: 3,
                resources: &["shelter", "water", "restrooms"],
            },
            Self::CommunityCenter => FacilityProfile {
                capacity: 200,
                radius_m: 120.0,
                safety_level: 3,
                resources: &["shelter", "water", "food", "restrooms"],
            },
        }
    }
}

impl FacilityProfile {
    pub fn resource_tags(&self) -> Vec<String> {
        self.resources.iter().map(|tag| tag.to_string()).collect()
    }
}
