//! Fluid constituent definitions.

/// Bulk phase a constituent is tracked in.
///
/// Networks that model condensation carry the same substance twice (e.g.
/// water vapor and liquid water) as two distinct constituents, and a
/// conservation check sums the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Gas,
    Liquid,
}

/// Fluid constituents relevant for life-support and thermal-fluid networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Water vapor (H₂O, gas phase)
    H2O,
    /// Liquid water
    Water,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Methane (CH₄)
    CH4,
    /// Hydrogen (H₂)
    H2,
    /// Helium (He)
    He,
    /// Argon (Ar)
    Ar,
    /// Ammonia (NH₃)
    Ammonia,
}

impl Species {
    pub const ALL: [Species; 10] = [
        Species::N2,
        Species::O2,
        Species::H2O,
        Species::Water,
        Species::CO2,
        Species::CH4,
        Species::H2,
        Species::He,
        Species::Ar,
        Species::Ammonia,
    ];

    /// Canonical short key, used in scenario files and quantity names.
    pub fn key(&self) -> &'static str {
        match self {
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::H2O => "H2O",
            Species::Water => "WATER",
            Species::CO2 => "CO2",
            Species::CH4 => "CH4",
            Species::H2 => "H2",
            Species::He => "He",
            Species::Ar => "Ar",
            Species::Ammonia => "NH3",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::H2O => "Water Vapor",
            Species::Water => "Liquid Water",
            Species::CO2 => "Carbon Dioxide",
            Species::CH4 => "Methane",
            Species::H2 => "Hydrogen",
            Species::He => "Helium",
            Species::Ar => "Argon",
            Species::Ammonia => "Ammonia",
        }
    }

    /// Bulk phase this constituent is tracked in.
    pub fn phase(&self) -> Phase {
        match self {
            Species::Water => Phase::Liquid,
            _ => Phase::Gas,
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    ///
    /// Values sourced from standard reference data (e.g., NIST).
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::H2O | Species::Water => 18.015,
            Species::CO2 => 44.010,
            Species::CH4 => 16.043,
            Species::H2 => 2.016,
            Species::He => 4.003,
            Species::Ar => 39.948,
            Species::Ammonia => 17.031,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "H2O" | "WATER VAPOR" | "VAPOR" => Ok(Species::H2O),
            "WATER" | "LIQUID WATER" => Ok(Species::Water),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "HE" | "HELIUM" => Ok(Species::He),
            "AR" | "ARGON" => Ok(Species::Ar),
            "NH3" | "AMMONIA" => Ok(Species::Ammonia),
            _ => Err("unknown species"),
        }
    }
}
