//! Shared types for the fighter dispatch contracts
//!
//! The fighter registry, geolocation store and mission escrow pass these
//! values across contract boundaries. Keeping one definition here keeps the
//! XDR encoding identical on both sides of every cross-contract call.

#![no_std]

use soroban_sdk::{contracttype, Address, String};

/// Fixed-point scale for coordinates: one unit is a micro-degree.
pub const COORD_SCALE: i64 = 1_000_000;

pub const MAX_LATITUDE: i64 = 90 * COORD_SCALE;
pub const MAX_LONGITUDE: i64 = 180 * COORD_SCALE;

/// Denominator for every basis-point rate (10_000 = 100%).
pub const BPS_DENOMINATOR: i128 = 10_000;

// ---------------------------------------------------------------------------
// Fighter types
// ---------------------------------------------------------------------------

/// Capability class, ordered. `tier >= required` is the eligibility rule, so
/// the discriminants must stay ascending.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Tier {
    Novice = 0,
    Warrior = 1,
    Expert = 2,
    Elite = 3,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FighterStatus {
    Available = 0,
    Busy = 1,
    Suspended = 2,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FightingStyle {
    Boxing = 0,
    Kickboxing = 1,
    MuayThai = 2,
    Wrestling = 3,
    Judo = 4,
    Bjj = 5,
    Mma = 6,
    KravMaga = 7,
    Other = 8,
}

/// Fighter record owned by the registry.
///
/// Registration attributes and `tier` are frozen at registration. `status`,
/// `total_earnings` and `completed_missions` change only through the
/// registry's own entry points.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FighterProfile {
    pub address: Address,
    pub name: String,
    pub fighting_style: FightingStyle,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub is_professional: bool,
    pub years_experience: u32,
    pub win_rate_bps: u32,
    pub tier: Tier,
    pub status: FighterStatus,
    pub total_earnings: i128,
    pub completed_missions: u32,
    pub registered_at: u64,
}

/// Whether a scaled coordinate pair lies on the globe.
pub fn coordinates_in_range(latitude: i64, longitude: i64) -> bool {
    (-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
        && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}
