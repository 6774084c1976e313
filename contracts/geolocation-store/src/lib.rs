//! Geolocation Store Contract for fighter dispatch
//!
//! Holds the last reported position of every fighter and answers the
//! "who is closest" query used by mission matching. Positions are fixed-point
//! micro-degrees and distance is a squared-Euclidean proxy over the raw scaled
//! values. This is not a geodesic distance, and matching depends on it as-is.

#![no_std]

use dispatch_types::coordinates_in_range;
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, Address, Env, Symbol,
    Vec,
};

const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
const LOCATION_TTL_THRESHOLD: u32 = 17_280;
const LOCATION_TTL_EXTEND: u32 = 518_400;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    Unauthorized = 1,
    AlreadyInitialized = 2,
    NotInitialized = 3,
    InvalidCoordinates = 4,
}

/// Last known position of a fighter.
///
/// `valid = false` excludes the record from matching no matter how recent it
/// is. Records are never deleted; a stale sweep only flips `valid`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocationRecord {
    pub fighter: Address,
    pub latitude: i64,
    pub longitude: i64,
    pub updated_at: u64,
    pub valid: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Updater(Address),
    Location(Address),
}

const EVT_INIT: Symbol = symbol_short!("geo_init");
const EVT_UPDATER: Symbol = symbol_short!("loc_auth");
const EVT_UPDATED: Symbol = symbol_short!("loc_upd");
const EVT_STALE: Symbol = symbol_short!("loc_stale");

/// Squared-Euclidean distance between two scaled coordinate pairs.
pub fn squared_distance(lat_a: i64, lng_a: i64, lat_b: i64, lng_b: i64) -> i128 {
    let d_lat = lat_a as i128 - lat_b as i128;
    let d_lng = lng_a as i128 - lng_b as i128;
    d_lat * d_lat + d_lng * d_lng
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct GeolocationStore;

#[contractimpl]
impl GeolocationStore {
    pub fn initialize(env: Env, admin: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        env.events().publish((EVT_INIT,), (admin,));
        Ok(())
    }

    /// Allow or revoke a non-admin writer (admin only).
    ///
    /// The fighter registry is enrolled here at deployment so registration
    /// and fighter-reported moves can write positions.
    pub fn set_updater(env: Env, updater: Address, allowed: bool) -> Result<(), ContractError> {
        let admin = Self::admin(&env)?;
        admin.require_auth();

        if allowed {
            env.storage()
                .instance()
                .set(&DataKey::Updater(updater.clone()), &true);
        } else {
            env.storage()
                .instance()
                .remove(&DataKey::Updater(updater.clone()));
        }
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        env.events().publish((EVT_UPDATER,), (updater, allowed));
        Ok(())
    }

    pub fn is_updater(env: Env, address: Address) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::Updater(address))
            .unwrap_or(false)
    }

    /// Overwrite a fighter's position, mark it valid and stamp the ledger time.
    ///
    /// `caller` must be the admin or an enrolled updater.
    pub fn update_location(
        env: Env,
        caller: Address,
        fighter: Address,
        latitude: i64,
        longitude: i64,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        if !coordinates_in_range(latitude, longitude) {
            return Err(ContractError::InvalidCoordinates);
        }

        Self::check_updater(&env, &caller)?;

        let record = LocationRecord {
            fighter: fighter.clone(),
            latitude,
            longitude,
            updated_at: env.ledger().timestamp(),
            valid: true,
        };

        let key = DataKey::Location(fighter.clone());
        env.storage().persistent().set(&key, &record);
        env.storage()
            .persistent()
            .extend_ttl(&key, LOCATION_TTL_THRESHOLD, LOCATION_TTL_EXTEND);

        env.events().publish(
            (EVT_UPDATED, fighter),
            (latitude, longitude, record.updated_at),
        );
        Ok(())
    }

    pub fn get_location(env: Env, fighter: Address) -> Option<LocationRecord> {
        env.storage().persistent().get(&DataKey::Location(fighter))
    }

    /// Closest candidate with a valid record, or `None`.
    ///
    /// Single pass in the given order. On equal distance the earlier
    /// candidate wins, so callers control tie-breaks through ordering.
    pub fn nearest(
        env: Env,
        candidates: Vec<Address>,
        ref_lat: i64,
        ref_lng: i64,
    ) -> Option<Address> {
        let mut best: Option<(Address, i128)> = None;

        for candidate in candidates.iter() {
            let record: LocationRecord = match env
                .storage()
                .persistent()
                .get(&DataKey::Location(candidate.clone()))
            {
                Some(r) => r,
                None => continue,
            };
            if !record.valid {
                continue;
            }

            let distance = squared_distance(record.latitude, record.longitude, ref_lat, ref_lng);
            let closer = match &best {
                Some((_, best_distance)) => distance < *best_distance,
                None => true,
            };
            if closer {
                best = Some((candidate, distance));
            }
        }

        best.map(|(address, _)| address)
    }

    /// Invalidate every listed record older than `max_age` seconds (admin only).
    ///
    /// Records stay in storage for audit. Returns how many were invalidated.
    pub fn sweep_stale(
        env: Env,
        fighters: Vec<Address>,
        max_age: u64,
    ) -> Result<u32, ContractError> {
        let admin = Self::admin(&env)?;
        admin.require_auth();

        let cutoff = env.ledger().timestamp().saturating_sub(max_age);
        let mut invalidated = 0u32;

        for fighter in fighters.iter() {
            let key = DataKey::Location(fighter.clone());
            let mut record: LocationRecord = match env.storage().persistent().get(&key) {
                Some(r) => r,
                None => continue,
            };
            if !record.valid || record.updated_at >= cutoff {
                continue;
            }

            record.valid = false;
            env.storage().persistent().set(&key, &record);
            env.storage()
                .persistent()
                .extend_ttl(&key, LOCATION_TTL_THRESHOLD, LOCATION_TTL_EXTEND);
            invalidated += 1;

            log!(&env, "stale location invalidated", fighter, record.updated_at);
            env.events()
                .publish((EVT_STALE, fighter), record.updated_at);
        }

        Ok(invalidated)
    }
}

impl GeolocationStore {
    fn admin(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)
    }

    fn check_updater(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = Self::admin(env)?;
        if *caller == admin {
            return Ok(());
        }

        let enrolled: bool = env
            .storage()
            .instance()
            .get(&DataKey::Updater(caller.clone()))
            .unwrap_or(false);
        if enrolled {
            Ok(())
        } else {
            Err(ContractError::Unauthorized)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
