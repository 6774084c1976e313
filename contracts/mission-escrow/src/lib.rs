//! Mission Escrow Contract for fighter dispatch
//!
//! Clients post missions with an escrowed deposit and a minimum fighter tier.
//! The contract matches a fighter (nearest eligible, or one the client names),
//! holds the deposit in custody and settles it exactly once:
//!
//! - completion pays the fighter's share and the platform fee,
//! - cancellation before assignment refunds the client minus a 1% penalty,
//! - a dispute is settled by the admin for either side; the fee always goes
//!   to the platform.
//!
//! ```text
//! Created --assign--> Assigned --complete--> Completed
//!    |                   |                      ^
//!    cancel           dispute                   |
//!    v                   v                      |
//! Cancelled          Disputed ----resolve-------+
//! ```
//!
//! Each entry point runs as a single host invocation. Inputs are validated
//! first, then state and role preconditions, then the new mission state is
//! committed, and only then are registry calls and token transfers made. Any
//! failure along the way unwinds all of it.

#![no_std]

mod external;

use dispatch_types::{coordinates_in_range, FighterStatus, Tier, BPS_DENOMINATOR};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token, Address, Bytes,
    Env, String, Symbol, Vec,
};

/// Upper bound for the platform fee rate (20%).
pub const MAX_FEE_BPS: u32 = 2_000;

/// Share of the deposit kept by the platform when a client cancels (1%).
pub const CANCELLATION_PENALTY_BPS: i128 = 100;

const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
const MISSION_TTL_THRESHOLD: u32 = 518_400;
const MISSION_TTL_EXTEND: u32 = 2_592_000; // ~150 days

// ============================================================================
// Error Types
// ============================================================================

#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    Unauthorized = 1,
    AlreadyInitialized = 2,
    NotInitialized = 3,

    // Input validation
    InvalidAmount = 4,
    InvalidLocationHash = 5,
    InvalidCoordinates = 6,
    InvalidFee = 7,

    // State preconditions
    MissionNotFound = 8,
    InvalidMissionState = 9,
    FighterNotFound = 10,
    FighterNotAvailable = 11,
    TierTooLow = 12,

    // Resources
    NoEligibleFighters = 13,
    MathOverflow = 14,
}

// ============================================================================
// Data Structures
// ============================================================================

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissionStatus {
    Created = 0,
    Assigned = 1,
    Disputed = 2,
    Completed = 3,
    Cancelled = 4,
}

/// A client-posted job with its escrowed split.
///
/// `fighter_amount + platform_fee == total_amount` always holds; both parts
/// are fixed when the mission is created.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mission {
    pub id: u64,
    pub client: Address,
    /// Opaque commitment to the job location.
    pub location_hash: Bytes,
    pub client_lat: i64,
    pub client_lng: i64,
    pub total_amount: i128,
    pub fighter_amount: i128,
    pub platform_fee: i128,
    pub required_tier: Tier,
    pub assigned_fighter: Option<Address>,
    pub status: MissionStatus,
    pub created_at: u64,
    /// Zero until the mission reaches Completed or Cancelled.
    pub completed_at: u64,
    pub description: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowConfig {
    pub admin: Address,
    pub registry: Address,
    pub geolocation: Address,
    /// Token held in custody and paid out.
    pub token: Address,
    /// Receives platform fees and cancellation penalties.
    pub treasury: Address,
    pub fee_bps: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    NextId,
    Mission(u64),
    ClientMissions(Address),
    FighterMissions(Address),
}

// ============================================================================
// Event Symbols
// ============================================================================

const EVT_INIT: Symbol = symbol_short!("esc_init");
const EVT_FEE: Symbol = symbol_short!("fee_upd");
const EVT_CREATED: Symbol = symbol_short!("msn_new");
const EVT_ASSIGNED: Symbol = symbol_short!("msn_asgn");
const EVT_COMPLETED: Symbol = symbol_short!("msn_done");
const EVT_DISPUTED: Symbol = symbol_short!("msn_disp");
const EVT_RESOLVED: Symbol = symbol_short!("msn_rslv");
const EVT_CANCELLED: Symbol = symbol_short!("msn_cncl");
const EVT_PAYOUT: Symbol = symbol_short!("payout");

// ============================================================================
// Escrow arithmetic
// ============================================================================

/// Split a deposit into `(fighter_amount, platform_fee)`.
///
/// The fee is taken first with truncating division; the remainder is the
/// fighter's share, so the two parts always sum to the deposit.
pub fn split_deposit(deposit: i128, fee_bps: u32) -> Option<(i128, i128)> {
    let fee = deposit.checked_mul(fee_bps as i128)? / BPS_DENOMINATOR;
    Some((deposit - fee, fee))
}

/// Split a cancelled deposit into `(refund, penalty)`.
pub fn split_cancellation(total: i128) -> Option<(i128, i128)> {
    let penalty = total.checked_mul(CANCELLATION_PENALTY_BPS)? / BPS_DENOMINATOR;
    Some((total - penalty, penalty))
}

// ============================================================================
// Contract Definition
// ============================================================================

#[contract]
pub struct MissionEscrow;

#[contractimpl]
impl MissionEscrow {
    // ========================================================================
    // Configuration
    // ========================================================================

    /// Initialize the escrow.
    ///
    /// # Arguments
    /// * `admin` - Arbitrates disputes and tunes the fee
    /// * `registry` - Fighter registry; must name this contract as its ledger
    /// * `geolocation` - Geolocation store used for nearest matching
    /// * `token` - Token deposits are made in
    /// * `treasury` - Platform account for fees and penalties
    /// * `fee_bps` - Platform fee in basis points, at most `MAX_FEE_BPS`
    pub fn initialize(
        env: Env,
        admin: Address,
        registry: Address,
        geolocation: Address,
        token: Address,
        treasury: Address,
        fee_bps: u32,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ContractError::AlreadyInitialized);
        }
        if fee_bps > MAX_FEE_BPS {
            return Err(ContractError::InvalidFee);
        }

        let config = EscrowConfig {
            admin,
            registry,
            geolocation,
            token,
            treasury,
            fee_bps,
        };
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::NextId, &1u64);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        env.events().publish((EVT_INIT,), config);

        Ok(())
    }

    /// Change the fee rate for missions created from now on (admin only).
    pub fn set_fee_bps(env: Env, fee_bps: u32) -> Result<(), ContractError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(ContractError::InvalidFee);
        }

        let mut config = Self::config(&env)?;
        config.admin.require_auth();

        config.fee_bps = fee_bps;
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        env.events().publish((EVT_FEE,), fee_bps);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<EscrowConfig, ContractError> {
        Self::config(&env)
    }

    // ========================================================================
    // Mission lifecycle
    // ========================================================================

    /// Post a mission and take the deposit into custody.
    ///
    /// # Returns
    /// The new mission id. Ids start at 1 and are never reused.
    pub fn create_mission(
        env: Env,
        client: Address,
        location_hash: Bytes,
        client_lat: i64,
        client_lng: i64,
        description: String,
        required_tier: Tier,
        deposit: i128,
    ) -> Result<u64, ContractError> {
        client.require_auth();

        if deposit <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if location_hash.is_empty() {
            return Err(ContractError::InvalidLocationHash);
        }
        if !coordinates_in_range(client_lat, client_lng) {
            return Err(ContractError::InvalidCoordinates);
        }

        let config = Self::config(&env)?;
        let (fighter_amount, platform_fee) =
            split_deposit(deposit, config.fee_bps).ok_or(ContractError::MathOverflow)?;

        let mission_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::NextId)
            .unwrap_or(1);

        let mission = Mission {
            id: mission_id,
            client: client.clone(),
            location_hash,
            client_lat,
            client_lng,
            total_amount: deposit,
            fighter_amount,
            platform_fee,
            required_tier,
            assigned_fighter: None,
            status: MissionStatus::Created,
            created_at: env.ledger().timestamp(),
            completed_at: 0,
            description,
        };
        Self::save_mission(&env, &mission);
        env.storage()
            .instance()
            .set(&DataKey::NextId, &(mission_id + 1));
        Self::append_index(&env, DataKey::ClientMissions(client.clone()), mission_id);

        token::Client::new(&env, &config.token).transfer(
            &client,
            &env.current_contract_address(),
            &deposit,
        );

        env.events().publish(
            (EVT_CREATED, mission_id),
            (client, deposit, fighter_amount, platform_fee, required_tier),
        );

        Ok(mission_id)
    }

    /// Assign the nearest available fighter whose tier meets the requirement.
    ///
    /// Candidates are taken in registration order, which decides ties.
    /// Finding nobody leaves the mission in Created.
    pub fn assign_nearest(
        env: Env,
        client: Address,
        mission_id: u64,
    ) -> Result<Address, ContractError> {
        client.require_auth();

        let config = Self::config(&env)?;
        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Created)?;
        if mission.client != client {
            return Err(ContractError::Unauthorized);
        }

        let eligible = external::list_eligible(&env, &config.registry, mission.required_tier);
        if eligible.is_empty() {
            return Err(ContractError::NoEligibleFighters);
        }

        let chosen = external::nearest(
            &env,
            &config.geolocation,
            eligible,
            mission.client_lat,
            mission.client_lng,
        )
        .ok_or(ContractError::NoEligibleFighters)?;

        log!(&env, "nearest fighter matched", mission_id, chosen);
        Self::assign(&env, &config, &mut mission, &chosen);

        Ok(chosen)
    }

    /// Assign a fighter chosen by the client.
    pub fn assign_specific(
        env: Env,
        client: Address,
        mission_id: u64,
        fighter: Address,
    ) -> Result<(), ContractError> {
        client.require_auth();

        let config = Self::config(&env)?;
        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Created)?;
        if mission.client != client {
            return Err(ContractError::Unauthorized);
        }

        let profile = external::get_fighter(&env, &config.registry, &fighter)
            .ok_or(ContractError::FighterNotFound)?;
        if profile.status != FighterStatus::Available {
            return Err(ContractError::FighterNotAvailable);
        }
        if profile.tier < mission.required_tier {
            return Err(ContractError::TierTooLow);
        }

        Self::assign(&env, &config, &mut mission, &fighter);
        Ok(())
    }

    /// Mark an assigned mission done and pay out (assigned fighter only).
    pub fn complete_mission(
        env: Env,
        fighter: Address,
        mission_id: u64,
    ) -> Result<(), ContractError> {
        fighter.require_auth();

        let config = Self::config(&env)?;
        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Assigned)?;
        if mission.assigned_fighter.as_ref() != Some(&fighter) {
            return Err(ContractError::Unauthorized);
        }

        mission.status = MissionStatus::Completed;
        mission.completed_at = env.ledger().timestamp();
        Self::save_mission(&env, &mission);

        external::set_status(&env, &config.registry, &fighter, FighterStatus::Available);
        external::record_earnings(&env, &config.registry, &fighter, mission.fighter_amount, 1);

        let token = token::Client::new(&env, &config.token);
        Self::disburse(&env, &token, mission_id, &fighter, mission.fighter_amount);
        Self::disburse(&env, &token, mission_id, &config.treasury, mission.platform_fee);

        env.events().publish(
            (EVT_COMPLETED, mission_id),
            (fighter, mission.fighter_amount, mission.platform_fee),
        );

        Ok(())
    }

    /// Freeze an assigned mission for arbitration (client or assigned fighter).
    pub fn signal_dispute(env: Env, caller: Address, mission_id: u64) -> Result<(), ContractError> {
        caller.require_auth();

        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Assigned)?;
        let is_party =
            caller == mission.client || mission.assigned_fighter.as_ref() == Some(&caller);
        if !is_party {
            return Err(ContractError::Unauthorized);
        }

        mission.status = MissionStatus::Disputed;
        Self::save_mission(&env, &mission);

        env.events().publish((EVT_DISPUTED, mission_id), caller);
        Ok(())
    }

    /// Settle a disputed mission (admin only).
    ///
    /// `favor_client` returns the fighter's share to the client and credits
    /// nothing; otherwise the fighter is paid and credited. The fee goes to
    /// the platform either way, the mission ends Completed and the fighter
    /// is released.
    pub fn resolve_dispute(
        env: Env,
        admin: Address,
        mission_id: u64,
        favor_client: bool,
    ) -> Result<(), ContractError> {
        admin.require_auth();

        let config = Self::config(&env)?;
        if admin != config.admin {
            return Err(ContractError::Unauthorized);
        }

        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Disputed)?;
        let fighter = mission
            .assigned_fighter
            .clone()
            .ok_or(ContractError::InvalidMissionState)?;

        mission.status = MissionStatus::Completed;
        mission.completed_at = env.ledger().timestamp();
        Self::save_mission(&env, &mission);

        external::set_status(&env, &config.registry, &fighter, FighterStatus::Available);

        let token = token::Client::new(&env, &config.token);
        if favor_client {
            Self::disburse(&env, &token, mission_id, &mission.client, mission.fighter_amount);
        } else {
            external::record_earnings(&env, &config.registry, &fighter, mission.fighter_amount, 1);
            Self::disburse(&env, &token, mission_id, &fighter, mission.fighter_amount);
        }
        Self::disburse(&env, &token, mission_id, &config.treasury, mission.platform_fee);

        env.events()
            .publish((EVT_RESOLVED, mission_id), (fighter, favor_client));

        Ok(())
    }

    /// Withdraw an unassigned mission (client only).
    ///
    /// The platform keeps `CANCELLATION_PENALTY_BPS` of the total and the
    /// rest is refunded. Assigned missions must go through a dispute instead.
    pub fn cancel_mission(env: Env, client: Address, mission_id: u64) -> Result<(), ContractError> {
        client.require_auth();

        let config = Self::config(&env)?;
        let mut mission = Self::load_mission(&env, mission_id)?;
        Self::expect_status(&mission, MissionStatus::Created)?;
        if mission.client != client {
            return Err(ContractError::Unauthorized);
        }

        let (refund, penalty) =
            split_cancellation(mission.total_amount).ok_or(ContractError::MathOverflow)?;

        mission.status = MissionStatus::Cancelled;
        mission.completed_at = env.ledger().timestamp();
        Self::save_mission(&env, &mission);

        let token = token::Client::new(&env, &config.token);
        Self::disburse(&env, &token, mission_id, &client, refund);
        Self::disburse(&env, &token, mission_id, &config.treasury, penalty);

        env.events()
            .publish((EVT_CANCELLED, mission_id), (refund, penalty));

        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_mission(env: Env, mission_id: u64) -> Option<Mission> {
        env.storage().persistent().get(&DataKey::Mission(mission_id))
    }

    pub fn get_client_missions(env: Env, client: Address) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::ClientMissions(client))
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn get_fighter_missions(env: Env, fighter: Address) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::FighterMissions(fighter))
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn get_mission_count(env: Env) -> u64 {
        let next_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::NextId)
            .unwrap_or(1);
        next_id - 1
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

impl MissionEscrow {
    fn config(env: &Env) -> Result<EscrowConfig, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_mission(env: &Env, mission_id: u64) -> Result<Mission, ContractError> {
        env.storage()
            .persistent()
            .get(&DataKey::Mission(mission_id))
            .ok_or(ContractError::MissionNotFound)
    }

    fn save_mission(env: &Env, mission: &Mission) {
        let key = DataKey::Mission(mission.id);
        env.storage().persistent().set(&key, mission);
        env.storage()
            .persistent()
            .extend_ttl(&key, MISSION_TTL_THRESHOLD, MISSION_TTL_EXTEND);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
    }

    fn expect_status(mission: &Mission, expected: MissionStatus) -> Result<(), ContractError> {
        if mission.status == expected {
            Ok(())
        } else {
            Err(ContractError::InvalidMissionState)
        }
    }

    fn append_index(env: &Env, key: DataKey, mission_id: u64) {
        let mut ids: Vec<u64> = env
            .storage()
            .persistent()
            .get(&key)
            .unwrap_or_else(|| Vec::new(env));
        ids.push_back(mission_id);
        env.storage().persistent().set(&key, &ids);
        env.storage()
            .persistent()
            .extend_ttl(&key, MISSION_TTL_THRESHOLD, MISSION_TTL_EXTEND);
    }

    /// Shared tail of both assignment paths. Callers have already checked the
    /// mission is Created and the fighter is eligible.
    fn assign(env: &Env, config: &EscrowConfig, mission: &mut Mission, fighter: &Address) {
        mission.assigned_fighter = Some(fighter.clone());
        mission.status = MissionStatus::Assigned;
        Self::save_mission(env, mission);

        external::set_status(env, &config.registry, fighter, FighterStatus::Busy);
        Self::append_index(env, DataKey::FighterMissions(fighter.clone()), mission.id);

        env.events()
            .publish((EVT_ASSIGNED, mission.id), fighter.clone());
    }

    /// Pay one leg of a settlement out of custody. Zero legs are skipped.
    fn disburse(
        env: &Env,
        token: &token::Client,
        mission_id: u64,
        recipient: &Address,
        amount: i128,
    ) {
        if amount == 0 {
            return;
        }
        token.transfer(&env.current_contract_address(), recipient, &amount);
        env.events()
            .publish((EVT_PAYOUT, mission_id), (recipient.clone(), amount));
    }
}

// ============================================================================
// Tests
// ============================================================================
