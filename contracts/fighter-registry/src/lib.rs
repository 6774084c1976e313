//! Fighter Registry Contract for fighter dispatch
//!
//! Source of truth for fighter identity, capability tier and availability.
//! The tier is scored once from the registration attributes and never
//! recomputed. Availability is flipped only by the mission escrow
//! (Available <-> Busy) or by the admin (Available <-> Suspended).

#![no_std]

use dispatch_types::{coordinates_in_range, FighterProfile, FighterStatus, FightingStyle, Tier};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, IntoVal,
    String, Symbol, Val, Vec,
};

// ---------------------------------------------------------------------------
// Scoring and validation constants
// ---------------------------------------------------------------------------

pub const MIN_HEIGHT_CM: u32 = 140;
pub const MAX_HEIGHT_CM: u32 = 230;
pub const MIN_WEIGHT_KG: u32 = 40;
pub const MAX_WEIGHT_KG: u32 = 200;
pub const MAX_WIN_RATE_BPS: u32 = 10_000;

const HEIGHT_BONUS_CM: u32 = 180;
const WEIGHT_BONUS_KG: u32 = 80;
const PHYSICAL_BONUS: u64 = 20;
const PROFESSIONAL_BONUS: u64 = 40;
const POINTS_PER_YEAR: u64 = 5;

const ELITE_SCORE: u64 = 200;
const EXPERT_SCORE: u64 = 120;
const WARRIOR_SCORE: u64 = 60;

const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
const PROFILE_TTL_THRESHOLD: u32 = 518_400;
const PROFILE_TTL_EXTEND: u32 = 2_592_000; // ~150 days

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

    // Registration
    AlreadyRegistered = 4,
    FighterNotFound = 5,
    InvalidName = 6,
    InvalidPhysicalAttributes = 7,
    InvalidWinRate = 8,
    InvalidCoordinates = 9,

    // Status and earnings
    InvalidStatusTransition = 10,
    InvalidAmount = 11,
    FighterSuspended = 12,
    MathOverflow = 13,
}

/// Attributes submitted once at registration.
#[contracttype]
#[derive(Clone, Debug)]
pub struct FighterRegistration {
    pub name: String,
    pub fighting_style: FightingStyle,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub is_professional: bool,
    pub years_experience: u32,
    /// Win rate in basis points, 0..=10_000.
    pub win_rate_bps: u32,
    pub latitude: i64,
    pub longitude: i64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    pub admin: Address,
    pub geolocation: Address,
    /// Mission escrow contract allowed to flip Available <-> Busy and credit earnings.
    pub ledger: Address,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Fighter(Address),
    /// Registration-ordered list of every fighter address.
    Roster,
}

const EVT_INIT: Symbol = symbol_short!("reg_init");
const EVT_REGISTERED: Symbol = symbol_short!("ftr_reg");
const EVT_STATUS: Symbol = symbol_short!("ftr_stat");
const EVT_EARNINGS: Symbol = symbol_short!("ftr_earn");

// ---------------------------------------------------------------------------
// Tier scoring
// ---------------------------------------------------------------------------

/// Three bonus bands by discipline.
pub fn style_bonus(style: FightingStyle) -> u64 {
    match style {
        FightingStyle::Mma | FightingStyle::KravMaga => 30,
        FightingStyle::Boxing | FightingStyle::Kickboxing | FightingStyle::MuayThai => 20,
        FightingStyle::Wrestling
        | FightingStyle::Judo
        | FightingStyle::Bjj
        | FightingStyle::Other => 10,
    }
}

pub fn score(registration: &FighterRegistration) -> u64 {
    let mut score = 0u64;

    if registration.height_cm >= HEIGHT_BONUS_CM {
        score += PHYSICAL_BONUS;
    }
    if registration.weight_kg >= WEIGHT_BONUS_KG {
        score += PHYSICAL_BONUS;
    }
    if registration.is_professional {
        score += PROFESSIONAL_BONUS;
    }
    score += registration.years_experience as u64 * POINTS_PER_YEAR;
    score += style_bonus(registration.fighting_style);
    score += (registration.win_rate_bps / 100) as u64;

    score
}

pub fn tier_for_score(score: u64) -> Tier {
    if score >= ELITE_SCORE {
        Tier::Elite
    } else if score >= EXPERT_SCORE {
        Tier::Expert
    } else if score >= WARRIOR_SCORE {
        Tier::Warrior
    } else {
        Tier::Novice
    }
}

pub fn compute_tier(registration: &FighterRegistration) -> Tier {
    tier_for_score(score(registration))
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct FighterRegistry;

#[contractimpl]
impl FighterRegistry {
    /// Initialize the registry.
    ///
    /// # Arguments
    /// * `admin` - May suspend and reinstate fighters
    /// * `geolocation` - Geolocation store; this registry must be enrolled there as an updater
    /// * `ledger` - Mission escrow contract
    pub fn initialize(
        env: Env,
        admin: Address,
        geolocation: Address,
        ledger: Address,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ContractError::AlreadyInitialized);
        }

        let config = RegistryConfig {
            admin: admin.clone(),
            geolocation: geolocation.clone(),
            ledger: ledger.clone(),
        };
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);

        env.events()
            .publish((EVT_INIT,), (admin, geolocation, ledger));

        Ok(())
    }

    /// Register the calling fighter and score its tier.
    ///
    /// The initial position is written to the geolocation store in the same
    /// invocation, so a failed location write leaves no profile behind.
    ///
    /// # Returns
    /// The tier assigned for life to this fighter.
    pub fn register_fighter(
        env: Env,
        fighter: Address,
        registration: FighterRegistration,
    ) -> Result<Tier, ContractError> {
        fighter.require_auth();

        Self::validate(&registration)?;

        let config = Self::config(&env)?;
        if env
            .storage()
            .persistent()
            .has(&DataKey::Fighter(fighter.clone()))
        {
            return Err(ContractError::AlreadyRegistered);
        }

        let tier = compute_tier(&registration);
        let profile = FighterProfile {
            address: fighter.clone(),
            name: registration.name.clone(),
            fighting_style: registration.fighting_style,
            height_cm: registration.height_cm,
            weight_kg: registration.weight_kg,
            is_professional: registration.is_professional,
            years_experience: registration.years_experience,
            win_rate_bps: registration.win_rate_bps,
            tier,
            status: FighterStatus::Available,
            total_earnings: 0,
            completed_missions: 0,
            registered_at: env.ledger().timestamp(),
        };
        Self::save_profile(&env, &profile);

        let mut roster = Self::roster(&env);
        roster.push_back(fighter.clone());
        env.storage().persistent().set(&DataKey::Roster, &roster);
        env.storage().persistent().extend_ttl(
            &DataKey::Roster,
            PROFILE_TTL_THRESHOLD,
            PROFILE_TTL_EXTEND,
        );

        Self::forward_location(
            &env,
            &config,
            &fighter,
            registration.latitude,
            registration.longitude,
        );

        env.events().publish((EVT_REGISTERED, fighter), tier);

        Ok(tier)
    }

    /// Report a new position for a registered, non-suspended fighter.
    pub fn update_location(
        env: Env,
        fighter: Address,
        latitude: i64,
        longitude: i64,
    ) -> Result<(), ContractError> {
        fighter.require_auth();

        if !coordinates_in_range(latitude, longitude) {
            return Err(ContractError::InvalidCoordinates);
        }

        let config = Self::config(&env)?;
        let profile = Self::load_profile(&env, &fighter)?;
        if profile.status == FighterStatus::Suspended {
            return Err(ContractError::FighterSuspended);
        }

        Self::forward_location(&env, &config, &fighter, latitude, longitude);
        Ok(())
    }

    /// Move a fighter between statuses.
    ///
    /// The ledger may only request Available <-> Busy; the admin may only
    /// request Available <-> Suspended. A busy fighter cannot be suspended.
    pub fn set_status(
        env: Env,
        caller: Address,
        fighter: Address,
        status: FighterStatus,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        let config = Self::config(&env)?;
        let is_ledger = caller == config.ledger;
        if !is_ledger && caller != config.admin {
            return Err(ContractError::Unauthorized);
        }

        let mut profile = Self::load_profile(&env, &fighter)?;
        let previous = profile.status;

        let allowed = if is_ledger {
            matches!(
                (previous, status),
                (FighterStatus::Available, FighterStatus::Busy)
                    | (FighterStatus::Busy, FighterStatus::Available)
            )
        } else {
            matches!(
                (previous, status),
                (FighterStatus::Available, FighterStatus::Suspended)
                    | (FighterStatus::Suspended, FighterStatus::Available)
            )
        };
        if !allowed {
            return Err(ContractError::InvalidStatusTransition);
        }

        profile.status = status;
        Self::save_profile(&env, &profile);

        env.events()
            .publish((EVT_STATUS, fighter), (previous, status));

        Ok(())
    }

    /// Credit a fighter's cumulative earnings and mission count (ledger only).
    pub fn record_earnings(
        env: Env,
        caller: Address,
        fighter: Address,
        amount: i128,
        missions: u32,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let config = Self::config(&env)?;
        if caller != config.ledger {
            return Err(ContractError::Unauthorized);
        }

        let mut profile = Self::load_profile(&env, &fighter)?;
        profile.total_earnings = profile
            .total_earnings
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        profile.completed_missions = profile
            .completed_missions
            .checked_add(missions)
            .ok_or(ContractError::MathOverflow)?;
        Self::save_profile(&env, &profile);

        env.events()
            .publish((EVT_EARNINGS, fighter), (amount, missions));

        Ok(())
    }

    pub fn get_fighter(env: Env, fighter: Address) -> Option<FighterProfile> {
        env.storage().persistent().get(&DataKey::Fighter(fighter))
    }

    pub fn is_registered(env: Env, fighter: Address) -> bool {
        env.storage().persistent().has(&DataKey::Fighter(fighter))
    }

    /// Available fighters in registration order.
    pub fn list_available(env: Env) -> Vec<Address> {
        Self::available_from(&env, Tier::Novice)
    }

    /// Available fighters whose tier is at least `min_tier`, in registration
    /// order. Lets the escrow filter by tier without a profile read per
    /// candidate.
    pub fn list_eligible(env: Env, min_tier: Tier) -> Vec<Address> {
        Self::available_from(&env, min_tier)
    }

    pub fn fighter_count(env: Env) -> u32 {
        Self::roster(&env).len()
    }
}

impl FighterRegistry {
    fn available_from(env: &Env, min_tier: Tier) -> Vec<Address> {
        let mut available = Vec::new(env);
        for fighter in Self::roster(env).iter() {
            let profile: Option<FighterProfile> = env
                .storage()
                .persistent()
                .get(&DataKey::Fighter(fighter.clone()));
            if let Some(p) = profile {
                if p.status == FighterStatus::Available && p.tier >= min_tier {
                    available.push_back(fighter);
                }
            }
        }
        available
    }

    fn validate(registration: &FighterRegistration) -> Result<(), ContractError> {
        if registration.name.len() == 0 {
            return Err(ContractError::InvalidName);
        }
        if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&registration.height_cm)
            || !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&registration.weight_kg)
        {
            return Err(ContractError::InvalidPhysicalAttributes);
        }
        if registration.win_rate_bps > MAX_WIN_RATE_BPS {
            return Err(ContractError::InvalidWinRate);
        }
        if !coordinates_in_range(registration.latitude, registration.longitude) {
            return Err(ContractError::InvalidCoordinates);
        }
        Ok(())
    }

    fn config(env: &Env) -> Result<RegistryConfig, ContractError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ContractError::NotInitialized)
    }

    fn roster(env: &Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Roster)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn load_profile(env: &Env, fighter: &Address) -> Result<FighterProfile, ContractError> {
        env.storage()
            .persistent()
            .get(&DataKey::Fighter(fighter.clone()))
            .ok_or(ContractError::FighterNotFound)
    }

    fn save_profile(env: &Env, profile: &FighterProfile) {
        let key = DataKey::Fighter(profile.address.clone());
        env.storage().persistent().set(&key, profile);
        env.storage()
            .persistent()
            .extend_ttl(&key, PROFILE_TTL_THRESHOLD, PROFILE_TTL_EXTEND);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
    }

    /// Write a position through the geolocation store as an enrolled updater.
    fn forward_location(
        env: &Env,
        config: &RegistryConfig,
        fighter: &Address,
        latitude: i64,
        longitude: i64,
    ) {
        let args: Vec<Val> = Vec::from_array(
            env,
            [
                env.current_contract_address().into_val(env),
                fighter.clone().into_val(env),
                latitude.into_val(env),
                longitude.into_val(env),
            ],
        );
        env.invoke_contract::<Val>(
            &config.geolocation,
            &Symbol::new(env, "update_location"),
            args,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use geolocation_store::{GeolocationStore, GeolocationStoreClient};
    use soroban_sdk::{
        testutils::Address as _,
        testutils::Ledger as _,
        testutils::{MockAuth, MockAuthInvoke},
        Address, Env, String,
    };

    struct Setup {
        env: Env,
        registry_id: Address,
        geolocation_id: Address,
        admin: Address,
        ledger: Address,
    }

    impl Setup {
        fn new() -> Self {
            let env = Env::default();
            env.mock_all_auths();

            let admin = Address::generate(&env);
            let ledger = Address::generate(&env);

            let geolocation_id = env.register(GeolocationStore, ());
            let registry_id = env.register(FighterRegistry, ());

            let geolocation = GeolocationStoreClient::new(&env, &geolocation_id);
            geolocation.initialize(&admin);
            geolocation.set_updater(&registry_id, &true);

            FighterRegistryClient::new(&env, &registry_id).initialize(
                &admin,
                &geolocation_id,
                &ledger,
            );

            Setup {
                env,
                registry_id,
                geolocation_id,
                admin,
                ledger,
            }
        }

        fn client(&self) -> FighterRegistryClient<'_> {
            FighterRegistryClient::new(&self.env, &self.registry_id)
        }

        fn geolocation(&self) -> GeolocationStoreClient<'_> {
            GeolocationStoreClient::new(&self.env, &self.geolocation_id)
        }

        fn register(&self, registration: &FighterRegistration) -> Address {
            let fighter = Address::generate(&self.env);
            self.client().register_fighter(&fighter, registration);
            fighter
        }
    }

    /// Scores 10: no physical bonus, amateur, no experience, "Other" style.
    fn baseline(env: &Env) -> FighterRegistration {
        FighterRegistration {
            name: String::from_str(env, "Rookie"),
            fighting_style: FightingStyle::Other,
            height_cm: 170,
            weight_kg: 70,
            is_professional: false,
            years_experience: 0,
            win_rate_bps: 0,
            latitude: 0,
            longitude: 0,
        }
    }

    fn expert(env: &Env) -> FighterRegistration {
        FighterRegistration {
            name: String::from_str(env, "Veteran"),
            fighting_style: FightingStyle::Mma,
            height_cm: 185,
            weight_kg: 90,
            is_professional: true,
            years_experience: 4,
            win_rate_bps: 5_000,
            latitude: 51_507_351,
            longitude: -127_758,
        }
    }

    // -- Scoring ----------------------------------------------------------

    #[test]
    fn test_score_components() {
        let env = Env::default();
        assert_eq!(score(&baseline(&env)), 10);

        // 20 + 20 + 40 + 4*5 + 30 + 50
        assert_eq!(score(&expert(&env)), 180);

        let mut r = baseline(&env);
        r.fighting_style = FightingStyle::Boxing;
        r.years_experience = 4;
        r.win_rate_bps = 3_000;
        assert_eq!(score(&r), 70);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(tier_for_score(0), Tier::Novice);
        assert_eq!(tier_for_score(59), Tier::Novice);
        assert_eq!(tier_for_score(60), Tier::Warrior);
        assert_eq!(tier_for_score(119), Tier::Warrior);
        assert_eq!(tier_for_score(120), Tier::Expert);
        assert_eq!(tier_for_score(199), Tier::Expert);
        assert_eq!(tier_for_score(200), Tier::Elite);
        assert_eq!(tier_for_score(u64::MAX), Tier::Elite);
    }

    #[test]
    fn test_style_bonus_bands() {
        assert_eq!(style_bonus(FightingStyle::Mma), 30);
        assert_eq!(style_bonus(FightingStyle::KravMaga), 30);
        assert_eq!(style_bonus(FightingStyle::MuayThai), 20);
        assert_eq!(style_bonus(FightingStyle::Judo), 10);
    }

    #[test]
    fn test_compute_tier_is_deterministic() {
        let env = Env::default();
        let r = expert(&env);
        assert_eq!(compute_tier(&r), compute_tier(&r));
        assert_eq!(compute_tier(&r), Tier::Expert);
    }

    #[test]
    fn test_tier_monotonic_in_win_rate() {
        let env = Env::default();
        let mut r = baseline(&env);
        r.is_professional = true;
        r.years_experience = 3;

        let mut previous = Tier::Novice;
        let mut win_rate = 0u32;
        while win_rate <= MAX_WIN_RATE_BPS {
            r.win_rate_bps = win_rate;
            let tier = compute_tier(&r);
            assert!(tier >= previous);
            previous = tier;
            win_rate += 250;
        }
        // 40 + 15 + 10 + 100 at a perfect record
        assert_eq!(previous, Tier::Expert);
    }

    // -- Registration -----------------------------------------------------

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #2)")]
    fn test_initialize_already_initialized() {
        let s = Setup::new();
        s.client()
            .initialize(&s.admin, &s.geolocation_id, &s.ledger);
    }

    #[test]
    fn test_register_fighter_success() {
        let s = Setup::new();
        s.env.ledger().with_mut(|li| {
            li.timestamp = 7_200;
        });

        let fighter = Address::generate(&s.env);
        let tier = s.client().register_fighter(&fighter, &expert(&s.env));
        assert_eq!(tier, Tier::Expert);

        let profile = s.client().get_fighter(&fighter).unwrap();
        assert_eq!(profile.address, fighter);
        assert_eq!(profile.tier, Tier::Expert);
        assert_eq!(profile.status, FighterStatus::Available);
        assert_eq!(profile.total_earnings, 0);
        assert_eq!(profile.completed_missions, 0);
        assert_eq!(profile.registered_at, 7_200);
        assert!(s.client().is_registered(&fighter));
        assert_eq!(s.client().fighter_count(), 1);

        let location = s.geolocation().get_location(&fighter).unwrap();
        assert!(location.valid);
        assert_eq!(location.latitude, 51_507_351);
        assert_eq!(location.longitude, -127_758);
        assert_eq!(location.updated_at, 7_200);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #4)")]
    fn test_register_twice_rejected() {
        let s = Setup::new();
        let fighter = s.register(&baseline(&s.env));
        s.client().register_fighter(&fighter, &expert(&s.env));
    }

    #[test]
    fn test_reregistration_keeps_original_tier() {
        let s = Setup::new();
        let fighter = s.register(&baseline(&s.env));

        let result = s.client().try_register_fighter(&fighter, &expert(&s.env));
        assert_eq!(result, Err(Ok(ContractError::AlreadyRegistered)));
        assert_eq!(s.client().get_fighter(&fighter).unwrap().tier, Tier::Novice);
        assert_eq!(s.client().fighter_count(), 1);
    }

    #[test]
    fn test_register_rejects_invalid_attributes_atomically() {
        let s = Setup::new();
        let fighter = Address::generate(&s.env);

        let mut r = baseline(&s.env);
        r.name = String::from_str(&s.env, "");
        assert_eq!(
            s.client().try_register_fighter(&fighter, &r),
            Err(Ok(ContractError::InvalidName))
        );

        let mut r = baseline(&s.env);
        r.height_cm = MIN_HEIGHT_CM - 1;
        assert_eq!(
            s.client().try_register_fighter(&fighter, &r),
            Err(Ok(ContractError::InvalidPhysicalAttributes))
        );

        let mut r = baseline(&s.env);
        r.weight_kg = MAX_WEIGHT_KG + 1;
        assert_eq!(
            s.client().try_register_fighter(&fighter, &r),
            Err(Ok(ContractError::InvalidPhysicalAttributes))
        );

        let mut r = baseline(&s.env);
        r.win_rate_bps = MAX_WIN_RATE_BPS + 1;
        assert_eq!(
            s.client().try_register_fighter(&fighter, &r),
            Err(Ok(ContractError::InvalidWinRate))
        );

        let mut r = baseline(&s.env);
        r.longitude = 181_000_000;
        assert_eq!(
            s.client().try_register_fighter(&fighter, &r),
            Err(Ok(ContractError::InvalidCoordinates))
        );

        assert!(!s.client().is_registered(&fighter));
        assert_eq!(s.client().fighter_count(), 0);
        assert!(s.geolocation().get_location(&fighter).is_none());
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #3)")]
    fn test_register_before_initialize() {
        let env = Env::default();
        env.mock_all_auths();
        let registry_id = env.register(FighterRegistry, ());
        let fighter = Address::generate(&env);
        FighterRegistryClient::new(&env, &registry_id).register_fighter(&fighter, &baseline(&env));
    }

    // -- Availability -----------------------------------------------------

    #[test]
    fn test_list_available_in_registration_order() {
        let s = Setup::new();
        let a = s.register(&baseline(&s.env));
        let b = s.register(&expert(&s.env));
        let c = s.register(&baseline(&s.env));

        let all = s.client().list_available();
        assert_eq!(all.len(), 3);
        assert_eq!(all.get(0).unwrap(), a);
        assert_eq!(all.get(1).unwrap(), b);
        assert_eq!(all.get(2).unwrap(), c);

        s.client().set_status(&s.ledger, &b, &FighterStatus::Busy);
        s.client().set_status(&s.admin, &a, &FighterStatus::Suspended);

        let available = s.client().list_available();
        assert_eq!(available.len(), 1);
        assert_eq!(available.get(0).unwrap(), c);
    }

    #[test]
    fn test_ledger_flips_busy_and_back() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));

        s.client().set_status(&s.ledger, &fighter, &FighterStatus::Busy);
        assert_eq!(
            s.client().get_fighter(&fighter).unwrap().status,
            FighterStatus::Busy
        );

        s.client()
            .set_status(&s.ledger, &fighter, &FighterStatus::Available);
        assert_eq!(
            s.client().get_fighter(&fighter).unwrap().status,
            FighterStatus::Available
        );
    }

    #[test]
    fn test_ledger_cannot_double_book_or_suspend() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        s.client().set_status(&s.ledger, &fighter, &FighterStatus::Busy);

        assert_eq!(
            s.client()
                .try_set_status(&s.ledger, &fighter, &FighterStatus::Busy),
            Err(Ok(ContractError::InvalidStatusTransition))
        );
        assert_eq!(
            s.client()
                .try_set_status(&s.ledger, &fighter, &FighterStatus::Suspended),
            Err(Ok(ContractError::InvalidStatusTransition))
        );
    }

    #[test]
    fn test_admin_suspends_and_reinstates() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));

        s.client()
            .set_status(&s.admin, &fighter, &FighterStatus::Suspended);
        assert_eq!(
            s.client().get_fighter(&fighter).unwrap().status,
            FighterStatus::Suspended
        );

        // The ledger cannot pull a suspended fighter back into service.
        assert_eq!(
            s.client()
                .try_set_status(&s.ledger, &fighter, &FighterStatus::Available),
            Err(Ok(ContractError::InvalidStatusTransition))
        );

        s.client()
            .set_status(&s.admin, &fighter, &FighterStatus::Available);
        assert_eq!(
            s.client().get_fighter(&fighter).unwrap().status,
            FighterStatus::Available
        );
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #10)")]
    fn test_admin_cannot_suspend_busy_fighter() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        s.client().set_status(&s.ledger, &fighter, &FighterStatus::Busy);
        s.client()
            .set_status(&s.admin, &fighter, &FighterStatus::Suspended);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #1)")]
    fn test_set_status_rejects_stranger() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        let stranger = Address::generate(&s.env);
        s.client()
            .set_status(&stranger, &fighter, &FighterStatus::Busy);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #5)")]
    fn test_set_status_unknown_fighter() {
        let s = Setup::new();
        let ghost = Address::generate(&s.env);
        s.client().set_status(&s.ledger, &ghost, &FighterStatus::Busy);
    }

    #[test]
    fn test_list_eligible_filters_by_tier() {
        let s = Setup::new();
        let novice = s.register(&baseline(&s.env));
        let veteran = s.register(&expert(&s.env));
        let busy_veteran = s.register(&expert(&s.env));
        s.client()
            .set_status(&s.ledger, &busy_veteran, &FighterStatus::Busy);

        let eligible = s.client().list_eligible(&Tier::Warrior);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible.get(0).unwrap(), veteran);

        let everyone = s.client().list_eligible(&Tier::Novice);
        assert_eq!(everyone, s.client().list_available());
        assert_eq!(everyone.get(0).unwrap(), novice);

        assert_eq!(s.client().list_eligible(&Tier::Elite).len(), 0);
    }

    #[test]
    fn test_ledger_role_requires_ledger_signature() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        let impostor = Address::generate(&s.env);

        s.env.mock_auths(&[MockAuth {
            address: &impostor,
            invoke: &MockAuthInvoke {
                contract: &s.registry_id,
                fn_name: "set_status",
                args: (s.ledger.clone(), fighter.clone(), FighterStatus::Busy).into_val(&s.env),
                sub_invokes: &[],
            },
        }]);
        assert!(s
            .client()
            .try_set_status(&s.ledger, &fighter, &FighterStatus::Busy)
            .is_err());

        s.env.mock_auths(&[MockAuth {
            address: &impostor,
            invoke: &MockAuthInvoke {
                contract: &s.registry_id,
                fn_name: "record_earnings",
                args: (s.ledger.clone(), fighter.clone(), 500i128, 1u32).into_val(&s.env),
                sub_invokes: &[],
            },
        }]);
        assert!(s
            .client()
            .try_record_earnings(&s.ledger, &fighter, &500, &1)
            .is_err());

        let profile = s.client().get_fighter(&fighter).unwrap();
        assert_eq!(profile.status, FighterStatus::Available);
        assert_eq!(profile.total_earnings, 0);

        s.env.mock_auths(&[MockAuth {
            address: &s.ledger,
            invoke: &MockAuthInvoke {
                contract: &s.registry_id,
                fn_name: "set_status",
                args: (s.ledger.clone(), fighter.clone(), FighterStatus::Busy).into_val(&s.env),
                sub_invokes: &[],
            },
        }]);
        s.client()
            .set_status(&s.ledger, &fighter, &FighterStatus::Busy);
        assert_eq!(
            s.client().get_fighter(&fighter).unwrap().status,
            FighterStatus::Busy
        );
    }

    // -- Earnings ---------------------------------------------------------

    #[test]
    fn test_record_earnings_is_additive() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));

        s.client().record_earnings(&s.ledger, &fighter, &950, &1);
        s.client().record_earnings(&s.ledger, &fighter, &475, &1);

        let profile = s.client().get_fighter(&fighter).unwrap();
        assert_eq!(profile.total_earnings, 1_425);
        assert_eq!(profile.completed_missions, 2);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #1)")]
    fn test_record_earnings_ledger_only() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        s.client().record_earnings(&s.admin, &fighter, &100, &1);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #11)")]
    fn test_record_earnings_rejects_negative() {
        let s = Setup::new();
        let fighter = s.register(&expert(&s.env));
        s.client().record_earnings(&s.ledger, &fighter, &-1, &0);
    }

    // -- Location ---------------------------------------------------------

    #[test]
    fn test_update_location_forwards_to_store() {
        let s = Setup::new();
        let fighter = s.register(&baseline(&s.env));

        s.env.ledger().with_mut(|li| {
            li.timestamp = 900;
        });
        s.client()
            .update_location(&fighter, &-33_868_820, &151_209_296);

        let location = s.geolocation().get_location(&fighter).unwrap();
        assert_eq!(location.latitude, -33_868_820);
        assert_eq!(location.longitude, 151_209_296);
        assert_eq!(location.updated_at, 900);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #12)")]
    fn test_suspended_fighter_cannot_move() {
        let s = Setup::new();
        let fighter = s.register(&baseline(&s.env));
        s.client()
            .set_status(&s.admin, &fighter, &FighterStatus::Suspended);
        s.client().update_location(&fighter, &1, &1);
    }

    #[test]
    #[should_panic(expected = "HostError: Error(Contract, #5)")]
    fn test_unregistered_cannot_move() {
        let s = Setup::new();
        let ghost = Address::generate(&s.env);
        s.client().update_location(&ghost, &1, &1);
    }
}
