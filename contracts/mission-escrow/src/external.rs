//! Calls into the fighter registry and geolocation store.
//!
//! The escrow never touches another contract's storage. Every status flip,
//! earnings credit and proximity query goes through the owning contract, and
//! the escrow identifies itself by its own contract address. A failure in any
//! of these calls traps and unwinds the whole invocation.

use dispatch_types::{FighterProfile, FighterStatus, Tier};
use soroban_sdk::{Address, Env, IntoVal, Symbol, Val, Vec};

pub fn list_eligible(env: &Env, registry: &Address, min_tier: Tier) -> Vec<Address> {
    let args: Vec<Val> = Vec::from_array(env, [min_tier.into_val(env)]);
    env.invoke_contract(registry, &Symbol::new(env, "list_eligible"), args)
}

pub fn get_fighter(env: &Env, registry: &Address, fighter: &Address) -> Option<FighterProfile> {
    let args: Vec<Val> = Vec::from_array(env, [fighter.clone().into_val(env)]);
    env.invoke_contract(registry, &Symbol::new(env, "get_fighter"), args)
}

pub fn set_status(env: &Env, registry: &Address, fighter: &Address, status: FighterStatus) {
    let args: Vec<Val> = Vec::from_array(
        env,
        [
            env.current_contract_address().into_val(env),
            fighter.clone().into_val(env),
            status.into_val(env),
        ],
    );
    env.invoke_contract::<Val>(registry, &Symbol::new(env, "set_status"), args);
}

pub fn record_earnings(
    env: &Env,
    registry: &Address,
    fighter: &Address,
    amount: i128,
    missions: u32,
) {
    let args: Vec<Val> = Vec::from_array(
        env,
        [
            env.current_contract_address().into_val(env),
            fighter.clone().into_val(env),
            amount.into_val(env),
            missions.into_val(env),
        ],
    );
    env.invoke_contract::<Val>(registry, &Symbol::new(env, "record_earnings"), args);
}

pub fn nearest(
    env: &Env,
    geolocation: &Address,
    candidates: Vec<Address>,
    latitude: i64,
    longitude: i64,
) -> Option<Address> {
    let args: Vec<Val> = Vec::from_array(
        env,
        [
            candidates.into_val(env),
            latitude.into_val(env),
            longitude.into_val(env),
        ],
    );
    env.invoke_contract(geolocation, &Symbol::new(env, "nearest"), args)
}
