use soroban_sdk::{contracttype, Address, Bytes, Env, String};

use crate::error::Error;

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals
pub const BASIS_POINTS: i128 = 10_000; // 100% = 10,000 basis points
pub const SHARE_ID: u32 = 0; // single share class

/// Ladder parameters plus the price of the next unit
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurveState {
    /// Price charged for the next unit issued
    pub current_price: i128,
    /// Step applied per unit while supply stays below `hitch`
    pub step1: i128,
    /// Step applied per unit once supply reaches `hitch`
    pub step2: i128,
    /// Supply count at which the step switches to `step2`
    pub hitch: u32,
    /// Spread retained on redemption, in basis points
    pub take_rate_bps: u32,
}

/// Pooled currency backing redemptions
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reserve {
    /// Currency held on behalf of the curve
    pub balance: i128,
    /// Backing held for outstanding units: each unit's issue price less the
    /// take, rounded down. Always at least the unit's burn return.
    pub obligations: i128,
}

impl Reserve {
    /// Balance in excess of what outstanding units can redeem
    pub fn liquidity(&self) -> i128 {
        if self.balance > self.obligations {
            self.balance - self.obligations
        } else {
            0
        }
    }
}

/// Where owner-side payouts and royalties are routed.
///
/// Moves from `Owner` to `Split` exactly once; there is no way back.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PayoutTarget {
    Owner,
    Split(Address),
}

/// Parameters accepted by `initialize`
#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub name: String,
    pub symbol: String,
    pub initial_price: i128,
    pub step1: i128,
    pub step2: i128,
    pub hitch: u32,
    pub take_rate_bps: u32,
    /// Full-reserve withdrawals are allowed at or after this timestamp
    pub unlock_date: u64,
    /// Trading opens at this timestamp (0 = no start gate)
    pub sale_start: u64,
    pub royalty_bps: u32,
    pub contract_uri: String,
    pub metadata_uri: String,
    pub metadata_renderer: Option<Address>,
    pub metadata_init: Option<Bytes>,
    pub parent_ip: Option<Address>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    Owner,
    Currency,
    SplitMain,
    Curve,
    TotalSupply,
    Reserve,
    UnlockDate,
    SaleStart,
    SaleActive,
    RoyaltyBps,
    PayoutTarget,
    Name,
    Symbol,
    ContractUri,
    MetadataUri,
    MetadataRenderer,
    ParentIp,
    Balance(Address), // holder → unit count
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn get_owner(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

pub fn get_currency(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Currency)
        .ok_or(Error::NotInitialized)
}

pub fn get_split_main(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::SplitMain)
        .ok_or(Error::NotInitialized)
}

pub fn get_curve(env: &Env) -> Result<CurveState, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Curve)
        .ok_or(Error::NotInitialized)
}

pub fn set_curve(env: &Env, curve: &CurveState) {
    env.storage().instance().set(&DataKey::Curve, curve);
}

pub fn get_reserve(env: &Env) -> Reserve {
    env.storage()
        .instance()
        .get(&DataKey::Reserve)
        .unwrap_or(Reserve {
            balance: 0,
            obligations: 0,
        })
}

pub fn set_reserve(env: &Env, reserve: &Reserve) {
    env.storage().instance().set(&DataKey::Reserve, reserve);
}

pub fn get_payout_target(env: &Env) -> PayoutTarget {
    env.storage()
        .instance()
        .get(&DataKey::PayoutTarget)
        .unwrap_or(PayoutTarget::Owner)
}

pub fn set_payout_target(env: &Env, target: &PayoutTarget) {
    env.storage().instance().set(&DataKey::PayoutTarget, target);
}

pub fn get_unlock_date(env: &Env) -> Result<u64, Error> {
    env.storage()
        .instance()
        .get(&DataKey::UnlockDate)
        .ok_or(Error::NotInitialized)
}

pub fn get_sale_start(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::SaleStart)
        .unwrap_or(0)
}

pub fn is_sale_active(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::SaleActive)
        .unwrap_or(false)
}

pub fn get_string(env: &Env, key: &DataKey) -> Result<String, Error> {
    env.storage().instance().get(key).ok_or(Error::NotInitialized)
}
