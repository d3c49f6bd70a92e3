use soroban_sdk::Env;

use crate::error::Error;
use crate::storage::{self, MarketConfig, BASIS_POINTS};

/// Validate initialization parameters
///
/// # Errors
/// - `InvalidPrice`: initial price must be positive, steps non-negative
/// - `InvalidBasisPoints`: take rate and royalty must be <= 10,000
pub fn validate_config(config: &MarketConfig) -> Result<(), Error> {
    if config.initial_price <= 0 || config.step1 < 0 || config.step2 < 0 {
        return Err(Error::InvalidPrice);
    }

    if config.take_rate_bps as i128 > BASIS_POINTS || config.royalty_bps as i128 > BASIS_POINTS {
        return Err(Error::InvalidBasisPoints);
    }

    Ok(())
}

/// Lock window: full-reserve operations wait until `now >= unlock_date`
pub fn is_locked(now: u64, unlock_date: u64) -> bool {
    now < unlock_date
}

pub fn require_unlocked(env: &Env) -> Result<(), Error> {
    let unlock_date = storage::get_unlock_date(env)?;
    if is_locked(env.ledger().timestamp(), unlock_date) {
        return Err(Error::StillLocked);
    }
    Ok(())
}

/// Trading requires the sale gate open and, if configured, the start time reached
pub fn require_sale_open(env: &Env) -> Result<(), Error> {
    if !storage::is_sale_active(env) {
        return Err(Error::SaleNotActive);
    }

    let sale_start = storage::get_sale_start(env);
    if sale_start > 0 && env.ledger().timestamp() < sale_start {
        return Err(Error::SaleNotStarted);
    }

    Ok(())
}
