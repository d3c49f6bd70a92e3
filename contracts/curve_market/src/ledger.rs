use soroban_sdk::{Address, Env};

use crate::error::Error;
use crate::storage::DataKey;

/// Units held by `holder`
pub fn balance_of(env: &Env, holder: &Address) -> u32 {
    env.storage()
        .persistent()
        .get::<DataKey, u32>(&DataKey::Balance(holder.clone()))
        .unwrap_or(0)
}

pub fn total_supply(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get::<DataKey, u32>(&DataKey::TotalSupply)
        .unwrap_or(0)
}

fn set_balance(env: &Env, holder: &Address, amount: u32) {
    let key = DataKey::Balance(holder.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
    }
}

/// Issue `amount` units to `to`, returning the new total supply
pub fn mint(env: &Env, to: &Address, amount: u32) -> Result<u32, Error> {
    let new_balance = balance_of(env, to)
        .checked_add(amount)
        .ok_or(Error::MathOverflow)?;
    let new_supply = total_supply(env)
        .checked_add(amount)
        .ok_or(Error::MathOverflow)?;

    set_balance(env, to, new_balance);
    env.storage()
        .instance()
        .set(&DataKey::TotalSupply, &new_supply);

    Ok(new_supply)
}

/// Destroy `amount` units held by `from`, returning the new total supply
pub fn burn(env: &Env, from: &Address, amount: u32) -> Result<u32, Error> {
    let current = balance_of(env, from);
    if current < amount {
        return Err(Error::InsufficientBalance);
    }
    let new_supply = total_supply(env)
        .checked_sub(amount)
        .ok_or(Error::NothingToSell)?;

    set_balance(env, from, current - amount);
    env.storage()
        .instance()
        .set(&DataKey::TotalSupply, &new_supply);

    Ok(new_supply)
}

/// Move units between holders; supply is unchanged
pub fn transfer(env: &Env, from: &Address, to: &Address, amount: u32) -> Result<(), Error> {
    let from_balance = balance_of(env, from);
    if from_balance < amount {
        return Err(Error::InsufficientBalance);
    }
    if from == to {
        return Ok(());
    }

    let new_to_balance = balance_of(env, to)
        .checked_add(amount)
        .ok_or(Error::MathOverflow)?;

    set_balance(env, from, from_balance - amount);
    set_balance(env, to, new_to_balance);

    Ok(())
}
