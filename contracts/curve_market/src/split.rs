use soroban_sdk::{contractclient, token, Address, Env, Vec};

use crate::error::Error;
use crate::storage::{self, PayoutTarget};

/// Multi-recipient payout collaborator.
///
/// Funds are sent to the split wallet returned by `create_split`, credited to
/// recipients by `distribute`, and released to a recipient by `withdraw`.
#[contractclient(name = "SplitMainClient")]
pub trait SplitMain {
    fn create_split(
        env: Env,
        accounts: Vec<Address>,
        percent_allocations: Vec<u32>,
        distributor_fee: u32,
        controller: Address,
    ) -> Address;

    fn distribute(
        env: Env,
        split: Address,
        token: Address,
        accounts: Vec<Address>,
        percent_allocations: Vec<u32>,
        distributor_fee: u32,
        distributor: Address,
    );

    fn withdraw(env: Env, account: Address, tokens: Vec<Address>);
}

/// Recipients and allocations forwarded to the collaborator on every call
pub struct Allocation {
    pub accounts: Vec<Address>,
    pub percent_allocations: Vec<u32>,
    pub distributor_fee: u32,
}

impl Allocation {
    pub fn validate(&self) -> Result<(), Error> {
        if self.accounts.is_empty() || self.accounts.len() != self.percent_allocations.len() {
            return Err(Error::InvalidSplit);
        }
        Ok(())
    }
}

/// Split wallet, or `SplitNotCreated`
pub fn require_split(env: &Env) -> Result<Address, Error> {
    match storage::get_payout_target(env) {
        PayoutTarget::Split(split) => Ok(split),
        PayoutTarget::Owner => Err(Error::SplitNotCreated),
    }
}

/// Fails with `SplitActive` once payouts are routed through a split
pub fn require_no_split(env: &Env) -> Result<(), Error> {
    match storage::get_payout_target(env) {
        PayoutTarget::Owner => Ok(()),
        PayoutTarget::Split(_) => Err(Error::SplitActive),
    }
}

/// Push `amount` of `token` into the split wallet and credit it to recipients
pub fn push_and_distribute(
    env: &Env,
    split: &Address,
    token_id: &Address,
    amount: i128,
    allocation: &Allocation,
    distributor: &Address,
) -> Result<(), Error> {
    if amount > 0 {
        token::Client::new(env, token_id).transfer(&env.current_contract_address(), split, &amount);
    }

    let split_main = SplitMainClient::new(env, &storage::get_split_main(env)?);
    split_main.distribute(
        split,
        token_id,
        &allocation.accounts,
        &allocation.percent_allocations,
        &allocation.distributor_fee,
        distributor,
    );

    Ok(())
}

/// Send the market's whole balance of each auxiliary token to the split wallet.
///
/// The curve currency is skipped: it is reserve-backed and only ever moves
/// through the liquidity or fund paths.
pub fn push_tokens(env: &Env, split: &Address, tokens: &Vec<Address>, currency: &Address) {
    let this = env.current_contract_address();

    for token_id in tokens.iter() {
        if &token_id == currency {
            continue;
        }
        let client = token::Client::new(env, &token_id);
        let held = client.balance(&this);
        if held > 0 {
            client.transfer(&this, split, &held);
        }
    }
}

/// Push every auxiliary token to the split wallet and credit it to recipients
pub fn distribute_tokens(
    env: &Env,
    split: &Address,
    tokens: &Vec<Address>,
    currency: &Address,
    allocation: &Allocation,
    distributor: &Address,
) -> Result<(), Error> {
    let this = env.current_contract_address();

    for token_id in tokens.iter() {
        if &token_id == currency {
            continue;
        }
        let held = token::Client::new(env, &token_id).balance(&this);
        push_and_distribute(env, split, &token_id, held, allocation, distributor)?;
    }

    Ok(())
}
