#![no_std]

mod error;
mod events;
mod ledger;
mod metadata;
mod pricing;
mod split;
mod storage;
mod validation;


pub use error::Error;
pub use metadata::{MetadataRenderer, MetadataRendererClient};
pub use split::{SplitMain, SplitMainClient};
pub use storage::{CurveState, MarketConfig, PayoutTarget, Reserve};

use events::*;
use split::Allocation;
use storage::{DataKey, SHARE_ID};

use soroban_sdk::{
    contract, contractimpl, log, token, Address, Env, String, Symbol, Vec,
};

#[contract]
pub struct CurveMarket;

#[contractimpl]
impl CurveMarket {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the market
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidPrice`: Initial price must be positive, steps non-negative
    /// - `InvalidBasisPoints`: Take rate / royalty above 10,000
    pub fn initialize(
        env: Env,
        owner: Address,
        currency: Address,
        split_main: Address,
        config: MarketConfig,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        owner.require_auth();
        validation::validate_config(&config)?;

        let curve = CurveState {
            current_price: config.initial_price,
            step1: config.step1,
            step2: config.step2,
            hitch: config.hitch,
            take_rate_bps: config.take_rate_bps,
        };

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Currency, &currency);
        env.storage().instance().set(&DataKey::SplitMain, &split_main);
        env.storage().instance().set(&DataKey::Curve, &curve);
        env.storage().instance().set(&DataKey::TotalSupply, &0u32);
        env.storage().instance().set(
            &DataKey::Reserve,
            &Reserve {
                balance: 0,
                obligations: 0,
            },
        );
        env.storage().instance().set(&DataKey::UnlockDate, &config.unlock_date);
        env.storage().instance().set(&DataKey::SaleStart, &config.sale_start);
        env.storage().instance().set(&DataKey::SaleActive, &false);
        env.storage().instance().set(&DataKey::RoyaltyBps, &config.royalty_bps);
        env.storage().instance().set(&DataKey::PayoutTarget, &PayoutTarget::Owner);
        env.storage().instance().set(&DataKey::Name, &config.name);
        env.storage().instance().set(&DataKey::Symbol, &config.symbol);
        env.storage().instance().set(&DataKey::ContractUri, &config.contract_uri);
        env.storage().instance().set(&DataKey::MetadataUri, &config.metadata_uri);
        if let Some(parent_ip) = &config.parent_ip {
            env.storage().instance().set(&DataKey::ParentIp, parent_ip);
        }

        if let Some(renderer) = &config.metadata_renderer {
            env.storage().instance().set(&DataKey::MetadataRenderer, renderer);
            if let Some(data) = &config.metadata_init {
                MetadataRendererClient::new(&env, renderer)
                    .initialize_token_metadata(&env.current_contract_address(), data);
            }
        }

        Ok(())
    }

    /// Hand the owner role to `new_owner`
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn transfer_ownership(env: Env, new_owner: Address) -> Result<(), Error> {
        let previous_owner = Self::require_owner(&env)?;

        env.storage().instance().set(&DataKey::Owner, &new_owner);

        env.events().publish(
            (Symbol::new(&env, "owner_xfer"),),
            OwnershipTransferredEvent {
                previous_owner,
                new_owner,
            },
        );

        Ok(())
    }

    /// Toggle the sale gate, returning the new state
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn flip_sale_state(env: Env) -> Result<bool, Error> {
        Self::require_owner(&env)?;

        let active = !storage::is_sale_active(&env);
        env.storage().instance().set(&DataKey::SaleActive, &active);

        env.events().publish(
            (Symbol::new(&env, "sale_flip"),),
            SaleStateEvent { active },
        );

        Ok(active)
    }

    // ============================================
    // TRADING
    // ============================================

    /// Buy one unit at the current ladder price
    ///
    /// The whole `payment` is taken into the reserve; anything above the
    /// current price is not refunded and counts toward liquidity.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SaleNotActive` / `SaleNotStarted`: Trading closed
    /// - `InsufficientPayment`: payment below current price
    pub fn buy(env: Env, buyer: Address, payment: i128) -> Result<i128, Error> {
        let mut curve = storage::get_curve(&env)?;
        validation::require_sale_open(&env)?;

        buyer.require_auth();

        let price = curve.current_price;
        if payment < price {
            return Err(Error::InsufficientPayment);
        }

        let supply = ledger::total_supply(&env);
        let take = pricing::take_amount(price, curve.take_rate_bps).ok_or(Error::MathOverflow)?;
        let owed = price - take;
        curve.current_price = pricing::price_after(&curve, supply, 1).ok_or(Error::MathOverflow)?;

        let mut reserve = storage::get_reserve(&env);
        reserve.balance = reserve
            .balance
            .checked_add(payment)
            .ok_or(Error::MathOverflow)?;
        reserve.obligations = reserve
            .obligations
            .checked_add(owed)
            .ok_or(Error::MathOverflow)?;

        let total_supply = ledger::mint(&env, &buyer, 1)?;
        storage::set_curve(&env, &curve);
        storage::set_reserve(&env, &reserve);

        let currency = storage::get_currency(&env)?;
        token::Client::new(&env, &currency).transfer(
            &buyer,
            &env.current_contract_address(),
            &payment,
        );

        env.events().publish(
            (Symbol::new(&env, "bought"), buyer.clone()),
            BoughtEvent {
                buyer,
                share_id: SHARE_ID,
                paid: payment,
                price,
                next_price: curve.current_price,
                total_supply,
            },
        );

        Ok(price)
    }

    /// Sell one unit back to the curve, returning the payout
    ///
    /// The ladder steps back to the price the unit was issued at and the
    /// seller receives that price less the take rate.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SaleNotActive` / `SaleNotStarted`: Trading closed
    /// - `NothingToSell`: No units outstanding
    /// - `InsufficientBalance`: Seller holds no units
    /// - `InsufficientReserve`: Reserve was liquidated and not refunded
    pub fn sell(env: Env, seller: Address) -> Result<i128, Error> {
        let mut curve = storage::get_curve(&env)?;
        validation::require_sale_open(&env)?;

        seller.require_auth();

        let supply = ledger::total_supply(&env);
        if supply == 0 {
            return Err(Error::NothingToSell);
        }
        if ledger::balance_of(&env, &seller) == 0 {
            return Err(Error::InsufficientBalance);
        }

        let price = pricing::price_before(&curve, supply).ok_or(Error::MathOverflow)?;
        let payout = pricing::burn_return(price, curve.take_rate_bps).ok_or(Error::MathOverflow)?;
        let take = pricing::take_amount(price, curve.take_rate_bps).ok_or(Error::MathOverflow)?;

        let mut reserve = Self::held_reserve(&env)?;
        if reserve.balance < payout {
            return Err(Error::InsufficientReserve);
        }
        reserve.balance -= payout;
        reserve.obligations = reserve
            .obligations
            .checked_sub(price - take)
            .ok_or(Error::MathOverflow)?;
        curve.current_price = price;

        let total_supply = ledger::burn(&env, &seller, 1)?;
        storage::set_curve(&env, &curve);
        storage::set_reserve(&env, &reserve);

        let currency = storage::get_currency(&env)?;
        token::Client::new(&env, &currency).transfer(
            &env.current_contract_address(),
            &seller,
            &payout,
        );

        env.events().publish(
            (Symbol::new(&env, "sold"), seller.clone()),
            SoldEvent {
                seller,
                share_id: SHARE_ID,
                payout,
                next_price: price,
                total_supply,
            },
        );

        Ok(payout)
    }

    /// Move units between holders
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount must be positive
    /// - `InsufficientBalance`: Sender holds fewer units
    pub fn transfer(env: Env, from: Address, to: Address, amount: u32) -> Result<(), Error> {
        if !storage::is_initialized(&env) {
            return Err(Error::NotInitialized);
        }

        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        ledger::transfer(&env, &from, &to, amount)?;

        env.events().publish(
            (Symbol::new(&env, "transfer"), SHARE_ID),
            TransferEvent { from, to, amount },
        );

        Ok(())
    }

    /// Top up the reserve (e.g. to re-collateralize after `withdraw_fund`)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: amount must be positive
    pub fn deposit_reserve(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        let currency = storage::get_currency(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let mut reserve = storage::get_reserve(&env);
        reserve.balance = reserve
            .balance
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        storage::set_reserve(&env, &reserve);

        token::Client::new(&env, &currency).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );

        env.events().publish(
            (Symbol::new(&env, "deposit"),),
            ReserveDepositedEvent { from, amount },
        );

        Ok(())
    }

    // ============================================
    // WITHDRAWALS
    // ============================================

    /// Pay the owner the liquidity above redemption obligations
    ///
    /// Per unit this is `price × take_rate / 10,000` rounded down, plus any
    /// overpayment and any currency sent straight to the contract.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitActive`: Use `distribute_and_withdraw` instead
    /// - `NothingToWithdraw`: No liquidity
    pub fn withdraw(env: Env) -> Result<i128, Error> {
        let owner = Self::require_owner(&env)?;
        split::require_no_split(&env)?;

        let mut reserve = Self::held_reserve(&env)?;
        let amount = reserve.liquidity();
        if amount == 0 {
            return Err(Error::NothingToWithdraw);
        }
        reserve.balance -= amount;
        storage::set_reserve(&env, &reserve);

        Self::pay_out(&env, &owner, amount, false)?;

        Ok(amount)
    }

    /// Pay the owner the entire reserve once the lock window has elapsed
    ///
    /// The reserve is the contract's full currency balance, including
    /// currency that arrived by plain transfer.
    ///
    /// Outstanding units cannot be sold afterward until the reserve is
    /// topped up again with `deposit_reserve`.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitActive`: Use `distribute_and_withdraw_fund` instead
    /// - `StillLocked`: Unlock date not reached
    /// - `NothingToWithdraw`: Reserve is empty
    pub fn withdraw_fund(env: Env) -> Result<i128, Error> {
        let owner = Self::require_owner(&env)?;
        split::require_no_split(&env)?;
        validation::require_unlocked(&env)?;

        let mut reserve = Self::held_reserve(&env)?;
        let amount = reserve.balance;
        if amount == 0 {
            return Err(Error::NothingToWithdraw);
        }
        reserve.balance = 0;
        storage::set_reserve(&env, &reserve);

        Self::pay_out(&env, &owner, amount, true)?;

        Ok(amount)
    }

    // ============================================
    // PAYOUT SPLIT
    // ============================================

    /// Create the payout split. One-way: payouts are routed through it from
    /// now on and direct withdrawals are disabled.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitAlreadyCreated`: A split already exists
    /// - `InvalidSplit`: Empty or mismatched recipients / allocations
    pub fn create_split(
        env: Env,
        accounts: Vec<Address>,
        percent_allocations: Vec<u32>,
        distributor_fee: u32,
    ) -> Result<Address, Error> {
        Self::require_owner(&env)?;

        if let PayoutTarget::Split(_) = storage::get_payout_target(&env) {
            return Err(Error::SplitAlreadyCreated);
        }

        let allocation = Allocation {
            accounts,
            percent_allocations,
            distributor_fee,
        };
        allocation.validate()?;

        let split_main = SplitMainClient::new(&env, &storage::get_split_main(&env)?);
        let split = split_main.create_split(
            &allocation.accounts,
            &allocation.percent_allocations,
            &allocation.distributor_fee,
            &env.current_contract_address(),
        );

        storage::set_payout_target(&env, &PayoutTarget::Split(split.clone()));

        env.events().publish(
            (Symbol::new(&env, "split_new"),),
            SplitCreatedEvent {
                split: split.clone(),
            },
        );

        Ok(split)
    }

    /// Push current liquidity (and any auxiliary tokens) into the split,
    /// distribute it, and release `account`'s accrued share
    ///
    /// Returns the currency amount pushed into the split.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitNotCreated`: No split yet
    /// - `InvalidSplit`: Empty or mismatched recipients / allocations
    pub fn distribute_and_withdraw(
        env: Env,
        account: Address,
        withdraw_currency: u32,
        tokens: Vec<Address>,
        accounts: Vec<Address>,
        percent_allocations: Vec<u32>,
        distributor_fee: u32,
        distributor: Address,
    ) -> Result<i128, Error> {
        let split = split::require_split(&env)?;

        Self::distribute_and_release(
            &env,
            &split,
            &account,
            withdraw_currency,
            &tokens,
            Allocation {
                accounts,
                percent_allocations,
                distributor_fee,
            },
            &distributor,
            false,
        )
    }

    /// Like `distribute_and_withdraw`, but pushes the entire reserve once the
    /// lock window has elapsed
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitNotCreated`: No split yet
    /// - `StillLocked`: Unlock date not reached
    /// - `InvalidSplit`: Empty or mismatched recipients / allocations
    pub fn distribute_and_withdraw_fund(
        env: Env,
        account: Address,
        withdraw_currency: u32,
        tokens: Vec<Address>,
        accounts: Vec<Address>,
        percent_allocations: Vec<u32>,
        distributor_fee: u32,
        distributor: Address,
    ) -> Result<i128, Error> {
        Self::require_owner(&env)?;
        let split = split::require_split(&env)?;
        validation::require_unlocked(&env)?;

        Self::distribute_and_release(
            &env,
            &split,
            &account,
            withdraw_currency,
            &tokens,
            Allocation {
                accounts,
                percent_allocations,
                distributor_fee,
            },
            &distributor,
            true,
        )
    }

    /// Move the entire reserve (and any auxiliary tokens) into the split
    /// wallet without distributing
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `SplitNotCreated`: No split yet
    /// - `StillLocked`: Unlock date not reached
    pub fn transfer_fund_to_split(
        env: Env,
        withdraw_currency: u32,
        tokens: Vec<Address>,
    ) -> Result<i128, Error> {
        Self::require_owner(&env)?;
        let split = split::require_split(&env)?;
        validation::require_unlocked(&env)?;

        let currency = storage::get_currency(&env)?;
        let mut amount = 0;
        if withdraw_currency != 0 {
            let mut reserve = Self::held_reserve(&env)?;
            amount = reserve.balance;
            reserve.balance = 0;
            storage::set_reserve(&env, &reserve);

            if amount > 0 {
                token::Client::new(&env, &currency).transfer(
                    &env.current_contract_address(),
                    &split,
                    &amount,
                );
            }
        }

        split::push_tokens(&env, &split, &tokens, &currency);

        log!(&env, "reserve moved to split", amount);
        env.events().publish(
            (Symbol::new(&env, "withdrawn"), split.clone()),
            WithdrawnEvent {
                to: split,
                amount,
                fund: true,
            },
        );

        Ok(amount)
    }

    // ============================================
    // METADATA
    // ============================================

    /// Set or clear the metadata renderer
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn set_metadata_renderer(env: Env, renderer: Option<Address>) -> Result<(), Error> {
        Self::require_owner(&env)?;

        match &renderer {
            Some(address) => env
                .storage()
                .instance()
                .set(&DataKey::MetadataRenderer, address),
            None => env.storage().instance().remove(&DataKey::MetadataRenderer),
        }

        env.events().publish(
            (Symbol::new(&env, "renderer"),),
            RendererChangedEvent { renderer },
        );

        Ok(())
    }

    pub fn set_contract_uri(env: Env, uri: String) -> Result<(), Error> {
        Self::require_owner(&env)?;

        env.storage().instance().set(&DataKey::ContractUri, &uri);
        Ok(())
    }

    /// Metadata URI for a unit id: rendered if a renderer is set, otherwise
    /// the static template with the id appended
    pub fn uri(env: Env, id: u32) -> Result<String, Error> {
        let renderer: Option<Address> = env.storage().instance().get(&DataKey::MetadataRenderer);
        if let Some(renderer) = renderer {
            return Ok(MetadataRendererClient::new(&env, &renderer)
                .token_uri(&env.current_contract_address(), &id));
        }

        let base = storage::get_string(&env, &DataKey::MetadataUri)?;
        metadata::static_uri(&env, &base, id)
    }

    pub fn contract_uri(env: Env) -> Result<String, Error> {
        storage::get_string(&env, &DataKey::ContractUri)
    }

    pub fn metadata_renderer(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::MetadataRenderer)
    }

    pub fn parent_ip(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::ParentIp)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Royalty receiver and amount for a secondary sale
    pub fn royalty_info(
        env: Env,
        _unit_id: u32,
        sale_price: i128,
    ) -> Result<(Address, i128), Error> {
        let royalty_bps: u32 = env
            .storage()
            .instance()
            .get(&DataKey::RoyaltyBps)
            .ok_or(Error::NotInitialized)?;
        let amount = pricing::royalty_amount(sale_price, royalty_bps).ok_or(Error::MathOverflow)?;

        let receiver = match storage::get_payout_target(&env) {
            PayoutTarget::Split(split) => split,
            PayoutTarget::Owner => storage::get_owner(&env)?,
        };

        Ok((receiver, amount))
    }

    /// Price of the next unit
    pub fn current_price(env: Env) -> Result<i128, Error> {
        Ok(storage::get_curve(&env)?.current_price)
    }

    /// Price of the next unit after `units` more are bought
    pub fn price_after(env: Env, units: u32) -> Result<i128, Error> {
        let curve = storage::get_curve(&env)?;
        pricing::price_after(&curve, ledger::total_supply(&env), units).ok_or(Error::MathOverflow)
    }

    /// Total cost of buying the next `units` units one at a time
    pub fn quote_buy(env: Env, units: u32) -> Result<i128, Error> {
        let curve = storage::get_curve(&env)?;
        pricing::quote_buy(&curve, ledger::total_supply(&env), units).ok_or(Error::MathOverflow)
    }

    /// Payout of the next sell
    pub fn quote_sell(env: Env) -> Result<i128, Error> {
        let curve = storage::get_curve(&env)?;
        let price = pricing::price_before(&curve, ledger::total_supply(&env))
            .ok_or(Error::NothingToSell)?;
        pricing::burn_return(price, curve.take_rate_bps).ok_or(Error::MathOverflow)
    }

    /// Reserve balance above redemption obligations
    pub fn liquidity(env: Env) -> Result<i128, Error> {
        Ok(Self::held_reserve(&env)?.liquidity())
    }

    pub fn reserve(env: Env) -> Result<Reserve, Error> {
        Self::held_reserve(&env)
    }

    pub fn curve(env: Env) -> Result<CurveState, Error> {
        storage::get_curve(&env)
    }

    pub fn total_supply(env: Env) -> u32 {
        ledger::total_supply(&env)
    }

    pub fn balance_of(env: Env, holder: Address) -> u32 {
        ledger::balance_of(&env, &holder)
    }

    pub fn is_locked(env: Env) -> Result<bool, Error> {
        let unlock_date = storage::get_unlock_date(&env)?;
        Ok(validation::is_locked(env.ledger().timestamp(), unlock_date))
    }

    pub fn unlock_date(env: Env) -> Result<u64, Error> {
        storage::get_unlock_date(&env)
    }

    pub fn sale_active(env: Env) -> bool {
        storage::is_sale_active(&env)
    }

    pub fn sale_start(env: Env) -> u64 {
        storage::get_sale_start(&env)
    }

    pub fn split_wallet(env: Env) -> Option<Address> {
        match storage::get_payout_target(&env) {
            PayoutTarget::Split(split) => Some(split),
            PayoutTarget::Owner => None,
        }
    }

    pub fn payout_target(env: Env) -> PayoutTarget {
        storage::get_payout_target(&env)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        storage::get_owner(&env)
    }

    pub fn currency(env: Env) -> Result<Address, Error> {
        storage::get_currency(&env)
    }

    pub fn name(env: Env) -> Result<String, Error> {
        storage::get_string(&env, &DataKey::Name)
    }

    pub fn symbol(env: Env) -> Result<String, Error> {
        storage::get_string(&env, &DataKey::Symbol)
    }
}

// ============================================
// INTERNAL HELPERS
// ============================================

impl CurveMarket {
    fn require_owner(env: &Env) -> Result<Address, Error> {
        let owner = storage::get_owner(env)?;
        owner.require_auth();
        Ok(owner)
    }

    /// Stored reserve with any currency sent straight to the contract
    /// folded into its balance
    fn held_reserve(env: &Env) -> Result<Reserve, Error> {
        let currency = storage::get_currency(env)?;
        let mut reserve = storage::get_reserve(env);
        let held = token::Client::new(env, &currency).balance(&env.current_contract_address());
        if held > reserve.balance {
            reserve.balance = held;
        }
        Ok(reserve)
    }

    fn pay_out(env: &Env, to: &Address, amount: i128, fund: bool) -> Result<(), Error> {
        let currency = storage::get_currency(env)?;
        token::Client::new(env, &currency).transfer(&env.current_contract_address(), to, &amount);

        log!(env, "withdrawn", amount, fund);
        env.events().publish(
            (Symbol::new(env, "withdrawn"), to.clone()),
            WithdrawnEvent {
                to: to.clone(),
                amount,
                fund,
            },
        );

        Ok(())
    }

    /// Shared body of the distribute-and-withdraw flows. Reserve accounting is
    /// settled before any token leaves the contract.
    #[allow(clippy::too_many_arguments)]
    fn distribute_and_release(
        env: &Env,
        split: &Address,
        account: &Address,
        withdraw_currency: u32,
        tokens: &Vec<Address>,
        allocation: Allocation,
        distributor: &Address,
        fund: bool,
    ) -> Result<i128, Error> {
        allocation.validate()?;

        let currency = storage::get_currency(env)?;
        let mut withdraw_tokens = Vec::new(env);
        let mut amount = 0;

        if withdraw_currency != 0 {
            let mut reserve = Self::held_reserve(env)?;
            amount = if fund {
                reserve.balance
            } else {
                reserve.liquidity()
            };
            reserve.balance -= amount;
            storage::set_reserve(env, &reserve);

            split::push_and_distribute(env, split, &currency, amount, &allocation, distributor)?;
            withdraw_tokens.push_back(currency.clone());
        }

        split::distribute_tokens(env, split, tokens, &currency, &allocation, distributor)?;
        for token_id in tokens.iter() {
            if token_id != currency {
                withdraw_tokens.push_back(token_id);
            }
        }

        let split_main = SplitMainClient::new(env, &storage::get_split_main(env)?);
        split_main.withdraw(account, &withdraw_tokens);

        env.events().publish(
            (Symbol::new(env, "distrib"), account.clone()),
            DistributedEvent {
                split: split.clone(),
                account: account.clone(),
                amount,
                fund,
            },
        );

        Ok(amount)
    }
}
