use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct BoughtEvent {
    pub buyer: Address,
    pub share_id: u32,
    pub paid: i128,
    pub price: i128,
    pub next_price: i128,
    pub total_supply: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SoldEvent {
    pub seller: Address,
    pub share_id: u32,
    pub payout: i128,
    pub next_price: i128,
    pub total_supply: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SaleStateEvent {
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SplitCreatedEvent {
    pub split: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WithdrawnEvent {
    pub to: Address,
    pub amount: i128,
    /// True when the whole reserve was liquidated
    pub fund: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DistributedEvent {
    pub split: Address,
    pub account: Address,
    pub amount: i128,
    pub fund: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ReserveDepositedEvent {
    pub from: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RendererChangedEvent {
    pub renderer: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OwnershipTransferredEvent {
    pub previous_owner: Address,
    pub new_owner: Address,
}
