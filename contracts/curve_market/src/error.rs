use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // SALE / CURVE ERRORS (20-29)
    // ============================================
    /// Sale state is not active
    SaleNotActive = 20,
    /// Current time is before the configured sale start
    SaleNotStarted = 21,
    /// Payment is below the current ladder price
    InsufficientPayment = 22,
    /// No units outstanding
    NothingToSell = 23,
    /// Holder doesn't have enough units
    InsufficientBalance = 24,
    /// Unit amount must be positive
    InvalidAmount = 25,

    // ============================================
    // RESERVE / WITHDRAWAL ERRORS (30-39)
    // ============================================
    /// Unlock date has not been reached
    StillLocked = 30,
    /// Reserve cannot cover the computed redemption
    InsufficientReserve = 31,
    /// Nothing available to withdraw
    NothingToWithdraw = 32,

    // ============================================
    // SPLIT ERRORS (40-49)
    // ============================================
    /// Direct withdrawal is disabled once a split exists
    SplitActive = 40,
    /// Split has already been created
    SplitAlreadyCreated = 41,
    /// Split has not been created yet
    SplitNotCreated = 42,
    /// Recipients and allocations are empty or of different length
    InvalidSplit = 43,

    // ============================================
    // CONFIGURATION ERRORS (50-59)
    // ============================================
    /// Initial price must be positive and steps non-negative
    InvalidPrice = 50,
    /// Basis points must be <= 10_000
    InvalidBasisPoints = 51,

    // ============================================
    // ARITHMETIC / METADATA ERRORS (60-69)
    // ============================================
    /// Checked arithmetic overflowed
    MathOverflow = 60,
    /// Metadata URI plus id does not fit the URI buffer
    UriTooLong = 61,
}
