//! Error types shared by every layer of the engine.

use crate::address::Address;
use primitive_types::U256;
use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, AmmError>;

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the role or binding the operation requires.
    Authorization,
    /// Operation is not allowed in the current pool or position state.
    StateGuard,
    /// Economic bound violated: slippage, pool size floor, fee ceilings.
    EconomicGuard,
    /// Checked arithmetic failed or a price collapsed to zero.
    Arithmetic,
    /// The asset ledger refused the staged settlement.
    Ledger,
    /// Persisted state could not be loaded.
    Persistence,
}

/// Failures reported by the asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{holder} holds {available} of {asset}, needs {needed}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        needed: U256,
        available: U256,
    },

    #[error("supply of {0} overflowed")]
    SupplyOverflow(Address),

    #[error("native asset wrapping is not configured")]
    WrappingUnavailable,
}

/// Every way an engine operation can fail.
///
/// Each variant carries a stable machine-readable reason returned by
/// [`AmmError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    // Authorization
    #[error("caller is not the bound router")]
    NotRouter,
    #[error("caller is not the admin")]
    NotAdmin,
    #[error("caller lacks the required capability")]
    BadRole,
    #[error("router is already bound")]
    RouterAlreadyBound,
    #[error("router is not bound to a core")]
    CoreUnbound,
    #[error("router is bound to a different core")]
    WrongCore,

    // State guards
    #[error("input and output assets are the same")]
    SameSwapToken,
    #[error("pool is paused")]
    Paused,
    #[error("pool is unlisted")]
    PoolUnlisted,
    #[error("pool already exists for {0}")]
    PoolExists(Address),
    #[error("no pool for {0}")]
    NoPool(Address),
    #[error("vCash cannot have a pool")]
    VcashPool,
    #[error("liquidity is still time locked")]
    WrongTime,
    #[error("top holder liquidity is locked")]
    TopHolderLocked,
    #[error("shares are still time locked")]
    TransferTooEarly,
    #[error("top holder cannot transfer shares yet")]
    TransferTopHolder,
    #[error("price was traded too recently to update")]
    TooEarly,
    #[error("pool is not synthetic")]
    NotSynthetic,
    #[error("insufficient shares")]
    InsufficientShares,

    // Economic guards
    #[error("input amount must be positive")]
    InsufficientInput,
    #[error("output below the requested minimum")]
    InsufficientOutput,
    #[error("input above the requested maximum")]
    ExcessiveInput,
    #[error("deadline passed")]
    Expired,
    #[error("pool value would fall below the minimum pool size")]
    MinPoolSize,
    #[error("pool cannot cover the trade")]
    InsufficientLiquidity,
    #[error("deposit mints no shares")]
    BadLiquidity,
    #[error("vCash output below the requested minimum")]
    InsufficientVcashOut,
    #[error("token output below the requested minimum")]
    InsufficientTokenOut,
    #[error("amount must be positive")]
    BadAmount,
    #[error("fee {0} is above the ceiling")]
    FeeTooHigh(u32),
    #[error("dev fee {0} is above the ceiling")]
    DevFeeTooHigh(u32),
    #[error("pool size limit is above the ceiling")]
    PoolSizeLimitTooHigh,

    // Arithmetic
    #[error("price must be positive")]
    ZeroPrice,
    #[error("arithmetic overflow")]
    MathOverflow,

    #[error("ledger rejected settlement: {0}")]
    Ledger(#[from] LedgerError),

    #[error("unsupported schema version {0}")]
    UnsupportedSchema(u32),
}

impl AmmError {
    /// Stable reason code, suitable for logs and client-side matching.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotRouter => "NOT_ROUTER",
            Self::NotAdmin => "NOT_ADMIN",
            Self::BadRole => "BAD_ROLE",
            Self::RouterAlreadyBound => "ROUTER_BOUND",
            Self::CoreUnbound => "CORE_UNBOUND",
            Self::WrongCore => "WRONG_CORE",
            Self::SameSwapToken => "SAME_SWAP_TOKEN",
            Self::Paused => "PAUSED",
            Self::PoolUnlisted => "POOL_UNLISTED",
            Self::PoolExists(_) => "POOL_EXISTS",
            Self::NoPool(_) => "NO_POOL",
            Self::VcashPool => "NO_VCASH_POOL",
            Self::WrongTime => "WRONG_TIME",
            Self::TopHolderLocked => "TOP_HOLDER & WRONG_TIME",
            Self::TransferTooEarly => "WRONG_TIME",
            Self::TransferTopHolder => "TOP HOLDER",
            Self::TooEarly => "TOO_EARLY",
            Self::NotSynthetic => "NOT_SYNTHETIC",
            Self::InsufficientShares => "INSUFF_SHARES",
            Self::InsufficientInput => "INSUFF_INPUT",
            Self::InsufficientOutput => "INSUFF_OUTPUT",
            Self::ExcessiveInput => "EXCESSIVE_INPUT",
            Self::Expired => "EXPIRED",
            Self::MinPoolSize => "MIN_POOL_SIZE",
            Self::InsufficientLiquidity => "INSUFF_LIQUIDITY",
            Self::BadLiquidity => "BAD_LIQUIDITY",
            Self::InsufficientVcashOut => "INSUFF_VCASH",
            Self::InsufficientTokenOut => "INSUFF_TOKEN",
            Self::BadAmount => "BAD_AMOUNT",
            Self::FeeTooHigh(_) => "FEE_TOO_HIGH",
            Self::DevFeeTooHigh(_) => "DEV_FEE_TOO_HIGH",
            Self::PoolSizeLimitTooHigh => "LIMIT_TOO_HIGH",
            Self::ZeroPrice => "ZERO_PRICE",
            Self::MathOverflow => "OVERFLOW",
            Self::Ledger(_) => "LEDGER",
            Self::UnsupportedSchema(_) => "SCHEMA",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotRouter
            | Self::NotAdmin
            | Self::BadRole
            | Self::RouterAlreadyBound
            | Self::CoreUnbound
            | Self::WrongCore => ErrorKind::Authorization,
            Self::SameSwapToken
            | Self::Paused
            | Self::PoolUnlisted
            | Self::PoolExists(_)
            | Self::NoPool(_)
            | Self::VcashPool
            | Self::WrongTime
            | Self::TopHolderLocked
            | Self::TransferTooEarly
            | Self::TransferTopHolder
            | Self::TooEarly
            | Self::NotSynthetic
            | Self::InsufficientShares => ErrorKind::StateGuard,
            Self::InsufficientInput
            | Self::InsufficientOutput
            | Self::ExcessiveInput
            | Self::Expired
            | Self::MinPoolSize
            | Self::InsufficientLiquidity
            | Self::BadLiquidity
            | Self::InsufficientVcashOut
            | Self::InsufficientTokenOut
            | Self::BadAmount
            | Self::FeeTooHigh(_)
            | Self::DevFeeTooHigh(_)
            | Self::PoolSizeLimitTooHigh => ErrorKind::EconomicGuard,
            Self::ZeroPrice | Self::MathOverflow => ErrorKind::Arithmetic,
            Self::Ledger(_) => ErrorKind::Ledger,
            Self::UnsupportedSchema(_) => ErrorKind::Persistence,
        }
    }
}
