//! Common imports for `motsu` tests.
pub use alloy_primitives::{Address, B256};
pub use execution_manager::{
    address_to_word, word_to_address, ArbResult, CallOutcome, ExecutionManager,
};

pub use crate::{Account, Code, DelegateCall, Sstore, VM};
