//! # Execution Manager primitives
//!
//! Contracts deployed on the rollup don't touch storage, caller information or
//! other accounts directly. Every such operation goes through the Execution
//! Manager, which virtualizes it. This crate describes that operation set as
//! the [`ExecutionManager`] trait, so a contract receives its host explicitly
//! instead of reaching for ambient state.
//!
//! Aborting is not a method of the trait. A contract entry point returns an
//! [`ArbResult`], and returning `Err(data)` is the abort: the host driving the
//! call must discard every [`ExecutionManager::sstore`] performed during that
//! call and surface `data` to the caller.
//!
//! ```rust
//! use execution_manager::{address_to_word, word_to_address, ExecutionManager};
//! use alloy_primitives::{Address, B256};
//!
//! fn stored_address(host: &impl ExecutionManager, key: B256) -> Address {
//!     word_to_address(host.sload(key))
//! }
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]
extern crate alloc;

use alloc::vec::Vec;

pub use alloy_primitives::{Address, B256};

/// Outcome of an entry point: return data on success, abort data otherwise.
pub type ArbResult = Result<Vec<u8>, Vec<u8>>;

/// Result of [`ExecutionManager::delegate_call`].
///
/// `data` is the callee's return data when `success` is `true` and its abort
/// data otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutcome {
    /// Whether the callee returned normally.
    pub success: bool,
    /// Return or abort data produced by the callee.
    pub data: Vec<u8>,
}

impl CallOutcome {
    /// A successful call returning `data`.
    #[must_use]
    pub fn success(data: impl Into<Vec<u8>>) -> Self {
        Self { success: true, data: data.into() }
    }

    /// A failed call that aborted with `data`.
    #[must_use]
    pub fn failure(data: impl Into<Vec<u8>>) -> Self {
        Self { success: false, data: data.into() }
    }

    /// Converts the outcome into an [`ArbResult`], keeping `data` as is.
    ///
    /// # Errors
    ///
    /// * The callee's abort data, if the call failed.
    pub fn into_result(self) -> ArbResult {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.data)
        }
    }
}

impl From<CallOutcome> for ArbResult {
    fn from(outcome: CallOutcome) -> Self {
        outcome.into_result()
    }
}

impl From<ArbResult> for CallOutcome {
    fn from(result: ArbResult) -> Self {
        match result {
            Ok(data) => CallOutcome::success(data),
            Err(data) => CallOutcome::failure(data),
        }
    }
}

/// Virtualized primitives a contract is allowed to invoke.
///
/// Every method is synchronous and total. Implementations are expected to run
/// exactly one top-level call at a time against a given storage namespace.
pub trait ExecutionManager {
    /// Returns the logical caller of the current invocation.
    fn caller(&self) -> Address;

    /// Reads the word stored at `key`.
    ///
    /// Slots that were never written read as [`B256::ZERO`].
    fn sload(&self, key: B256) -> B256;

    /// Writes `value` at `key`.
    ///
    /// The write becomes durable only once the enclosing call succeeds.
    fn sstore(&mut self, key: B256, value: B256);

    /// Executes `calldata` against `target`'s logic within the current
    /// storage context.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the host.
    /// * `target` - Account whose code is executed.
    /// * `calldata` - Data forwarded to `target`.
    fn delegate_call(&mut self, target: Address, calldata: &[u8])
        -> CallOutcome;
}

impl<T: ExecutionManager + ?Sized> ExecutionManager for &mut T {
    fn caller(&self) -> Address {
        (**self).caller()
    }

    fn sload(&self, key: B256) -> B256 {
        (**self).sload(key)
    }

    fn sstore(&mut self, key: B256, value: B256) {
        (**self).sstore(key, value);
    }

    fn delegate_call(
        &mut self,
        target: Address,
        calldata: &[u8],
    ) -> CallOutcome {
        (**self).delegate_call(target, calldata)
    }
}

/// Encodes `address` as a word, right-aligned with twelve leading zero bytes.
#[must_use]
pub fn address_to_word(address: Address) -> B256 {
    address.into_word()
}

/// Decodes the [`Address`] held in the low twenty bytes of `word`.
///
/// The upper bytes are ignored, matching how the EVM truncates a word when it
/// is used as an address.
#[must_use]
pub fn word_to_address(word: B256) -> Address {
    Address::from_word(word)
}
