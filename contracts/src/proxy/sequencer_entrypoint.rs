//! Upgradeable proxy in front of the sequencer entrypoint.
//!
//! The proxy starts [`ProxyState::Uninitialized`]. A single successful
//! [`ProxySequencerEntrypoint::init`] records a non-zero owner and the first
//! implementation and moves it to [`ProxyState::Active`] for good, even if the
//! owner later points the implementation at the zero address. From then on
//! the owner may swap the implementation with
//! [`ProxySequencerEntrypoint::upgrade`], and every call that doesn't target
//! one of those two functions is delegated, byte for byte, to the current
//! implementation.
//!
//! Ownership can't be transferred or renounced.
use alloc::{string::ToString, vec::Vec};

use alloy_primitives::Address;
use alloy_sol_types::{Revert, SolCall, SolError};
use execution_manager::{ArbResult, ExecutionManager};
use tracing::{debug, trace, warn};

use crate::proxy::{
    abi::IProxySequencerEntrypoint::{initCall, upgradeCall},
    slot::Slot,
    IProxy,
};

/// Abort reason of an `init` call on an initialized proxy.
pub const ALREADY_INITIALIZED: &str =
    "ProxySequencerEntrypoint has already been inited";

/// Abort reason of an `upgrade` call from an account other than the owner.
pub const UNAUTHORIZED: &str = "Only owner can upgrade the Entrypoint";

/// Abort reason of an `init` call naming the zero address as owner.
pub const ZERO_OWNER: &str =
    "ProxySequencerEntrypoint owner can't be the zero address";

/// An error that occurred in a [`ProxySequencerEntrypoint`] call.
///
/// Converting it into bytes gives the abort data surfaced to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `init` was called after the proxy was initialized.
    #[error("{}", ALREADY_INITIALIZED)]
    AlreadyInitialized,
    /// `init` was called with the zero address as owner.
    #[error("{}", ZERO_OWNER)]
    ZeroOwner,
    /// `upgrade` was called by an account other than the owner.
    #[error("{}", UNAUTHORIZED)]
    Unauthorized {
        /// Account that attempted the upgrade.
        caller: Address,
    },
    /// The implementation aborted. Holds its abort data untouched.
    #[error("delegated call failed")]
    DelegatedFailure(Vec<u8>),
    /// Calldata matched a proxy selector but its arguments couldn't be
    /// decoded.
    #[error("invalid calldata")]
    InvalidCalldata,
}

impl From<Error> for Vec<u8> {
    fn from(value: Error) -> Self {
        match value {
            Error::DelegatedFailure(data) => data,
            // Solidity aborts with empty data when argument decoding fails.
            Error::InvalidCalldata => Vec::new(),
            e => Revert { reason: e.to_string() }.abi_encode(),
        }
    }
}

/// Lifecycle state of the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyState {
    /// Both slots hold the zero word.
    Uninitialized,
    /// `init` succeeded. The owner slot is set for good.
    Active,
}

/// State machine of the sequencer entrypoint proxy, running on the injected
/// Execution Manager `E`.
#[derive(Debug)]
pub struct ProxySequencerEntrypoint<E> {
    vm: E,
}

impl<E: ExecutionManager> ProxySequencerEntrypoint<E> {
    /// Creates a proxy whose primitives go through `vm`.
    pub fn new(vm: E) -> Self {
        Self { vm }
    }

    /// Returns the Execution Manager.
    pub fn vm(&self) -> &E {
        &self.vm
    }

    /// Consumes the proxy, returning the Execution Manager.
    pub fn into_inner(self) -> E {
        self.vm
    }

    /// Entry point of an external call.
    ///
    /// Calldata starting with the selector of `init(address,address)` or
    /// `upgrade(address)` runs the matching function. Any other calldata,
    /// including calldata shorter than a selector, goes to
    /// [`Self::fallback`].
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `calldata` - Calldata of the external call.
    ///
    /// # Errors
    ///
    /// * The abort data of the failed operation, see [`Error`].
    pub fn route(&mut self, calldata: &[u8]) -> ArbResult {
        let selector = calldata.get(..4);

        if selector == Some(initCall::SELECTOR.as_slice()) {
            debug!("dispatching init");
            let call = initCall::abi_decode_validate(calldata)
                .map_err(|_| Error::InvalidCalldata)?;
            self.init(call.implementation, call.owner)?;
            return Ok(Vec::new());
        }

        if selector == Some(upgradeCall::SELECTOR.as_slice()) {
            debug!("dispatching upgrade");
            let call = upgradeCall::abi_decode_validate(calldata)
                .map_err(|_| Error::InvalidCalldata)?;
            self.upgrade(call.implementation)?;
            return Ok(Vec::new());
        }

        Ok(self.fallback(calldata)?)
    }

    /// Sets `owner` and `implementation`, moving the proxy to
    /// [`ProxyState::Active`].
    ///
    /// The owner slot is written before the implementation slot. Both writes
    /// are rolled back by the host if the enclosing call aborts.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `implementation` - First implementation to delegate to.
    /// * `owner` - Account allowed to upgrade the implementation.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyInitialized`] - If the proxy is already
    ///   [`ProxyState::Active`].
    /// * [`Error::ZeroOwner`] - If `owner` is the zero address.
    pub fn init(
        &mut self,
        implementation: Address,
        owner: Address,
    ) -> Result<(), Error> {
        if self.state() == ProxyState::Active {
            warn!(
                implementation = %self.implementation(),
                owner = %self.owner(),
                "rejecting init of an initialized proxy"
            );
            return Err(Error::AlreadyInitialized);
        }

        // A zero owner would leave nothing marking the proxy as initialized.
        if owner.is_zero() {
            warn!(%implementation, "rejecting init with a zero owner");
            return Err(Error::ZeroOwner);
        }

        Slot::Owner.set(&mut self.vm, owner);
        Slot::Implementation.set(&mut self.vm, implementation);

        debug!(%implementation, %owner, "initialized proxy");
        Ok(())
    }

    /// Replaces the implementation with `new_implementation`.
    ///
    /// The new address isn't validated, the owner is trusted to point the
    /// proxy at working code. Upgrading to the zero address keeps the proxy
    /// [`ProxyState::Active`].
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `new_implementation` - Next implementation to delegate to.
    ///
    /// # Errors
    ///
    /// * [`Error::Unauthorized`] - If the caller isn't the owner.
    pub fn upgrade(
        &mut self,
        new_implementation: Address,
    ) -> Result<(), Error> {
        self.only_owner()?;

        let previous = self.implementation();
        Slot::Implementation.set(&mut self.vm, new_implementation);

        debug!(%previous, %new_implementation, "upgraded implementation");
        Ok(())
    }

    /// Delegates `calldata` to the current implementation and hands back its
    /// return data.
    ///
    /// There's no guard against an uninitialized proxy: the call then goes to
    /// [`Address::ZERO`] and its outcome is up to the Execution Manager.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `calldata` - Calldata forwarded unmodified.
    ///
    /// # Errors
    ///
    /// * [`Error::DelegatedFailure`] - If the implementation aborted.
    pub fn fallback(&mut self, calldata: &[u8]) -> Result<Vec<u8>, Error> {
        let result = self.do_fallback(calldata);
        trace!(
            success = result.is_ok(),
            calldata_len = calldata.len(),
            "delegated call returned"
        );
        result.map_err(Error::DelegatedFailure)
    }

    /// Returns the current implementation.
    #[must_use]
    pub fn implementation(&self) -> Address {
        Slot::Implementation.get(&self.vm)
    }

    /// Returns the owner allowed to upgrade.
    #[must_use]
    pub fn owner(&self) -> Address {
        Slot::Owner.get(&self.vm)
    }

    /// Returns the lifecycle state.
    ///
    /// The proxy is [`ProxyState::Active`] as soon as either slot holds a
    /// non-zero word.
    #[must_use]
    pub fn state(&self) -> ProxyState {
        if Slot::Implementation.is_empty(&self.vm)
            && Slot::Owner.is_empty(&self.vm)
        {
            ProxyState::Uninitialized
        } else {
            ProxyState::Active
        }
    }

    /// Checks that the caller is the stored owner.
    ///
    /// # Errors
    ///
    /// * [`Error::Unauthorized`] - If called by any account other than the
    ///   owner.
    pub fn only_owner(&self) -> Result<(), Error> {
        let caller = self.vm.caller();
        if self.owner() != caller {
            warn!(%caller, "rejecting upgrade from non-owner");
            return Err(Error::Unauthorized { caller });
        }

        Ok(())
    }
}

impl<E: ExecutionManager> IProxy for ProxySequencerEntrypoint<E> {
    type Vm = E;

    fn vm_mut(&mut self) -> &mut E {
        &mut self.vm
    }

    fn implementation(&self) -> Address {
        Self::implementation(self)
    }
}
