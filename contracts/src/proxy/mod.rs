//! Proxy contracts running on top of the Execution Manager.
//!
//! [`IProxy`] provides the generic delegating fallback, and
//! [`sequencer_entrypoint::ProxySequencerEntrypoint`] builds the upgradeable
//! sequencer entrypoint proxy on top of it.
use alloc::vec::Vec;

use alloy_primitives::Address;
use execution_manager::{CallOutcome, ExecutionManager};

pub mod abi;
pub mod sequencer_entrypoint;
pub mod slot;

/// This trait provides a fallback function that delegates all calls to another
/// contract using the Execution Manager's delegated call. We refer to the
/// second contract as the _implementation_ behind the proxy, and it has to be
/// specified by implementing [`IProxy::implementation`].
///
/// Additionally, delegation to the implementation can be triggered manually
/// through the [`IProxy::do_fallback`] function, or to a different contract
/// through the [`IProxy::delegate`] function.
///
/// The success and return data of the delegated call will be returned back
/// to the caller of the proxy.
pub trait IProxy {
    /// Execution Manager the proxy runs on.
    type Vm: ExecutionManager;

    /// Returns write access to the Execution Manager.
    fn vm_mut(&mut self) -> &mut Self::Vm;

    /// Returns the address to which the fallback function and
    /// [`IProxy::do_fallback`] should delegate.
    ///
    /// # Arguments
    ///
    /// * `&self` - Read access to the contract's state.
    fn implementation(&self) -> Address;

    /// Delegates `calldata` to `implementation` in the proxy's storage
    /// context.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `implementation` - The address of the implementation contract.
    /// * `calldata` - The calldata to delegate to the implementation contract.
    fn delegate(
        &mut self,
        implementation: Address,
        calldata: &[u8],
    ) -> CallOutcome {
        self.vm_mut().delegate_call(implementation, calldata)
    }

    /// Fallback function that delegates calls to the address returned
    /// by [`IProxy::implementation`]. Will run if no other function in the
    /// contract matches the call data.
    ///
    /// # Arguments
    ///
    /// * `&mut self` - Write access to the contract's state.
    /// * `calldata` - The calldata to delegate to the implementation contract.
    ///
    /// # Errors
    ///
    /// * The implementation's abort data, unmodified.
    fn do_fallback(&mut self, calldata: &[u8]) -> Result<Vec<u8>, Vec<u8>> {
        let implementation = self.implementation();
        self.delegate(implementation, calldata).into_result()
    }
}
