#![allow(dead_code)]
use alloy_primitives::{Address, B256};
use alloy_sol_types::{Revert, SolError};
use entrypoint_proxy::proxy::sequencer_entrypoint::ProxySequencerEntrypoint;
use motsu::prelude::*;

/// Slot the mock entrypoint bumps on every successful call.
pub const CALLS_SLOT: B256 = B256::with_last_byte(2);

/// Reason the mock entrypoint aborts with.
pub const ENTRYPOINT_FAILURE: &str = "SequencerEntrypoint: invalid transaction";

/// Sequencer entrypoint stand-in.
///
/// Echoes its calldata back, aborting instead when the calldata starts with
/// `0xff`. Successful calls count themselves in [`CALLS_SLOT`] of whatever
/// storage context they run in.
pub fn sequencer_entrypoint(vm: &mut VM, calldata: &[u8]) -> ArbResult {
    if calldata.first() == Some(&0xff) {
        vm.sstore(CALLS_SLOT, B256::repeat_byte(0xff));
        return Err(Revert { reason: ENTRYPOINT_FAILURE.into() }.abi_encode());
    }

    let calls = vm.sload(CALLS_SLOT);
    let mut next = calls.0;
    next[31] = next[31].wrapping_add(1);
    vm.sstore(CALLS_SLOT, B256::from(next));

    Ok(calldata.to_vec())
}

/// Deploys a proxy and a mock entrypoint, returning their addresses.
pub fn deploy(vm: &mut VM) -> (Address, Address) {
    let (proxy, entrypoint) = (Account::random(), Account::random());
    vm.deploy(entrypoint, sequencer_entrypoint);
    vm.deploy(proxy, |vm: &mut VM, calldata: &[u8]| {
        ProxySequencerEntrypoint::new(vm).route(calldata)
    });
    (proxy, entrypoint)
}
