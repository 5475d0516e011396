/*!
# Sequencer Entrypoint Proxy

An upgradeable proxy for the rollup's sequencer entrypoint. The proxy keeps a
stable address that every external caller targets, while a privileged owner
installs and later swaps the logic contract behind it.

The proxy never touches storage or call primitives directly. It is handed an
[`execution_manager::ExecutionManager`] and performs every read, write,
caller lookup and delegated call through it, so the same state machine runs
against the rollup's Execution Manager or an in-memory test host.

## Usage

```rust
use entrypoint_proxy::proxy::sequencer_entrypoint::ProxySequencerEntrypoint;
use execution_manager::{ArbResult, ExecutionManager};

fn entry(vm: impl ExecutionManager, calldata: &[u8]) -> ArbResult {
    ProxySequencerEntrypoint::new(vm).route(calldata)
}
```

`route` dispatches `init(address,address)` and `upgrade(address)` by selector
and forwards everything else, unmodified, to the current implementation.
*/

#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(rustdoc::broken_intra_doc_links)]
extern crate alloc;

pub mod proxy;

#[cfg(feature = "export-abi")]
pub use proxy::abi::print_abi;
