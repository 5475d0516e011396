//! Storage slots owned by the sequencer entrypoint proxy.
//!
//! The proxy keeps exactly two words, each holding an [`Address`] encoded
//! right-aligned with its upper twelve bytes zero. Slots are only reachable
//! through [`Slot`], so no other key can be read or written by the proxy.
use alloy_primitives::{b256, Address, B256};
use execution_manager::{address_to_word, word_to_address, ExecutionManager};

/// Key of the slot holding the current implementation.
pub const IMPLEMENTATION_SLOT: B256 = B256::ZERO;

/// Key of the slot holding the owner allowed to upgrade.
pub const OWNER_SLOT: B256 = b256!(
    "0x0000000000000000000000000000000000000000000000000000000000000001"
);

/// A storage slot of the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Address of the logic contract calls are delegated to. Zero until the
    /// proxy is initialized.
    Implementation,
    /// Address allowed to upgrade the implementation.
    Owner,
}

impl Slot {
    /// Returns the storage key of the slot.
    #[must_use]
    pub const fn key(self) -> B256 {
        match self {
            Slot::Implementation => IMPLEMENTATION_SLOT,
            Slot::Owner => OWNER_SLOT,
        }
    }

    /// Reads the address stored in the slot.
    ///
    /// # Arguments
    ///
    /// * `vm` - Execution Manager the proxy runs on.
    #[must_use]
    pub fn get(self, vm: &impl ExecutionManager) -> Address {
        word_to_address(vm.sload(self.key()))
    }

    /// Whether the slot holds the zero word.
    ///
    /// # Arguments
    ///
    /// * `vm` - Execution Manager the proxy runs on.
    #[must_use]
    pub fn is_empty(self, vm: &impl ExecutionManager) -> bool {
        vm.sload(self.key()).is_zero()
    }

    /// Stores `address` in the slot.
    ///
    /// # Arguments
    ///
    /// * `vm` - Execution Manager the proxy runs on.
    /// * `address` - Address to store.
    pub fn set(self, vm: &mut impl ExecutionManager, address: Address) {
        vm.sstore(self.key(), address_to_word(address));
    }
}
