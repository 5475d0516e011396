//! Records of primitive invocations observed by the [`crate::VM`].
use alloy_primitives::{Address, B256};

/// A [`execution_manager::ExecutionManager::sstore`] invocation.
///
/// Writes are recorded when they happen, so the log also keeps writes that a
/// later abort rolled back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sstore {
    /// Storage namespace the write targeted.
    pub address: Address,
    /// Slot key.
    pub key: B256,
    /// Written word.
    pub value: B256,
}

/// A [`execution_manager::ExecutionManager::delegate_call`] invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateCall {
    /// Storage context the delegated code ran in.
    pub context: Address,
    /// Account whose code was executed.
    pub target: Address,
    /// Forwarded calldata.
    pub calldata: Vec<u8>,
}

/// Everything the VM observed since the last [`crate::VM::clear_calls`].
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    pub(crate) sstores: Vec<Sstore>,
    pub(crate) delegate_calls: Vec<DelegateCall>,
    pub(crate) reverts: Vec<Vec<u8>>,
}

impl CallLog {
    pub(crate) fn clear(&mut self) {
        self.sstores.clear();
        self.delegate_calls.clear();
        self.reverts.clear();
    }
}
