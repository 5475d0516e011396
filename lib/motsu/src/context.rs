//! Unit-testing context for predeploys.
//!
//! [`VM`] keeps one storage namespace per address and a stack of call frames.
//! Each frame journals the writes it performs, so an aborted frame can put
//! back the previous values without touching writes of its caller.

use std::{collections::HashMap, fmt, rc::Rc};

use alloy_primitives::{Address, B256};
use execution_manager::{ArbResult, CallOutcome, ExecutionManager};
use tracing::trace;

use crate::calls::{CallLog, DelegateCall, Sstore};

/// Code deployed at an address.
///
/// It receives the VM as its Execution Manager and the calldata of the call.
pub type Code = Rc<dyn Fn(&mut VM, &[u8]) -> ArbResult>;

/// Factory for test accounts.
#[derive(Debug, Clone, Copy)]
pub struct Account;

impl Account {
    /// Returns a fresh random address.
    #[must_use]
    pub fn random() -> Address {
        Address::from(rand::random::<[u8; 20]>())
    }
}

/// Previous value of a slot, kept to undo a write.
type UndoEntry = (Address, B256, Option<B256>);

struct Frame {
    caller: Address,
    context: Address,
    undo: Vec<UndoEntry>,
}

impl Frame {
    fn new(caller: Address, context: Address) -> Self {
        Self { caller, context, undo: Vec::new() }
    }
}

/// Values forced onto primitives regardless of state.
#[derive(Default)]
struct Mocks {
    caller: Option<Address>,
    sload: Option<B256>,
    delegate_call: Option<CallOutcome>,
}

/// In-memory Execution Manager.
#[derive(Default)]
pub struct VM {
    storage: HashMap<Address, HashMap<B256, B256>>,
    code: HashMap<Address, Code>,
    frames: Vec<Frame>,
    mocks: Mocks,
    log: CallLog,
}

impl fmt::Debug for VM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VM")
            .field("storage", &self.storage)
            .field("deployed", &self.code.keys().collect::<Vec<_>>())
            .field("depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}

impl VM {
    /// Deploys `code` at `address`, replacing whatever was there.
    pub fn deploy(
        &mut self,
        address: Address,
        code: impl Fn(&mut VM, &[u8]) -> ArbResult + 'static,
    ) {
        self.code.insert(address, Rc::new(code));
    }

    /// Sends `calldata` from `from` to the code deployed at `to`.
    ///
    /// Runs as a single external call: if the code returns `Err`, every write
    /// it made is rolled back and the abort data is recorded in
    /// [`VM::reverts`]. Calling an address without code succeeds with empty
    /// return data.
    ///
    /// # Errors
    ///
    /// * The abort data of the callee.
    pub fn call(
        &mut self,
        from: Address,
        to: Address,
        calldata: &[u8],
    ) -> ArbResult {
        let code = self.code.get(&to).cloned();
        let result = self.execute(from, to, |vm| match code {
            Some(code) => code(vm, calldata),
            None => Ok(Vec::new()),
        });

        if let Err(data) = &result {
            self.log.reverts.push(data.clone());
        }

        result
    }

    /// Runs `f` as an external call from `from` in the storage context of
    /// `to`.
    ///
    /// Writes performed by `f` are kept if it returns `Ok` and rolled back
    /// otherwise.
    ///
    /// # Errors
    ///
    /// * Whatever `f` returns.
    pub fn execute<T, E>(
        &mut self,
        from: Address,
        to: Address,
        f: impl FnOnce(&mut VM) -> Result<T, E>,
    ) -> Result<T, E> {
        trace!(%from, %to, depth = self.frames.len(), "entering call");
        self.frames.push(Frame::new(from, to));
        let result = f(self);
        self.exit(result.is_ok());
        result
    }

    /// Returns the word stored at `key` in the namespace of `address`.
    #[must_use]
    pub fn storage(&self, address: Address, key: B256) -> B256 {
        self.storage
            .get(&address)
            .and_then(|slots| slots.get(&key))
            .copied()
            .unwrap_or_default()
    }

    /// Writes `value` at `key` in the namespace of `address`, outside of any
    /// call. Nothing is recorded.
    pub fn set_storage(&mut self, address: Address, key: B256, value: B256) {
        self.storage.entry(address).or_default().insert(key, value);
    }

    /// Forces [`ExecutionManager::caller`] to return `caller`.
    pub fn mock_caller(&mut self, caller: Address) {
        self.mocks.caller = Some(caller);
    }

    /// Forces every [`ExecutionManager::sload`] to return `word`.
    pub fn mock_sload(&mut self, word: B256) {
        self.mocks.sload = Some(word);
    }

    /// Forces every [`ExecutionManager::delegate_call`] to return `outcome`
    /// without running any code.
    pub fn mock_delegate_call(&mut self, outcome: CallOutcome) {
        self.mocks.delegate_call = Some(outcome);
    }

    /// Removes every forced value.
    pub fn clear_mocks(&mut self) {
        self.mocks = Mocks::default();
    }

    /// Recorded [`ExecutionManager::sstore`] invocations.
    #[must_use]
    pub fn sstores(&self) -> &[Sstore] {
        &self.log.sstores
    }

    /// Recorded [`ExecutionManager::delegate_call`] invocations.
    #[must_use]
    pub fn delegate_calls(&self) -> &[DelegateCall] {
        &self.log.delegate_calls
    }

    /// Abort data of every failed [`VM::call`].
    #[must_use]
    pub fn reverts(&self) -> &[Vec<u8>] {
        &self.log.reverts
    }

    /// Forgets every recorded invocation.
    pub fn clear_calls(&mut self) {
        self.log.clear();
    }

    fn context(&self) -> Address {
        self.frames.last().map(|frame| frame.context).unwrap_or_default()
    }

    fn exit(&mut self, success: bool) {
        let Some(frame) = self.frames.pop() else {
            return;
        };

        if success {
            if let Some(parent) = self.frames.last_mut() {
                parent.undo.extend(frame.undo);
            }
            return;
        }

        trace!(
            context = %frame.context,
            writes = frame.undo.len(),
            "rolling back aborted call"
        );
        for (address, key, previous) in frame.undo.into_iter().rev() {
            let slots = self.storage.entry(address).or_default();
            match previous {
                Some(value) => slots.insert(key, value),
                None => slots.remove(&key),
            };
        }
    }
}

impl ExecutionManager for VM {
    fn caller(&self) -> Address {
        self.mocks.caller.unwrap_or_else(|| {
            self.frames.last().map(|frame| frame.caller).unwrap_or_default()
        })
    }

    fn sload(&self, key: B256) -> B256 {
        self.mocks.sload.unwrap_or_else(|| self.storage(self.context(), key))
    }

    fn sstore(&mut self, key: B256, value: B256) {
        let address = self.context();
        self.log.sstores.push(Sstore { address, key, value });

        let previous =
            self.storage.entry(address).or_default().insert(key, value);
        if let Some(frame) = self.frames.last_mut() {
            frame.undo.push((address, key, previous));
        }
    }

    fn delegate_call(
        &mut self,
        target: Address,
        calldata: &[u8],
    ) -> CallOutcome {
        let context = self.context();
        self.log.delegate_calls.push(DelegateCall {
            context,
            target,
            calldata: calldata.to_vec(),
        });

        if let Some(outcome) = &self.mocks.delegate_call {
            return outcome.clone();
        }

        let Some(code) = self.code.get(&target).cloned() else {
            trace!(%target, "delegate call to account without code");
            return CallOutcome::success(Vec::new());
        };

        let caller =
            self.frames.last().map(|frame| frame.caller).unwrap_or_default();
        self.frames.push(Frame::new(caller, context));
        let result = code(self, calldata);
        self.exit(result.is_ok());

        CallOutcome::from(result)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address, B256};
    use execution_manager::{CallOutcome, ExecutionManager};

    use super::{Account, VM};

    const KEY: B256 = B256::with_last_byte(1);
    const ONE: B256 = B256::with_last_byte(1);
    const TWO: B256 = B256::with_last_byte(2);

    fn store(word: B256) -> impl Fn(&mut VM, &[u8]) -> Result<Vec<u8>, Vec<u8>>
    {
        move |vm: &mut VM, _: &[u8]| {
            vm.sstore(KEY, word);
            Ok(word.to_vec())
        }
    }

    #[test]
    fn commits_writes_of_successful_call() {
        let mut vm = VM::default();
        let (alice, contract) = (Account::random(), Account::random());
        vm.deploy(contract, store(ONE));

        let data = vm.call(alice, contract, &[]).expect("should succeed");

        assert_eq!(data, ONE.to_vec());
        assert_eq!(vm.storage(contract, KEY), ONE);
        assert!(vm.reverts().is_empty());
    }

    #[test]
    fn rolls_back_writes_of_aborted_call() {
        let mut vm = VM::default();
        let (alice, contract) = (Account::random(), Account::random());
        vm.set_storage(contract, KEY, ONE);
        vm.deploy(contract, |vm: &mut VM, _: &[u8]| {
            vm.sstore(KEY, TWO);
            vm.sstore(B256::with_last_byte(9), TWO);
            Err(b"abort".to_vec())
        });

        let err = vm.call(alice, contract, &[]).expect_err("should abort");

        assert_eq!(err, b"abort".to_vec());
        assert_eq!(vm.storage(contract, KEY), ONE);
        assert_eq!(vm.storage(contract, B256::with_last_byte(9)), B256::ZERO);
        assert_eq!(vm.sstores().len(), 2);
        assert_eq!(vm.reverts(), &[b"abort".to_vec()]);
    }

    #[test]
    fn delegate_call_runs_in_callers_context() {
        let mut vm = VM::default();
        let (alice, proxy, logic) =
            (Account::random(), Account::random(), Account::random());
        vm.deploy(logic, |vm: &mut VM, _: &[u8]| {
            let caller = vm.caller();
            vm.sstore(KEY, caller.into_word());
            Ok(Vec::new())
        });
        vm.deploy(proxy, move |vm: &mut VM, calldata: &[u8]| {
            vm.delegate_call(logic, calldata).into_result()
        });

        vm.call(alice, proxy, &[0xde, 0xad]).expect("should succeed");

        assert_eq!(vm.storage(proxy, KEY), alice.into_word());
        assert_eq!(vm.storage(logic, KEY), B256::ZERO);
        let calls = vm.delegate_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].context, proxy);
        assert_eq!(calls[0].target, logic);
        assert_eq!(calls[0].calldata, vec![0xde, 0xad]);
    }

    #[test]
    fn failed_delegate_call_only_rolls_back_its_own_writes() {
        let mut vm = VM::default();
        let (alice, proxy, logic) =
            (Account::random(), Account::random(), Account::random());
        vm.deploy(logic, |vm: &mut VM, _: &[u8]| {
            vm.sstore(KEY, TWO);
            Err(b"inner".to_vec())
        });

        let outcome = vm
            .execute(alice, proxy, |vm| {
                vm.sstore(KEY, ONE);
                Ok::<_, ()>(vm.delegate_call(logic, &[]))
            })
            .expect("outer call should succeed");

        assert_eq!(outcome, CallOutcome::failure(b"inner".to_vec()));
        assert_eq!(vm.storage(proxy, KEY), ONE);
    }

    #[test]
    fn outer_abort_rolls_back_successful_delegate_call() {
        let mut vm = VM::default();
        let (alice, proxy, logic) =
            (Account::random(), Account::random(), Account::random());
        vm.deploy(logic, store(TWO));

        let result = vm.execute(alice, proxy, |vm| {
            let outcome = vm.delegate_call(logic, &[]);
            assert!(outcome.success);
            Err::<(), _>("abort")
        });

        assert_eq!(result, Err("abort"));
        assert_eq!(vm.storage(proxy, KEY), B256::ZERO);
    }

    #[test]
    fn delegate_call_to_account_without_code_succeeds() {
        let mut vm = VM::default();
        let alice = Account::random();

        let outcome = vm
            .execute(alice, Account::random(), |vm| {
                Ok::<_, ()>(vm.delegate_call(Address::ZERO, &[0x01]))
            })
            .expect("should succeed");

        assert_eq!(outcome, CallOutcome::success(Vec::new()));
    }

    #[test]
    fn mocks_override_state() {
        let mut vm = VM::default();
        let contract = Account::random();
        let wallet = address!("0x1212121212121212121212121212121212121212");
        vm.set_storage(contract, KEY, ONE);
        vm.mock_caller(wallet);
        vm.mock_sload(TWO);
        vm.mock_delegate_call(CallOutcome::failure(vec![0xff]));

        vm.execute(Account::random(), contract, |vm| {
            assert_eq!(vm.caller(), wallet);
            assert_eq!(vm.sload(KEY), TWO);
            assert_eq!(
                vm.delegate_call(contract, &[]),
                CallOutcome::failure(vec![0xff])
            );
            Ok::<_, ()>(())
        })
        .expect("should succeed");

        vm.clear_mocks();
        vm.execute(Account::random(), contract, |vm| {
            assert_eq!(vm.sload(KEY), ONE);
            Ok::<_, ()>(())
        })
        .expect("should succeed");
    }
}
