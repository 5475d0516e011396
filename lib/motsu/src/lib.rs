//! # Motsu - Unit Testing for Predeploys
//!
//! This crate provides [`VM`], an in-memory implementation of
//! [`execution_manager::ExecutionManager`]. Contracts written against the
//! primitive layer can be driven from plain `#[test]` functions, with the same
//! all-or-nothing storage semantics the rollup guarantees for a top-level
//! call.
//!
//! The name `motsu` is an analogy to the place where you put your fingers to
//! hold a stylus pen.
//!
//! ## Usage
//!
//! Deploy code at an address, then call it the way an external account
//! would. Storage writes of a call that returns `Err` are rolled back.
//!
//! ```rust
//! use motsu::prelude::*;
//!
//! let mut vm = VM::default();
//! let alice = Account::random();
//! let counter = Account::random();
//! let key = B256::with_last_byte(1);
//!
//! vm.deploy(counter, move |vm: &mut VM, _calldata: &[u8]| {
//!     vm.sstore(key, B256::with_last_byte(7));
//!     Err(b"nope".to_vec())
//! });
//!
//! let result = vm.call(alice, counter, &[]);
//! assert_eq!(result, Err(b"nope".to_vec()));
//! assert_eq!(vm.storage(counter, key), B256::ZERO);
//! ```
//!
//! Primitive calls are recorded so tests can assert on them, and individual
//! primitives can be forced to return fixed values with the `mock_*` methods.
mod calls;
mod context;
pub mod prelude;

pub use calls::{DelegateCall, Sstore};
pub use context::{Account, Code, VM};
