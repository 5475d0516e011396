//! Prints the Solidity interface of the sequencer entrypoint proxy.
fn main() {
    entrypoint_proxy::print_abi();
}
