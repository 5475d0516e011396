//! Solidity interface of the sequencer entrypoint proxy.
//!
//! The `sol!` definitions give the selectors and argument decoding used when
//! routing calldata. Anything that doesn't match one of these selectors is
//! forwarded to the implementation.

pub use sol::*;

#[cfg_attr(coverage_nightly, coverage(off))]
mod sol {
    #![allow(missing_docs)]

    use alloy_sol_macro::sol;

    sol! {
        /// External surface of the proxy. Calls to any other selector are
        /// delegated to the current implementation.
        interface IProxySequencerEntrypoint {
            /// Sets owner and implementation. Only callable once.
            function init(address implementation, address owner) external;

            /// Replaces the implementation. Only callable by the owner.
            function upgrade(address implementation) external;
        }
    }
}

/// Solidity source of the proxy's external interface.
#[cfg(feature = "export-abi")]
pub const ABI: &str = "\
interface IProxySequencerEntrypoint {
    function init(address implementation, address owner) external;

    function upgrade(address implementation) external;

    fallback() external;
}
";

/// Prints the proxy's Solidity interface to stdout.
#[cfg(feature = "export-abi")]
pub fn print_abi() {
    println!("{ABI}");
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::SolCall;

    use super::IProxySequencerEntrypoint::{initCall, upgradeCall};

    #[test]
    fn selectors_match_solidity_signatures() {
        assert_eq!(initCall::SIGNATURE, "init(address,address)");
        assert_eq!(upgradeCall::SIGNATURE, "upgrade(address)");
        assert_eq!(initCall::SELECTOR, hex_literal::hex!("f09a4016"));
        assert_eq!(upgradeCall::SELECTOR, hex_literal::hex!("0900f010"));
    }

    #[cfg(feature = "export-abi")]
    #[test]
    fn exported_abi_declares_every_function() {
        for (name, signature) in [
            ("init", initCall::SIGNATURE),
            ("upgrade", upgradeCall::SIGNATURE),
        ] {
            let declaration = super::ABI
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with(&format!("function {name}(")))
                .expect("should declare the function");
            let params = declaration
                .split_once('(')
                .and_then(|(_, rest)| rest.split_once(')'))
                .map(|(params, _)| params)
                .expect("should have a parameter list");
            let types: Vec<_> = params
                .split(", ")
                .filter_map(|param| param.split_whitespace().next())
                .collect();

            assert_eq!(format!("{name}({})", types.join(",")), signature);
        }
    }
}
