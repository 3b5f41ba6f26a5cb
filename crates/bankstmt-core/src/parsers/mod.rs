//! Built-in bank statement parsers.

pub mod generic;
pub mod hsbc;

pub use generic::GenericParser;
pub use hsbc::HsbcParser;

use crate::process::ParserRegistry;

/// Registry wired with the parsers this crate ships. Banks in the builtin
/// keyword table without a dedicated parser yet get the generic fallback,
/// so their statements flow through and yield no records instead of a
/// dispatch error.
pub fn registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(Box::new(HsbcParser::new()));
    registry.register(Box::new(GenericParser::new("玉山银行")));
    registry.register(Box::new(GenericParser::new("其他")));
    registry
}
