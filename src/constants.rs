//! Centralized hash domains and reserved names.
//!
//! All hash domains used when fingerprinting atoms must be defined here to
//! avoid accidental reuse and to keep fingerprint versions consistent.

/// Domain for the type universe `^TYPE` (v0).
pub const DOMAIN_TYPE_UNIVERSE_V0: &[u8] = b"TYPE_UNIVERSE_V0";

/// Domain for named root types (v0).
pub const DOMAIN_ROOT_TYPE_V0: &[u8] = b"ROOT_TYPE_V0";

/// Domain for literals (v0).
pub const DOMAIN_LITERAL_V0: &[u8] = b"LITERAL_V0";

/// Domain for pattern and bound variables (v0).
pub const DOMAIN_VARIABLE_V0: &[u8] = b"VARIABLE_V0";

/// Domain for lambdas (v0).
pub const DOMAIN_LAMBDA_V0: &[u8] = b"LAMBDA_V0";

/// Domain for atom sequences (v0).
pub const DOMAIN_SEQUENCE_V0: &[u8] = b"SEQUENCE_V0";

/// Domain for algebraic property sets (v0).
pub const DOMAIN_ALGPROP_V0: &[u8] = b"ALGPROP_V0";

/// Domain for operator descriptors (v0).
pub const DOMAIN_OPERATOR_V0: &[u8] = b"OPERATOR_V0";

/// Domain for applications (v0).
pub const DOMAIN_APPLY_V0: &[u8] = b"APPLY_V0";

/// Rendering of the type universe.
pub const TYPE_UNIVERSE: &str = "^TYPE";

/// Root type matched by every atom when used as a pattern.
pub const ANY: &str = "ANY";
/// Root type of integer literals.
pub const INTEGER: &str = "INTEGER";
/// Root type of string literals.
pub const STRING: &str = "STRING";
/// Root type of symbol literals.
pub const SYMBOL: &str = "SYMBOL";
/// Root type of boolean literals.
pub const BOOLEAN: &str = "BOOLEAN";
/// Root type of float literals.
pub const FLOAT: &str = "FLOAT";
/// Root type of operator references.
pub const OPREF: &str = "OPREF";

/// Prefix of De Bruijn variable names (`:1`, `:2`, ...).
pub const BOUND_VARIABLE_PREFIX: char = ':';

/// Separator between a formal parameter name and its padding copy number.
pub const PARAMETER_COPY_SEPARATOR: char = '#';
