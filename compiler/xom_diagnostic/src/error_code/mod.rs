//! Error codes for all generator diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the stage. Used for `explain` lookups and documentation.

use std::fmt;

/// The error taxonomy. Every [`ErrorCode`] belongs to exactly one kind.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorKind {
    /// Rejected while loading declaration files.
    InvalidInput,
    /// Annotations on one declaration contradict each other or its type.
    ConflictingAnnotations,
    /// A type, member or version reference does not resolve.
    UnresolvedReference,
    /// A base-type chain loops back on itself.
    CyclicInheritance,
    /// Overlapping version ranges disagree on the declaration's shape.
    AmbiguousVersionShape,
    /// Stable identifiers or names are missing, malformed or not unique.
    IdentityValidationFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::ConflictingAnnotations => "ConflictingAnnotations",
            ErrorKind::UnresolvedReference => "UnresolvedReference",
            ErrorKind::CyclicInheritance => "CyclicInheritance",
            ErrorKind::AmbiguousVersionShape => "AmbiguousVersionShape",
            ErrorKind::IdentityValidationFailed => "IdentityValidationFailed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes for all generator diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E0xxx: Input loading
/// - E1xxx: Type graph and references
/// - E2xxx: Annotation resolution
/// - E3xxx: Version/platform gating
/// - E4xxx: Identity registration
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Input errors (E0xxx)
    /// Declaration file cannot be read
    E0001,
    /// Declaration file is not a valid declaration document
    E0002,
    /// Unknown annotation kind
    E0003,
    /// Annotation parameters do not match its kind
    E0004,
    /// Malformed type expression
    E0005,
    /// Invalid identifier
    E0006,

    // Graph errors (E1xxx)
    /// Unresolved type reference
    E1001,
    /// Base type is not allowed for this kind
    E1002,
    /// Non-interface in an interface list
    E1003,
    /// Generic arity mismatch
    E1004,
    /// Cyclic inheritance
    E1005,
    /// Content property names no member
    E1006,
    /// Invalid core-layer base
    E1007,
    /// Member version index has no type version
    E1008,
    /// Property or field without a declared type
    E1009,

    // Annotation errors (E2xxx)
    /// Mutually exclusive annotations
    E2001,
    /// Storage kind does not match the declared type
    E2002,
    /// Annotation does not apply to this declaration
    E2003,
    /// Same artifact both excluded and force-included
    E2004,
    /// Offset on a declaration absent from the native stub
    E2005,
    /// Member force-included where its owning type is not
    E2006,

    // Version errors (E3xxx)
    /// Overlapping version ranges with different shapes
    E3001,
    /// Empty version range
    E3002,

    // Identity errors (E4xxx)
    /// Identity validation failed
    E4001,
}

impl ErrorCode {
    /// All error codes, in declaration order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E4001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E4001 => "E4001",
        }
    }

    /// The taxonomy kind this code reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E0001
            | ErrorCode::E0002
            | ErrorCode::E0003
            | ErrorCode::E0004
            | ErrorCode::E0005
            | ErrorCode::E0006 => ErrorKind::InvalidInput,
            ErrorCode::E1005 => ErrorKind::CyclicInheritance,
            ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E1006
            | ErrorCode::E1007
            | ErrorCode::E1008
            | ErrorCode::E1009 => ErrorKind::UnresolvedReference,
            ErrorCode::E2001
            | ErrorCode::E2002
            | ErrorCode::E2003
            | ErrorCode::E2004
            | ErrorCode::E2005
            | ErrorCode::E2006
            | ErrorCode::E3002 => ErrorKind::ConflictingAnnotations,
            ErrorCode::E3001 => ErrorKind::AmbiguousVersionShape,
            ErrorCode::E4001 => ErrorKind::IdentityValidationFailed,
        }
    }

    /// Check if this is an input loading error (E0xxx range).
    pub fn is_input_error(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// Check if this is a graph error (E1xxx range).
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
                | ErrorCode::E1007
                | ErrorCode::E1008
                | ErrorCode::E1009
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
