//! Scalar types and condition codes used by the IR.

use core::fmt;

/// A scalar value type carried by a data node.
///
/// Printable names match §6 of the design: `b, i32, u32, i64, u64, ref`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    /// No type has been assigned yet (control nodes, or before inference).
    None,
    /// Boolean, produced by comparisons.
    Bool,
    I32,
    U32,
    I64,
    U64,
    /// A reference/pointer-sized value (checks, calls returning objects).
    Ref,
}

impl Type {
    /// `Constant`'s default type absent other information.
    pub const DEFAULT_CONSTANT: Type = Type::I64;

    fn as_str(self) -> &'static str {
        match self {
            Type::None => "",
            Type::Bool => "b",
            Type::I32 => "i32",
            Type::U32 => "u32",
            Type::I64 => "i64",
            Type::U64 => "u64",
            Type::Ref => "ref",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison condition code carried by `Compare` nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionCode {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl ConditionCode {
    fn as_str(self) -> &'static str {
        match self {
            ConditionCode::Eq => "EQ",
            ConditionCode::Ne => "NE",
            ConditionCode::Ge => "GE",
            ConditionCode::Gt => "GT",
            ConditionCode::Le => "LE",
            ConditionCode::Lt => "LT",
        }
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
