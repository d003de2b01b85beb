//! The opcode enumeration and the static per-opcode property tables.
//!
//! The source language mixes inheritance (`FixedInputs<N>`, `DynamicInputs`,
//! `ControlProp<T>`) with an opcode tag stored alongside. Per DESIGN NOTES
//! (§9) we replace the "control property" template with a static table
//! indexed by opcode, queried through [`Opcode::has_control_input`].

use core::fmt;

/// Node kind. One variant per `OPCODE_LIST` entry in the source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Control regions
    Start,
    Region,
    End,
    // Branchers
    If,
    Jump,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
    And,
    Or,
    // Comparison
    Compare,
    // Leaves
    Constant,
    Parameter,
    // Dynamic-arity data/control
    Phi,
    Call,
    Return,
    // Checks
    NullCheck,
    BoundsCheck,
}

/// Arity discipline of a node kind; dynamic-arity nodes grow a `SmallVec`
/// without an upper bound, fixed-arity nodes are checked with
/// `debug_assert!` against the listed cap wherever inputs are set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Fixed(u32),
    Dynamic,
}

impl Opcode {
    /// Is input/user slot 0 a control edge for nodes of this kind?
    ///
    /// Mirrors `Inst::HasControlProp()` in the source, which every
    /// `ControlProp<T>` subclass overrides to return `true`.
    pub fn has_control_input(self) -> bool {
        matches!(
            self,
            Opcode::If
                | Opcode::Jump
                | Opcode::Phi
                | Opcode::Call
                | Opcode::Return
                | Opcode::NullCheck
                | Opcode::BoundsCheck
        )
    }

    /// Is this opcode a control region (`Start`/`Region`/`End`)?
    pub fn is_region(self) -> bool {
        matches!(self, Opcode::Start | Opcode::Region | Opcode::End)
    }

    pub fn is_arithmetic_binary(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Shl
                | Opcode::Shr
                | Opcode::And
                | Opcode::Or
        )
    }

    pub fn is_check(self) -> bool {
        matches!(self, Opcode::NullCheck | Opcode::BoundsCheck)
    }

    /// Does this opcode define an SSA value that can own a live interval?
    /// False for the purely control-shaped opcodes (regions, branchers,
    /// `Return`), which never appear as a data input anywhere.
    pub fn is_value(self) -> bool {
        !matches!(
            self,
            Opcode::Start | Opcode::Region | Opcode::End | Opcode::If | Opcode::Jump | Opcode::Return
        )
    }

    /// The fixed/dynamic arity discipline for this opcode's *total* input
    /// count (control slot included, when present).
    pub fn arity(self) -> Arity {
        use Opcode::*;
        match self {
            Start => Arity::Dynamic,
            Region => Arity::Dynamic,
            End => Arity::Dynamic,
            If => Arity::Fixed(2),
            Jump => Arity::Fixed(1),
            Add | Sub | Mul | Div | Shl | Shr | And | Or => Arity::Fixed(2),
            Compare => Arity::Fixed(2),
            Constant => Arity::Fixed(0),
            Parameter => Arity::Fixed(0),
            Phi => Arity::Dynamic,
            Call => Arity::Dynamic,
            Return => Arity::Fixed(2),
            NullCheck => Arity::Fixed(2),
            BoundsCheck => Arity::Fixed(3),
        }
    }

    fn as_str(self) -> &'static str {
        use Opcode::*;
        match self {
            Start => "Start",
            Region => "Region",
            End => "End",
            If => "If",
            Jump => "Jump",
            Add => "Add",
            Sub => "Sub",
            Mul => "Mul",
            Div => "Div",
            Shl => "Shl",
            Shr => "Shr",
            And => "And",
            Or => "Or",
            Compare => "Compare",
            Constant => "Constant",
            Parameter => "Parameter",
            Phi => "Phi",
            Call => "Call",
            Return => "Return",
            NullCheck => "NullCheck",
            BoundsCheck => "BoundsCheck",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
