use crate::language::ast::BinaryOp;
use std::fmt;

/// Static classification of a node. `Str`, `Method` and `Statement` only
/// tag non-value constructs; no arithmetic exists on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Double,
    Boolean,
    Str,
    Method,
    Statement,
}

impl ValueType {
    /// The only implicit conversion: a type matches itself, and `Int`
    /// widens to `Double`.
    pub fn are_compatible(first: ValueType, second: ValueType) -> bool {
        if first == second {
            return true;
        }
        if first == ValueType::Double && second == ValueType::Int {
            return true;
        }
        if second == ValueType::Double && first == ValueType::Int {
            return true;
        }
        false
    }

    pub fn result_type(first: ValueType, second: ValueType) -> ValueType {
        if first == ValueType::Double || second == ValueType::Double {
            return ValueType::Double;
        }
        if first == ValueType::Int && second == ValueType::Int {
            return ValueType::Int;
        }
        first
    }

    pub fn mnemonic(self) -> Option<&'static str> {
        match self {
            ValueType::Int | ValueType::Boolean => Some("i"),
            ValueType::Double => Some("d"),
            _ => None,
        }
    }

    pub fn descriptor(self) -> Option<&'static str> {
        match self {
            ValueType::Int => Some("I"),
            ValueType::Boolean => Some("Z"),
            ValueType::Double => Some("D"),
            _ => None,
        }
    }

    pub fn slot_width(self) -> usize {
        match self {
            ValueType::Double => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Str => "string",
            ValueType::Method => "method",
            ValueType::Statement => "statement",
        };
        f.write_str(name)
    }
}

/// Instruction-set spelling of an operator; arithmetic and comparison words
/// are suffixed to a mnemonic, the logical words are whole instructions.
pub fn operator_word(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Eq => "eq",
        BinaryOp::NotEq => "ne",
        BinaryOp::Gt => "gt",
        BinaryOp::GtEq => "ge",
        BinaryOp::Lt => "lt",
        BinaryOp::LtEq => "le",
        BinaryOp::And => "iand",
        BinaryOp::Or => "ior",
    }
}
