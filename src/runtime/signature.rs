// src/runtime/signature.rs
//! Method type encodings
//!
//! A signature is written as a compact string: the first character is the
//! return type, every following character is one argument type.
//!
//! | Code | Type    |
//! |------|---------|
//! | `v`  | void    |
//! | `@`  | any     |
//! | `*`  | string  |
//! | `i`  | integer |
//! | `d`  | double  |
//! | `B`  | bool    |
//!
//! `"*i"` returns a string and takes one integer.

use crate::runtime::selector::Selector;
use crate::utils::errors::{InterceptionError, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Type of a single return value or argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Void,
    Any,
    String,
    Integer,
    Double,
    Bool,
}

impl TypeCode {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'v' => Some(TypeCode::Void),
            '@' => Some(TypeCode::Any),
            '*' => Some(TypeCode::String),
            'i' => Some(TypeCode::Integer),
            'd' => Some(TypeCode::Double),
            'B' => Some(TypeCode::Bool),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            TypeCode::Void => 'v',
            TypeCode::Any => '@',
            TypeCode::String => '*',
            TypeCode::Integer => 'i',
            TypeCode::Double => 'd',
            TypeCode::Bool => 'B',
        }
    }

    /// Check whether a value fits this type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            TypeCode::Any => true,
            TypeCode::Void => value.is_null(),
            TypeCode::String => value.is_string(),
            TypeCode::Integer => value.is_i64() || value.is_u64(),
            TypeCode::Double => value.is_number(),
            TypeCode::Bool => value.is_boolean(),
        }
    }
}

/// Return and argument encoding of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    ret: TypeCode,
    args: Vec<TypeCode>,
}

impl Signature {
    pub fn new(ret: TypeCode, args: Vec<TypeCode>) -> Self {
        Self { ret, args }
    }

    /// Parse a compact encoding such as `"*i"`
    pub fn parse(encoding: &str) -> Result<Self> {
        let mut chars = encoding.chars();
        let ret = chars
            .next()
            .ok_or_else(|| InterceptionError::InvalidSignature("empty encoding".to_string()))?;
        let ret = TypeCode::from_char(ret).ok_or_else(|| {
            InterceptionError::InvalidSignature(format!("unknown return type `{}` in `{}`", ret, encoding))
        })?;

        let args = chars
            .map(|c| match TypeCode::from_char(c) {
                Some(TypeCode::Void) => Err(InterceptionError::InvalidSignature(format!(
                    "void argument in `{}`",
                    encoding
                ))),
                Some(code) => Ok(code),
                None => Err(InterceptionError::InvalidSignature(format!(
                    "unknown argument type `{}` in `{}`",
                    c, encoding
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { ret, args })
    }

    pub fn return_type(&self) -> TypeCode {
        self.ret
    }

    pub fn arg_types(&self) -> &[TypeCode] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Validate call arguments against this signature
    pub fn check_args(&self, selector: &Selector, args: &[Value]) -> Result<()> {
        if args.len() != self.args.len() {
            return Err(InterceptionError::ArgumentMismatch {
                selector: selector.to_string(),
                expected: format!("{} argument(s)", self.args.len()),
                found: format!("{} argument(s)", args.len()),
            });
        }

        for (index, (code, value)) in self.args.iter().zip(args).enumerate() {
            if !code.accepts(value) {
                return Err(InterceptionError::ArgumentMismatch {
                    selector: selector.to_string(),
                    expected: format!("`{}` at position {}", code.as_char(), index),
                    found: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate a returned value against the return type
    pub fn check_return(&self, selector: &Selector, value: &Value) -> Result<()> {
        if self.ret.accepts(value) {
            Ok(())
        } else {
            Err(InterceptionError::ReturnTypeMismatch {
                selector: selector.to_string(),
                expected: self.ret.as_char().to_string(),
                found: value.to_string(),
            })
        }
    }
}

impl Default for Signature {
    /// No arguments, any return value
    fn default() -> Self {
        Self::new(TypeCode::Any, Vec::new())
    }
}

impl FromStr for Signature {
    type Err = InterceptionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ret.as_char())?;
        for arg in &self.args {
            write!(f, "{}", arg.as_char())?;
        }
        Ok(())
    }
}
