use std::str::FromStr;

use crate::error::AppError;

/// Type expression as written in an ABI JSON artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    U8,
    U16,
    U32,
    U64,
    Usize,
    BigUint,
    Bool,
    Address,
    /// Token identifiers and utf-8 strings, decoded to text.
    Text,
    /// Raw byte buffers.
    Bytes,
    H256,
    Option(Box<AbiType>),
    List(Box<AbiType>),
    Tuple(Vec<AbiType>),
    /// `optional<T>`: trailing argument that may be omitted.
    Optional(Box<AbiType>),
    /// `variadic<T>`: any number of top-level values.
    Variadic(Box<AbiType>),
    /// `multi<A, B, ..>`: several top-level values.
    Multi(Vec<AbiType>),
    /// Struct or enum declared in the ABI `types` section.
    Custom(String),
}

impl FromStr for AbiType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let expr = raw.trim();
        if expr.is_empty() {
            return Err(AppError::Abi("empty type expression".to_string()));
        }

        let Some(open) = expr.find('<') else {
            return Ok(primitive(expr));
        };
        if !expr.ends_with('>') {
            return Err(AppError::Abi(format!("unbalanced type expression '{}'", expr)));
        }

        let name = expr[..open].trim();
        let args = split_top_level(&expr[open + 1..expr.len() - 1])?
            .into_iter()
            .map(|arg| arg.parse::<AbiType>())
            .collect::<Result<Vec<_>, _>>()?;

        let single = |args: Vec<AbiType>| -> Result<Box<AbiType>, AppError> {
            let mut args = args;
            if args.len() != 1 {
                return Err(AppError::Abi(format!(
                    "'{}' takes exactly one type argument",
                    name
                )));
            }
            Ok(Box::new(args.remove(0)))
        };

        match name {
            "Option" => Ok(AbiType::Option(single(args)?)),
            "List" | "vec" | "Vec" | "ManagedVec" => Ok(AbiType::List(single(args)?)),
            "optional" | "OptionalValue" => Ok(AbiType::Optional(single(args)?)),
            "variadic" | "MultiValueEncoded" => Ok(AbiType::Variadic(single(args)?)),
            "tuple" => Ok(AbiType::Tuple(args)),
            "multi" => Ok(AbiType::Multi(args)),
            other => Err(AppError::Abi(format!(
                "unsupported generic type '{}'",
                other
            ))),
        }
    }
}

fn primitive(name: &str) -> AbiType {
    match name {
        "u8" => AbiType::U8,
        "u16" => AbiType::U16,
        "u32" => AbiType::U32,
        "u64" => AbiType::U64,
        "usize" => AbiType::Usize,
        "BigUint" => AbiType::BigUint,
        "bool" => AbiType::Bool,
        "Address" | "ManagedAddress" => AbiType::Address,
        "TokenIdentifier" | "EgldOrEsdtTokenIdentifier" | "utf-8 string" => AbiType::Text,
        "bytes" | "ManagedBuffer" | "BoxedBytes" => AbiType::Bytes,
        "H256" => AbiType::H256,
        custom => AbiType::Custom(custom.to_string()),
    }
}

fn split_top_level(inner: &str) -> Result<Vec<&str>, AppError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AppError::Abi(format!("unbalanced type arguments '{}'", inner)))?;
            }
            ',' if depth == 0 => {
                parts.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AppError::Abi(format!("unbalanced type arguments '{}'", inner)));
    }
    parts.push(inner[start..].trim());

    if parts.iter().any(|part| part.is_empty()) {
        return Err(AppError::Abi(format!("empty type argument in '{}'", inner)));
    }
    Ok(parts)
}
