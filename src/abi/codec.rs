//! ABI-driven encoding of `TypedValue`s.
//!
//! The ABI decides the shape; every leaf goes through `multiversx-sc-codec`, so
//! top-level and nested forms are exactly the contract's own `TopEncode` /
//! `NestedEncode` output.

use multiversx_sc_codec::{
    top_encode_to_vec_u8, DecodeError, EncodeError, NestedDecode, NestedEncode, TopDecode,
};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::registry::{AbiRegistry, TypeDef};
use super::types::AbiType;
use super::value::TypedValue;
use crate::crypto::Address;
use crate::error::{AppError, Result};

/// Encodes endpoint arguments to top-level byte buffers, one per contract argument.
pub fn encode_arguments(
    registry: &AbiRegistry,
    endpoint: &str,
    args: &[TypedValue],
) -> Result<Vec<Vec<u8>>> {
    let endpoint = registry.endpoint(endpoint)?;
    if args.len() > endpoint.inputs.len() {
        return Err(AppError::Abi(format!(
            "{} takes {} arguments, got {}",
            endpoint.name,
            endpoint.inputs.len(),
            args.len()
        )));
    }

    let mut encoded = Vec::with_capacity(args.len());
    for (index, (name, ty)) in endpoint.inputs.iter().enumerate() {
        let arg = args.get(index);
        match ty {
            AbiType::Optional(inner) => match arg.cloned().and_then(TypedValue::into_option) {
                Some(value) => encoded.push(top_encode(registry, inner, &value)?),
                None => {
                    if args[index.min(args.len())..]
                        .iter()
                        .any(|rest| !matches!(rest, TypedValue::Absent))
                    {
                        return Err(AppError::Abi(format!(
                            "{}: optional argument '{}' omitted before a later one",
                            endpoint.name, name
                        )));
                    }
                    break;
                }
            },
            AbiType::Variadic(inner) => {
                if let Some(value) = arg {
                    for item in list_items(value)? {
                        encoded.push(top_encode(registry, inner, item)?);
                    }
                }
            }
            AbiType::Multi(types) => {
                let value = arg.ok_or_else(|| missing_argument(&endpoint.name, name))?;
                let items = list_items(value)?;
                if items.len() != types.len() {
                    return Err(AppError::Abi(format!(
                        "{}: '{}' expects {} values",
                        endpoint.name,
                        name,
                        types.len()
                    )));
                }
                for (item_ty, item) in types.iter().zip(items) {
                    encoded.push(top_encode(registry, item_ty, item)?);
                }
            }
            _ => {
                let value = arg.ok_or_else(|| missing_argument(&endpoint.name, name))?;
                encoded.push(top_encode(registry, ty, value)?);
            }
        }
    }
    Ok(encoded)
}

/// Decodes the first declared output of `endpoint` from raw return data.
pub fn decode_first_output(
    registry: &AbiRegistry,
    endpoint: &str,
    data: &[Vec<u8>],
) -> Result<TypedValue> {
    let endpoint = registry.endpoint(endpoint)?;
    let Some(output) = endpoint.outputs.first() else {
        return Ok(TypedValue::Absent);
    };

    match output {
        AbiType::Variadic(inner) => match inner.as_ref() {
            AbiType::Multi(types) if !types.is_empty() => {
                let mut groups = Vec::with_capacity(data.len() / types.len());
                for chunk in data.chunks(types.len()) {
                    groups.push(decode_multi(registry, types, chunk)?);
                }
                Ok(TypedValue::List(groups))
            }
            inner => Ok(TypedValue::List(
                data.iter()
                    .map(|item| top_decode(registry, inner, item))
                    .collect::<Result<Vec<_>>>()?,
            )),
        },
        AbiType::Multi(types) => decode_multi(registry, types, data),
        AbiType::Optional(inner) => match data.first() {
            None => Ok(TypedValue::Absent),
            Some(bytes) => Ok(TypedValue::present(top_decode(registry, inner, bytes)?)),
        },
        ty => top_decode(registry, ty, data.first().map(Vec::as_slice).unwrap_or(&[])),
    }
}

/// `function@hex@hex` transaction payload.
pub fn call_data(function: &str, args: &[Vec<u8>]) -> String {
    let mut data = function.to_string();
    for arg in args {
        data.push('@');
        data.push_str(&hex::encode(arg));
    }
    data
}

fn decode_multi(registry: &AbiRegistry, types: &[AbiType], data: &[Vec<u8>]) -> Result<TypedValue> {
    let mut items = Vec::with_capacity(types.len());
    for (index, ty) in types.iter().enumerate() {
        let bytes = data.get(index).map(Vec::as_slice).unwrap_or(&[]);
        items.push(top_decode(registry, ty, bytes)?);
    }
    Ok(TypedValue::List(items))
}

pub fn top_encode(registry: &AbiRegistry, ty: &AbiType, value: &TypedValue) -> Result<Vec<u8>> {
    let encoded = match ty {
        AbiType::U8 => top_encode_to_vec_u8(&narrow::<u8>(value, ty)?),
        AbiType::U16 => top_encode_to_vec_u8(&narrow::<u16>(value, ty)?),
        AbiType::U32 => top_encode_to_vec_u8(&narrow::<u32>(value, ty)?),
        AbiType::Usize => top_encode_to_vec_u8(&(narrow::<u32>(value, ty)? as usize)),
        AbiType::U64 => top_encode_to_vec_u8(&narrow::<u64>(value, ty)?),
        AbiType::BigUint => top_encode_to_vec_u8(&numeric(value)?),
        AbiType::Bool => top_encode_to_vec_u8(&boolean(value)?),
        AbiType::Address => top_encode_to_vec_u8(&address_bytes(value)?),
        AbiType::Text | AbiType::Bytes => top_encode_to_vec_u8(&buffer(value)?),
        AbiType::H256 => top_encode_to_vec_u8(&fixed_32(value)?),
        AbiType::Custom(name) => {
            let def = registry.type_def(name)?;
            if def.is_fieldless_enum() {
                top_encode_to_vec_u8(&enum_discriminant(def, name, value)?)
            } else {
                return nested_to_vec(registry, ty, value);
            }
        }
        AbiType::Option(_) => {
            if value.clone().into_option().is_none() {
                return Ok(Vec::new());
            }
            return nested_to_vec(registry, ty, value);
        }
        AbiType::List(inner) => {
            let mut out = Vec::new();
            for item in list_items(value)? {
                nested_encode(registry, inner, item, &mut out)?;
            }
            return Ok(out);
        }
        AbiType::Tuple(_) => return nested_to_vec(registry, ty, value),
        AbiType::Optional(_) | AbiType::Variadic(_) | AbiType::Multi(_) => {
            return Err(AppError::Abi(
                "multi-value types are only valid as endpoint arguments".to_string(),
            ))
        }
    };
    encoded.map_err(encode_error)
}

fn nested_to_vec(registry: &AbiRegistry, ty: &AbiType, value: &TypedValue) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    nested_encode(registry, ty, value, &mut out)?;
    Ok(out)
}

pub fn nested_encode(
    registry: &AbiRegistry,
    ty: &AbiType,
    value: &TypedValue,
    out: &mut Vec<u8>,
) -> Result<()> {
    let written = match ty {
        AbiType::U8 => narrow::<u8>(value, ty)?.dep_encode(out),
        AbiType::U16 => narrow::<u16>(value, ty)?.dep_encode(out),
        AbiType::U32 => narrow::<u32>(value, ty)?.dep_encode(out),
        AbiType::Usize => (narrow::<u32>(value, ty)? as usize).dep_encode(out),
        AbiType::U64 => narrow::<u64>(value, ty)?.dep_encode(out),
        AbiType::BigUint => numeric(value)?.dep_encode(out),
        AbiType::Bool => boolean(value)?.dep_encode(out),
        AbiType::Address => address_bytes(value)?.dep_encode(out),
        AbiType::Text | AbiType::Bytes => buffer(value)?.dep_encode(out),
        AbiType::H256 => fixed_32(value)?.dep_encode(out),
        AbiType::Option(inner) => match value.clone().into_option() {
            None => false.dep_encode(out),
            Some(present) => {
                true.dep_encode(out).map_err(encode_error)?;
                return nested_encode(registry, inner, &present, out);
            }
        },
        AbiType::List(inner) => {
            let items = list_items(value)?;
            items.len().dep_encode(out).map_err(encode_error)?;
            for item in items {
                nested_encode(registry, inner, item, out)?;
            }
            return Ok(());
        }
        AbiType::Tuple(types) => {
            let items = list_items(value)?;
            if items.len() != types.len() {
                return Err(AppError::Abi(format!(
                    "tuple expects {} values, got {}",
                    types.len(),
                    items.len()
                )));
            }
            for (item_ty, item) in types.iter().zip(items) {
                nested_encode(registry, item_ty, item, out)?;
            }
            return Ok(());
        }
        AbiType::Custom(name) => {
            match registry.type_def(name)? {
                TypeDef::Struct(fields) => {
                    for (field, field_ty) in fields {
                        let field_value = value.field(field).ok_or_else(|| {
                            AppError::Abi(format!("{}: missing field '{}'", name, field))
                        })?;
                        nested_encode(registry, field_ty, field_value, out)?;
                    }
                }
                def @ TypeDef::Enum(_) => {
                    let discriminant = enum_discriminant(def, name, value)?;
                    discriminant.dep_encode(out).map_err(encode_error)?;
                    if let Some(variant) = def.variant_by_discriminant(discriminant) {
                        for (field, field_ty) in &variant.fields {
                            let field_value = value.field(field).ok_or_else(|| {
                                AppError::Abi(format!(
                                    "{}::{}: missing field '{}'",
                                    name, variant.name, field
                                ))
                            })?;
                            nested_encode(registry, field_ty, field_value, out)?;
                        }
                    }
                }
            }
            return Ok(());
        }
        AbiType::Optional(_) | AbiType::Variadic(_) | AbiType::Multi(_) => {
            return Err(AppError::Abi("multi-value types cannot be nested".to_string()))
        }
    };
    written.map_err(encode_error)
}

pub fn top_decode(registry: &AbiRegistry, ty: &AbiType, bytes: &[u8]) -> Result<TypedValue> {
    match ty {
        AbiType::U8 => number(u8::top_decode(bytes)),
        AbiType::U16 => number(u16::top_decode(bytes)),
        AbiType::U32 => number(u32::top_decode(bytes)),
        AbiType::Usize => number(usize::top_decode(bytes).map(|n| n as u64)),
        AbiType::U64 => number(u64::top_decode(bytes)),
        AbiType::BigUint => Ok(TypedValue::Numeric(
            BigUint::top_decode(bytes).map_err(decode_error)?,
        )),
        AbiType::Bool => Ok(TypedValue::Bool(bool::top_decode(bytes).map_err(decode_error)?)),
        AbiType::Address => {
            let raw = <[u8; 32]>::top_decode(bytes).map_err(decode_error)?;
            Ok(TypedValue::Address(Address::from_bytes(&raw)?.to_bech32()))
        }
        AbiType::Text => {
            let raw = Vec::<u8>::top_decode(bytes).map_err(decode_error)?;
            Ok(TypedValue::Text(String::from_utf8_lossy(&raw).into_owned()))
        }
        AbiType::Bytes => Ok(TypedValue::Bytes(
            Vec::<u8>::top_decode(bytes).map_err(decode_error)?,
        )),
        AbiType::H256 => Ok(TypedValue::Bytes(
            <[u8; 32]>::top_decode(bytes).map_err(decode_error)?.to_vec(),
        )),
        AbiType::Option(_) if bytes.is_empty() => Ok(TypedValue::Absent),
        AbiType::List(inner) => {
            let mut input = bytes;
            let mut items = Vec::new();
            while !input.is_empty() {
                items.push(nested_decode(registry, inner, &mut input)?);
            }
            Ok(TypedValue::List(items))
        }
        AbiType::Custom(name) if registry.type_def(name)?.is_fieldless_enum() => {
            let discriminant = u8::top_decode(bytes).map_err(decode_error)?;
            enum_value(registry.type_def(name)?, name, discriminant, Vec::new())
        }
        AbiType::Option(_) | AbiType::Custom(_) | AbiType::Tuple(_) => {
            let mut input = bytes;
            let value = nested_decode(registry, ty, &mut input)?;
            if !input.is_empty() {
                return Err(malformed(format!("{} trailing bytes", input.len())));
            }
            Ok(value)
        }
        AbiType::Optional(_) | AbiType::Variadic(_) | AbiType::Multi(_) => Err(AppError::Abi(
            "multi-value types are only valid as endpoint results".to_string(),
        )),
    }
}

pub fn nested_decode(
    registry: &AbiRegistry,
    ty: &AbiType,
    input: &mut &[u8],
) -> Result<TypedValue> {
    match ty {
        AbiType::U8 => number(u8::dep_decode(input)),
        AbiType::U16 => number(u16::dep_decode(input)),
        AbiType::U32 => number(u32::dep_decode(input)),
        AbiType::Usize => number(usize::dep_decode(input).map(|n| n as u64)),
        AbiType::U64 => number(u64::dep_decode(input)),
        AbiType::BigUint => Ok(TypedValue::Numeric(
            BigUint::dep_decode(input).map_err(decode_error)?,
        )),
        AbiType::Bool => Ok(TypedValue::Bool(bool::dep_decode(input).map_err(decode_error)?)),
        AbiType::Address => {
            let raw = <[u8; 32]>::dep_decode(input).map_err(decode_error)?;
            Ok(TypedValue::Address(Address::from_bytes(&raw)?.to_bech32()))
        }
        AbiType::Text => {
            let raw = Vec::<u8>::dep_decode(input).map_err(decode_error)?;
            Ok(TypedValue::Text(String::from_utf8_lossy(&raw).into_owned()))
        }
        AbiType::Bytes => Ok(TypedValue::Bytes(
            Vec::<u8>::dep_decode(input).map_err(decode_error)?,
        )),
        AbiType::H256 => Ok(TypedValue::Bytes(
            <[u8; 32]>::dep_decode(input).map_err(decode_error)?.to_vec(),
        )),
        AbiType::Option(inner) => {
            if bool::dep_decode(input).map_err(decode_error)? {
                Ok(TypedValue::present(nested_decode(registry, inner, input)?))
            } else {
                Ok(TypedValue::Absent)
            }
        }
        AbiType::List(inner) => {
            let count = usize::dep_decode(input).map_err(decode_error)?;
            let mut items = Vec::with_capacity(count.min(input.len()));
            for _ in 0..count {
                items.push(nested_decode(registry, inner, input)?);
            }
            Ok(TypedValue::List(items))
        }
        AbiType::Tuple(types) => Ok(TypedValue::List(
            types
                .iter()
                .map(|item_ty| nested_decode(registry, item_ty, input))
                .collect::<Result<Vec<_>>>()?,
        )),
        AbiType::Custom(name) => match registry.type_def(name)? {
            TypeDef::Struct(fields) => {
                let mut decoded = Vec::with_capacity(fields.len());
                for (field, field_ty) in fields {
                    decoded.push((field.clone(), nested_decode(registry, field_ty, input)?));
                }
                Ok(TypedValue::Struct(decoded))
            }
            def @ TypeDef::Enum(_) => {
                let discriminant = u8::dep_decode(input).map_err(decode_error)?;
                let variant = def.variant_by_discriminant(discriminant).ok_or_else(|| {
                    malformed(format!("{}: unknown discriminant {}", name, discriminant))
                })?;
                let mut decoded = Vec::with_capacity(variant.fields.len());
                for (field, field_ty) in &variant.fields {
                    decoded.push((field.clone(), nested_decode(registry, field_ty, input)?));
                }
                enum_value(def, name, discriminant, decoded)
            }
        },
        AbiType::Optional(_) | AbiType::Variadic(_) | AbiType::Multi(_) => Err(AppError::Abi(
            "multi-value types cannot be nested".to_string(),
        )),
    }
}

fn number<T: Into<u64>>(decoded: std::result::Result<T, DecodeError>) -> Result<TypedValue> {
    decoded
        .map(|n| TypedValue::u64(n.into()))
        .map_err(decode_error)
}

fn decode_error(err: DecodeError) -> AppError {
    malformed(String::from_utf8_lossy(err.message_bytes()).into_owned())
}

fn encode_error(err: EncodeError) -> AppError {
    AppError::Abi(format!(
        "encode error: {}",
        String::from_utf8_lossy(err.message_bytes())
    ))
}

fn malformed(message: String) -> AppError {
    AppError::ContractQueryFailed(format!("decode error: {}", message))
}

fn missing_argument(endpoint: &str, name: &str) -> AppError {
    AppError::Abi(format!("{}: missing argument '{}'", endpoint, name))
}

fn unexpected(expected: &str, value: &TypedValue) -> AppError {
    AppError::Abi(format!("expected {} value, got {}", expected, value.kind()))
}

fn numeric(value: &TypedValue) -> Result<BigUint> {
    match value {
        TypedValue::Numeric(n) => Ok(n.clone()),
        TypedValue::Present(inner) => numeric(inner),
        TypedValue::Bool(b) => Ok(BigUint::from(u8::from(*b))),
        other => Err(unexpected("numeric", other)),
    }
}

/// Numeric value converted to the ABI integer type, rejecting overflow.
fn narrow<T: TryFrom<u64>>(value: &TypedValue, ty: &AbiType) -> Result<T> {
    let number = numeric(value)?;
    number
        .to_u64()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| AppError::Abi(format!("{} does not fit in {:?}", number, ty)))
}

fn boolean(value: &TypedValue) -> Result<bool> {
    match value {
        TypedValue::Bool(b) => Ok(*b),
        TypedValue::Present(inner) => boolean(inner),
        other => Err(unexpected("bool", other)),
    }
}

fn address_bytes(value: &TypedValue) -> Result<[u8; 32]> {
    let address = match value {
        TypedValue::Address(bech32) | TypedValue::Text(bech32) => Address::from_bech32(bech32)?,
        TypedValue::Bytes(bytes) => Address::from_bytes(bytes)?,
        TypedValue::Present(inner) => return address_bytes(inner),
        other => return Err(unexpected("address", other)),
    };
    let mut raw = [0u8; 32];
    raw.copy_from_slice(address.as_bytes());
    Ok(raw)
}

fn buffer(value: &TypedValue) -> Result<Vec<u8>> {
    match value {
        TypedValue::Text(text) => Ok(text.as_bytes().to_vec()),
        TypedValue::Bytes(bytes) => Ok(bytes.clone()),
        TypedValue::Present(inner) => buffer(inner),
        other => Err(unexpected("byte string", other)),
    }
}

fn fixed_32(value: &TypedValue) -> Result<[u8; 32]> {
    let bytes = buffer(value)?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| AppError::Abi(format!("H256 needs 32 bytes, got {}", bytes.len())))
}

fn list_items(value: &TypedValue) -> Result<&[TypedValue]> {
    match value {
        TypedValue::List(items) => Ok(items),
        TypedValue::Present(inner) => list_items(inner),
        other => Err(unexpected("list", other)),
    }
}

fn enum_discriminant(def: &TypeDef, name: &str, value: &TypedValue) -> Result<u8> {
    match value {
        TypedValue::Enum {
            name: variant,
            discriminant,
            ..
        } => {
            if variant.is_empty() {
                return def
                    .variant_by_discriminant(*discriminant)
                    .map(|v| v.discriminant)
                    .ok_or_else(|| {
                        AppError::Abi(format!("{}: unknown discriminant {}", name, discriminant))
                    });
            }
            def.variant_by_name(variant)
                .map(|v| v.discriminant)
                .ok_or_else(|| AppError::Abi(format!("{}: unknown variant '{}'", name, variant)))
        }
        TypedValue::Present(inner) => enum_discriminant(def, name, inner),
        other => Err(unexpected("enum", other)),
    }
}

fn enum_value(
    def: &TypeDef,
    name: &str,
    discriminant: u8,
    fields: Vec<(String, TypedValue)>,
) -> Result<TypedValue> {
    let variant = def
        .variant_by_discriminant(discriminant)
        .ok_or_else(|| malformed(format!("{}: unknown discriminant {}", name, discriminant)))?;
    Ok(TypedValue::Enum {
        discriminant,
        name: variant.name.clone(),
        fields,
    })
}
