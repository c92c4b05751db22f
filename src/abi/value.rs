use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

/// Decoded contract value, tagged by ABI shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// `Option` none, or a value the contract did not return at all.
    Absent,
    Present(Box<TypedValue>),
    Numeric(BigUint),
    Bool(bool),
    /// Bech32 form.
    Address(String),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<TypedValue>),
    Struct(Vec<(String, TypedValue)>),
    Enum {
        discriminant: u8,
        name: String,
        fields: Vec<(String, TypedValue)>,
    },
}

impl TypedValue {
    pub fn u64(value: u64) -> Self {
        TypedValue::Numeric(BigUint::from(value))
    }

    pub fn present(value: TypedValue) -> Self {
        TypedValue::Present(Box::new(value))
    }

    pub fn optional(value: Option<TypedValue>) -> Self {
        value.map(TypedValue::present).unwrap_or(TypedValue::Absent)
    }

    /// Fieldless enum variant; the discriminant is resolved from the ABI when encoding.
    pub fn variant(name: &str) -> Self {
        TypedValue::Enum {
            discriminant: 0,
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Absent => "absent",
            TypedValue::Present(_) => "present",
            TypedValue::Numeric(_) => "numeric",
            TypedValue::Bool(_) => "bool",
            TypedValue::Address(_) => "address",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::Text(_) => "text",
            TypedValue::List(_) => "list",
            TypedValue::Struct(_) => "struct",
            TypedValue::Enum { .. } => "enum",
        }
    }

    /// Looks up a struct (or enum variant) field by name.
    pub fn field(&self, name: &str) -> Option<&TypedValue> {
        let fields = match self {
            TypedValue::Struct(fields) => fields,
            TypedValue::Enum { fields, .. } => fields,
            TypedValue::Present(inner) => return inner.field(name),
            _ => return None,
        };
        fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }

    /// Strips one `Present` layer; `Absent` maps to `None`.
    pub fn into_option(self) -> Option<TypedValue> {
        match self {
            TypedValue::Absent => None,
            TypedValue::Present(inner) => Some(*inner),
            other => Some(other),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {0} does not fit in {1}")]
    Overflow(String, &'static str),
}

fn unexpected(expected: &'static str, found: &TypedValue) -> ValueError {
    ValueError::UnexpectedKind {
        expected,
        found: found.kind(),
    }
}

/// Number as u64; absent is 0.
pub fn unwrap_u64(value: Option<&TypedValue>) -> Result<u64, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(0),
        Some(TypedValue::Present(inner)) => unwrap_u64(Some(inner.as_ref())),
        Some(TypedValue::Numeric(n)) => n
            .to_u64()
            .ok_or_else(|| ValueError::Overflow(n.to_string(), "u64")),
        Some(TypedValue::Enum { discriminant, .. }) => Ok(u64::from(*discriminant)),
        Some(other) => Err(unexpected("numeric", other)),
    }
}

pub fn unwrap_u8(value: Option<&TypedValue>) -> Result<u8, ValueError> {
    let wide = unwrap_u64(value)?;
    u8::try_from(wide).map_err(|_| ValueError::Overflow(wide.to_string(), "u8"))
}

/// Big unsigned amount; absent is 0.
pub fn unwrap_biguint(value: Option<&TypedValue>) -> Result<BigUint, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(BigUint::zero()),
        Some(TypedValue::Present(inner)) => unwrap_biguint(Some(inner.as_ref())),
        Some(TypedValue::Numeric(n)) => Ok(n.clone()),
        Some(other) => Err(unexpected("numeric", other)),
    }
}

/// `Option<u64>` cap: absent stays `None` rather than becoming 0.
pub fn unwrap_optional_u64(value: Option<&TypedValue>) -> Result<Option<u64>, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(None),
        Some(TypedValue::Present(inner)) => unwrap_u64(Some(inner.as_ref())).map(Some),
        Some(numeric @ TypedValue::Numeric(_)) => unwrap_u64(Some(numeric)).map(Some),
        Some(other) => Err(unexpected("optional numeric", other)),
    }
}

pub fn unwrap_bool(value: Option<&TypedValue>) -> Result<bool, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(false),
        Some(TypedValue::Present(inner)) => unwrap_bool(Some(inner.as_ref())),
        Some(TypedValue::Bool(b)) => Ok(*b),
        Some(other) => Err(unexpected("bool", other)),
    }
}

/// Bech32 address; absent is the empty string.
pub fn unwrap_address(value: Option<&TypedValue>) -> Result<String, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(String::new()),
        Some(TypedValue::Present(inner)) => unwrap_address(Some(inner.as_ref())),
        Some(TypedValue::Address(address)) | Some(TypedValue::Text(address)) => {
            Ok(address.clone())
        }
        Some(other) => Err(unexpected("address", other)),
    }
}

/// Byte string as text. Text passes through, bytes (or a list of byte values) are
/// UTF-8 decoded, absence yields `default`.
pub fn unwrap_text(value: Option<&TypedValue>, default: &str) -> Result<String, ValueError> {
    match value {
        None | Some(TypedValue::Absent) => Ok(default.to_string()),
        Some(TypedValue::Present(inner)) => unwrap_text(Some(inner.as_ref()), default),
        Some(TypedValue::Text(text)) => Ok(text.clone()),
        Some(TypedValue::Bytes(bytes)) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Some(TypedValue::List(items)) => {
            let bytes = items
                .iter()
                .map(|item| unwrap_u8(Some(item)))
                .collect::<Result<Vec<u8>, _>>()?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(other) => Err(unexpected("byte string", other)),
    }
}

/// List of numeric ids (`List<u64>` or `variadic<u64>`); absent is empty.
pub fn unwrap_id_list(value: &TypedValue) -> Result<Vec<u64>, ValueError> {
    match value {
        TypedValue::Absent => Ok(Vec::new()),
        TypedValue::Present(inner) => unwrap_id_list(inner),
        TypedValue::List(items) => items.iter().map(|item| unwrap_u64(Some(item))).collect(),
        numeric @ TypedValue::Numeric(_) => Ok(vec![unwrap_u64(Some(numeric))?]),
        other => Err(unexpected("list", other)),
    }
}
