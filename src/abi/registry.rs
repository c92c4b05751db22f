use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::types::AbiType;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct AbiJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Vec<EndpointJson>,
    #[serde(default)]
    types: BTreeMap<String, TypeDefJson>,
}

#[derive(Debug, Deserialize)]
struct EndpointJson {
    name: String,
    #[serde(default)]
    mutability: Option<String>,
    #[serde(default, rename = "payableInTokens")]
    payable_in_tokens: Vec<String>,
    #[serde(default)]
    inputs: Vec<ParamJson>,
    #[serde(default)]
    outputs: Vec<OutputJson>,
}

#[derive(Debug, Deserialize)]
struct ParamJson {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug, Deserialize)]
struct OutputJson {
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug, Deserialize)]
struct TypeDefJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    fields: Vec<ParamJson>,
    #[serde(default)]
    variants: Vec<VariantJson>,
}

#[derive(Debug, Deserialize)]
struct VariantJson {
    name: String,
    discriminant: u8,
    #[serde(default)]
    fields: Vec<ParamJson>,
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub readonly: bool,
    pub payable: bool,
    pub inputs: Vec<(String, AbiType)>,
    pub outputs: Vec<AbiType>,
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub discriminant: u8,
    pub fields: Vec<(String, AbiType)>,
}

#[derive(Debug, Clone)]
pub enum TypeDef {
    Struct(Vec<(String, AbiType)>),
    Enum(Vec<EnumVariant>),
}

impl TypeDef {
    pub fn variant_by_name(&self, name: &str) -> Option<&EnumVariant> {
        match self {
            TypeDef::Enum(variants) => variants.iter().find(|v| v.name == name),
            TypeDef::Struct(_) => None,
        }
    }

    pub fn variant_by_discriminant(&self, discriminant: u8) -> Option<&EnumVariant> {
        match self {
            TypeDef::Enum(variants) => variants.iter().find(|v| v.discriminant == discriminant),
            TypeDef::Struct(_) => None,
        }
    }

    pub fn is_fieldless_enum(&self) -> bool {
        match self {
            TypeDef::Enum(variants) => variants.iter().all(|v| v.fields.is_empty()),
            TypeDef::Struct(_) => false,
        }
    }
}

/// Endpoint and type registry parsed from a contract ABI artifact.
#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
    pub name: String,
    endpoints: HashMap<String, Endpoint>,
    types: HashMap<String, TypeDef>,
}

impl AbiRegistry {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: AbiJson = serde_json::from_str(raw)
            .map_err(|e| AppError::Abi(format!("invalid ABI JSON: {}", e)))?;

        let mut endpoints = HashMap::with_capacity(parsed.endpoints.len());
        for endpoint in parsed.endpoints {
            let inputs = parse_params(&endpoint.inputs)?;
            let outputs = endpoint
                .outputs
                .iter()
                .map(|output| output.type_name.parse::<AbiType>())
                .collect::<Result<Vec<_>>>()?;
            let readonly = endpoint
                .mutability
                .as_deref()
                .map(|m| m.eq_ignore_ascii_case("readonly"))
                .unwrap_or(false);

            endpoints.insert(
                endpoint.name.clone(),
                Endpoint {
                    name: endpoint.name,
                    readonly,
                    payable: !endpoint.payable_in_tokens.is_empty(),
                    inputs,
                    outputs,
                },
            );
        }

        let mut types = HashMap::with_capacity(parsed.types.len());
        for (name, def) in parsed.types {
            let type_def = match def.kind.as_str() {
                "struct" => TypeDef::Struct(parse_params(&def.fields)?),
                "enum" | "explicit-enum" => TypeDef::Enum(
                    def.variants
                        .iter()
                        .map(|variant| {
                            Ok(EnumVariant {
                                name: variant.name.clone(),
                                discriminant: variant.discriminant,
                                fields: parse_params(&variant.fields)?,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                other => {
                    return Err(AppError::Abi(format!(
                        "type '{}' has unsupported kind '{}'",
                        name, other
                    )))
                }
            };
            types.insert(name, type_def);
        }

        Ok(Self {
            name: parsed.name.unwrap_or_default(),
            endpoints,
            types,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Abi(format!("ABI file not found at {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn endpoint(&self, name: &str) -> Result<&Endpoint> {
        self.endpoints
            .get(name)
            .ok_or_else(|| AppError::Abi(format!("endpoint '{}' is not declared in the ABI", name)))
    }

    pub fn type_def(&self, name: &str) -> Result<&TypeDef> {
        self.types
            .get(name)
            .ok_or_else(|| AppError::Abi(format!("type '{}' is not declared in the ABI", name)))
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

fn parse_params(params: &[ParamJson]) -> Result<Vec<(String, AbiType)>> {
    params
        .iter()
        .map(|param| Ok((param.name.clone(), param.type_name.parse::<AbiType>()?)))
        .collect()
}
