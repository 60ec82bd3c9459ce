//! Name-based type system for V12/V13 metadata
//!
//! Legacy metadata describes call arguments with Rust type expressions
//! (`Compact<T::Balance>`, `<T::Lookup as StaticLookup>::Source`). They are
//! normalized, parsed structurally, and resolved against three definition
//! tables, searched in order: caller overrides, the runtime's generated call
//! enums, and the built-in Substrate definitions.
//!
//! Definitions use the polkadot.js JSON shape: a string is an alias, an object
//! with `_enum` is an enum (array of unit variants or map of variant fields),
//! any other object is a struct with fields in declaration order.

use super::ModuleSpec;
use crate::error::TxWrapperError;
use crate::metadata::{Field, Primitive, TypeDescriptor, TypeRef, Variant};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

/// Longest alias chain followed before giving up
const MAX_ALIAS_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Definition {
    Alias(String),
    Shape(TypeDescriptor),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LegacyTypes {
    overrides: HashMap<String, Definition>,
    generated: HashMap<String, Definition>,
    builtins: HashMap<String, Definition>,
}

impl LegacyTypes {
    pub(crate) fn new(
        modules: &[ModuleSpec],
        overrides: &Map<String, JsonValue>,
    ) -> Result<Self, TxWrapperError> {
        let builtins = match builtin_definitions() {
            JsonValue::Object(map) => parse_definitions(&map)?,
            _ => HashMap::new(),
        };
        Ok(LegacyTypes {
            overrides: parse_definitions(overrides)?,
            generated: call_definitions(modules),
            builtins,
        })
    }

    pub(crate) fn resolve(&self, expr: &str) -> Result<TypeDescriptor, TxWrapperError> {
        self.resolve_depth(expr, 0)
    }

    fn lookup(&self, name: &str) -> Option<&Definition> {
        self.overrides
            .get(name)
            .or_else(|| self.generated.get(name))
            .or_else(|| self.builtins.get(name))
    }

    fn resolve_definition(
        &self,
        def: &Definition,
        depth: usize,
    ) -> Result<TypeDescriptor, TxWrapperError> {
        match def {
            Definition::Alias(target) => self.resolve_depth(target, depth + 1),
            Definition::Shape(desc) => Ok(desc.clone()),
        }
    }

    fn resolve_depth(&self, expr: &str, depth: usize) -> Result<TypeDescriptor, TxWrapperError> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(TxWrapperError::UnknownType(format!(
                "alias chain too deep at {}",
                expr
            )));
        }
        let name = normalize(expr);

        if name.is_empty() || name == "()" {
            return Ok(TypeDescriptor::unit());
        }
        if let Some(def) = self.lookup(&name) {
            return self.resolve_definition(def, depth);
        }
        if let Some(primitive) = Primitive::from_name(&name) {
            return Ok(TypeDescriptor::Primitive(primitive));
        }

        if let Some(inner) = name.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            return Ok(TypeDescriptor::Tuple(
                split_top_level(inner, ',')
                    .into_iter()
                    .map(TypeRef::named)
                    .collect(),
            ));
        }

        if let Some(inner) = name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let parts = split_top_level(inner, ';');
            if let [elem, len] = parts.as_slice() {
                let len = len
                    .parse::<usize>()
                    .map_err(|_| TxWrapperError::UnknownType(name.clone()))?;
                return Ok(TypeDescriptor::Array(TypeRef::named(*elem), len));
            }
            return Err(TxWrapperError::UnknownType(name));
        }

        if let (Some(open), true) = (name.find('<'), name.ends_with('>')) {
            let base = &name[..open];
            let args = split_top_level(&name[open + 1..name.len() - 1], ',');
            let arg = |i: usize| -> Result<TypeRef, TxWrapperError> {
                args.get(i)
                    .map(|a| TypeRef::named(*a))
                    .ok_or_else(|| TxWrapperError::UnknownType(name.clone()))
            };
            return match base {
                "Vec" | "BoundedVec" | "WeakBoundedVec" | "VecDeque" | "BTreeSet"
                | "BoundedBTreeSet" => Ok(TypeDescriptor::Sequence(arg(0)?)),
                "BTreeMap" | "BoundedBTreeMap" => {
                    let (key, value) = (arg(0)?, arg(1)?);
                    Ok(TypeDescriptor::Sequence(TypeRef::named(format!(
                        "({},{})",
                        key, value
                    ))))
                }
                "Option" => Ok(TypeDescriptor::Option(arg(0)?)),
                "Compact" => Ok(TypeDescriptor::Compact(arg(0)?)),
                "Box" => self.resolve_depth(args.first().copied().unwrap_or_default(), depth + 1),
                "Result" => Ok(TypeDescriptor::Enum(vec![
                    Variant {
                        name: "Ok".to_string(),
                        index: 0,
                        fields: vec![Field::unnamed(arg(0)?)],
                    },
                    Variant {
                        name: "Err".to_string(),
                        index: 1,
                        fields: vec![Field::unnamed(arg(1)?)],
                    },
                ])),
                "PhantomData" => Ok(TypeDescriptor::unit()),
                // Generic alias such as `BalanceOf<T>`
                _ => match self.lookup(base) {
                    Some(def) => self.resolve_definition(def, depth),
                    None => Err(TxWrapperError::UnknownType(name.clone())),
                },
            };
        }

        Err(TxWrapperError::UnknownType(name))
    }
}

/// Strip trait projections, `T::` prefixes and whitespace from a type expression
pub(crate) fn normalize(expr: &str) -> String {
    let mut s = expr.split_whitespace().collect::<Vec<_>>().join(" ");
    s = s.replace("<T::Lookup as StaticLookup>::Source", "LookupSource");
    s = s.replace("&'static [u8]", "Bytes").replace("&[u8]", "Bytes");

    // <T as Trait>::Name, <T as Trait<I>>::Name
    while let Some(start) = s.find("<T as ") {
        let Some(end) = matching_close(&s, start) else {
            break;
        };
        if !s[end + 1..].starts_with("::") {
            break;
        }
        s.replace_range(start..end + 3, "");
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s.as_str();
    while let Some(pos) = rest.find("T::") {
        let at_boundary = !rest[..pos].ends_with(|c: char| c.is_alphanumeric() || c == '_');
        out.push_str(&rest[..pos]);
        if !at_boundary {
            out.push_str("T::");
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    out.retain(|c| !c.is_whitespace());
    out
}

/// Index of the `>` closing the `<` at `open`
fn matching_close(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside of any brackets
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

fn parse_definitions(
    map: &Map<String, JsonValue>,
) -> Result<HashMap<String, Definition>, TxWrapperError> {
    map.iter()
        .map(|(name, def)| Ok((name.clone(), parse_definition(name, def)?)))
        .collect()
}

fn variant_index(name: &str, i: usize) -> Result<u8, TxWrapperError> {
    u8::try_from(i).map_err(|_| {
        TxWrapperError::InvalidInput(format!("{} has more than 256 variants", name))
    })
}

fn struct_fields(name: &str, map: &Map<String, JsonValue>) -> Result<Vec<Field>, TxWrapperError> {
    map.iter()
        .filter(|(field, _)| !field.starts_with('_'))
        .map(|(field, ty)| {
            let ty = ty.as_str().ok_or_else(|| {
                TxWrapperError::InvalidInput(format!(
                    "Field {}.{} must be a type name",
                    name, field
                ))
            })?;
            Ok(Field::named(field.clone(), TypeRef::named(ty)))
        })
        .collect()
}

pub(crate) fn parse_definition(name: &str, def: &JsonValue) -> Result<Definition, TxWrapperError> {
    match def {
        JsonValue::String(target) => Ok(Definition::Alias(target.clone())),
        JsonValue::Object(map) => match map.get("_enum") {
            Some(JsonValue::Array(items)) => {
                let variants = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let variant = item.as_str().ok_or_else(|| {
                            TxWrapperError::InvalidInput(format!(
                                "Variant {} of {} must be a name",
                                i, name
                            ))
                        })?;
                        Ok(Variant {
                            name: variant.to_string(),
                            index: variant_index(name, i)?,
                            fields: Vec::new(),
                        })
                    })
                    .collect::<Result<Vec<_>, TxWrapperError>>()?;
                Ok(Definition::Shape(TypeDescriptor::Enum(variants)))
            }
            Some(JsonValue::Object(variants)) => {
                let variants = variants
                    .iter()
                    .enumerate()
                    .map(|(i, (variant, fields))| {
                        let fields = match fields {
                            JsonValue::Null => Vec::new(),
                            JsonValue::String(ty) if ty == "Null" || ty == "()" => Vec::new(),
                            JsonValue::String(ty) => vec![Field::unnamed(TypeRef::named(ty.as_str()))],
                            JsonValue::Object(fields) => struct_fields(variant, fields)?,
                            _ => {
                                return Err(TxWrapperError::InvalidInput(format!(
                                    "Unsupported fields for {}::{}",
                                    name, variant
                                )))
                            }
                        };
                        Ok(Variant {
                            name: variant.clone(),
                            index: variant_index(name, i)?,
                            fields,
                        })
                    })
                    .collect::<Result<Vec<_>, TxWrapperError>>()?;
                Ok(Definition::Shape(TypeDescriptor::Enum(variants)))
            }
            Some(_) => Err(TxWrapperError::InvalidInput(format!(
                "Unsupported _enum shape for {}",
                name
            ))),
            None => Ok(Definition::Shape(TypeDescriptor::Struct(struct_fields(
                name, map,
            )?))),
        },
        _ => Err(TxWrapperError::InvalidInput(format!(
            "Unsupported type definition for {}",
            name
        ))),
    }
}

/// `<Module>Call` enum per module plus the outer `Call` enum
fn call_definitions(modules: &[ModuleSpec]) -> HashMap<String, Definition> {
    let mut defs = HashMap::new();
    let mut outer = Vec::new();
    for module in modules.iter().filter(|m| !m.calls.is_empty()) {
        let call_enum = format!("{}Call", module.name);
        let variants = module
            .calls
            .iter()
            .map(|call| Variant {
                name: call.name.clone(),
                index: call.call_index,
                fields: call
                    .params
                    .iter()
                    .map(|p| Field::named(p.name.clone(), p.ty.clone()))
                    .collect(),
            })
            .collect();
        defs.insert(
            call_enum.clone(),
            Definition::Shape(TypeDescriptor::Enum(variants)),
        );
        outer.push(Variant {
            name: module.name.clone(),
            index: module.index,
            fields: vec![Field::unnamed(TypeRef::named(call_enum))],
        });
    }
    defs.insert(
        "Call".to_string(),
        Definition::Shape(TypeDescriptor::Enum(outer)),
    );
    defs
}

/// Substrate runtime types common to legacy chains
fn builtin_definitions() -> JsonValue {
    json!({
        "Null": "()",
        "Bytes": "Vec<u8>",
        "H160": "[u8; 20]",
        "H256": "[u8; 32]",
        "H512": "[u8; 64]",
        "Hash": "H256",
        "CallHash": "Hash",
        "BlockHash": "Hash",
        "Balance": "u128",
        "BalanceOf": "Balance",
        "Index": "u32",
        "Nonce": "u32",
        "BlockNumber": "u32",
        "Moment": "u64",
        "Weight": "u64",
        "AccountIndex": "u32",
        "AccountIdOf": "AccountId",
        "AssetId": "u32",
        "EraIndex": "u32",
        "SessionIndex": "u32",
        "ReferendumIndex": "u32",
        "PropIndex": "u32",
        "ProposalIndex": "u32",
        "MemberCount": "u32",
        "Perbill": "u32",
        "Permill": "u32",
        "Percent": "u8",
        "Perquintill": "u64",
        "Key": "Bytes",
        "StorageKey": "Bytes",
        "StorageData": "Bytes",
        "KeyValue": "(StorageKey, StorageData)",
        "OpaqueCall": "Bytes",
        "RuntimeCall": "Call",
        "CallOf": "Call",
        "Address": "MultiAddress",
        "LookupSource": "MultiAddress",
        "MultiAddress": {
            "_enum": {
                "Id": "AccountId",
                "Index": "Compact<AccountIndex>",
                "Raw": "Bytes",
                "Address32": "H256",
                "Address20": "H160"
            }
        },
        "ExtrinsicSignature": "MultiSignature",
        "MultiSignature": {
            "_enum": {
                "Ed25519": "H512",
                "Sr25519": "H512",
                "Ecdsa": "[u8; 65]"
            }
        },
        "Timepoint": {
            "height": "BlockNumber",
            "index": "u32"
        },
        "ValidatorPrefs": {
            "commission": "Compact<Perbill>",
            "blocked": "bool"
        },
        "RewardDestination": {
            "_enum": {
                "Staked": "Null",
                "Stash": "Null",
                "Controller": "Null",
                "Account": "AccountId",
                "None": "Null"
            }
        },
        "Conviction": {
            "_enum": ["None", "Locked1x", "Locked2x", "Locked3x", "Locked4x", "Locked5x", "Locked6x"]
        },
        "ProxyType": {
            "_enum": ["Any", "NonTransfer", "Governance", "Staking"]
        }
    })
}
