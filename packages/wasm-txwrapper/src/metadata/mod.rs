//! Runtime metadata registry
//!
//! Parses a metadata blob once and answers the questions the builder and the
//! decoder ask: what shape does a type have, which call lives at a given
//! module/call index, which signed extensions does the runtime declare.
//!
//! Supported blob versions: 12 and 13 (type names as Rust expressions) and 14
//! (portable type registry).

mod descriptor;
pub(crate) mod legacy;
pub mod v13;
pub mod v14;

pub use descriptor::{Field, Primitive, TypeDescriptor, TypeRef, Variant};

use crate::address::{NetworkRegistry, SUBSTRATE_SS58_FORMAT};
use crate::codec::{self, decode_compact, TypeResolver};
use crate::error::TxWrapperError;
use legacy::LegacyTypes;
use parity_scale_codec::Decode;
use scale_info::PortableRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// `b"meta"` read as a little-endian u32
pub const META_RESERVED: u32 = 0x6174_656d;

/// Configuration for [`Registry::build`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryOptions {
    /// Overrides the chain's `System.SS58Prefix` constant
    #[serde(default)]
    pub ss58_prefix: Option<u16>,
    /// Legacy type definitions in polkadot.js JSON form
    #[serde(default)]
    pub types: Map<String, JsonValue>,
    /// Extra SS58 prefixes accepted when decoding addresses
    #[serde(default)]
    pub networks: BTreeMap<u16, String>,
}

/// One call parameter in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParam {
    pub name: String,
    #[serde(skip)]
    pub ty: TypeRef,
    /// Type as spelled in metadata
    pub type_name: String,
}

/// A dispatchable call and where it sits in the runtime's call enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSpec {
    pub module: String,
    pub name: String,
    pub module_index: u8,
    pub call_index: u8,
    pub params: Vec<CallParam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantSpec {
    pub name: String,
    pub ty: TypeRef,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: String,
    pub index: u8,
    pub calls: Vec<CallSpec>,
    pub constants: Vec<ConstantSpec>,
}

/// A signed extension declared by the runtime
///
/// Legacy metadata only carries the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtensionInfo {
    pub identifier: String,
    pub ty: Option<TypeRef>,
    pub additional_signed: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicInfo {
    pub version: u8,
    pub signed_extensions: Vec<SignedExtensionInfo>,
    pub address_ty: TypeRef,
    pub signature_ty: TypeRef,
    pub call_ty: TypeRef,
}

#[derive(Debug)]
enum TypeSource {
    Legacy(LegacyTypes),
    Portable(PortableRegistry),
}

/// Parsed runtime metadata
///
/// Immutable after [`Registry::build`]. Descriptors are resolved on first use
/// and cached; the cache is never observable.
#[derive(Debug)]
pub struct Registry {
    version: u8,
    types: TypeSource,
    modules: Vec<ModuleSpec>,
    extrinsic: ExtrinsicInfo,
    ss58_prefix: u16,
    networks: NetworkRegistry,
    cache: RwLock<HashMap<TypeRef, Arc<TypeDescriptor>>>,
}

/// Lowercase with underscores removed, so `transfer_keep_alive` matches `transferKeepAlive`
pub(crate) fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strip the optional compact length prefix and check the magic
fn metadata_body(bytes: &[u8]) -> Result<&[u8], TxWrapperError> {
    let has_magic = |b: &[u8]| b.len() >= 5 && b[..4] == META_RESERVED.to_le_bytes();
    if has_magic(bytes) {
        return Ok(bytes);
    }
    if let Ok((len, prefix)) = decode_compact(bytes) {
        let body = &bytes[prefix..];
        if has_magic(body) && len == body.len() as u128 {
            return Ok(body);
        }
    }
    Err(TxWrapperError::InvalidMetadata(
        "missing metadata magic".to_string(),
    ))
}

impl Registry {
    /// Parse a metadata blob
    pub fn build(bytes: &[u8], options: RegistryOptions) -> Result<Self, TxWrapperError> {
        let body = metadata_body(bytes)?;
        let version = body[4];
        let mut payload = &body[5..];

        let (types, modules, extrinsic) = match version {
            12 | 13 => {
                let metadata = v13::RuntimeMetadataV13::decode(&mut payload)?;
                let modules = metadata.module_specs();
                let types = LegacyTypes::new(&modules, &options.types)?;
                (TypeSource::Legacy(types), modules, metadata.extrinsic_info())
            }
            14 => {
                let metadata = v14::RuntimeMetadataV14::decode(&mut payload)?;
                let modules = metadata.module_specs()?;
                let extrinsic = metadata.extrinsic_info()?;
                (TypeSource::Portable(metadata.types), modules, extrinsic)
            }
            v => return Err(TxWrapperError::UnsupportedMetadataVersion(v)),
        };

        let mut networks = NetworkRegistry::default();
        for (prefix, name) in &options.networks {
            networks.register(*prefix, name.clone());
        }

        let mut registry = Registry {
            version,
            types,
            modules,
            extrinsic,
            ss58_prefix: SUBSTRATE_SS58_FORMAT,
            networks,
            cache: RwLock::new(HashMap::new()),
        };

        registry.ss58_prefix = match options.ss58_prefix {
            Some(prefix) => prefix,
            None => registry.chain_ss58_prefix().unwrap_or(SUBSTRATE_SS58_FORMAT),
        };
        if !registry.networks.is_registered(registry.ss58_prefix) {
            registry
                .networks
                .register(registry.ss58_prefix, "runtime".to_string());
        }

        tracing::debug!(
            version,
            modules = registry.modules.len(),
            signed_extensions = registry.extrinsic.signed_extensions.len(),
            ss58_prefix = registry.ss58_prefix,
            "Built metadata registry"
        );
        Ok(registry)
    }

    /// Parse a `0x`-prefixed hex metadata blob, as returned by `state_getMetadata`
    pub fn from_hex(hex_str: &str, options: RegistryOptions) -> Result<Self, TxWrapperError> {
        let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?;
        Registry::build(&bytes, options)
    }

    /// `System.SS58Prefix`, when the runtime declares it
    fn chain_ss58_prefix(&self) -> Option<u16> {
        let constant = self
            .modules
            .iter()
            .find(|m| m.name == "System")?
            .constants
            .iter()
            .find(|c| c.name == "SS58Prefix")?;
        let desc = self.resolve(&constant.ty).ok()?;
        let (value, _) = codec::decode(&constant.value, &desc, self).ok()?;
        value.as_u128().and_then(|v| u16::try_from(v).ok())
    }

    pub fn metadata_version(&self) -> u8 {
        self.version
    }

    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }

    pub fn extrinsic(&self) -> &ExtrinsicInfo {
        &self.extrinsic
    }

    pub fn ss58_prefix(&self) -> u16 {
        self.ss58_prefix
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Descriptor for a type by name
    ///
    /// Legacy registries parse the name as a type expression. Portable
    /// registries accept primitive names and the last path segment of a
    /// uniquely named type (`MultiAddress`, `AccountId32`).
    pub fn resolve_type(&self, name: &str) -> Result<Arc<TypeDescriptor>, TxWrapperError> {
        match &self.types {
            TypeSource::Legacy(_) => self.resolve(&TypeRef::named(name)),
            TypeSource::Portable(types) => match Primitive::from_name(name) {
                Some(primitive) if name != "AccountId" && name != "AccountId32" => {
                    Ok(Arc::new(TypeDescriptor::Primitive(primitive)))
                }
                _ => self.resolve(&TypeRef::Id(v14::find_by_name(types, name)?)),
            },
        }
    }

    fn find_module(&self, module: &str) -> Result<&ModuleSpec, TxWrapperError> {
        let folded = fold_name(module);
        self.modules
            .iter()
            .find(|m| fold_name(&m.name) == folded)
            .ok_or_else(|| TxWrapperError::UnknownType(format!("module {}", module)))
    }

    /// Look up a call by module and call name
    pub fn resolve_call(&self, module: &str, call: &str) -> Result<&CallSpec, TxWrapperError> {
        let spec = self.find_module(module)?;
        let folded = fold_name(call);
        spec.calls
            .iter()
            .find(|c| fold_name(&c.name) == folded)
            .ok_or_else(|| TxWrapperError::UnknownType(format!("call {}.{}", spec.name, call)))
    }

    /// Look up a call by its wire indices
    pub fn call_by_index(
        &self,
        module_index: u8,
        call_index: u8,
    ) -> Result<&CallSpec, TxWrapperError> {
        let module = self
            .modules
            .iter()
            .find(|m| m.index == module_index && !m.calls.is_empty())
            .ok_or_else(|| TxWrapperError::UnknownVariant {
                ty: "Call".to_string(),
                index: module_index,
            })?;
        module
            .calls
            .iter()
            .find(|c| c.call_index == call_index)
            .ok_or_else(|| TxWrapperError::UnknownVariant {
                ty: format!("{}Call", module.name),
                index: call_index,
            })
    }

    /// A module constant decoded with its declared type
    pub fn constant(&self, module: &str, name: &str) -> Result<crate::value::Value, TxWrapperError> {
        let spec = self.find_module(module)?;
        let constant = spec
            .constants
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TxWrapperError::UnknownType(format!("constant {}.{}", spec.name, name)))?;
        let desc = self.resolve(&constant.ty)?;
        Ok(codec::decode(&constant.value, &desc, self)?.0)
    }

    fn describe(&self, ty: &TypeRef) -> Result<TypeDescriptor, TxWrapperError> {
        match (&self.types, ty) {
            (TypeSource::Legacy(types), TypeRef::Named(name)) => types.resolve(name),
            (TypeSource::Portable(types), TypeRef::Id(id)) => v14::describe(types, *id),
            (TypeSource::Portable(types), TypeRef::Named(name)) => {
                v14::describe(types, v14::find_by_name(types, name)?)
            }
            (TypeSource::Legacy(_), TypeRef::Id(_)) => {
                Err(TxWrapperError::UnknownType(ty.to_string()))
            }
        }
    }
}

impl TypeResolver for Registry {
    fn resolve(&self, ty: &TypeRef) -> Result<Arc<TypeDescriptor>, TxWrapperError> {
        if let Some(hit) = self.cache.read().ok().and_then(|cache| cache.get(ty).cloned()) {
            return Ok(hit);
        }
        let desc = Arc::new(self.describe(ty)?);
        tracing::trace!(ty = %ty, kind = desc.kind(), "Resolved type");
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(ty.clone(), desc.clone());
        }
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{legacy_metadata, portable_metadata};
    use crate::value::Value;

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[test]
    fn test_legacy_registry() {
        let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
        assert_eq!(registry.metadata_version(), 13);
        assert_eq!(registry.extrinsic().version, 4);
        assert_eq!(registry.ss58_prefix(), 42);

        let transfer = registry.resolve_call("balances", "transfer").unwrap();
        assert_eq!(transfer.module, "Balances");
        assert_eq!((transfer.module_index, transfer.call_index), (5, 0));
        assert_eq!(transfer.params[0].name, "dest");

        let keep_alive = registry.resolve_call("Balances", "transferKeepAlive").unwrap();
        assert_eq!(keep_alive.name, "transfer_keep_alive");
        assert_eq!(registry.call_by_index(5, 3).unwrap().name, "transfer_keep_alive");

        assert_eq!(
            *registry.resolve_type("T::Balance").unwrap(),
            TypeDescriptor::Primitive(Primitive::U128)
        );
    }

    #[test]
    fn test_portable_registry() {
        let registry = Registry::build(&portable_metadata(), RegistryOptions::default()).unwrap();
        assert_eq!(registry.metadata_version(), 14);
        assert_eq!(registry.ss58_prefix(), 0);

        let transfer = registry.resolve_call("Balances", "transfer_keep_alive").unwrap();
        assert_eq!(transfer.params.len(), 2);
        assert_eq!(transfer.params[1].name, "value");

        assert_eq!(
            *registry.resolve_type("AccountId32").unwrap(),
            TypeDescriptor::Primitive(Primitive::AccountId32)
        );
        let address = registry.resolve(&registry.extrinsic().address_ty).unwrap();
        assert_eq!(address.variant_by_index(0).map(|v| v.name.as_str()), Some("Id"));
        assert_eq!(
            registry.extrinsic().signed_extensions[0].identifier,
            "CheckNonZeroSender"
        );
    }

    #[test]
    fn test_ss58_override_and_networks() {
        let options = RegistryOptions {
            ss58_prefix: Some(7),
            networks: BTreeMap::from([(1284, "moonbeam".to_string())]),
            ..Default::default()
        };
        let registry = Registry::build(&legacy_metadata(), options).unwrap();
        assert_eq!(registry.ss58_prefix(), 7);
        assert!(registry.networks().is_registered(7));
        assert!(registry.networks().is_registered(1284));
    }

    #[test]
    fn test_length_prefixed_blob() {
        let blob = legacy_metadata();
        let mut prefixed = codec::encode_compact(blob.len() as u128);
        prefixed.extend_from_slice(&blob);
        let registry = Registry::build(&prefixed, RegistryOptions::default()).unwrap();
        assert_eq!(registry.metadata_version(), 13);
    }

    #[test]
    fn test_rejects_bad_blobs() {
        assert!(matches!(
            Registry::build(b"nope", RegistryOptions::default()),
            Err(TxWrapperError::InvalidMetadata(_))
        ));
        assert_eq!(
            Registry::build(b"meta\x0b", RegistryOptions::default()).err(),
            Some(TxWrapperError::UnsupportedMetadataVersion(11))
        );
        assert_eq!(
            Registry::build(b"meta\x0f\x00", RegistryOptions::default()).err(),
            Some(TxWrapperError::UnsupportedMetadataVersion(15))
        );
        // Right magic, truncated body
        let blob = legacy_metadata();
        assert!(matches!(
            Registry::build(&blob[..blob.len() / 2], RegistryOptions::default()),
            Err(TxWrapperError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
        assert!(matches!(
            registry.resolve_call("Balances", "mint"),
            Err(TxWrapperError::UnknownType(_))
        ));
        assert_eq!(
            registry.call_by_index(99, 0).err(),
            Some(TxWrapperError::UnknownVariant {
                ty: "Call".to_string(),
                index: 99
            })
        );
        assert!(matches!(
            registry.resolve_type("Frobnicator"),
            Err(TxWrapperError::UnknownType(_))
        ));
    }

    #[test]
    fn test_constants() {
        let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
        assert_eq!(
            registry.constant("System", "SS58Prefix").unwrap(),
            Value::UInt(42)
        );
    }
}
