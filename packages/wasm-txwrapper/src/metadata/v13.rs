//! V12/V13 metadata containers
//!
//! V12 and V13 share one layout; V13 only adds the `NMap` storage entry, which
//! a V12 blob never produces, so both decode through the same structs.

use super::{CallParam, CallSpec, ConstantSpec, ExtrinsicInfo, ModuleSpec, SignedExtensionInfo};
use crate::metadata::TypeRef;
use parity_scale_codec::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RuntimeMetadataV13 {
    pub modules: Vec<ModuleMetadata>,
    pub extrinsic: ExtrinsicMetadata,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ModuleMetadata {
    pub name: String,
    pub storage: Option<StorageMetadata>,
    pub calls: Option<Vec<FunctionMetadata>>,
    pub events: Option<Vec<EventMetadata>>,
    pub constants: Vec<ModuleConstantMetadata>,
    pub errors: Vec<ErrorMetadata>,
    pub index: u8,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct StorageMetadata {
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct StorageEntryMetadata {
    pub name: String,
    pub modifier: StorageEntryModifier,
    pub ty: StorageEntryType,
    pub default: Vec<u8>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum StorageEntryModifier {
    Optional,
    Default,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum StorageEntryType {
    Plain(String),
    Map {
        hasher: StorageHasher,
        key: String,
        value: String,
        unused: bool,
    },
    DoubleMap {
        hasher: StorageHasher,
        key1: String,
        key2: String,
        value: String,
        key2_hasher: StorageHasher,
    },
    NMap {
        keys: Vec<String>,
        hashers: Vec<StorageHasher>,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct FunctionMetadata {
    pub name: String,
    pub arguments: Vec<FunctionArgumentMetadata>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct FunctionArgumentMetadata {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct EventMetadata {
    pub name: String,
    pub arguments: Vec<String>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ModuleConstantMetadata {
    pub name: String,
    pub ty: String,
    pub value: Vec<u8>,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ErrorMetadata {
    pub name: String,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ExtrinsicMetadata {
    pub version: u8,
    pub signed_extensions: Vec<String>,
}

impl RuntimeMetadataV13 {
    pub(crate) fn module_specs(&self) -> Vec<ModuleSpec> {
        self.modules
            .iter()
            .map(|module| {
                let calls = module
                    .calls
                    .iter()
                    .flatten()
                    .enumerate()
                    .map(|(call_index, call)| CallSpec {
                        module: module.name.clone(),
                        name: call.name.clone(),
                        module_index: module.index,
                        call_index: call_index as u8,
                        params: call
                            .arguments
                            .iter()
                            .map(|arg| CallParam {
                                name: arg.name.clone(),
                                ty: TypeRef::named(arg.ty.clone()),
                                type_name: arg.ty.clone(),
                            })
                            .collect(),
                    })
                    .collect();
                let constants = module
                    .constants
                    .iter()
                    .map(|c| ConstantSpec {
                        name: c.name.clone(),
                        ty: TypeRef::named(c.ty.clone()),
                        value: c.value.clone(),
                    })
                    .collect();
                ModuleSpec {
                    name: module.name.clone(),
                    index: module.index,
                    calls,
                    constants,
                }
            })
            .collect()
    }

    pub(crate) fn extrinsic_info(&self) -> ExtrinsicInfo {
        ExtrinsicInfo {
            version: self.extrinsic.version,
            signed_extensions: self
                .extrinsic
                .signed_extensions
                .iter()
                .map(|identifier| SignedExtensionInfo {
                    identifier: identifier.clone(),
                    ty: None,
                    additional_signed: None,
                })
                .collect(),
            address_ty: TypeRef::named("Address"),
            signature_ty: TypeRef::named("ExtrinsicSignature"),
            call_ty: TypeRef::named("Call"),
        }
    }
}
