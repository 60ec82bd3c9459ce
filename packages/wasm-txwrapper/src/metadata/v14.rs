//! V14 metadata containers over a portable `scale-info` registry
//!
//! Type references inside the containers are compact `u32` ids into
//! [`PortableRegistry`]; descriptors are produced on demand by [`describe`].

use super::{CallParam, CallSpec, ConstantSpec, ExtrinsicInfo, ModuleSpec, SignedExtensionInfo};
use crate::error::TxWrapperError;
use crate::metadata::{Field, Primitive, TypeDescriptor, TypeRef, Variant};
use parity_scale_codec::{Decode, Encode};
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, Type, TypeDef, TypeDefPrimitive};

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct RuntimeMetadataV14 {
    pub types: PortableRegistry,
    pub pallets: Vec<PalletMetadata>,
    pub extrinsic: ExtrinsicMetadata,
    #[codec(compact)]
    pub ty: u32,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct PalletMetadata {
    pub name: String,
    pub storage: Option<PalletStorageMetadata>,
    pub calls: Option<TypeId>,
    pub event: Option<TypeId>,
    pub constants: Vec<PalletConstantMetadata>,
    pub error: Option<TypeId>,
    pub index: u8,
}

/// Reference into the portable registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct TypeId {
    #[codec(compact)]
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct PalletStorageMetadata {
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct StorageEntryMetadata {
    pub name: String,
    pub modifier: StorageEntryModifier,
    pub ty: StorageEntryType,
    pub default: Vec<u8>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum StorageEntryModifier {
    Optional,
    Default,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum StorageEntryType {
    Plain(TypeId),
    Map {
        hashers: Vec<StorageHasher>,
        key: TypeId,
        value: TypeId,
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
pub struct PalletConstantMetadata {
    pub name: String,
    pub ty: TypeId,
    pub value: Vec<u8>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ExtrinsicMetadata {
    pub ty: TypeId,
    pub version: u8,
    pub signed_extensions: Vec<SignedExtensionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SignedExtensionMetadata {
    pub identifier: String,
    pub ty: TypeId,
    pub additional_signed: TypeId,
}

fn lookup(types: &PortableRegistry, id: u32) -> Result<&Type<PortableForm>, TxWrapperError> {
    types
        .resolve(id)
        .ok_or_else(|| TxWrapperError::UnknownType(format!("#{}", id)))
}

/// Last path segment of a registry type (`MultiAddress`, `AccountId32`...)
pub(crate) fn type_name(ty: &Type<PortableForm>) -> Option<&str> {
    ty.path.segments.last().map(|s| s.as_str())
}

fn fields(fields: &[scale_info::Field<PortableForm>]) -> Vec<Field> {
    fields
        .iter()
        .map(|f| Field {
            name: f.name.clone(),
            ty: TypeRef::Id(f.ty.id),
        })
        .collect()
}

/// One-level descriptor for registry type `id`
pub(crate) fn describe(types: &PortableRegistry, id: u32) -> Result<TypeDescriptor, TxWrapperError> {
    let ty = lookup(types, id)?;

    // Account ids render as SS58, so keep them distinct from plain byte arrays
    if type_name(ty) == Some("AccountId32") {
        return Ok(TypeDescriptor::Primitive(Primitive::AccountId32));
    }

    Ok(match &ty.type_def {
        TypeDef::Composite(composite) => TypeDescriptor::Struct(fields(&composite.fields)),
        TypeDef::Variant(variant) => {
            if ty.path.segments == ["Option"] {
                if let Some(param) = ty.type_params.first().and_then(|p| p.ty.as_ref()) {
                    return Ok(TypeDescriptor::Option(TypeRef::Id(param.id)));
                }
            }
            TypeDescriptor::Enum(
                variant
                    .variants
                    .iter()
                    .map(|v| Variant {
                        name: v.name.clone(),
                        index: v.index,
                        fields: fields(&v.fields),
                    })
                    .collect(),
            )
        }
        TypeDef::Sequence(seq) => TypeDescriptor::Sequence(TypeRef::Id(seq.type_param.id)),
        TypeDef::Array(array) => {
            TypeDescriptor::Array(TypeRef::Id(array.type_param.id), array.len as usize)
        }
        TypeDef::Tuple(tuple) => {
            TypeDescriptor::Tuple(tuple.fields.iter().map(|f| TypeRef::Id(f.id)).collect())
        }
        TypeDef::Primitive(primitive) => TypeDescriptor::Primitive(match primitive {
            TypeDefPrimitive::Bool => Primitive::Bool,
            TypeDefPrimitive::Char => Primitive::Char,
            TypeDefPrimitive::Str => Primitive::Str,
            TypeDefPrimitive::U8 => Primitive::U8,
            TypeDefPrimitive::U16 => Primitive::U16,
            TypeDefPrimitive::U32 => Primitive::U32,
            TypeDefPrimitive::U64 => Primitive::U64,
            TypeDefPrimitive::U128 => Primitive::U128,
            TypeDefPrimitive::U256 => Primitive::U256,
            TypeDefPrimitive::I8 => Primitive::I8,
            TypeDefPrimitive::I16 => Primitive::I16,
            TypeDefPrimitive::I32 => Primitive::I32,
            TypeDefPrimitive::I64 => Primitive::I64,
            TypeDefPrimitive::I128 => Primitive::I128,
            TypeDefPrimitive::I256 => Primitive::I256,
        }),
        TypeDef::Compact(compact) => TypeDescriptor::Compact(TypeRef::Id(compact.type_param.id)),
        TypeDef::BitSequence(_) => {
            return Err(TxWrapperError::UnknownType(format!(
                "bit sequence #{} is not supported",
                id
            )))
        }
    })
}

/// Id of the unique registry type whose last path segment is `name`
pub(crate) fn find_by_name(types: &PortableRegistry, name: &str) -> Result<u32, TxWrapperError> {
    let mut matches = types
        .types
        .iter()
        .filter(|t| type_name(&t.ty) == Some(name))
        .map(|t| t.id);
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => Err(TxWrapperError::UnknownType(format!(
            "{} is ambiguous in the type registry",
            name
        ))),
        (None, _) => Err(TxWrapperError::UnknownType(name.to_string())),
    }
}

impl RuntimeMetadataV14 {
    pub(crate) fn module_specs(&self) -> Result<Vec<ModuleSpec>, TxWrapperError> {
        self.pallets
            .iter()
            .map(|pallet| {
                let calls = match &pallet.calls {
                    Some(calls) => self.call_specs(pallet, calls.id)?,
                    None => Vec::new(),
                };
                let constants = pallet
                    .constants
                    .iter()
                    .map(|c| ConstantSpec {
                        name: c.name.clone(),
                        ty: TypeRef::Id(c.ty.id),
                        value: c.value.clone(),
                    })
                    .collect();
                Ok(ModuleSpec {
                    name: pallet.name.clone(),
                    index: pallet.index,
                    calls,
                    constants,
                })
            })
            .collect()
    }

    fn call_specs(&self, pallet: &PalletMetadata, id: u32) -> Result<Vec<CallSpec>, TxWrapperError> {
        let ty = lookup(&self.types, id)?;
        let TypeDef::Variant(variant) = &ty.type_def else {
            return Err(TxWrapperError::InvalidMetadata(format!(
                "call type of {} is not an enum",
                pallet.name
            )));
        };
        Ok(variant
            .variants
            .iter()
            .map(|call| CallSpec {
                module: pallet.name.clone(),
                name: call.name.clone(),
                module_index: pallet.index,
                call_index: call.index,
                params: call
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| CallParam {
                        name: field.name.clone().unwrap_or_else(|| format!("arg{}", i)),
                        ty: TypeRef::Id(field.ty.id),
                        type_name: field
                            .type_name
                            .clone()
                            .unwrap_or_else(|| format!("#{}", field.ty.id)),
                    })
                    .collect(),
            })
            .collect())
    }

    pub(crate) fn extrinsic_info(&self) -> Result<ExtrinsicInfo, TxWrapperError> {
        // UncheckedExtrinsic<Address, Call, Signature, Extra>
        let extrinsic = lookup(&self.types, self.extrinsic.ty.id)?;
        let param = |name: &str| -> Result<TypeRef, TxWrapperError> {
            extrinsic
                .type_params
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.ty.as_ref())
                .map(|ty| TypeRef::Id(ty.id))
                .ok_or_else(|| {
                    TxWrapperError::InvalidMetadata(format!(
                        "extrinsic type has no {} parameter",
                        name
                    ))
                })
        };

        Ok(ExtrinsicInfo {
            version: self.extrinsic.version,
            signed_extensions: self
                .extrinsic
                .signed_extensions
                .iter()
                .map(|ext| SignedExtensionInfo {
                    identifier: ext.identifier.clone(),
                    ty: Some(TypeRef::Id(ext.ty.id)),
                    additional_signed: Some(TypeRef::Id(ext.additional_signed.id)),
                })
                .collect(),
            address_ty: param("Address")?,
            signature_ty: param("Signature")?,
            call_ty: param("Call")?,
        })
    }
}
