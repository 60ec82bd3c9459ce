//! Signed-extension layout
//!
//! Each extension the runtime declares contributes "extra" bytes to the
//! extrinsic body and "additional signed" bytes to the signing payload only.
//! Known extensions have a fixed layout; unknown ones must be zero-sized.

use crate::codec::{self, encode_compact_to, Input, TypeResolver};
use crate::era::Era;
use crate::error::TxWrapperError;
use crate::metadata::{Registry, SignedExtensionInfo, TypeDescriptor, TypeRef};
use crate::value::Value;

/// Extensions assumed when the metadata declares none
pub const DEFAULT_SIGNED_EXTENSIONS: [&str; 7] = [
    "CheckSpecVersion",
    "CheckTxVersion",
    "CheckGenesis",
    "CheckMortality",
    "CheckNonce",
    "CheckWeight",
    "ChargeTransactionPayment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extension {
    SpecVersion,
    TxVersion,
    Genesis,
    Mortality,
    Nonce,
    Weight,
    TransactionPayment,
    AssetTxPayment,
    MetadataHash,
    NonZeroSender,
    Unknown,
}

impl Extension {
    fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "CheckSpecVersion" => Extension::SpecVersion,
            "CheckTxVersion" => Extension::TxVersion,
            "CheckGenesis" => Extension::Genesis,
            "CheckMortality" | "CheckEra" => Extension::Mortality,
            "CheckNonce" => Extension::Nonce,
            "CheckWeight" => Extension::Weight,
            "ChargeTransactionPayment" => Extension::TransactionPayment,
            "ChargeAssetTxPayment" => Extension::AssetTxPayment,
            "CheckMetadataHash" => Extension::MetadataHash,
            "CheckNonZeroSender" => Extension::NonZeroSender,
            _ => Extension::Unknown,
        }
    }
}

/// Values the extensions draw from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtensionValues {
    pub era: Era,
    pub nonce: u64,
    pub tip: u128,
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: [u8; 32],
    /// Block the era is anchored to (genesis for immortal eras)
    pub checkpoint: [u8; 32],
}

/// Signed fields read back from an extrinsic body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedExtra {
    pub era: Era,
    pub nonce: u64,
    pub tip: u128,
    /// Extensions other than era, nonce and tip that carry data
    pub other: Vec<(String, Value)>,
}

fn extension_list(registry: &Registry) -> Vec<SignedExtensionInfo> {
    let declared = &registry.extrinsic().signed_extensions;
    if declared.is_empty() {
        return DEFAULT_SIGNED_EXTENSIONS
            .iter()
            .map(|identifier| SignedExtensionInfo {
                identifier: identifier.to_string(),
                ty: None,
                additional_signed: None,
            })
            .collect();
    }
    declared.clone()
}

fn is_zero_sized(registry: &Registry, ty: &TypeRef, depth: usize) -> Result<bool, TxWrapperError> {
    if depth > 16 {
        return Ok(false);
    }
    Ok(match &*registry.resolve(ty)? {
        TypeDescriptor::Tuple(types) => {
            for ty in types {
                if !is_zero_sized(registry, ty, depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
        TypeDescriptor::Struct(fields) => {
            for field in fields {
                if !is_zero_sized(registry, &field.ty, depth + 1)? {
                    return Ok(false);
                }
            }
            true
        }
        TypeDescriptor::Array(_, 0) => true,
        _ => false,
    })
}

/// Reject an unknown extension that would need data we cannot supply
fn check_unknown(
    registry: &Registry,
    ext: &SignedExtensionInfo,
    ty: Option<&TypeRef>,
) -> Result<(), TxWrapperError> {
    match ty {
        None => {
            tracing::warn!(
                identifier = %ext.identifier,
                "Unknown signed extension, assuming it carries no data"
            );
            Ok(())
        }
        Some(ty) if is_zero_sized(registry, ty, 0)? => Ok(()),
        Some(_) => Err(TxWrapperError::UnknownType(format!(
            "signed extension {}",
            ext.identifier
        ))),
    }
}

/// Extra bytes carried in the extrinsic body
pub(crate) fn encode_extra(
    registry: &Registry,
    era: &Era,
    nonce: u64,
    tip: u128,
    out: &mut Vec<u8>,
) -> Result<(), TxWrapperError> {
    for ext in extension_list(registry) {
        match Extension::from_identifier(&ext.identifier) {
            Extension::Mortality => out.extend_from_slice(&era.encode()),
            Extension::Nonce => encode_compact_to(nonce as u128, out),
            Extension::TransactionPayment => encode_compact_to(tip, out),
            Extension::AssetTxPayment => {
                encode_compact_to(tip, out);
                // No asset id: fees in the native token
                out.push(0x00);
            }
            // Metadata hash check disabled
            Extension::MetadataHash => out.push(0x00),
            Extension::Unknown => check_unknown(registry, &ext, ext.ty.as_ref())?,
            Extension::SpecVersion
            | Extension::TxVersion
            | Extension::Genesis
            | Extension::Weight
            | Extension::NonZeroSender => {}
        }
    }
    Ok(())
}

/// Implicit bytes signed over but never transmitted
pub(crate) fn encode_additional(
    registry: &Registry,
    values: &ExtensionValues,
    out: &mut Vec<u8>,
) -> Result<(), TxWrapperError> {
    for ext in extension_list(registry) {
        match Extension::from_identifier(&ext.identifier) {
            Extension::SpecVersion => out.extend_from_slice(&values.spec_version.to_le_bytes()),
            Extension::TxVersion => {
                out.extend_from_slice(&values.transaction_version.to_le_bytes())
            }
            Extension::Genesis => out.extend_from_slice(&values.genesis_hash),
            Extension::Mortality => out.extend_from_slice(&values.checkpoint),
            // Option<[u8; 32]>::None
            Extension::MetadataHash => out.push(0x00),
            Extension::Unknown => check_unknown(registry, &ext, ext.additional_signed.as_ref())?,
            Extension::Nonce
            | Extension::Weight
            | Extension::TransactionPayment
            | Extension::AssetTxPayment
            | Extension::NonZeroSender => {}
        }
    }
    Ok(())
}

/// Read the extra fields of a signed extrinsic
pub(crate) fn decode_extra(
    registry: &Registry,
    input: &mut Input<'_>,
) -> Result<DecodedExtra, TxWrapperError> {
    let mut extra = DecodedExtra {
        era: Era::Immortal,
        nonce: 0,
        tip: 0,
        other: Vec::new(),
    };
    for ext in extension_list(registry) {
        match Extension::from_identifier(&ext.identifier) {
            Extension::Mortality => extra.era = Era::decode(input)?,
            Extension::Nonce => {
                let nonce = input.read_compact()?;
                extra.nonce = u64::try_from(nonce).map_err(|_| {
                    TxWrapperError::MalformedCompactInt(format!("nonce {} exceeds u64", nonce))
                })?;
            }
            Extension::TransactionPayment => extra.tip = input.read_compact()?,
            Extension::AssetTxPayment => {
                extra.tip = input.read_compact()?;
                let asset = match &ext.ty {
                    Some(ty) => decode_asset(registry, input, ty)?,
                    None => codec::decode_as(input, &TypeRef::named("Option<AssetId>"), registry)?,
                };
                extra.other.push((ext.identifier.clone(), asset));
            }
            Extension::MetadataHash => {
                let mode = input.read_byte()?;
                extra
                    .other
                    .push((ext.identifier.clone(), Value::UInt(mode as u128)));
            }
            Extension::Unknown => match &ext.ty {
                Some(ty) => {
                    let value = codec::decode_as(input, ty, registry)?;
                    if !is_zero_sized(registry, ty, 0)? {
                        extra.other.push((ext.identifier.clone(), value));
                    }
                }
                None => check_unknown(registry, &ext, None)?,
            },
            Extension::SpecVersion
            | Extension::TxVersion
            | Extension::Genesis
            | Extension::Weight
            | Extension::NonZeroSender => {}
        }
    }
    Ok(extra)
}

/// Asset id of a `ChargeAssetTxPayment { tip, asset_id }` whose tip was already read
fn decode_asset(
    registry: &Registry,
    input: &mut Input<'_>,
    ty: &TypeRef,
) -> Result<Value, TxWrapperError> {
    match &*registry.resolve(ty)? {
        TypeDescriptor::Struct(fields) if fields.len() == 2 => {
            codec::decode_as(input, &fields[1].ty, registry)
        }
        other => Err(TxWrapperError::UnknownType(format!(
            "ChargeAssetTxPayment as {}",
            other.kind()
        ))),
    }
}
