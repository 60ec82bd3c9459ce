//! Metadata fixtures shared by the unit tests
//!
//! Both blobs are produced by encoding this crate's own metadata containers,
//! so they exercise the same decode path as a live node's `state_getMetadata`.

#![allow(non_camel_case_types, dead_code)]

use crate::metadata::v13::{
    ExtrinsicMetadata, FunctionArgumentMetadata, FunctionMetadata, ModuleConstantMetadata,
    ModuleMetadata, RuntimeMetadataV13,
};
use crate::metadata::v14::{self, PalletConstantMetadata, PalletMetadata, RuntimeMetadataV14, TypeId};
use parity_scale_codec::{Compact, Encode};
use scale_info::{meta_type, PortableRegistry, TypeInfo};

pub const DEFAULT_EXTENSIONS: [&str; 7] = [
    "CheckSpecVersion",
    "CheckTxVersion",
    "CheckGenesis",
    "CheckMortality",
    "CheckNonce",
    "CheckWeight",
    "ChargeTransactionPayment",
];

fn call(name: &str, args: &[(&str, &str)]) -> FunctionMetadata {
    FunctionMetadata {
        name: name.to_string(),
        arguments: args
            .iter()
            .map(|(name, ty)| FunctionArgumentMetadata {
                name: name.to_string(),
                ty: ty.to_string(),
            })
            .collect(),
        documentation: vec![],
    }
}

fn module(name: &str, index: u8, calls: Vec<FunctionMetadata>) -> ModuleMetadata {
    ModuleMetadata {
        name: name.to_string(),
        storage: None,
        calls: Some(calls),
        events: None,
        constants: vec![],
        errors: vec![],
        index,
    }
}

/// V13 runtime with System, Balances and Utility, declaring `extensions`
pub fn legacy_metadata_with(extensions: &[&str]) -> Vec<u8> {
    let mut system = module("System", 0, vec![call("remark", &[("remark", "Vec<u8>")])]);
    system.constants.push(ModuleConstantMetadata {
        name: "SS58Prefix".to_string(),
        ty: "u16".to_string(),
        value: 42u16.encode(),
        documentation: vec![],
    });

    let dest = "<T::Lookup as StaticLookup>::Source";
    let value = "Compact<T::Balance>";
    let balances = module(
        "Balances",
        5,
        vec![
            call("transfer", &[("dest", dest), ("value", value)]),
            call(
                "set_balance",
                &[("who", dest), ("new_free", value), ("new_reserved", value)],
            ),
            call(
                "force_transfer",
                &[("source", dest), ("dest", dest), ("value", value)],
            ),
            call("transfer_keep_alive", &[("dest", dest), ("value", value)]),
        ],
    );
    let utility = module(
        "Utility",
        26,
        vec![call("batch", &[("calls", "Vec<<T as Config>::Call>")])],
    );
    // A module without calls must not appear in the call enum
    let timestamp = ModuleMetadata {
        calls: None,
        ..module("Timestamp", 3, vec![])
    };

    let metadata = RuntimeMetadataV13 {
        modules: vec![system, timestamp, balances, utility],
        extrinsic: ExtrinsicMetadata {
            version: 4,
            signed_extensions: extensions.iter().map(|s| s.to_string()).collect(),
        },
    };
    let mut blob = b"meta".to_vec();
    blob.push(13);
    metadata.encode_to(&mut blob);
    blob
}

pub fn legacy_metadata() -> Vec<u8> {
    legacy_metadata_with(&DEFAULT_EXTENSIONS)
}

#[derive(TypeInfo)]
pub struct AccountId32(pub [u8; 32]);

#[derive(TypeInfo)]
pub enum MultiAddress {
    Id(AccountId32),
    Index(#[codec(compact)] u32),
    Raw(Vec<u8>),
    Address32([u8; 32]),
    Address20([u8; 20]),
}

#[derive(TypeInfo)]
pub enum MultiSignature {
    Ed25519([u8; 64]),
    Sr25519([u8; 64]),
    Ecdsa([u8; 65]),
}

#[derive(TypeInfo)]
pub enum BalancesCall {
    #[codec(index = 0)]
    transfer_allow_death {
        dest: MultiAddress,
        #[codec(compact)]
        value: u128,
    },
    #[codec(index = 3)]
    transfer_keep_alive {
        dest: MultiAddress,
        #[codec(compact)]
        value: u128,
    },
}

#[derive(TypeInfo)]
pub enum SystemCall {
    #[codec(index = 0)]
    remark { remark: Vec<u8> },
}

#[derive(TypeInfo)]
pub enum UtilityCall {
    #[codec(index = 0)]
    batch { calls: Vec<RuntimeCall> },
}

#[derive(TypeInfo)]
pub enum RuntimeCall {
    #[codec(index = 0)]
    System(SystemCall),
    #[codec(index = 5)]
    Balances(BalancesCall),
    #[codec(index = 26)]
    Utility(UtilityCall),
}

#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra> {
    pub signature: Option<(Address, Signature, Extra)>,
    pub function: Call,
}

#[derive(TypeInfo)]
pub enum Mode {
    Disabled,
    Enabled,
}

#[derive(TypeInfo)]
pub struct CheckNonce(#[codec(compact)] pub u32);

#[derive(TypeInfo)]
pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

#[derive(TypeInfo)]
pub struct CheckMetadataHash {
    pub mode: Mode,
}

#[derive(TypeInfo)]
pub struct Reserved {
    pub value: u32,
}

/// V14 runtime with System, Balances and Utility
///
/// Declares `CheckNonZeroSender` first, `CheckMetadataHash` last and one
/// zero-sized extension unknown to the builder. With `sized_unknown` the
/// unknown extension carries a `u32`, which cannot be built.
pub fn portable_metadata_with(sized_unknown: bool) -> Vec<u8> {
    let mut registry = scale_info::Registry::new();
    let mut id = |ty: scale_info::MetaType| TypeId {
        id: registry.register_type(&ty).id,
    };

    let unit = id(meta_type::<()>());
    let u32_ty = id(meta_type::<u32>());
    let u16_ty = id(meta_type::<u16>());
    let hash = id(meta_type::<[u8; 32]>());
    let era = id(meta_type::<[u8; 2]>());
    let nonce = id(meta_type::<CheckNonce>());
    let payment = id(meta_type::<ChargeTransactionPayment>());
    let metadata_hash = id(meta_type::<CheckMetadataHash>());
    let metadata_hash_additional = id(meta_type::<Option<[u8; 32]>>());
    let reserved = id(meta_type::<Reserved>());
    let system_calls = id(meta_type::<SystemCall>());
    let balances_calls = id(meta_type::<BalancesCall>());
    let utility_calls = id(meta_type::<UtilityCall>());
    let extrinsic = id(meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, ()>>());

    let ext = |identifier: &str, ty: TypeId, additional_signed: TypeId| v14::SignedExtensionMetadata {
        identifier: identifier.to_string(),
        ty,
        additional_signed,
    };
    let signed_extensions = vec![
        ext("CheckNonZeroSender", unit, unit),
        ext("CheckSpecVersion", unit, u32_ty),
        ext("CheckTxVersion", unit, u32_ty),
        ext("CheckGenesis", unit, hash),
        ext("CheckMortality", era, hash),
        ext("CheckNonce", nonce, unit),
        ext("CheckWeight", unit, unit),
        ext("ChargeTransactionPayment", payment, unit),
        ext("PrevalidateAttests", if sized_unknown { reserved } else { unit }, unit),
        ext("CheckMetadataHash", metadata_hash, metadata_hash_additional),
    ];

    let pallet = |name: &str, index: u8, calls: TypeId| PalletMetadata {
        name: name.to_string(),
        storage: None,
        calls: Some(calls),
        event: None,
        constants: vec![],
        error: None,
        index,
    };
    let mut system = pallet("System", 0, system_calls);
    system.constants.push(PalletConstantMetadata {
        name: "SS58Prefix".to_string(),
        ty: u16_ty,
        value: 0u16.encode(),
        docs: vec![],
    });

    let metadata = RuntimeMetadataV14 {
        types: PortableRegistry::from(registry),
        pallets: vec![
            system,
            pallet("Balances", 5, balances_calls),
            pallet("Utility", 26, utility_calls),
        ],
        extrinsic: v14::ExtrinsicMetadata {
            ty: extrinsic,
            version: 4,
            signed_extensions,
        },
        ty: unit.id,
    };
    let mut blob = b"meta".to_vec();
    blob.push(14);
    metadata.encode_to(&mut blob);
    blob
}

pub fn portable_metadata() -> Vec<u8> {
    portable_metadata_with(false)
}

/// SCALE compact encoding, for building expected byte strings
pub fn compact(value: u128) -> Vec<u8> {
    Compact(value).encode()
}
