//! Build, sign and decode round trips through the public API

mod common;

use common::{legacy_metadata, MockNode, BLOCK_HASH, DEST, GENESIS_HASH, SEED};
use rstest::rstest;
use serde_json::json;
use wasm_txwrapper::signer::verify_payload;
use wasm_txwrapper::{
    decode_extrinsic, decode_ss58, fetch_chain_material, fetch_nonce, DecodeOptions, Era,
    ExtrinsicBuilder, KeyPair, Registry, RegistryOptions, SignatureScheme, Transaction,
    UnsignedExtrinsicPayload, Validity, Value,
};

fn hash32(hex_str: &str) -> [u8; 32] {
    hex::decode(hex_str.trim_start_matches("0x"))
        .unwrap()
        .try_into()
        .unwrap()
}

fn transfer_args(value: u128) -> Value {
    Value::from(json!({ "dest": DEST, "value": value.to_string() }))
}

#[rstest]
#[case::sr25519(SignatureScheme::Sr25519)]
#[case::ed25519(SignatureScheme::Ed25519)]
fn test_build_sign_decode_transfer(#[case] scheme: SignatureScheme) {
    let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
    let builder = ExtrinsicBuilder::new(&registry);
    let keypair = KeyPair::from_seed(scheme, &SEED).unwrap();

    let method = builder
        .build_call("Balances", "transfer", &transfer_args(12345))
        .unwrap();
    let payload = UnsignedExtrinsicPayload {
        method,
        era: Era::Immortal,
        nonce: 0,
        tip: 0,
        spec_version: 9,
        transaction_version: 1,
        genesis_hash: hash32(GENESIS_HASH),
        block_hash: None,
    };
    let signed = builder.sign(&payload, &keypair).unwrap();

    let decoded = decode_extrinsic(&signed, &registry, &DecodeOptions::default()).unwrap();
    assert!(decoded.is_signed());
    assert_eq!(decoded.call.module, "Balances");
    assert_eq!(decoded.call.call, "transfer");
    assert_eq!(
        decoded.call.arg("dest").and_then(Value::as_account_id),
        Some(decode_ss58(DEST).unwrap().0)
    );
    assert_eq!(decoded.call.arg("value").and_then(Value::as_u128), Some(12345));

    let signature = decoded.signature.as_ref().unwrap();
    assert_eq!(signature.signer, Some(keypair.public_key()));
    assert_eq!(signature.signature.scheme, scheme);
    assert_eq!(signature.era, Era::Immortal);
    assert_eq!(signature.nonce, 0);

    // The embedded signature verifies against the rebuilt payload
    let signing_payload = builder.build_signing_payload(&payload).unwrap();
    assert!(verify_payload(
        &signing_payload,
        &signature.signature,
        &keypair.public_key()
    ));

    let rendered = decoded.to_json();
    assert_eq!(rendered["method"]["args"]["value"], json!("12345"));
    assert_eq!(rendered["isSigned"], json!(true));
}

#[test]
fn test_unsigned_build_is_deterministic() {
    let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
    let builder = ExtrinsicBuilder::new(&registry);
    let first = builder
        .build_call("Balances", "transferKeepAlive", &transfer_args(1_000_000_000_000))
        .unwrap();
    let second = builder
        .build_call("Balances", "transferKeepAlive", &transfer_args(1_000_000_000_000))
        .unwrap();
    assert_eq!(
        builder.build_unsigned_extrinsic(&first),
        builder.build_unsigned_extrinsic(&second)
    );
}

#[test]
fn test_add_signature_to_unsigned_transaction() {
    let registry = Registry::build(&legacy_metadata(), RegistryOptions::default()).unwrap();
    let builder = ExtrinsicBuilder::new(&registry);
    let keypair = KeyPair::from_seed(SignatureScheme::Sr25519, &SEED).unwrap();

    let method = builder
        .build_call("Balances", "transfer", &transfer_args(500))
        .unwrap();
    let unsigned = Transaction::from_bytes(&builder.build_unsigned_extrinsic(&method), &registry)
        .unwrap();
    assert!(!unsigned.is_signed());
    assert_eq!(unsigned.id(), None);

    let era = Era::mortal(64, 1000);
    let payload = UnsignedExtrinsicPayload {
        method: method.clone(),
        era,
        nonce: 3,
        tip: 10,
        spec_version: 9,
        transaction_version: 1,
        genesis_hash: hash32(GENESIS_HASH),
        block_hash: Some(hash32(BLOCK_HASH)),
    };
    let signature = keypair.sign_payload(&builder.build_signing_payload(&payload).unwrap());
    let signed = unsigned
        .add_signature(&registry, &keypair.public_key(), &signature, &era, 3, 10)
        .unwrap();

    assert!(signed.is_signed());
    assert_eq!(signed.call_data(), &method[..]);
    assert_eq!(signed.nonce(), 3);
    assert_eq!(signed.tip(), 10);
    assert_eq!(signed.era(), era);
    assert_eq!(signed.signer(), Some(keypair.public_key()));
    assert!(signed.id().is_some());

    // Same bytes as assembling directly
    let assembled = builder
        .assemble_signed(&method, &keypair.public_key(), &signature, &era, 3, 10)
        .unwrap();
    assert_eq!(signed.to_bytes(), assembled);
    assert!(signed
        .add_signature(&registry, &keypair.public_key(), &signature, &era, 3, 10)
        .is_err());
}

#[test]
fn test_online_flow_with_mock_node() {
    let node = MockNode::new();
    let material = fetch_chain_material(&node).unwrap();
    assert_eq!(material.spec_name, "westend");
    assert_eq!(material.block_number, 1000);
    assert_eq!(material.genesis_hash, hash32(GENESIS_HASH));
    assert_eq!(material.block_hash, hash32(BLOCK_HASH));

    let keypair = KeyPair::from_seed(SignatureScheme::Sr25519, &SEED).unwrap();
    let sender = wasm_txwrapper::encode_ss58(&keypair.public_key(), 42).unwrap();
    let nonce = fetch_nonce(&node, &sender).unwrap();
    assert_eq!(nonce, 3);

    let registry = material.registry(RegistryOptions::default()).unwrap();
    let builder = ExtrinsicBuilder::new(&registry);
    let method = builder
        .build_call("Balances", "transfer", &transfer_args(42))
        .unwrap();
    let validity = Validity {
        first_valid: material.block_number,
        max_duration: 64,
    };
    let payload = material.payload(method, &validity, nonce, 0);
    assert_eq!(payload.block_hash, Some(material.block_hash));

    let signed = builder.sign(&payload, &keypair).unwrap();
    let tx = Transaction::from_bytes(&signed, &registry).unwrap();
    assert_eq!(tx.sender(42), Some(sender));
    assert_eq!(tx.nonce(), 3);
    assert_eq!(tx.era(), Era::mortal(64, 1000));
    assert!(node.calls.borrow().contains(&"state_getMetadata".to_string()));
}
