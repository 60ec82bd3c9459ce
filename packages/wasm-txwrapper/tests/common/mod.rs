//! Shared fixtures for the integration tests

#![allow(dead_code)]

use parity_scale_codec::Encode;
use serde_json::{json, Value as JsonValue};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_txwrapper::metadata::v13::{
    ExtrinsicMetadata, FunctionArgumentMetadata, FunctionMetadata, ModuleConstantMetadata,
    ModuleMetadata, RuntimeMetadataV13,
};
use wasm_txwrapper::{RpcClient, TxWrapperError};

pub const SEED: [u8; 32] = [0x2a; 32];
pub const DEST: &str = "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr";
pub const GENESIS_HASH: &str =
    "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";
pub const BLOCK_HASH: &str = "0x5d2c6a6d0a2fb43cf5f0f9a0a1bd1e3a5c2b08f4e0b3e2e2ae0a1d8b3c7e9f10";

fn function(name: &str, args: &[(&str, &str)]) -> FunctionMetadata {
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

/// V13 runtime with System and Balances, as a node would serve it
pub fn legacy_metadata() -> Vec<u8> {
    let mut system = module("System", 0, vec![function("remark", &[("remark", "Vec<u8>")])]);
    system.constants.push(ModuleConstantMetadata {
        name: "SS58Prefix".to_string(),
        ty: "u16".to_string(),
        value: 42u16.encode(),
        documentation: vec![],
    });
    let dest = "<T::Lookup as StaticLookup>::Source";
    let balances = module(
        "Balances",
        5,
        vec![
            function("transfer", &[("dest", dest), ("value", "Compact<T::Balance>")]),
            function(
                "transfer_keep_alive",
                &[("dest", dest), ("value", "Compact<T::Balance>")],
            ),
        ],
    );

    let metadata = RuntimeMetadataV13 {
        modules: vec![system, balances],
        extrinsic: ExtrinsicMetadata {
            version: 4,
            signed_extensions: [
                "CheckSpecVersion",
                "CheckTxVersion",
                "CheckGenesis",
                "CheckMortality",
                "CheckNonce",
                "CheckWeight",
                "ChargeTransactionPayment",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        },
    };
    let mut blob = b"meta".to_vec();
    blob.push(13);
    metadata.encode_to(&mut blob);
    blob
}

/// Answers JSON-RPC calls from a fixed table
pub struct MockNode {
    responses: HashMap<String, JsonValue>,
    pub calls: RefCell<Vec<String>>,
}

impl MockNode {
    pub fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert("chain_getBlockHash".to_string(), json!(GENESIS_HASH));
        responses.insert(
            "chain_getBlock".to_string(),
            json!({ "block": { "header": { "number": "0x3e8" } } }),
        );
        responses.insert(
            "state_getMetadata".to_string(),
            json!(format!("0x{}", hex::encode(legacy_metadata()))),
        );
        responses.insert(
            "state_getRuntimeVersion".to_string(),
            json!({ "specName": "westend", "specVersion": 9, "transactionVersion": 1 }),
        );
        responses.insert("system_accountNextIndex".to_string(), json!(3));
        MockNode {
            responses,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl RpcClient for MockNode {
    fn call(&self, method: &str, params: JsonValue) -> Result<JsonValue, TxWrapperError> {
        self.calls.borrow_mut().push(method.to_string());
        // Head block differs from genesis
        if method == "chain_getBlockHash" && params == json!([]) {
            return Ok(json!(BLOCK_HASH));
        }
        self.responses.get(method).cloned().ok_or(TxWrapperError::Rpc {
            code: -32601,
            message: "Method not found".to_string(),
            data: None,
        })
    }
}
