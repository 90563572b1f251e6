//! Property-based tests for the call envelope
//!
//! Whatever the payload or method name, every call is answered with exactly
//! one result and failures are reported under the method name.

use engagebridge_core::{BridgeError, BridgeResult, MethodCall, MethodResult};
use engagebridge_transport::{Codec, JsonCodec, invoke_map_args, invoke_no_args};
use proptest::prelude::*;
use serde_json::Value;

// Strategy: Generate JSON payloads (simple types for test speed)
fn arb_json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| Value::Number(i.into())),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(2, 12, 4, |inner| {
        prop::collection::hash_map("[a-zA-Z]{1,8}", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    })
}

// Strategy: Generate method names
fn arb_method() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,31}"
}

proptest! {
    /// Property: a unit handler always replies `true`, whatever the payload
    #[test]
    fn proptest_unit_handler_replies_true(method in arb_method(), payload in arb_json_value()) {
        let call = MethodCall::new(method, payload);

        let result = invoke_map_args(&call, |_| ());

        prop_assert_eq!(result, MethodResult::success(Value::Bool(true)));
    }

    /// Property: a failing handler is reported under the method name
    #[test]
    fn proptest_failure_code_is_method_name(method in arb_method(), message in ".*") {
        let call = MethodCall::without_arguments(method.clone());

        let result = invoke_no_args(&call, || -> BridgeResult<()> {
            Err(BridgeError::Native(message))
        });

        prop_assert_eq!(&result.error_info().unwrap().code, &method);
    }

    /// Property: a panicking handler is contained and reported under the method name
    #[test]
    fn proptest_panic_is_contained(method in arb_method(), message in "[a-z ]{1,24}") {
        let call = MethodCall::without_arguments(method.clone());

        let result = invoke_no_args(&call, || -> BridgeResult<()> { panic!("{}", message) });

        let err = result.error_info().unwrap();
        prop_assert_eq!(&err.code, &method);
        prop_assert!(err.message.contains(message.trim()));
    }

    /// Property: calls survive the JSON codec unchanged
    #[test]
    fn proptest_call_roundtrip(method in arb_method(), payload in arb_json_value()) {
        let codec = JsonCodec::new();
        let call = MethodCall::new(method, payload);

        let bytes = codec.encode(&call).unwrap();
        let decoded = codec.decode_call(&bytes).unwrap();

        prop_assert_eq!(decoded, call);
    }
}
