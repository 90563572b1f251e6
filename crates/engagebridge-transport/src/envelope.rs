//! Call envelope: transform the arguments, invoke the handler, normalize the outcome
//!
//! Every handler in the bridge runs through one of the `invoke*` functions so
//! that each call is answered with exactly one [`MethodResult`]:
//!
//! - a unit outcome becomes the affirmative value `true`
//! - a `Result` outcome is unwrapped, an inner error counts as a handler failure
//! - errors and panics in either the transform or the handler become a failure
//!   whose code is the method name (or a named precondition code)

use crate::panic_guard::catch_panic;
use engagebridge_core::{Arguments, BridgeError, BridgeResult, MethodCall, MethodResult};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;

/// Conversion of a handler outcome into the value sent back to the caller
pub trait IntoReply {
    fn into_reply(self) -> BridgeResult<Value>;
}

impl IntoReply for () {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(Value::Bool(true))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(self)
    }
}

impl IntoReply for bool {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(Value::Bool(self))
    }
}

impl IntoReply for i64 {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(Value::from(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(Value::String(self))
    }
}

impl IntoReply for Map<String, Value> {
    fn into_reply(self) -> BridgeResult<Value> {
        Ok(Value::Object(self))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> BridgeResult<Value> {
        match self {
            Some(inner) => inner.into_reply(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: IntoReply> IntoReply for Vec<T> {
    fn into_reply(self) -> BridgeResult<Value> {
        self.into_iter()
            .map(IntoReply::into_reply)
            .collect::<BridgeResult<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BridgeError>,
{
    fn into_reply(self) -> BridgeResult<Value> {
        self.map_err(Into::into)?.into_reply()
    }
}

/// Reply with any serializable value
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> BridgeResult<Value> {
        serde_json::to_value(self.0).map_err(Into::into)
    }
}

/// Run `transform` then `handler` for `call` and normalize the outcome
pub fn invoke<A, R, T, H>(call: &MethodCall, transform: T, handler: H) -> MethodResult
where
    T: FnOnce(&Value) -> BridgeResult<A>,
    H: FnOnce(A) -> R,
    R: IntoReply,
{
    let outcome = catch_panic(AssertUnwindSafe(|| {
        let args = transform(call.arguments())?;
        handler(args).into_reply()
    }))
    .and_then(|inner| inner);

    into_result(&call.method, outcome)
}

/// Invoke a handler that takes no arguments
pub fn invoke_no_args<R, H>(call: &MethodCall, handler: H) -> MethodResult
where
    H: FnOnce() -> R,
    R: IntoReply,
{
    invoke(call, |_| Ok(()), |()| handler())
}

/// Invoke a handler with an owned copy of the argument map
///
/// A missing or non-map payload becomes an empty map.
pub fn invoke_map_args<R, H>(call: &MethodCall, handler: H) -> MethodResult
where
    H: FnOnce(Arguments) -> R,
    R: IntoReply,
{
    invoke(call, |_| Ok(call.arguments_map()), handler)
}

/// Invoke a handler with the payload decoded into a typed argument record
pub fn invoke_typed<A, R, H>(call: &MethodCall, handler: H) -> MethodResult
where
    A: DeserializeOwned,
    H: FnOnce(A) -> R,
    R: IntoReply,
{
    invoke(call, decode_arguments::<A>, handler)
}

/// Decode a raw payload into `A`, treating a `null` payload as an empty map
pub fn decode_arguments<A: DeserializeOwned>(raw: &Value) -> BridgeResult<A> {
    let decoded = match raw {
        Value::Null => A::deserialize(&Value::Object(Map::new())),
        other => A::deserialize(other),
    };
    decoded.map_err(Into::into)
}

/// Normalize a handler outcome that was produced outside [`invoke`]
///
/// Used by asynchronous handlers that answer through a reply handle.
pub fn into_result(method: &str, outcome: BridgeResult<Value>) -> MethodResult {
    match outcome {
        Ok(value) => MethodResult::success(value),
        Err(err) => {
            tracing::debug!(method, error = %err, "call failed");
            MethodResult::from_error(method, &err)
        }
    }
}
