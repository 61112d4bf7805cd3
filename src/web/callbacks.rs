//! Callback registry: an input slot changes, a handler computes the new value
//! for an output slot.

use crate::charts::RenderError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A component property on the page, e.g. `checklist.value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub property: String,
}

impl Slot {
    pub fn new(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.property)
    }
}

#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("No callback registered for input {0}")]
    UnknownInput(Slot),
    #[error("A callback is already registered for input {0}")]
    DuplicateInput(Slot),
    #[error("Invalid value for input {slot}: {source}")]
    InvalidValue {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode output {slot}: {source}")]
    Encode {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Body posted by the page when an input changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub input: Slot,
    pub value: Value,
}

/// New value for the output slot bound to the changed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub output: Slot,
    pub value: Value,
}

type Handler<S> = Box<dyn Fn(&S, Value) -> Result<Value, CallbackError> + Send + Sync>;

struct Callback<S> {
    output: Slot,
    handler: Handler<S>,
}

/// Callbacks keyed by input slot; at most one per input.
pub struct CallbackRegistry<S> {
    callbacks: HashMap<Slot, Callback<S>>,
}

impl<S> Default for CallbackRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CallbackRegistry<S> {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Register a handler working on raw JSON values.
    pub fn register<F>(&mut self, input: Slot, output: Slot, handler: F) -> Result<(), CallbackError>
    where
        F: Fn(&S, Value) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        if self.callbacks.contains_key(&input) {
            return Err(CallbackError::DuplicateInput(input));
        }
        self.callbacks.insert(
            input,
            Callback {
                output,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Register a handler with typed input and output; JSON conversion is
    /// done here.
    pub fn register_typed<I, O, F>(
        &mut self,
        input: Slot,
        output: Slot,
        handler: F,
    ) -> Result<(), CallbackError>
    where
        I: DeserializeOwned,
        O: Serialize,
        F: Fn(&S, I) -> Result<O, CallbackError> + Send + Sync + 'static,
    {
        let input_slot = input.clone();
        let output_slot = output.clone();
        self.register(input, output, move |state, value| {
            let typed: I = serde_json::from_value(value).map_err(|source| {
                CallbackError::InvalidValue {
                    slot: input_slot.clone(),
                    source,
                }
            })?;
            let out = handler(state, typed)?;
            serde_json::to_value(out).map_err(|source| CallbackError::Encode {
                slot: output_slot.clone(),
                source,
            })
        })
    }

    /// Run the callback bound to `request.input`.
    pub fn dispatch(
        &self,
        state: &S,
        request: DispatchRequest,
    ) -> Result<DispatchResponse, CallbackError> {
        let callback = self
            .callbacks
            .get(&request.input)
            .ok_or_else(|| CallbackError::UnknownInput(request.input.clone()))?;

        let value = (callback.handler)(state, request.value)?;
        Ok(DispatchResponse {
            output: callback.output.clone(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Counter {
        offset: i64,
    }

    fn registry() -> CallbackRegistry<Counter> {
        let mut registry = CallbackRegistry::new();
        registry
            .register_typed(
                Slot::new("numbers", "value"),
                Slot::new("total", "children"),
                |state: &Counter, values: Vec<i64>| Ok(values.iter().sum::<i64>() + state.offset),
            )
            .unwrap();
        registry
    }

    #[test]
    fn dispatch_routes_to_bound_output() {
        let response = registry()
            .dispatch(
                &Counter { offset: 10 },
                DispatchRequest {
                    input: Slot::new("numbers", "value"),
                    value: json!([1, 2, 3]),
                },
            )
            .unwrap();

        assert_eq!(response.output, Slot::new("total", "children"));
        assert_eq!(response.value, json!(16));
    }

    #[test]
    fn unknown_input_is_rejected() {
        let err = registry()
            .dispatch(
                &Counter { offset: 0 },
                DispatchRequest {
                    input: Slot::new("numbers", "options"),
                    value: json!([]),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CallbackError::UnknownInput(slot) if slot.property == "options"));
    }

    #[test]
    fn malformed_value_is_rejected() {
        let err = registry()
            .dispatch(
                &Counter { offset: 0 },
                DispatchRequest {
                    input: Slot::new("numbers", "value"),
                    value: json!("not a list"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CallbackError::InvalidValue { .. }), "{err:?}");
    }

    #[test]
    fn second_callback_on_same_input_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(
                Slot::new("numbers", "value"),
                Slot::new("other", "children"),
                |_: &Counter, v| Ok(v),
            )
            .unwrap_err();

        assert!(matches!(err, CallbackError::DuplicateInput(_)));

        let response = registry
            .dispatch(
                &Counter { offset: 0 },
                DispatchRequest {
                    input: Slot::new("numbers", "value"),
                    value: json!([2]),
                },
            )
            .unwrap();
        assert_eq!(response.output, Slot::new("total", "children"));
        assert_eq!(response.value, json!(2));
    }

    #[test]
    fn slot_displays_as_id_dot_property() {
        assert_eq!(Slot::new("checklist", "value").to_string(), "checklist.value");
    }
}
