//! Native callables pre-populated into the global scope.
//!
//! Argument-type mismatches are reported with descriptive messages; the
//! call site anchors them at the call's closing paren. `map`, `filter` and
//! `reduce` call back through the interpreter to apply user callables.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{GloxError, Result};
use crate::interpreter::Interpreter;
use crate::value::{callable_arity, NativeFunction, Value};

pub static NATIVES: &[NativeFunction] = &[
    NativeFunction {
        name: "clock",
        arity: 0,
        func: clock,
    },
    NativeFunction {
        name: "print",
        arity: 1,
        func: print,
    },
    NativeFunction {
        name: "string",
        arity: 1,
        func: string,
    },
    NativeFunction {
        name: "len",
        arity: 1,
        func: len,
    },
    NativeFunction {
        name: "size",
        arity: 1,
        func: size,
    },
    NativeFunction {
        name: "hasKey",
        arity: 2,
        func: has_key,
    },
    NativeFunction {
        name: "keys",
        arity: 1,
        func: keys,
    },
    NativeFunction {
        name: "values",
        arity: 1,
        func: values,
    },
    NativeFunction {
        name: "map",
        arity: 2,
        func: map,
    },
    NativeFunction {
        name: "filter",
        arity: 2,
        func: filter,
    },
    NativeFunction {
        name: "reduce",
        arity: 3,
        func: reduce,
    },
];

/// Current wall-clock time in seconds.
fn clock(_interpreter: &mut Interpreter, _arguments: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| GloxError::native(format!("clock error: {}", e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

/// Writes the printable representation (strings unquoted) and a newline.
fn print(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    println!("{}", arguments[0]);

    Ok(Value::Nil)
}

/// Identity for strings, canonical repr for everything else.
fn string(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    match &arguments[0] {
        Value::String(s) => Ok(Value::String(s.clone())),

        value => Ok(Value::String(value.repr())),
    }
}

fn len(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    match &arguments[0] {
        Value::Array(items) => Ok(Value::Number(items.borrow().len() as f64)),

        Value::String(s) => Ok(Value::Number(s.len() as f64)),

        _ => Err(GloxError::native("can only call len on arrays or strings")),
    }
}

fn size(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    match &arguments[0] {
        Value::Map(map) => Ok(Value::Number(map.borrow().len() as f64)),

        _ => Err(GloxError::native("can only call size on maps")),
    }
}

fn has_key(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    let map = match &arguments[0] {
        Value::Map(map) => map,

        _ => return Err(GloxError::native("first argument of hasKey must be a map")),
    };

    match &arguments[1] {
        Value::String(key) => Ok(Value::Boolean(map.borrow().contains_key(key))),

        _ => Err(GloxError::native(
            "second argument of hasKey must be a string",
        )),
    }
}

fn keys(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    match &arguments[0] {
        Value::Map(map) => Ok(Value::array(map.borrow().keys())),

        _ => Err(GloxError::native("argument of keys must be a map")),
    }
}

fn values(_interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    match &arguments[0] {
        Value::Map(map) => Ok(Value::array(map.borrow().values())),

        _ => Err(GloxError::native("argument of values must be a map")),
    }
}

/// Applies a 1-ary callable to each element, yielding a new array.
fn map(interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    let elements: Vec<Value> = match &arguments[0] {
        Value::Array(items) => items.borrow().clone(),

        _ => return Err(GloxError::native("first argument of map must be an array")),
    };

    let function: &Value = &arguments[1];

    if callable_arity(function) != Some(1) {
        return Err(GloxError::native(
            "second argument of map must be an function taking a single parameter",
        ));
    }

    let mut results: Vec<Value> = Vec::with_capacity(elements.len());

    for element in elements {
        results.push(interpreter.call_callable(function, vec![element])?);
    }

    Ok(Value::array(results))
}

/// Keeps the elements for which the callable returns a truthy value.
/// The error strings intentionally say "map"; callers match on the exact
/// text.
fn filter(interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    let elements: Vec<Value> = match &arguments[0] {
        Value::Array(items) => items.borrow().clone(),

        _ => return Err(GloxError::native("first argument of map must be an array")),
    };

    let function: &Value = &arguments[1];

    if callable_arity(function) != Some(1) {
        return Err(GloxError::native(
            "second argument of map must be an function taking a single parameter",
        ));
    }

    let mut results: Vec<Value> = Vec::with_capacity(elements.len());

    for element in elements {
        if interpreter
            .call_callable(function, vec![element.clone()])?
            .is_truthy()
        {
            results.push(element);
        }
    }

    Ok(Value::array(results))
}

/// Folds the array with a 2-ary callable `fn(accumulator, element)`.
fn reduce(interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    let elements: Vec<Value> = match &arguments[1] {
        Value::Array(items) => items.borrow().clone(),

        _ => {
            return Err(GloxError::native(
                "second argument of reduce must be an array",
            ))
        }
    };

    let function: &Value = &arguments[2];

    if callable_arity(function) != Some(2) {
        return Err(GloxError::native(
            "third argument of reduce must be an function taking two parameters - the accumulator and the current element",
        ));
    }

    let mut accumulator: Value = arguments[0].clone();

    for element in elements {
        accumulator = interpreter.call_callable(function, vec![accumulator, element])?;
    }

    Ok(accumulator)
}
