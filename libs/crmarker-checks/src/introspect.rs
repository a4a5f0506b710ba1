/// Introspection Checks - validate what the student's program defined
///
/// **Checks:**
/// - `check_function`: a name is bound to a function with the expected
///   parameter list and, optionally, a docstring
/// - `check_eval`: calling a function yields the right value without printing,
///   returning nothing or raising
///
/// Every failure becomes a `CheckResult` with an HTML feedback message; no
/// fault raised by student code escapes these functions.

use crate::bindings::{Binding, Bindings, Function, RuntimeFault};
use crmarker_common::CheckResult;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Options for `check_function`
#[derive(Debug, Clone, Copy)]
pub struct FunctionCheck {
    pub require_docstring: bool,
    pub allow_extra_args: bool,
}

impl Default for FunctionCheck {
    fn default() -> Self {
        Self {
            require_docstring: true,
            allow_extra_args: false,
        }
    }
}

/// Options for `check_eval`
#[derive(Debug, Clone, Default)]
pub struct EvalCheck {
    /// Expected return value; `None` skips the comparison
    pub correct_val: Option<Value>,
    pub allow_output: bool,
    pub allow_none: bool,
    /// Render the call as `name(...)` instead of echoing the arguments
    pub hide_args: bool,
}

fn lookup_function<'a>(bindings: &'a Bindings, name: &str) -> Result<&'a Function, CheckResult> {
    match bindings.get(name) {
        None => Err(CheckResult::failure(format!(
            "You have not defined <code>{}</code>.",
            name
        ))),
        Some(Binding::Value(_)) => Err(CheckResult::failure(format!(
            "You have not defined a function <code>{}(...)</code>.",
            name
        ))),
        Some(Binding::Function(function)) => Ok(function),
    }
}

/// Check that `name` is a function taking exactly `expected_args`
pub fn check_function(
    bindings: &Bindings,
    name: &str,
    expected_args: &[&str],
    options: FunctionCheck,
) -> CheckResult {
    let function = match lookup_function(bindings, name) {
        Ok(function) => function,
        Err(failure) => return failure,
    };

    let params = function.params();
    let leading = &params[..expected_args.len().min(params.len())];
    let full_name = format!("{}({})", name, expected_args.join(", "));

    let exact = params.len() == expected_args.len() && leading.iter().zip(expected_args).all(|(a, b)| a == b);
    let prefix = leading.len() == expected_args.len() && leading.iter().zip(expected_args).all(|(a, b)| a == b);

    if options.allow_extra_args {
        if !prefix {
            return CheckResult::failure(format!(
                "You have not defined a function <code>{}</code>.",
                full_name
            ));
        }
    } else if !exact {
        if prefix {
            return CheckResult::failure(format!(
                "You have not defined a function <code>{}</code>; your function <code>{}()</code> has extra arguments.",
                full_name, name
            ));
        }
        return CheckResult::failure(format!(
            "You have not defined a function <code>{}</code>.",
            full_name
        ));
    }

    if options.require_docstring && function.doc().map_or(true, |doc| doc.trim().is_empty()) {
        return CheckResult::failure(format!(
            "Your function <code>{}</code> has no docstring.",
            full_name
        ));
    }

    CheckResult::ok()
}

/// Render a value the way feedback messages show it; the absence value reads as `None`
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// `name(a, b)`, `name(a,)` for a single argument, `name(...)` when hidden
fn call_display(name: &str, args: &[Value], hide_args: bool) -> String {
    if hide_args {
        return format!("{}(...)", name);
    }
    let rendered: Vec<String> = args.iter().map(display_value).collect();
    match rendered.len() {
        1 => format!("{}({},)", name, rendered[0]),
        _ => format!("{}({})", name, rendered.join(", ")),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Call `name(args)` with its output captured and validate the result
pub fn check_eval(bindings: &Bindings, name: &str, args: &[Value], options: &EvalCheck) -> CheckResult {
    let function = match lookup_function(bindings, name) {
        Ok(function) => function,
        Err(failure) => return failure,
    };
    let call = call_display(name, args, options.hide_args);

    let mut captured: Vec<u8> = Vec::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| function.call(args, &mut captured)))
        .unwrap_or_else(|payload| Err(RuntimeFault(panic_message(payload))));

    let value = match result {
        Ok(value) => value,
        Err(fault) => {
            debug!(function = name, fault = %fault, "Evaluation raised a fault");
            return CheckResult::failure(format!(
                "When evaluating <code>{}</code>, your code raised an error: <code>{}</code>",
                call, fault
            ));
        }
    };

    let printed = String::from_utf8_lossy(&captured);
    if !options.allow_output && !printed.trim().is_empty() {
        return CheckResult::failure(format!(
            "When evaluating <code>{}</code>, your code printed something.  It should not do this.",
            call
        ));
    }

    if value.is_null() && !options.allow_none {
        return CheckResult::failure(format!(
            "When evaluating <code>{}</code>, your function returned <code>None</code>. \
             This probably means that you did not include a <code>return</code> statement.",
            call
        ));
    }

    if let Some(expected) = &options.correct_val {
        if !expected.is_null() && &value != expected {
            return CheckResult::failure(format!(
                "When evaluating <code>{}</code>, your function should return <code>{}</code>, \
                 but in fact it returns <code>{}</code>.",
                call,
                display_value(expected),
                display_value(&value)
            ))
            .with_value(value);
        }
    }

    CheckResult::ok_with(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Helper to build bindings with one documented function
    fn bindings_with(name: &str, params: &[&str], doc: Option<&str>) -> Bindings {
        let mut function = Function::new(params, |args, _| Ok(args.first().cloned().unwrap_or(Value::Null)));
        if let Some(doc) = doc {
            function = function.with_doc(doc);
        }
        let mut bindings = Bindings::new();
        bindings.define_function(name, function);
        bindings
    }

    /// Helper to build bindings from a single function body
    fn bindings_from(name: &str, function: Function) -> Bindings {
        let mut bindings = Bindings::new();
        bindings.define_function(name, function);
        bindings
    }

    #[test]
    fn test_check_function_missing() {
        let result = check_function(&Bindings::new(), "area", &["r"], FunctionCheck::default());
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("You have not defined <code>area</code>."));
    }

    #[test]
    fn test_check_function_not_callable() {
        let mut bindings = Bindings::new();
        bindings.define_value("area", json!(3.14));
        let result = check_function(&bindings, "area", &["r"], FunctionCheck::default());
        assert!(!result.success);
        assert!(result.message.unwrap().contains("not defined a function <code>area(...)</code>"));
    }

    #[test]
    fn test_check_function_exact_match() {
        let bindings = bindings_with("area", &["w", "h"], Some("Area of a rectangle."));
        let result = check_function(&bindings, "area", &["w", "h"], FunctionCheck::default());
        assert_eq!(result, CheckResult::ok());
    }

    #[test]
    fn test_check_function_extra_args_allowed() {
        let bindings = bindings_with("f", &["a", "b"], Some("doc"));
        let options = FunctionCheck { allow_extra_args: true, ..Default::default() };
        let result = check_function(&bindings, "f", &["a"], options);
        assert!(result.success);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_check_function_extra_args_rejected() {
        let bindings = bindings_with("f", &["a", "b"], Some("doc"));
        let result = check_function(&bindings, "f", &["a"], FunctionCheck::default());
        assert!(!result.success);
        let message = result.message.unwrap();
        assert!(message.contains("extra arguments"));
        assert!(message.contains("<code>f(a)</code>"));
    }

    #[test]
    fn test_check_function_wrong_names() {
        let bindings = bindings_with("f", &["x", "y"], Some("doc"));
        let result = check_function(&bindings, "f", &["a", "b"], FunctionCheck::default());
        assert_eq!(
            result.message.as_deref(),
            Some("You have not defined a function <code>f(a, b)</code>.")
        );

        let options = FunctionCheck { allow_extra_args: true, ..Default::default() };
        let result = check_function(&bindings, "f", &["x", "y", "z"], options);
        assert!(!result.success);
    }

    #[test]
    fn test_check_function_docstring() {
        let blank = bindings_with("f", &["a"], Some("   \n"));
        let result = check_function(&blank, "f", &["a"], FunctionCheck::default());
        assert_eq!(result.message.as_deref(), Some("Your function <code>f(a)</code> has no docstring."));

        let missing = bindings_with("f", &["a"], None);
        assert!(!check_function(&missing, "f", &["a"], FunctionCheck::default()).success);

        let options = FunctionCheck { require_docstring: false, ..Default::default() };
        assert!(check_function(&missing, "f", &["a"], options).success);
    }

    #[test]
    fn test_check_eval_correct_value() {
        let bindings = bindings_from("double", Function::new(&["x"], |args, _| {
            Ok(json!(args[0].as_i64().unwrap_or_default() * 2))
        }));
        let options = EvalCheck { correct_val: Some(json!(10)), ..Default::default() };
        let result = check_eval(&bindings, "double", &[json!(5)], &options);
        assert!(result.success);
        assert_eq!(result.value, Some(json!(10)));
    }

    #[test]
    fn test_check_eval_returns_none() {
        let bindings = bindings_from("f", Function::new(&["x"], |_, _| Ok(Value::Null)));
        let result = check_eval(&bindings, "f", &[json!(1)], &EvalCheck::default());
        assert!(!result.success);
        let message = result.message.unwrap();
        assert!(message.contains("returned <code>None</code>"));
        assert!(message.contains("<code>return</code> statement"));

        let options = EvalCheck { allow_none: true, ..Default::default() };
        assert!(check_eval(&bindings, "f", &[json!(1)], &options).success);
    }

    #[test]
    fn test_check_eval_wrong_value() {
        let bindings = bindings_from("f", Function::new(&["a", "b"], |_, _| Ok(json!(4))));
        let options = EvalCheck { correct_val: Some(json!(5)), ..Default::default() };
        let result = check_eval(&bindings, "f", &[json!(2), json!(3)], &options);
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some(
                "When evaluating <code>f(2, 3)</code>, your function should return <code>5</code>, \
                 but in fact it returns <code>4</code>."
            )
        );
        assert_eq!(result.value, Some(json!(4)));
    }

    #[test]
    fn test_check_eval_fault_is_caught() {
        let bindings = bindings_from("f", Function::new(&["x"], |_, _| {
            Err(RuntimeFault::new("division by zero"))
        }));
        let result = check_eval(&bindings, "f", &[json!(0)], &EvalCheck::default());
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("When evaluating <code>f(0,)</code>, your code raised an error: <code>division by zero</code>")
        );
    }

    #[test]
    fn test_check_eval_panic_is_caught() {
        let bindings = bindings_from("f", Function::new(&[], |_, _| panic!("index out of range")));
        let result = check_eval(&bindings, "f", &[], &EvalCheck::default());
        assert!(!result.success);
        assert!(result.message.unwrap().contains("<code>index out of range</code>"));
    }

    #[test]
    fn test_check_eval_output() {
        let bindings = bindings_from("f", Function::new(&["x"], |args, out| {
            writeln!(out, "debug").map_err(|e| RuntimeFault::new(e.to_string()))?;
            Ok(args[0].clone())
        }));
        let result = check_eval(&bindings, "f", &[json!("s")], &EvalCheck::default());
        assert!(result.message.unwrap().contains("printed something"));

        let options = EvalCheck { allow_output: true, ..Default::default() };
        let result = check_eval(&bindings, "f", &[json!("s")], &options);
        assert!(result.success);
        assert_eq!(result.value, Some(json!("s")));
    }

    #[test]
    fn test_check_eval_hide_args() {
        let bindings = bindings_from("f", Function::new(&["xs"], |_, _| Ok(json!(0))));
        let options = EvalCheck { correct_val: Some(json!(1)), hide_args: true, ..Default::default() };
        let big: Vec<i64> = (0..1000).collect();
        let result = check_eval(&bindings, "f", &[json!(big)], &options);
        let message = result.message.unwrap();
        assert!(message.contains("<code>f(...)</code>"));
        assert!(!message.contains("999"));
    }

    #[test]
    fn test_check_eval_missing_function() {
        let result = check_eval(&Bindings::new(), "f", &[], &EvalCheck::default());
        assert!(!result.success);
        assert!(result.message.unwrap().contains("not defined"));
    }
}
