/// Binding table the introspection checks run against
///
/// Checking code registers what the student's program defined: plain values
/// and functions. A function carries its parameter names, its docstring and a
/// native body that receives the call arguments plus a writer standing in for
/// standard output, so the checks can capture anything the call prints.
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// A fault raised by a function body during a call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RuntimeFault(pub String);

impl RuntimeFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type CallResult = Result<Value, RuntimeFault>;

type NativeBody = dyn Fn(&[Value], &mut dyn Write) -> CallResult + Send + Sync;

#[derive(Clone)]
pub struct Function {
    params: Vec<String>,
    doc: Option<String>,
    body: Arc<NativeBody>,
}

impl Function {
    pub fn new<F>(params: &[&str], body: F) -> Self
    where
        F: Fn(&[Value], &mut dyn Write) -> CallResult + Send + Sync + 'static,
    {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            doc: None,
            body: Arc::new(body),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn call(&self, args: &[Value], out: &mut dyn Write) -> CallResult {
        (self.body)(args, out)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(Function),
}

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: HashMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(name.into(), Binding::Value(value));
        self
    }

    pub fn define_function(&mut self, name: impl Into<String>, function: Function) -> &mut Self {
        self.entries.insert(name.into(), Binding::Function(function));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
