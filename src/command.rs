use crate::description::{Location, Operation};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Parameters of a command invocation.
pub type Params = Map<String, Value>;

/// A named operation with its parameters bound to the request template.
#[derive(Clone, Debug)]
pub struct Command {
    pub name: String,
    pub method: reqwest::Method,
    /// Path and query string, relative to the client's base URI
    pub uri: String,
    /// Parameters the command was resolved with, defaults applied
    pub params: Params,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub empty_response: bool,
}

/// Bind `params` to `operation`.
///
/// Declared parameters are checked for presence and type and placed where
/// the template says. Undeclared ones go to the operation's
/// `additionalParameters` location, or are dropped when it has none.
pub fn resolve(name: &str, operation: &Operation, mut params: Params) -> Result<Command> {
    let method = operation
        .method()
        .map_err(|e| Error::Resolution(format!("Command {} has an invalid method: {}", name, e)))?;

    let mut bound = Bound::default();

    for (key, parameter) in &operation.parameters {
        let value = match params.get(key) {
            Some(Value::Null) | None => parameter.default.clone(),
            Some(value) => Some(value.clone()),
        };

        let Some(value) = value else {
            if parameter.required {
                return Err(Error::Resolution(format!(
                    "Command {} is missing required parameter {}",
                    name, key
                )));
            }
            continue;
        };

        if let Some(kind) = parameter.kind
            && !kind.matches(&value)
        {
            return Err(Error::Resolution(format!(
                "Parameter {} of command {} must be of type {:?}, got {}",
                key, name, kind, value
            )));
        }

        params.insert(key.clone(), value.clone());
        bound.place(parameter.location, parameter.wire_name(key).to_string(), value, name)?;
    }

    for (key, value) in &params {
        if operation.parameters.contains_key(key) || value.is_null() {
            continue;
        }
        match &operation.additional_parameters {
            Some(additional) => {
                bound.place(additional.location, key.clone(), value.clone(), name)?
            }
            None => log::debug!("Command {} ignores undeclared parameter {}", name, key),
        }
    }

    let path = expand_uri(name, &operation.uri, &bound.uri)?;
    let uri = if bound.query.is_empty() {
        path
    } else {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &bound.query {
            query.append_pair(key, value);
        }
        format!("{}?{}", path, query.finish())
    };

    let body = if bound.json.is_empty() {
        None
    } else {
        Some(Value::Object(bound.json))
    };

    log::debug!("Resolved command {} to {} {}", name, method, uri);
    Ok(Command {
        name: name.to_string(),
        method,
        uri,
        params,
        body,
        headers: bound.headers,
        empty_response: operation.empty_response,
    })
}

#[derive(Default)]
struct Bound {
    uri: Vec<(String, String)>,
    query: Vec<(String, String)>,
    json: Map<String, Value>,
    headers: Vec<(String, String)>,
}

impl Bound {
    fn place(&mut self, location: Location, key: String, value: Value, command: &str) -> Result<()> {
        match location {
            Location::Uri => {
                let value = scalar(&value).ok_or_else(|| non_scalar(command, &key))?;
                self.uri.push((key, value));
            }
            Location::Query => match value {
                Value::Array(items) => {
                    for item in items {
                        let item = scalar(&item).ok_or_else(|| non_scalar(command, &key))?;
                        self.query.push((key.clone(), item));
                    }
                }
                value => {
                    let value = scalar(&value).ok_or_else(|| non_scalar(command, &key))?;
                    self.query.push((key, value));
                }
            },
            Location::Header => {
                let value = scalar(&value).ok_or_else(|| non_scalar(command, &key))?;
                self.headers.push((key, value));
            }
            Location::Json => {
                self.json.insert(key, value);
            }
        }
        Ok(())
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_scalar(command: &str, key: &str) -> Error {
    Error::Resolution(format!(
        "Parameter {} of command {} cannot be sent as text",
        key, command
    ))
}

/// Replace every `{name}` in `template` with its percent-encoded value.
///
/// Each value must stay a single path segment, so empty and dot values are
/// rejected.
fn expand_uri(command: &str, template: &str, values: &[(String, String)]) -> Result<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let end = rest[start..].find('}').map(|i| start + i).ok_or_else(|| {
            Error::Resolution(format!("Command {} has an unterminated URI template", command))
        })?;

        let placeholder = &rest[start + 1..end];
        let value = values
            .iter()
            .find(|(key, _)| key == placeholder)
            .map(|(_, value)| value)
            .ok_or_else(|| {
                Error::Resolution(format!(
                    "Command {} has no value for URI placeholder {{{}}}",
                    command, placeholder
                ))
            })?;

        // Dot segments would be collapsed when joined onto the base URI
        if matches!(value.as_str(), "" | "." | "..") {
            return Err(Error::Resolution(format!(
                "Command {} cannot use {:?} as URI placeholder {{{}}}",
                command, value, placeholder
            )));
        }

        expanded.push_str(&rest[..start]);
        expanded.push_str(&urlencoding::encode(value));
        rest = &rest[end + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}
