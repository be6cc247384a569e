//! Command composition: ordered templates + parameters → one shell statement list.
//!
//! Placeholders are written `{{Field}}`. Whitespace inside the braces and a
//! leading `.` are ignored, so `{{ .Field }}` names the same field. Values are
//! substituted literally: nothing is quoted or escaped, the parameters are
//! trusted operator input.
//!
//! Rendered lines are joined with `;` rather than `&&`. The remote shell runs
//! every statement even if an earlier one fails, which keeps the cleanup steps
//! of a script running after a failed load-generator step. Only the exit status
//! of the last statement reaches the caller.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::remote::error::CompositionError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Statement separator between rendered lines.
pub const SEPARATOR: char = ';';

/// Named string values substituted into templates.
///
/// Built once at run start and then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRecord {
    fields: BTreeMap<String, String>,
}

impl ParameterRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Flatten a serializable struct into fields, one per struct member.
    ///
    /// Members must serialize as strings, numbers or booleans; nested values
    /// have no textual form in a shell line and are rejected.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, CompositionError> {
        let json =
            serde_json::to_value(value).map_err(|e| CompositionError::Parameters(e.to_string()))?;

        let serde_json::Value::Object(map) = json else {
            return Err(CompositionError::Parameters(
                "parameters must serialize to a map of fields".to_string(),
            ));
        };

        let mut record = Self::new();
        for (field, value) in map {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CompositionError::Parameters(format!(
                        "field {} has no scalar value: {}",
                        field, other
                    )));
                }
            };
            record.fields.insert(field, text);
        }
        Ok(record)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Ordered list of command templates forming one remote script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    lines: Vec<String>,
}

impl ScriptTemplate {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Rendered script, ready for a single remote invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedScript {
    lines: Vec<String>,
    text: String,
}

impl ComposedScript {
    /// A script that is sent verbatim, without templating.
    pub fn verbatim(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            lines: vec![command.clone()],
            text: command,
        }
    }

    /// Rendered lines in composition order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The `;`-joined statement sequence.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Render one template against `params`.
pub fn render(template: &str, params: &ParameterRecord) -> Result<String, CompositionError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let Some(end) = after_open.find(CLOSE) else {
            return Err(CompositionError::UnterminatedPlaceholder {
                template: template.to_string(),
            });
        };

        let field = placeholder_field(&after_open[..end]);
        let value = params
            .get(field)
            .ok_or_else(|| CompositionError::UnresolvedPlaceholder {
                field: field.to_string(),
                template: template.to_string(),
            })?;
        rendered.push_str(value);

        rest = &after_open[end + CLOSE.len()..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn placeholder_field(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('.').unwrap_or(trimmed).trim()
}

/// Render every template in order and join them into one script.
///
/// Fails on the first template that cannot be rendered; nothing partial is
/// returned.
pub fn compose(
    template: &ScriptTemplate,
    params: &ParameterRecord,
) -> Result<ComposedScript, CompositionError> {
    if template.lines().is_empty() {
        return Err(CompositionError::EmptyScript);
    }

    let lines = template
        .lines()
        .iter()
        .map(|line| render(line, params))
        .collect::<Result<Vec<_>, _>>()?;

    let text = lines.join(&SEPARATOR.to_string());
    debug!(
        "Composed {} statement(s) from {} field(s) into a {} byte script",
        lines.len(),
        params.len(),
        text.len()
    );

    Ok(ComposedScript { lines, text })
}
