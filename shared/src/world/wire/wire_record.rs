use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    types::ContextId,
    world::{
        value::{Timestamp, Value},
        wire::error::WireError,
    },
};

/// Structural type tag of a wire record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireKind {
    Scalar,
    Sequence,
    Mapping,
    Set,
    StructuredObject,
    Timestamp,
}

impl WireKind {
    /// Tracked kinds are registered and always carry a contextId
    pub fn is_tracked(&self) -> bool {
        matches!(
            self,
            WireKind::Sequence | WireKind::Mapping | WireKind::Set | WireKind::StructuredObject
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            WireKind::Scalar => "scalar",
            WireKind::Sequence => "sequence",
            WireKind::Mapping => "mapping",
            WireKind::Set => "set",
            WireKind::StructuredObject => "structured-object",
            WireKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline scalar payload. JSON `null` is represented by an absent value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// `None` for null and for numbers JSON cannot carry
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(inner) => Some(Scalar::Bool(*inner)),
            Value::Number(inner) if inner.is_finite() => Some(Scalar::Number(*inner)),
            Value::Text(inner) => Some(Scalar::Text(inner.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(inner) => Value::Bool(*inner),
            Scalar::Number(inner) => Value::Number(*inner),
            Scalar::Text(inner) => Value::Text(inner.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Nested(Vec<WireRecord>),
    Scalar(Scalar),
}

/// One node of an encoded graph.
///
/// A tracked record with no `value` is a reference to a container the
/// receiver already holds (or will hold by the end of the message), never
/// a null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    #[serde(default)]
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<ContextId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ContextId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WireValue>,
    #[serde(rename = "type")]
    pub kind: WireKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_metadata: Vec<WireRecord>,
}

impl WireRecord {
    pub fn scalar(property: impl Into<String>, parent_id: Option<ContextId>, value: &Value) -> Self {
        Self {
            property: property.into(),
            context_id: None,
            parent_id,
            value: Scalar::from_value(value).map(WireValue::Scalar),
            kind: WireKind::Scalar,
            child_metadata: Vec::new(),
        }
    }

    pub fn timestamp(
        property: impl Into<String>,
        parent_id: Option<ContextId>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            property: property.into(),
            context_id: None,
            parent_id,
            value: Some(WireValue::Scalar(Scalar::Number(timestamp.millis() as f64))),
            kind: WireKind::Timestamp,
            child_metadata: Vec::new(),
        }
    }

    /// Reference to an already known container
    pub fn stub(
        property: impl Into<String>,
        kind: WireKind,
        context_id: ContextId,
        parent_id: Option<ContextId>,
    ) -> Self {
        Self {
            property: property.into(),
            context_id: Some(context_id),
            parent_id,
            value: None,
            kind,
            child_metadata: Vec::new(),
        }
    }

    /// Full record for a sequence, set or mapping
    pub fn collection(
        property: impl Into<String>,
        kind: WireKind,
        context_id: ContextId,
        parent_id: Option<ContextId>,
        children: Vec<WireRecord>,
    ) -> Self {
        Self {
            property: property.into(),
            context_id: Some(context_id),
            parent_id,
            value: Some(WireValue::Nested(children)),
            kind,
            child_metadata: Vec::new(),
        }
    }

    /// Full record for a structured object. `inline` carries the scalar
    /// fields, `complex` the container-valued ones.
    pub fn object(
        property: impl Into<String>,
        context_id: ContextId,
        parent_id: Option<ContextId>,
        inline: Vec<WireRecord>,
        complex: Vec<WireRecord>,
    ) -> Self {
        Self {
            property: property.into(),
            context_id: Some(context_id),
            parent_id,
            value: Some(WireValue::Nested(inline)),
            kind: WireKind::StructuredObject,
            child_metadata: complex,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.kind.is_tracked() && self.value.is_none()
    }

    /// Nested child records, empty for scalars and stubs
    pub fn children(&self) -> &[WireRecord] {
        match &self.value {
            Some(WireValue::Nested(children)) => children,
            _ => &[],
        }
    }

    /// Every child of this record: nested ones, then out-of-band ones
    pub fn all_children(&self) -> impl Iterator<Item = &WireRecord> {
        self.children().iter().chain(self.child_metadata.iter())
    }

    /// Visits this record and all of its descendants, depth first
    pub fn visit(&self, visitor: &mut impl FnMut(&WireRecord)) {
        visitor(self);
        for child in self.all_children() {
            child.visit(visitor);
        }
    }

    /// Decodes a scalar or timestamp record
    pub fn to_plain_value(&self) -> Result<Value, WireError> {
        match (self.kind, &self.value) {
            (WireKind::Scalar, None) => Ok(Value::Null),
            (WireKind::Scalar, Some(WireValue::Scalar(scalar))) => Ok(scalar.to_value()),
            (WireKind::Timestamp, Some(WireValue::Scalar(Scalar::Number(millis))))
                if millis.is_finite() =>
            {
                Ok(Value::Timestamp(Timestamp::from_millis(*millis as i64)))
            }
            (WireKind::Timestamp, _) => Err(WireError::InvalidTimestamp {
                property: self.property.clone(),
            }),
            (kind, _) => Err(WireError::UnexpectedPayload {
                kind,
                property: self.property.clone(),
                detail: "expected a scalar payload",
            }),
        }
    }

    /// Checks the record tree's shape against its type tags
    pub fn validate(&self) -> Result<(), WireError> {
        match self.kind {
            WireKind::Scalar => {
                if matches!(self.value, Some(WireValue::Nested(_))) {
                    return Err(self.unexpected("scalars cannot nest records"));
                }
            }
            WireKind::Timestamp => {
                self.to_plain_value()?;
            }
            kind => {
                let Some(context_id) = &self.context_id else {
                    return Err(WireError::MissingContextId {
                        kind,
                        property: self.property.clone(),
                    });
                };
                if matches!(self.value, Some(WireValue::Scalar(_))) {
                    return Err(self.unexpected("containers carry nested records"));
                }
                if kind != WireKind::StructuredObject && !self.child_metadata.is_empty() {
                    return Err(self.unexpected("only structured objects carry childMetadata"));
                }
                if self.is_stub() && !self.child_metadata.is_empty() {
                    return Err(self.unexpected("references carry no children"));
                }
                if kind == WireKind::Mapping && self.children().len() % 2 != 0 {
                    return Err(WireError::MalformedMapping {
                        context_id: context_id.clone(),
                        count: self.children().len(),
                    });
                }
            }
        }

        for child in self.all_children() {
            child.validate()?;
        }
        Ok(())
    }

    fn unexpected(&self, detail: &'static str) -> WireError {
        WireError::UnexpectedPayload {
            kind: self.kind,
            property: self.property.clone(),
            detail,
        }
    }
}
