//! Report sections, their schemas, placeholders and read-side normalization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::json_extract::extract_json_object;
use crate::schema::{FieldSpec, ObjectSchema};

/// Prefix written into placeholder sections so viewers can show an error
/// banner instead of content.
pub const ERROR_PREFIX: &str = "Error: ";

// ---------------------------------------------------------------------------
// Section schemas
// ---------------------------------------------------------------------------

/// One printable component inside the `3d-components` section.
pub static COMPONENT_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("component"),
        FieldSpec::string("description"),
        FieldSpec::string("promptFor3DGeneration"),
        FieldSpec::string("printSpecifications"),
        FieldSpec::string("assemblyNotes"),
        FieldSpec::string("printTime"),
        FieldSpec::string("material"),
        FieldSpec::string("supports"),
    ],
    aliases: &[
        ("name", "component"),
        ("prompt", "promptFor3DGeneration"),
        ("printSpecs", "printSpecifications"),
        ("estimatedPrintTime", "printTime"),
    ],
};

pub static COMPONENTS_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("project"),
        FieldSpec::string("description"),
        FieldSpec::object_list("components", &COMPONENT_SCHEMA),
        FieldSpec::string("generalNotes"),
    ],
    aliases: &[("projectName", "project"), ("notes", "generalNotes")],
};

static PART_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("part"),
        FieldSpec::integer("quantity"),
        FieldSpec::string("vendor"),
        FieldSpec::string("estimatedCost"),
        FieldSpec::string("notes"),
    ],
    aliases: &[("name", "part"), ("qty", "quantity"), ("supplier", "vendor")],
};

static ASSEMBLY_STEP_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::integer("step"),
        FieldSpec::string("title"),
        FieldSpec::string("instructions"),
    ],
    aliases: &[("stepNumber", "step"), ("description", "instructions")],
};

pub static ASSEMBLY_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("project"),
        FieldSpec::string("content"),
        FieldSpec::object_list("parts", &PART_SCHEMA),
        FieldSpec::object_list("assemblySteps", &ASSEMBLY_STEP_SCHEMA),
        FieldSpec::string("generalNotes"),
    ],
    aliases: &[
        ("projectName", "project"),
        ("summary", "content"),
        ("partsList", "parts"),
        ("steps", "assemblySteps"),
    ],
};

static FIRMWARE_FILE_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("filename"),
        FieldSpec::string("description"),
        FieldSpec::string("code"),
    ],
    aliases: &[("name", "filename"), ("path", "filename"), ("content", "code")],
};

pub static FIRMWARE_SCHEMA: ObjectSchema = ObjectSchema {
    fields: &[
        FieldSpec::string("project"),
        FieldSpec::string("content"),
        FieldSpec::string("language"),
        FieldSpec::string("platform"),
        FieldSpec::string_list("libraries"),
        FieldSpec::object_list("files", &FIRMWARE_FILE_SCHEMA),
        FieldSpec::string("generalNotes"),
    ],
    aliases: &[
        ("projectName", "project"),
        ("summary", "content"),
        ("microcontroller", "platform"),
    ],
};

// ---------------------------------------------------------------------------
// Report kinds
// ---------------------------------------------------------------------------

/// A named section of generated content stored on a report record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    #[serde(rename = "3d-components")]
    Components,
    #[serde(rename = "assembly-parts")]
    Assembly,
    #[serde(rename = "firmware-code")]
    Firmware,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [Self::Components, Self::Assembly, Self::Firmware];

    /// Public section name used in URLs, job types and response maps.
    pub fn section_name(self) -> &'static str {
        match self {
            Self::Components => "3d-components",
            Self::Assembly => "assembly-parts",
            Self::Firmware => "firmware-code",
        }
    }

    /// The `reports` column holding this section.
    pub fn column(self) -> &'static str {
        match self {
            Self::Components => "components",
            Self::Assembly => "assembly",
            Self::Firmware => "firmware",
        }
    }

    pub fn schema(self) -> &'static ObjectSchema {
        match self {
            Self::Components => &COMPONENTS_SCHEMA,
            Self::Assembly => &ASSEMBLY_SCHEMA,
            Self::Firmware => &FIRMWARE_SCHEMA,
        }
    }

    /// Name given to the strict output format in the provider request.
    pub fn schema_name(self) -> &'static str {
        match self {
            Self::Components => "components_report",
            Self::Assembly => "assembly_report",
            Self::Firmware => "firmware_report",
        }
    }

    /// The text field that carries the human-readable summary and, for
    /// placeholders, the error message.
    pub fn notes_field(self) -> &'static str {
        match self {
            Self::Components => "generalNotes",
            Self::Assembly | Self::Firmware => "content",
        }
    }

    /// A schema-conforming section whose notes field describes `error`.
    pub fn placeholder(self, project: &str, error: &str) -> Value {
        let message = format!("{ERROR_PREFIX}{error}");
        match self {
            Self::Components => json!({
                "project": project,
                "description": "",
                "components": [],
                "generalNotes": message,
            }),
            Self::Assembly => json!({
                "project": project,
                "content": message,
                "parts": [],
                "assemblySteps": [],
                "generalNotes": "",
            }),
            Self::Firmware => json!({
                "project": project,
                "content": message,
                "language": "",
                "platform": "",
                "libraries": [],
                "files": [],
                "generalNotes": "",
            }),
        }
    }

    /// Short summary used when the summarizing model call is unavailable.
    pub fn fallback_summary(self, payload: &Value) -> String {
        let project = payload["project"].as_str().unwrap_or("the project");
        let count = |key: &str| payload[key].as_array().map_or(0, Vec::len);
        match self {
            Self::Components => format!(
                "Generated {} printable component(s) for {project}.",
                count("components")
            ),
            Self::Assembly => format!(
                "Prepared {} part(s) and {} assembly step(s) for {project}.",
                count("parts"),
                count("assemblySteps")
            ),
            Self::Firmware => format!(
                "Generated {} firmware file(s) for {project} targeting {}.",
                count("files"),
                payload["platform"].as_str().unwrap_or("the selected platform")
            ),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.section_name() == s)
            .ok_or_else(|| format!("Unknown report section '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Component addressing (component-scoped edits)
// ---------------------------------------------------------------------------

/// How a chat edit points at one component of the `3d-components` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelector {
    /// Zero-based position in the `components` array.
    Index(usize),
    /// Case-insensitive match on the `component` name.
    Name(String),
}

impl fmt::Display for ComponentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Position of the selected component in a `3d-components` payload.
pub fn locate_component(section: &Value, selector: &ComponentSelector) -> Option<usize> {
    let components = section["components"].as_array()?;
    match selector {
        ComponentSelector::Index(i) => (*i < components.len()).then_some(*i),
        ComponentSelector::Name(name) => components.iter().position(|c| {
            c["component"]
                .as_str()
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name.trim()))
        }),
    }
}

// ---------------------------------------------------------------------------
// Read-side normalization
// ---------------------------------------------------------------------------

/// Whether a stored section is an error placeholder.
pub fn is_error_section(kind: ReportKind, section: &Value) -> bool {
    section[kind.notes_field()]
        .as_str()
        .is_some_and(|s| s.starts_with(ERROR_PREFIX))
}

/// Bring a stored section into the single shape the UI reads.
///
/// Older rows stored either a bare string or `{ "content": "<json text>" }`.
/// Strings containing an object are unwrapped; other strings become
/// `{ "content": ... }`. Every result gains a boolean `hasError`.
pub fn normalize_stored_section(kind: ReportKind, stored: &Value) -> Value {
    let mut section = match stored {
        Value::String(text) => unwrap_text(text),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(text)) if map.len() == 1 => unwrap_text(text),
            _ => stored.clone(),
        },
        other => json!({ "content": other }),
    };

    let has_error = is_error_section(kind, &section)
        || section["content"]
            .as_str()
            .is_some_and(|s| s.starts_with(ERROR_PREFIX));
    if let Value::Object(map) = &mut section {
        map.insert("hasError".to_string(), Value::Bool(has_error));
    }
    section
}

fn unwrap_text(text: &str) -> Value {
    match extract_json_object(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "content": text }),
    }
}
