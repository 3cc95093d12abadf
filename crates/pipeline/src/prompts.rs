//! Prompt text for each report section.
//!
//! System policies are fixed per section; user prompts are assembled from
//! the request. The exact wording is not load-bearing: the strict output
//! schema is what the pipeline relies on.

use forgekit_core::report::ReportKind;
use serde_json::Value;

const COMPONENTS_POLICY: &str = "\
You are a hardware product engineer specializing in FDM 3D printing. \
Break the described product into individually printable components. \
For each component give a concise description, a detailed prompt suitable \
for a text-to-3D model generator, print specifications (layer height, \
infill, orientation), assembly notes, an estimated print time, a material \
and whether supports are needed. Respond with a single JSON object only.";

const ASSEMBLY_POLICY: &str = "\
You are a hardware assembly technician. Produce the bill of materials for \
the described product (every non-printed part with quantity, a typical \
vendor and an estimated cost) and numbered step-by-step assembly \
instructions. Put a short overview in `content`. Respond with a single \
JSON object only.";

const FIRMWARE_POLICY: &str = "\
You are an embedded firmware engineer. Write complete, compilable firmware \
for the described product on the requested platform. List the required \
libraries and return every source file with its filename and full code. \
Put a short overview in `content`. Respond with a single JSON object only.";

const EDIT_POLICY: &str = "\
You are revising an existing generated document. Apply the user's \
instruction to the current JSON and return the complete revised document \
in the same structure. Keep everything the instruction does not touch.";

const COMPONENT_EDIT_POLICY: &str = "\
You are revising a single printable component of a hardware product. Apply \
the user's instruction to the component JSON and return only that one \
component object with every field filled in.";

pub const SUMMARY_POLICY: &str = "\
Summarize in two or three plain sentences, addressed to the user, what was \
generated or changed. Do not use JSON or markdown.";

/// Fixed system policy for a section generation.
pub fn system_policy(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Components => COMPONENTS_POLICY,
        ReportKind::Assembly => ASSEMBLY_POLICY,
        ReportKind::Firmware => FIRMWARE_POLICY,
    }
}

/// System policy for a whole-section edit.
pub fn edit_policy(kind: ReportKind) -> String {
    format!("{}\n\n{EDIT_POLICY}", system_policy(kind))
}

pub fn component_edit_policy() -> String {
    format!("{COMPONENTS_POLICY}\n\n{COMPONENT_EDIT_POLICY}")
}

pub fn generation_prompt(
    project: &str,
    description: &str,
    section_params: Option<&Value>,
) -> String {
    let mut prompt = format!("Project: {project}\n\nDescription:\n{description}\n");
    if let Some(params) = section_params.filter(|p| !p.is_null()) {
        prompt.push_str("\nAdditional requirements:\n");
        prompt.push_str(&pretty(params));
        prompt.push('\n');
    }
    prompt
}

pub fn edit_prompt(current: Option<&Value>, instruction: &str, context: Option<&Value>) -> String {
    let mut prompt = String::new();
    match current {
        Some(current) => {
            prompt.push_str("Current document:\n");
            prompt.push_str(&pretty(current));
        }
        None => prompt.push_str("There is no current document yet; create one."),
    }
    push_context(&mut prompt, context);
    prompt.push_str("\n\nInstruction:\n");
    prompt.push_str(instruction);
    prompt
}

pub fn component_edit_prompt(
    component: &Value,
    instruction: &str,
    context: Option<&Value>,
) -> String {
    let mut prompt = format!("Current component:\n{}", pretty(component));
    push_context(&mut prompt, context);
    prompt.push_str("\n\nInstruction:\n");
    prompt.push_str(instruction);
    prompt
}

pub fn summary_prompt(kind: ReportKind, payload: &Value, instruction: Option<&str>) -> String {
    let mut prompt = format!("Section: {kind}\n");
    if let Some(instruction) = instruction {
        prompt.push_str(&format!("User request: {instruction}\n"));
    }
    prompt.push_str("\nResult:\n");
    prompt.push_str(&pretty(payload));
    prompt
}

fn push_context(prompt: &mut String, context: Option<&Value>) {
    if let Some(context) = context.filter(|c| !c.is_null()) {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(&pretty(context));
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
