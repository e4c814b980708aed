//! Parameter tree model
//!
//! A preset document is a structured tree with:
//! - a `Meta` element carrying the regenerable `UUID` identity
//! - a `name` attribute on the root (display name)
//! - a `Parameters` section whose children are named parameters, each with
//!   `unmapped_value` and `mapped_value` decimal attributes
//! - an optional `Node_Properties` element with category-specific attributes
//!
//! `PresetRecord` wraps the whole document so fields the engine does not
//! interpret are written back untouched.

mod xml;

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

pub use xml::{Declaration, Document, Element, Node};

use crate::error::{PresetError, PresetResult};

pub const META_ELEMENT: &str = "Meta";
pub const IDENTITY_ATTRIBUTE: &str = "UUID";
pub const NAME_ATTRIBUTE: &str = "name";
pub const PARAMETERS_ELEMENT: &str = "Parameters";
pub const NODE_PROPERTIES_ELEMENT: &str = "Node_Properties";
pub const SUB_PRESET_NAME_ATTRIBUTE: &str = "SubPresetName";
pub const UNMAPPED_VALUE: &str = "unmapped_value";
pub const MAPPED_VALUE: &str = "mapped_value";

/// A single named parameter with its raw and transformed values
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub unmapped_value: f64,
    pub mapped_value: f64,
}

/// Why a parameter could not be read from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterIssue {
    #[error("parameter '{0}' not found")]
    Missing(String),

    #[error("parameter '{name}' has non-numeric {field} '{value}'")]
    NonNumeric {
        name: String,
        field: &'static str,
        value: String,
    },
}

/// Format a value as shortest round-trip decimal text (`150.0`, `0.25`)
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// A preset document with typed access to identity, name and parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRecord {
    document: Document,
}

impl PresetRecord {
    /// Parse and validate a preset document
    ///
    /// Fails with `MalformedRecord` when the text is not a single-rooted XML
    /// document, has no `Parameters` section, a parameter carries neither
    /// value attribute, or two parameters share a name.
    pub fn parse(text: &str, source_name: &str) -> PresetResult<Self> {
        let document = Document::parse(text).map_err(|e| match e {
            PresetError::MalformedRecord { reason, .. } => PresetError::malformed(source_name, reason),
            other => PresetError::malformed(source_name, other.to_string()),
        })?;
        Self::from_document(document, source_name)
    }

    pub fn from_document(document: Document, source_name: &str) -> PresetResult<Self> {
        let parameters = parameters_section(&document.root)
            .ok_or_else(|| PresetError::malformed(source_name, "missing Parameters section"))?;

        let mut seen = HashSet::new();
        for param in parameters.child_elements() {
            if param.attribute(UNMAPPED_VALUE).is_none() && param.attribute(MAPPED_VALUE).is_none() {
                return Err(PresetError::malformed(
                    source_name,
                    format!("parameter '{}' has no value attributes", param.name),
                ));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(PresetError::malformed(
                    source_name,
                    format!("duplicate parameter '{}'", param.name),
                ));
            }
        }

        Ok(Self { document })
    }

    /// Read and parse a preset file
    pub fn from_file(path: &Path) -> PresetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, &path.display().to_string())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn to_xml_string(&self) -> PresetResult<String> {
        self.document.to_xml_string()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity and naming
    // ─────────────────────────────────────────────────────────────────────────

    pub fn identity(&self) -> Option<&str> {
        self.document
            .root
            .find(META_ELEMENT)
            .and_then(|meta| meta.attribute(IDENTITY_ATTRIBUTE))
    }

    /// Assign a fresh UUID v4 that differs from every identity in `avoid`
    ///
    /// Inserts a `Meta` element as the first child of the root when the
    /// document has none.
    pub fn regenerate_identity(&mut self, avoid: &[&str]) -> String {
        let identity = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !avoid.contains(&candidate.as_str()) && self.identity() != Some(candidate.as_str()) {
                break candidate;
            }
        };

        let root = &mut self.document.root;
        if root.find(META_ELEMENT).is_none() {
            root.children.insert(0, Node::Element(Element::new(META_ELEMENT)));
        }
        if let Some(meta) = root.find_mut(META_ELEMENT) {
            meta.set_attribute(IDENTITY_ATTRIBUTE, identity.as_str());
        }
        identity
    }

    pub fn display_name(&self) -> Option<&str> {
        self.document.root.attribute(NAME_ATTRIBUTE)
    }

    /// Set the root display name and mirror it into `Node_Properties/@SubPresetName`
    pub fn set_display_name(&mut self, name: &str) {
        self.document.root.set_attribute(NAME_ATTRIBUTE, name);
        if let Some(props) = self.node_properties_mut() {
            props.set_attribute(SUB_PRESET_NAME_ATTRIBUTE, name);
        }
    }

    pub fn node_properties(&self) -> Option<&Element> {
        self.document.root.find(NODE_PROPERTIES_ELEMENT)
    }

    pub fn node_properties_mut(&mut self) -> Option<&mut Element> {
        self.document.root.find_mut(NODE_PROPERTIES_ELEMENT)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────

    fn parameters_element(&self) -> Option<&Element> {
        parameters_section(&self.document.root)
    }

    /// Parameter names in document order
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters_element()
            .into_iter()
            .flat_map(|params| params.child_elements())
            .map(|param| param.name.as_str())
    }

    /// All parameters in document order, each either read or the reason it could not be
    pub fn parameters(&self) -> impl Iterator<Item = Result<Parameter, ParameterIssue>> + '_ {
        self.parameters_element()
            .into_iter()
            .flat_map(|params| params.child_elements())
            .map(read_parameter)
    }

    /// Resolve a parameter by name
    ///
    /// An absent value attribute reads as `0`; a present but non-numeric one
    /// is an issue.
    pub fn parameter(&self, name: &str) -> Result<Parameter, ParameterIssue> {
        self.parameters_element()
            .and_then(|params| params.child_elements().find(|p| p.name == name))
            .ok_or_else(|| ParameterIssue::Missing(name.to_string()))
            .and_then(read_parameter)
    }

    /// Overwrite both values of an existing parameter
    ///
    /// Returns false (and changes nothing) when the record has no parameter
    /// of that name. Other attributes of the parameter are left alone.
    pub fn set_parameter(&mut self, parameter: &Parameter) -> bool {
        let Some(params) = self
            .document
            .root
            .child_elements_mut()
            .find(|e| e.name == PARAMETERS_ELEMENT)
        else {
            return false;
        };
        match params.child_elements_mut().find(|p| p.name == parameter.name) {
            Some(element) => {
                element.set_attribute(UNMAPPED_VALUE, format_value(parameter.unmapped_value));
                element.set_attribute(MAPPED_VALUE, format_value(parameter.mapped_value));
                true
            }
            None => false,
        }
    }

    /// Write a collection of parameter values back onto this record
    ///
    /// Only parameters already defined here are touched; the rest are
    /// ignored. Returns how many were applied.
    pub fn replace_parameters<'a>(&mut self, parameters: impl IntoIterator<Item = &'a Parameter>) -> usize {
        parameters
            .into_iter()
            .filter(|p| self.set_parameter(p))
            .count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    /// Write to a new file, failing if `path` already exists
    ///
    /// The document is serialized fully before anything touches disk, then
    /// written through a temp file in the same directory and persisted.
    pub fn save_new(&self, path: &Path) -> PresetResult<()> {
        let staged = self.stage(path)?;
        staged.persist_noclobber(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> PresetResult<()> {
        let staged = self.stage(path)?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn stage(&self, path: &Path) -> PresetResult<tempfile::NamedTempFile> {
        let xml = self.to_xml_string()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(xml.as_bytes())?;
        staged.flush()?;
        Ok(staged)
    }
}

/// The `Parameters` element directly under the root; nested sections are not parameters
fn parameters_section(root: &Element) -> Option<&Element> {
    root.child_elements().find(|e| e.name == PARAMETERS_ELEMENT)
}

fn read_parameter(element: &Element) -> Result<Parameter, ParameterIssue> {
    let value = |field: &'static str| -> Result<f64, ParameterIssue> {
        match element.attribute(field) {
            None => Ok(0.0),
            Some(text) => text.trim().parse::<f64>().map_err(|_| ParameterIssue::NonNumeric {
                name: element.name.clone(),
                field,
                value: text.to_string(),
            }),
        }
    };
    Ok(Parameter {
        name: element.name.clone(),
        unmapped_value: value(UNMAPPED_VALUE)?,
        mapped_value: value(MAPPED_VALUE)?,
    })
}
