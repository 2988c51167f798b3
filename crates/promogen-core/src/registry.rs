//! In-memory registry of requested outputs.
//!
//! The registry always holds at least one spec. It performs no I/O; the
//! controller snapshots it when a generation run is submitted.

use crate::constants::is_supported_language;
use crate::error::RegistryError;
use crate::models::{AssetFormat, OutputSpec, OutputType};

/// A single editable field of an [`OutputSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecField {
    OutputType(OutputType),
    Enabled(bool),
    Language(String),
    Width(u32),
    Height(u32),
    GeneratePrint(bool),
}

#[derive(Debug, Clone)]
pub struct OutputSpecRegistry {
    specs: Vec<OutputSpec>,
    next_seq: u64,
}

impl Default for OutputSpecRegistry {
    /// A registry holding a single default poster.
    fn default() -> Self {
        let mut registry = Self {
            specs: Vec::new(),
            next_seq: 1,
        };
        registry.add(OutputType::Poster);
        registry
    }
}

impl OutputSpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from existing specs. Ids must be unique and the list non-empty.
    pub fn from_specs(specs: Vec<OutputSpec>) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::LastSpec);
        }
        for (i, spec) in specs.iter().enumerate() {
            if specs[..i].iter().any(|s| s.id == spec.id) {
                return Err(RegistryError::InvalidValue(format!(
                    "duplicate output spec id {}",
                    spec.id
                )));
            }
        }
        Ok(Self {
            next_seq: specs.len() as u64 + 1,
            specs,
        })
    }

    /// Append a spec of the given type with its defaults and a fresh id.
    pub fn add(&mut self, output_type: OutputType) -> &OutputSpec {
        let id = self.fresh_id(output_type);
        self.specs.push(OutputSpec::with_defaults(id, output_type));
        let last = self.specs.len() - 1;
        &self.specs[last]
    }

    /// Replace one field of the matching spec.
    pub fn update(&mut self, id: &str, field: SpecField) -> Result<&OutputSpec, RegistryError> {
        let index = self.index_of(id)?;
        let mut updated = self.specs[index].clone();
        match field {
            SpecField::OutputType(t) => updated.output_type = t,
            SpecField::Enabled(enabled) => updated.enabled = enabled,
            SpecField::Language(language) => {
                if !is_supported_language(&language) {
                    return Err(RegistryError::InvalidValue(format!(
                        "unsupported language {}",
                        language
                    )));
                }
                updated.language = language;
            }
            SpecField::Width(width) => updated.width = positive("width", width)?,
            SpecField::Height(height) => updated.height = positive("height", height)?,
            SpecField::GeneratePrint(flag) => updated.generate_print = flag,
        }
        self.specs[index] = updated;
        Ok(&self.specs[index])
    }

    /// Add the format if absent, remove it if present.
    pub fn toggle_format(
        &mut self,
        id: &str,
        format: AssetFormat,
    ) -> Result<&OutputSpec, RegistryError> {
        let index = self.index_of(id)?;
        let mut updated = self.specs[index].clone();
        if !updated.formats.remove(&format) {
            updated.formats.insert(format);
        }
        self.specs[index] = updated;
        Ok(&self.specs[index])
    }

    pub fn toggle_enabled(&mut self, id: &str) -> Result<&OutputSpec, RegistryError> {
        let enabled = self.get(id).map(|s| s.enabled);
        match enabled {
            Some(enabled) => self.update(id, SpecField::Enabled(!enabled)),
            None => Err(RegistryError::UnknownSpec(id.to_string())),
        }
    }

    /// Remove a spec. Refused when it is the last one; the registry is then unchanged.
    pub fn remove(&mut self, id: &str) -> Result<OutputSpec, RegistryError> {
        let index = self.index_of(id)?;
        if self.specs.len() == 1 {
            return Err(RegistryError::LastSpec);
        }
        Ok(self.specs.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&OutputSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn specs(&self) -> &[OutputSpec] {
        &self.specs
    }

    pub fn enabled(&self) -> impl Iterator<Item = &OutputSpec> {
        self.specs.iter().filter(|s| s.enabled)
    }

    pub fn has_enabled(&self) -> bool {
        self.specs.iter().any(|s| s.enabled)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn index_of(&self, id: &str) -> Result<usize, RegistryError> {
        self.specs
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| RegistryError::UnknownSpec(id.to_string()))
    }

    fn fresh_id(&mut self, output_type: OutputType) -> String {
        loop {
            let id = format!("{}-{}", output_type, self.next_seq);
            self.next_seq += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn positive(name: &str, value: u32) -> Result<u32, RegistryError> {
    if value == 0 {
        Err(RegistryError::InvalidValue(format!("{} must be positive", name)))
    } else {
        Ok(value)
    }
}
