//! Literal token substitution over raw bytes.
use crate::GenesisError;

/// Replaces every occurrence of `from` by `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Token to replace.
    pub from: String,
    /// Replacement.
    pub to: String,
}

impl Patch {
    /// Constructs a patch.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Patches applied one after another, each to the output of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchList(pub Vec<Patch>);

impl PatchList {
    /// Appends a patch.
    pub fn push(&mut self, patch: Patch) {
        self.0.push(patch);
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies all patches to `input`.
    pub fn apply(&self, input: &[u8]) -> Result<Vec<u8>, GenesisError> {
        let mut out = input.to_vec();
        for (index, patch) in self.0.iter().enumerate() {
            if patch.from.is_empty() {
                return Err(GenesisError::EmptyToken { index });
            }
            out = replace_all(&out, patch.from.as_bytes(), patch.to.as_bytes());
        }
        Ok(out)
    }
}

/// Non-overlapping, left to right replacement of `from` by `to`.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(from.len()).position(|w| w == from) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
    }
    out.extend_from_slice(rest);
    out
}
