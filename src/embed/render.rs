//! Pure text rendering of embedded models.

use std::collections::BTreeSet;
use crate::models::EmbeddedModel;

/// Number of byte literals emitted per line.
pub const BYTES_PER_LINE: usize = 16;

/// Fixed-size byte array placed in program memory.
#[derive(Debug, Clone, Copy)]
pub struct ArrayDeclaration<'a> {
  /// C identifier of the array.
  pub identifier: &'a str,
  /// Placement attribute, omitted when empty.
  pub attribute: &'a str,
  /// Array contents.
  pub bytes: &'a [u8],
}

impl<'a> ArrayDeclaration<'a> {
  /// Declaration for `model` named `identifier`.
  pub fn for_model(identifier: &'a str, attribute: &'a str, model: &'a EmbeddedModel) -> Self {
    Self {
      identifier,
      attribute,
      bytes: model.bytes(),
    }
  }

  /// Render the declaration as a C/C++ statement.
  ///
  /// Bytes are written as two-digit lowercase hex so the output only depends on the input
  /// bytes.
  pub fn render(&self) -> String {
    let attribute = if self.attribute.is_empty() {
      String::new()
    } else {
      format!(" {}", self.attribute)
    };
    let mut out = String::with_capacity(self.bytes.len() * 6 + 64);
    out.push_str(&format!(
      "const uint8_t {}[{}]{} = {{",
      self.identifier,
      self.bytes.len(),
      attribute
    ));

    for (line_index, chunk) in self.bytes.chunks(BYTES_PER_LINE).enumerate() {
      if line_index > 0 {
        out.push(',');
      }
      out.push_str("\n  ");
      let line = chunk
        .iter()
        .map(|byte| format!("0x{byte:02x}"))
        .collect::<Vec<_>>()
        .join(", ");
      out.push_str(&line);
    }

    if !self.bytes.is_empty() {
      out.push('\n');
    }
    out.push_str("};");
    out
  }
}

/// Integer constant holding the array length.
#[derive(Debug, Clone, Copy)]
pub struct SizeDeclaration<'a> {
  /// C identifier of the constant.
  pub identifier: &'a str,
  /// Array length.
  pub length: usize,
}

impl SizeDeclaration<'_> {
  /// Render the declaration as a C/C++ statement.
  pub fn render(&self) -> String {
    format!("const size_t {} = {};", self.identifier, self.length)
  }
}

/// Returns `true` when `name` is already a valid C identifier.
pub fn is_c_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
    && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Turn an arbitrary name into a valid, unique C identifier.
///
/// Names that are already valid identifiers are kept as written.
pub fn sanitize_ident(name: &str, used: &mut BTreeSet<String>) -> String {
  let base = if is_c_identifier(name) {
    name.to_string()
  } else {
    let mut base = name
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
      .collect::<String>();

    while base.contains("__") {
      base = base.replace("__", "_");
    }

    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
      base = format!("_{}", base);
    }
    base
  };

  let mut candidate = base.clone();
  let mut counter = 1;
  while used.contains(&candidate) {
    candidate = format!("{base}_{counter}");
    counter += 1;
  }

  used.insert(candidate.clone());
  candidate
}
