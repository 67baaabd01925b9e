//! Emission sink and component wiring fragments handed to the code generator.

/// Header providing `tflite::MicroMutableOpResolver`.
pub const OP_RESOLVER_INCLUDE: &str = "tensorflow/lite/micro/micro_mutable_op_resolver.h";

const GENERATED_BANNER: &str = "// Generated at build time by litert-bundler\n";

/// Destination for generated code.
pub trait CodeSink {
  /// Append a header-safe constant (the model array and its size).
  fn add_global(&mut self, declaration: String);

  /// Append a declaration that needs the inference library and a single translation unit.
  fn add_declaration(&mut self, declaration: String);

  /// Append a statement executed during component setup.
  fn add_statement(&mut self, statement: String);
}

/// Sink that keeps each kind of fragment in emission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
  /// Header-safe constants.
  pub globals: Vec<String>,
  /// Translation-unit declarations.
  pub declarations: Vec<String>,
  /// Setup statements.
  pub statements: Vec<String>,
}

impl CodeSink for GeneratedSource {
  fn add_global(&mut self, declaration: String) {
    self.globals.push(declaration);
  }

  fn add_declaration(&mut self, declaration: String) {
    self.declarations.push(declaration);
  }

  fn add_statement(&mut self, statement: String) {
    self.statements.push(statement);
  }
}

impl CodeSink for Vec<String> {
  fn add_global(&mut self, declaration: String) {
    self.push(declaration);
  }

  fn add_declaration(&mut self, declaration: String) {
    self.push(declaration);
  }

  fn add_statement(&mut self, statement: String) {
    self.push(statement);
  }
}

impl GeneratedSource {
  /// Render a header holding only the model constants.
  ///
  /// `const` namespace-scope objects have internal linkage, so the header can be included
  /// from several translation units.
  pub fn render_header(&self) -> String {
    let mut out = format!(
      "{GENERATED_BANNER}#pragma once\n\n#include <cstddef>\n#include <cstdint>\n"
    );
    for global in &self.globals {
      out.push('\n');
      out.push_str(global);
      out.push('\n');
    }
    out
  }

  /// Render the component wiring for exactly one translation unit.
  ///
  /// The fragment includes `header_name` for the model constants, declares the op resolver
  /// and lists the setup statements in order.
  pub fn render_setup(&self, header_name: &str) -> String {
    let mut out = format!(
      "{GENERATED_BANNER}#include \"{OP_RESOLVER_INCLUDE}\"\n#include \"{header_name}\"\n"
    );
    if !self.declarations.is_empty() {
      out.push('\n');
      for declaration in &self.declarations {
        out.push_str(declaration);
        out.push('\n');
      }
    }
    if !self.statements.is_empty() {
      out.push_str("\n// setup\n");
      for statement in &self.statements {
        out.push_str(statement);
        out.push('\n');
      }
    }
    out
  }
}

/// Declaration of the fixed-capacity op resolver the component is constructed with.
pub fn op_resolver_declaration(identifier: &str, op_count: usize) -> String {
  format!("static tflite::MicroMutableOpResolver<{op_count}> {identifier};")
}

/// Setup call handing the embedded model to the component instance.
pub fn set_model_data_statement(component_id: &str, array_id: &str, size_id: &str) -> String {
  format!("{component_id}->set_model_data({array_id}, {size_id});")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> GeneratedSource {
    let mut source = GeneratedSource::default();
    source.add_global("const uint8_t LITERT_MODEL[1] PROGMEM = {\n  0x1c\n};".into());
    source.add_global("const size_t LITERT_MODEL_SIZE = 1;".into());
    source.add_declaration(op_resolver_declaration("detector_op_res", 4));
    source.add_statement(set_model_data_statement(
      "detector",
      "LITERT_MODEL",
      "LITERT_MODEL_SIZE",
    ));
    source
  }

  #[test]
  fn renders_wiring_fragments() {
    assert_eq!(
      op_resolver_declaration("litert_component_op_res", 4),
      "static tflite::MicroMutableOpResolver<4> litert_component_op_res;"
    );
    assert_eq!(
      set_model_data_statement("detector", "LITERT_MODEL", "LITERT_MODEL_SIZE"),
      "detector->set_model_data(LITERT_MODEL, LITERT_MODEL_SIZE);"
    );
  }

  #[test]
  fn header_holds_only_model_constants() {
    let header = sample().render_header();
    assert_eq!(
      header,
      "// Generated at build time by litert-bundler\n#pragma once\n\n#include <cstddef>\n#include <cstdint>\n\nconst uint8_t LITERT_MODEL[1] PROGMEM = {\n  0x1c\n};\n\nconst size_t LITERT_MODEL_SIZE = 1;\n"
    );
    assert!(!header.contains("tflite::"));
    assert!(!header.contains("set_model_data"));
  }

  #[test]
  fn setup_fragment_includes_library_and_header() {
    let setup = sample().render_setup("litert_model.h");
    assert_eq!(
      setup,
      "// Generated at build time by litert-bundler\n#include \"tensorflow/lite/micro/micro_mutable_op_resolver.h\"\n#include \"litert_model.h\"\n\nstatic tflite::MicroMutableOpResolver<4> detector_op_res;\n\n// setup\ndetector->set_model_data(LITERT_MODEL, LITERT_MODEL_SIZE);\n"
    );
  }

  #[test]
  fn vec_sink_collects_everything() {
    let mut sink: Vec<String> = Vec::new();
    sink.add_global("g".into());
    sink.add_declaration("d".into());
    sink.add_statement("s".into());
    assert_eq!(sink, vec!["g".to_string(), "d".to_string(), "s".to_string()]);
  }
}
