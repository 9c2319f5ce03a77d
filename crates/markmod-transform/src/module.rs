//! Module text assembly.

use serde::Serialize;

/// Named exports plus the top-level code they depend on.
///
/// Serializes to the context statements followed by one
/// `export const <key> = <value>;` line per key, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct ExportedModule {
    context: Vec<String>,
    exports: Vec<(String, String)>,
}

impl ExportedModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add top-level statements (imports, helper functions).
    pub fn add_context(&mut self, code: impl Into<String>) {
        self.context.push(code.into());
    }

    /// Export `value` serialized as JSON.
    pub fn add_export_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(value)?;
        self.add_export_code(key, json);
        Ok(())
    }

    /// Export a raw JavaScript expression. A repeated key replaces the
    /// earlier value in place.
    pub fn add_export_code(&mut self, key: &str, code: impl Into<String>) {
        let code = code.into();
        match self.exports.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => *value = code,
            None => self.exports.push((key.to_string(), code)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|(k, _)| k.as_str())
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for code in &self.context {
            out.push_str(code.trim_end());
            out.push('\n');
        }
        for (key, value) in &self.exports {
            out.push_str(&format!("export const {} = {};\n", key, value));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_context_then_exports() {
        let mut module = ExportedModule::new();
        module.add_export_json("attributes", &serde_json::json!({ "a": 1 })).unwrap();
        module.add_context("import React from \"react\"\n");
        module.add_export_code("ReactComponent", "function () {}");

        assert_eq!(
            module.serialize(),
            "import React from \"react\"\nexport const attributes = {\"a\":1};\nexport const ReactComponent = function () {};\n"
        );
    }

    #[test]
    fn last_write_wins_in_place() {
        let mut module = ExportedModule::new();
        module.add_export_code("a", "1");
        module.add_export_code("b", "2");
        module.add_export_code("a", "3");

        assert_eq!(module.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            module.serialize(),
            "export const a = 3;\nexport const b = 2;\n"
        );
    }

    #[test]
    fn escapes_json_strings() {
        let mut module = ExportedModule::new();
        module.add_export_json("html", "<p>\"hi\"</p>\n").unwrap();

        assert_eq!(
            module.serialize(),
            "export const html = \"<p>\\\"hi\\\"</p>\\n\";\n"
        );
    }
}
