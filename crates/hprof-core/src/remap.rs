use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Obfuscated-to-clear symbol table (for example parsed from a ProGuard/R8 mapping).
///
/// Applied while the index is built, so every name the graph hands out is already
/// deobfuscated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolRemapping {
    /// Obfuscated class name -> clear class name.
    pub classes: HashMap<String, String>,
    /// Obfuscated class name -> (obfuscated field name -> clear field name).
    pub fields: HashMap<String, HashMap<String, String>>,
}

impl SymbolRemapping {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty()
    }

    pub fn add_class(&mut self, obfuscated: impl Into<String>, clear: impl Into<String>) {
        self.classes.insert(obfuscated.into(), clear.into());
    }

    pub fn add_field(
        &mut self,
        obfuscated_class: impl Into<String>,
        obfuscated_field: impl Into<String>,
        clear: impl Into<String>,
    ) {
        self.fields
            .entry(obfuscated_class.into())
            .or_default()
            .insert(obfuscated_field.into(), clear.into());
    }

    /// Deobfuscates a class name. Array names keep their brackets: `[La.b;` maps
    /// the component and `a.b[]` maps the part before the first `[`.
    pub fn class_name(&self, name: &str) -> String {
        if let Some(component) = name
            .strip_prefix('[')
            .map(|rest| rest.trim_start_matches('['))
            .and_then(|rest| rest.strip_prefix('L'))
            .and_then(|rest| rest.strip_suffix(';'))
        {
            if let Some(clear) = self.classes.get(component) {
                let dims = name.len() - name.trim_start_matches('[').len();
                return format!("{}L{clear};", "[".repeat(dims));
            }
            return name.to_string();
        }

        match name.find('[') {
            Some(bracket) => match self.classes.get(&name[..bracket]) {
                Some(clear) => format!("{clear}{}", &name[bracket..]),
                None => name.to_string(),
            },
            None => self
                .classes
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        }
    }

    pub fn field_name(&self, obfuscated_class: &str, field: &str) -> Option<&str> {
        self.fields
            .get(obfuscated_class)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }
}
