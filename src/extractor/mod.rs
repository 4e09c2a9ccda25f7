pub mod dart_extractor;

use serde::Serialize;
use std::collections::BTreeSet;

/// Names that regular-method scanning picks up from control flow such as
/// `} else if (x) {`. They are never reported as methods.
pub const CONTROL_FLOW_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "case", "return", "break", "continue",
];

/// Scheme prefix marking an import of a reusable package.
pub const PACKAGE_SCHEME: &str = "package:";

/// Structural facts recovered from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactSet {
    /// First declared class, empty when none was found
    pub class_name: String,
    pub methods: BTreeSet<String>,
    /// Import paths in declaration order, duplicates kept
    pub imports: Vec<String>,
    /// Distinct package roots in first-seen order
    pub dependencies: Vec<String>,
}

impl FactSet {
    pub fn is_empty(&self) -> bool {
        self.class_name.is_empty()
            && self.methods.is_empty()
            && self.imports.is_empty()
            && self.dependencies.is_empty()
    }
}

/// Declaration shape a method candidate was matched by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFamily {
    Regular,
    Constructor,
    Accessor,
    Operator,
}

impl MethodFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodFamily::Regular => "regular",
            MethodFamily::Constructor => "constructor",
            MethodFamily::Accessor => "accessor",
            MethodFamily::Operator => "operator",
        }
    }
}

/// Drop private-by-convention names and control-flow keywords, de-duplicating the rest.
pub fn filter_methods<I>(candidates: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter(|name| !name.starts_with('_'))
        .filter(|name| !CONTROL_FLOW_KEYWORDS.contains(&name.as_str()))
        .collect()
}

/// Package roots of every `package:` import, in first-seen order.
pub fn derive_dependencies(imports: &[String]) -> Vec<String> {
    let mut dependencies: Vec<String> = Vec::new();

    for import in imports {
        let Some((_, rest)) = import.split_once(PACKAGE_SCHEME) else {
            continue;
        };
        let package = rest.split('/').next().unwrap_or_default();
        if !dependencies.iter().any(|d| d == package) {
            dependencies.push(package.to_string());
        }
    }

    dependencies
}
