use super::{derive_dependencies, filter_methods, FactSet, MethodFamily};
use anyhow::{Context, Result};
use regex::Regex;

const IMPORT_PATTERN: &str = r#"import\s+['"]([^'"]+)['"];"#;

const CLASS_PATTERN: &str = r"\bclass\s+(\w+)(?:<[\w\s,<>?]*>)?(?:\s+extends|\s+implements|\s+with|\s*\{)";

// Annotations, optional `static`, return type with optional generics and `?`,
// then `name(params) [async] {`.
const REGULAR_METHOD_PATTERN: &str = r"(?:@\w+\s+)*(?:static\s+)?(?:void|String|int|bool|double|num|Future|List|Map|Set|Stream|\w+)(?:<[\w\s,<>?]*>)?\??\s+(\w+)\s*\([^)]*\)\s*(?:async\s*)?\{";

const GETTER_PATTERN: &str = r"\bget\s+(\w+)\s*(?:=>|\{)";

const SETTER_PATTERN: &str = r"\bset\s+(\w+)\s*\([^)]*\)\s*\{";

const OPERATOR_PATTERN: &str = r"\boperator\s+(\S+)\s*\([^)]*\)\s*\{";

/// Pattern-based extractor for Dart/Flutter class files.
///
/// Holds only the compiled, input-independent patterns; every call to
/// [`DartExtractor::extract`] works on its own input and keeps nothing.
pub struct DartExtractor {
    import_re: Regex,
    class_re: Regex,
    regular_re: Regex,
    getter_re: Regex,
    setter_re: Regex,
    operator_re: Regex,
}

impl DartExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            import_re: compile(IMPORT_PATTERN)?,
            class_re: compile(CLASS_PATTERN)?,
            regular_re: compile(REGULAR_METHOD_PATTERN)?,
            getter_re: compile(GETTER_PATTERN)?,
            setter_re: compile(SETTER_PATTERN)?,
            operator_re: compile(OPERATOR_PATTERN)?,
        })
    }

    /// Recover the structural facts of one source file. Never fails; input
    /// that matches nothing yields an empty [`FactSet`].
    pub fn extract(&self, source: &str) -> FactSet {
        let imports = self.imports(source);
        let class_name = self.class_name(source);

        let mut candidates = Vec::new();
        for family in [
            MethodFamily::Regular,
            MethodFamily::Constructor,
            MethodFamily::Accessor,
            MethodFamily::Operator,
        ] {
            let found = self.scan_family(family, source, &class_name);
            tracing::trace!("{} family matched {} candidates", family.as_str(), found.len());
            candidates.extend(found);
        }

        let methods = filter_methods(candidates);
        let dependencies = derive_dependencies(&imports);

        tracing::debug!(
            "Extracted class={:?}, {} methods, {} imports, {} dependencies",
            class_name,
            methods.len(),
            imports.len(),
            dependencies.len()
        );

        FactSet {
            class_name,
            methods,
            imports,
            dependencies,
        }
    }

    /// Import paths in declaration order
    pub fn imports(&self, source: &str) -> Vec<String> {
        captures(&self.import_re, source)
    }

    /// First declared class name, or an empty string
    pub fn class_name(&self, source: &str) -> String {
        self.class_re
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Unfiltered candidates of a single pattern family
    pub fn scan_family(&self, family: MethodFamily, source: &str, class_name: &str) -> Vec<String> {
        match family {
            MethodFamily::Regular => captures(&self.regular_re, source),
            MethodFamily::Constructor => constructors(source, class_name),
            MethodFamily::Accessor => {
                let mut names = captures(&self.getter_re, source);
                names.extend(captures(&self.setter_re, source));
                names
            }
            MethodFamily::Operator => captures(&self.operator_re, source)
                .into_iter()
                .map(|symbol| format!("operator {}", symbol))
                .collect(),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid extraction pattern: {}", pattern))
}

fn captures(re: &Regex, source: &str) -> Vec<String> {
    re.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `ClassName(...)` and `ClassName.named(...)` declarations with an optional
/// initializer list. The pattern embeds the class name, so it is built per call.
fn constructors(source: &str, class_name: &str) -> Vec<String> {
    if class_name.is_empty() {
        return Vec::new();
    }

    let pattern = format!(
        r"(?:@\w+\s+)*(?:const\s+|factory\s+)?\b({}(?:\.\w+)?)\s*\([^)]*\)\s*(?::[^{{}};]*)?\{{",
        regex::escape(class_name)
    );

    match Regex::new(&pattern) {
        Ok(re) => captures(&re, source),
        Err(e) => {
            tracing::warn!("Skipping constructor scan for {}: {}", class_name, e);
            Vec::new()
        }
    }
}
