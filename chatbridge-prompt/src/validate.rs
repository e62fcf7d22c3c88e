//! Lightweight checks for TypeScript and JavaScript snippets produced in
//! teacher mode. Structural only: no parsing or type checking.

use std::fmt::Write;

use regex::Regex;
use serde::{Deserialize, Serialize};

use chatbridge_core::ChatbridgeError;

const BOXED_PRIMITIVES: [&str; 4] = ["String", "Number", "Boolean", "Object"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    #[default]
    TypeScript,
    JavaScript,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

fn closer(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn check_brackets(code: &str, errors: &mut Vec<String>) {
    let mut expected = Vec::new();
    for (position, c) in code.chars().enumerate() {
        if let Some(close) = closer(c) {
            expected.push(close);
        } else if matches!(c, ')' | ']' | '}') {
            match expected.pop() {
                Some(close) if close == c => {}
                Some(close) => errors.push(format!(
                    "Mismatched bracket at position {position}. Expected '{close}', found '{c}'"
                )),
                None => errors.push(format!(
                    "Unexpected closing bracket at position {position}: '{c}'"
                )),
            }
        }
    }
    if !expected.is_empty() {
        let open: Vec<String> = expected.iter().map(char::to_string).collect();
        errors.push(format!("Unclosed brackets: {}", open.join(", ")));
    }
}

fn check_annotations(code: &str, warnings: &mut Vec<String>) -> Result<(), ChatbridgeError> {
    let annotation = Regex::new(r":\s*([a-zA-Z_$][a-zA-Z0-9_$]*)(\[\])?")
        .map_err(|e| ChatbridgeError::InvalidConfig(e.to_string()))?;
    for caps in annotation.captures_iter(code) {
        let name = &caps[1];
        if caps.get(2).is_none() && BOXED_PRIMITIVES.contains(&name) {
            warnings.push(format!(
                "Consider using lowercase primitive type '{}' instead of '{name}'",
                name.to_lowercase()
            ));
        }
    }
    Ok(())
}

fn needs_semicolon(line: &str) -> bool {
    !line.is_empty()
        && !line.ends_with(|c: char| matches!(c, ';' | '{' | '}'))
        && !line.starts_with("//")
        && !line.starts_with('*')
        && !line.starts_with("/*")
        && !line.contains("*/")
}

/// Bracket balance, boxed primitive annotations (TypeScript only) and
/// missing semicolons. Only bracket problems make the code invalid.
pub fn validate_code(code: &str, language: CodeLanguage) -> Result<CodeValidation, ChatbridgeError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_brackets(code, &mut errors);
    if language == CodeLanguage::TypeScript {
        check_annotations(code, &mut warnings)?;
    }
    for (index, line) in code.lines().enumerate() {
        let line = line.trim();
        if needs_semicolon(line) {
            warnings.push(format!("Missing semicolon at line {}: {line}", index + 1));
        }
    }

    Ok(CodeValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    })
}

impl CodeValidation {
    /// Markdown report handed back to the model.
    pub fn report(&self) -> String {
        let mut out = String::from("## Code Validation Results\n\n");
        if self.is_valid {
            out.push_str("✅ **Code is valid!** No syntax errors detected.\n\n");
        } else {
            out.push_str("❌ **Code has errors that need to be fixed:**\n\n");
            for error in &self.errors {
                let _ = writeln!(out, "- **Error:** {error}");
            }
            out.push('\n');
        }

        if !self.warnings.is_empty() {
            out.push_str("⚠️ **Warnings and suggestions for improvement:**\n\n");
            for warning in &self.warnings {
                let _ = writeln!(out, "- **Warning:** {warning}");
            }
            out.push('\n');
        }
        if self.is_valid && self.warnings.is_empty() {
            out.push_str("🎉 **Perfect!** Your code follows best practices and is ready to use.\n\n");
        }

        out.push_str("### 💡 Teacher Mode Tips:\n\n");
        out.push_str("- Always declare variables with `const`, `let`, or `var`\n");
        out.push_str("- Use TypeScript types for better code safety: `string`, `number`, `boolean`\n");
        out.push_str("- End statements with semicolons for consistency\n");
        out.push_str("- Keep functions small and focused on a single task\n");
        out.push_str("- Use descriptive variable and function names\n");
        out
    }
}
