//! Deterministic prompt templates for the remote model.
//!
//! Prompt construction is plain string templating: the submitted source is
//! embedded verbatim inside a fenced block together with a fixed set of audit
//! instructions, so the same input always produces the same prompt.

/// Languages selectable for a code scan. The CLI constrains `--language` to
/// this list; the model client itself accepts any language name.
pub const SUPPORTED_LANGUAGES: [&str; 12] = [
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "C#",
    "C++",
    "Go",
    "Rust",
    "PHP",
    "Ruby",
    "Swift",
    "Kotlin",
];

/// A prompt that can be rendered to a string.
pub trait Prompt {
    /// Render the prompt to a string suitable for model input.
    fn render(&self) -> String;
}

/// The five audit instructions appended to every prompt, plus the clause
/// that makes "no findings" an empty array instead of free-form prose.
fn audit_instructions() -> &'static str {
    r#"Provide a detailed report in the specified JSON format.
For each vulnerability found, you must:
1. Identify the vulnerability type.
2. Assign a severity level (Critical, High, Medium, Low, Informational).
3. Provide a clear and concise description of the issue and its potential impact.
4. Offer a specific, actionable remediation with corrected code examples where applicable.
5. Specify the line number in the source where the vulnerability is located.

If no vulnerabilities are found, provide a summary stating the code appears secure and leave the vulnerabilities array empty."#
}

/// Audit prompt for a pasted code snippet.
#[derive(Debug, Clone)]
pub struct CodeAuditPrompt<'a> {
    pub code: &'a str,
    /// Declared language; used for the heading and, lowercased, as the
    /// fence tag.
    pub language: &'a str,
}

impl Prompt for CodeAuditPrompt<'_> {
    fn render(&self) -> String {
        format!(
            r#"You are a world-class cybersecurity expert and senior software engineer. Your task is to perform a thorough security audit of the provided code snippet.
Analyze it for any security vulnerabilities, including but not limited to the OWASP Top 10 (e.g., Injection, Broken Authentication, Cross-Site Scripting (XSS), Insecure Deserialization, etc.), race conditions, logic flaws, and insecure use of dependencies.

The code is written in: {language}

Code to analyze:
```{fence}
{code}
```

{instructions}"#,
            language = self.language,
            fence = self.language.to_lowercase(),
            code = self.code,
            instructions = audit_instructions(),
        )
    }
}

/// Audit prompt for a fetched website source.
#[derive(Debug, Clone)]
pub struct SiteAuditPrompt<'a> {
    pub html: &'a str,
}

impl Prompt for SiteAuditPrompt<'_> {
    fn render(&self) -> String {
        format!(
            r#"You are a world-class cybersecurity expert. Your task is to perform a thorough security audit of the provided website's source code (HTML, inline CSS, and inline JavaScript).
Analyze it for any security vulnerabilities, including but not limited to the OWASP Top 10 (e.g., XSS from user inputs reflected in HTML, insecure 'src' attributes, insecure form handling, Content Security Policy issues, etc.), and other common web vulnerabilities.

Website source code to analyze:
```html
{html}
```

{instructions}"#,
            html = self.html,
            instructions = audit_instructions(),
        )
    }
}

/// One scan's model input: either a code snippet with a declared language,
/// or the fetched source of a website. Owned transiently for the duration of
/// a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditPayload {
    Code { code: String, language: String },
    Site { html: String },
}

impl AuditPayload {
    pub fn render_prompt(&self) -> String {
        match self {
            AuditPayload::Code { code, language } => CodeAuditPrompt { code, language }.render(),
            AuditPayload::Site { html } => SiteAuditPrompt { html }.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prompt_embeds_snippet_and_fence() {
        let prompt = CodeAuditPrompt {
            code: "eval(userInput)",
            language: "JavaScript",
        };
        let rendered = prompt.render();

        assert!(rendered.contains("eval(userInput)"));
        assert!(rendered.contains("```javascript\neval(userInput)\n```"));
        assert!(rendered.contains("The code is written in: JavaScript"));
        assert!(rendered.contains("Assign a severity level"));
    }

    #[test]
    fn test_code_prompt_is_deterministic() {
        let prompt = CodeAuditPrompt {
            code: "SELECT * FROM users",
            language: "SQL",
        };
        assert_eq!(prompt.render(), prompt.render());
    }

    #[test]
    fn test_site_prompt_uses_html_fence() {
        let prompt = SiteAuditPrompt {
            html: "<form action=\"http://example.com\">",
        };
        let rendered = prompt.render();

        assert!(rendered.contains("```html\n<form action=\"http://example.com\">\n```"));
        assert!(rendered.contains("website's source code"));
    }

    #[test]
    fn test_payload_selects_matching_template() {
        let code = AuditPayload::Code {
            code: "x".into(),
            language: "Python".into(),
        };
        assert!(code.render_prompt().contains("```python"));

        let site = AuditPayload::Site { html: "<p>".into() };
        assert!(site.render_prompt().contains("```html"));
    }

    #[test]
    fn test_supported_languages_non_empty() {
        assert!(SUPPORTED_LANGUAGES.contains(&"JavaScript"));
    }
}
