/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 */

use bundle_error_reporting::{Diagnostics, SourceCache};

/// Render diagnostics for the terminal, or as a JSON array.
pub fn render(diagnostics: &Diagnostics, json: bool, sources: &mut SourceCache) -> String {
    if json {
        let items: Vec<_> = diagnostics.iter().map(|d| d.to_json()).collect();
        serde_json::Value::Array(items).to_string()
    } else {
        diagnostics.to_text(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_dyn::Location;
    use bundle_error_reporting::Diagnostic;

    fn diagnostics() -> Diagnostics {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning(
            "unknown field: foo",
            "bundle.foo".parse().unwrap(),
            Location::new("bundle.yml", 2, 3),
        ));
        diags
    }

    #[test]
    fn test_json() {
        let out = render(&diagnostics(), true, &mut SourceCache::new());
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert!(out.contains("unknown field: foo"));
    }

    #[test]
    fn test_text_uses_source() {
        let mut sources = SourceCache::new();
        sources.add("bundle.yml", "bundle:\n  foo: 1\n");
        let out = render(&diagnostics(), false, &mut sources);
        assert!(out.contains("unknown field: foo"));
        assert!(out.contains("bundle.yml"));
    }
}
