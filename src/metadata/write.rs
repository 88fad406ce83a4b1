use crate::model::Descriptor;

/// Serializes a descriptor back to the key-value record form.
///
/// Fields are written in canonical order; repeatable fields get one line per
/// entry and multi-line values are folded with continuation indentation. The
/// output reparses to a record equal to the input (field order in the source
/// text is not preserved, field content is).
pub fn write_metadata(descriptor: &Descriptor) -> String {
    let mut out = String::new();
    let d = descriptor;

    if let Some(v) = &d.metadata_version {
        push_field(&mut out, "Metadata-Version", v);
    }
    push_field(&mut out, "Name", &d.name);
    push_field(&mut out, "Version", d.version.as_str());
    if let Some(v) = &d.summary {
        push_field(&mut out, "Summary", v);
    }
    if let Some(v) = &d.homepage {
        push_field(&mut out, "Home-page", v);
    }
    if let Some(v) = &d.author {
        push_field(&mut out, "Author", v);
    }
    if let Some(v) = &d.author_email {
        push_field(&mut out, "Author-email", v);
    }
    if let Some(v) = &d.license {
        push_field(&mut out, "License", v);
    }
    if !d.keywords.is_empty() {
        let joined = d
            .keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        push_field(&mut out, "Keywords", &joined);
    }
    for classifier in &d.classifiers {
        push_field(&mut out, "Classifier", classifier);
    }
    if let Some(spec) = &d.requires_python {
        if !spec.is_empty() {
            push_field(&mut out, "Requires-Python", &spec.to_string());
        }
    }
    if let Some(ct) = &d.description_content_type {
        push_field(&mut out, "Description-Content-Type", ct.as_str());
    }
    for extra in &d.extras {
        push_field(&mut out, "Provides-Extra", extra);
    }
    for file in &d.license_files {
        push_field(&mut out, "License-File", file);
    }
    for (key, value) in &d.unknown {
        push_field(&mut out, key, value);
    }

    if let Some(body) = &d.description {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }

    out
}

fn push_field(out: &mut String, key: &str, value: &str) {
    for (i, line) in value.lines().enumerate() {
        if i == 0 {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(line);
        } else {
            out.push_str("        ");
            out.push_str(line);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_metadata;
    use crate::version::Version;
    use crate::model::Descriptor;

    #[test]
    fn test_minimal_record() {
        let d = Descriptor::new("example", Version::parse("0.1.0").unwrap());
        let text = write_metadata(&d);
        assert_eq!(text, "Name: example\nVersion: 0.1.0\n");
    }

    #[test]
    fn test_repeatable_fields_one_per_line() {
        let mut d = Descriptor::new("example", Version::parse("0.1.0").unwrap());
        d.classifiers.insert("Topic :: Utilities".to_string());
        d.classifiers.insert("Typing :: Typed".to_string());
        d.extras.insert("tests".to_string());
        let text = write_metadata(&d);
        assert_eq!(text.matches("Classifier: ").count(), 2);
        assert!(text.contains("Provides-Extra: tests\n"));
    }

    #[test]
    fn test_multiline_value_is_folded() {
        let mut d = Descriptor::new("example", Version::parse("0.1.0").unwrap());
        d.license = Some("MIT License\nwith an extra clause".to_string());
        let text = write_metadata(&d);
        assert!(text.contains("License: MIT License\n        with an extra clause\n"));
        let reparsed = parse_metadata(&text).unwrap();
        assert_eq!(reparsed.license, d.license);
    }

    #[test]
    fn test_description_becomes_body() {
        let mut d = Descriptor::new("example", Version::parse("0.1.0").unwrap());
        d.description = Some("First line.\n\nSecond paragraph.".to_string());
        let text = write_metadata(&d);
        assert!(text.ends_with("\n\nFirst line.\n\nSecond paragraph.\n"));
        let reparsed = parse_metadata(&text).unwrap();
        assert_eq!(reparsed.description, d.description);
    }
}
