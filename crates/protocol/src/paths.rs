//! Path canonicalization shared by candidate registration, the knowledge
//! tracker and ancestor re-matching.

/// Canonical form: leading slash, no trailing slash (except the root).
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let mut out = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Ancestor prefixes of `path`, nearest first, down to the root `/`.
///
/// `path` itself is not included; the root has no ancestors.
pub fn ancestors(path: &str) -> Vec<String> {
    let normalized = normalize(path);
    let mut out = Vec::new();
    let mut current = normalized.as_str();
    while let Some(idx) = current.rfind('/') {
        if idx == 0 {
            if current != "/" {
                out.push("/".to_string());
            }
            break;
        }
        current = &current[..idx];
        out.push(current.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_forms() {
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("  /a "), "/a");
    }

    #[test]
    fn ancestors_strip_one_segment_at_a_time() {
        assert_eq!(ancestors("/a/b/c"), vec!["/a/b", "/a", "/"]);
        assert_eq!(ancestors("/a"), vec!["/"]);
        assert_eq!(ancestors("/"), Vec::<String>::new());
    }
}
