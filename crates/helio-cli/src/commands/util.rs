use std::path::Path;

/// Directory a manifest for `output` goes into.
pub fn manifest_dir(output: &Path) -> &Path {
    output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub fn fmt_optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_dir_of_bare_file_is_cwd() {
        assert_eq!(manifest_dir(Path::new("potential.csv")), Path::new("."));
        assert_eq!(manifest_dir(Path::new("out/potential.csv")), Path::new("out"));
    }

    #[test]
    fn optional_values_format() {
        assert_eq!(fmt_optional(Some(1.234), 2), "1.23");
        assert_eq!(fmt_optional(None, 2), "-");
    }
}
