/// Recursively merge two TOML values.
///
/// If both values are tables, they are merged recursively.
/// Otherwise, the `overlay` value replaces the `base` value.
pub fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key.clone(), value.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_replaces_scalars_and_keeps_siblings() {
        let mut base: toml::Value =
            toml::from_str("[sandbox]\nprefix = \"rootcamp\"\nscratch_root = \"/tmp\"").unwrap();
        let overlay: toml::Value = toml::from_str("[sandbox]\nprefix = \"lab\"").unwrap();

        merge_toml_values(&mut base, &overlay);

        assert_eq!(base["sandbox"]["prefix"].as_str(), Some("lab"));
        assert_eq!(base["sandbox"]["scratch_root"].as_str(), Some("/tmp"));
    }
}
