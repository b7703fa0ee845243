use serde::de::DeserializeOwned;

/// Deserialize JSON with JSON-path context in error messages.
pub fn from_json_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at path {path} → {}", err.into_inner()))
        }
    }
}

/// Same as [`from_json_str_with_path`] for YAML sources (JSON is valid YAML).
pub fn from_yaml_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = serde_yaml::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at path {path} → {}", err.into_inner()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(unused)]
        inner: Inner,
    }
    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(unused)]
        flag: bool,
    }

    #[test]
    fn json_error_names_the_field_path() {
        let err = from_json_str_with_path::<Outer>(r#"{"inner": {"flag": "yes"}}"#).unwrap_err();
        assert!(err.contains("inner.flag"), "{err}");
    }

    #[test]
    fn yaml_error_names_the_field_path() {
        let err = from_yaml_str_with_path::<Outer>("inner:\n  flag: [1]\n").unwrap_err();
        assert!(err.contains("inner.flag"), "{err}");
    }
}
