use crate::config::types::{InputConfig, SearchKind};
use crate::ConfigError;
use serde_json::Value;

/// Fields every input document must carry
const REQUIRED_FIELDS: [&str; 3] = ["keywords", "proxies", "type"];

/// Validates the raw shape of an input document before deserializing it
///
/// Reports every missing field at once, then checks that list fields are
/// lists and that `type` is a known search kind.
pub fn validate_document(document: &Value) -> Result<(), ConfigError> {
    let object = document.as_object().ok_or_else(|| {
        ConfigError::Validation("Input must be a JSON object".to_string())
    })?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::MissingFields(missing.join(", ")));
    }

    match object.get("keywords") {
        Some(Value::Array(items)) if !items.is_empty() => {}
        _ => {
            return Err(ConfigError::Validation(
                "Keywords must be a non-empty list".to_string(),
            ))
        }
    }

    if !matches!(object.get("proxies"), Some(Value::Array(_))) {
        return Err(ConfigError::Validation("Proxies must be a list".to_string()));
    }

    match object.get("type") {
        Some(Value::String(tag)) => {
            tag.parse::<SearchKind>()?;
        }
        other => {
            return Err(ConfigError::InvalidSearchType(
                other.map(Value::to_string).unwrap_or_default(),
            ))
        }
    }

    Ok(())
}

/// Validates a deserialized input document
pub fn validate(config: &InputConfig) -> Result<(), ConfigError> {
    validate_keywords(&config.keywords)?;
    validate_proxies(&config.proxies)?;
    config.search_type.parse::<SearchKind>()?;
    Ok(())
}

/// Keywords must be present and individually non-blank
fn validate_keywords(keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.is_empty() {
        return Err(ConfigError::Validation(
            "Keywords must be a non-empty list".to_string(),
        ));
    }

    if let Some(position) = keywords.iter().position(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "Keyword at position {} is blank",
            position
        )));
    }

    Ok(())
}

/// Every pool entry must pass [`validate_proxy_entry`]
fn validate_proxies(proxies: &[String]) -> Result<(), ConfigError> {
    proxies
        .iter()
        .try_for_each(|proxy| validate_proxy_entry(proxy))
}

/// Checks one proxy pool entry
///
/// Accepted forms are "host:port" and `http://` or `https://` URLs with an
/// explicit port. Other schemes (socks included) are rejected here so that a
/// bad pool fails at load rather than when a client happens to pick it.
pub fn validate_proxy_entry(proxy: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid proxy entry: '{}'", proxy));

    if proxy.is_empty() || proxy.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let authority = match proxy.split_once("://") {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            rest.trim_end_matches('/')
        }
        Some((scheme, _)) => {
            return Err(ConfigError::Validation(format!(
                "Unsupported proxy scheme '{}' in '{}': use host:port or http(s)://host:port",
                scheme, proxy
            )))
        }
        None => proxy,
    };

    match authority.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(invalid()),
    }
}
