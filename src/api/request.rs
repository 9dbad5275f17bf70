use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, Context, Result};

/// Replace `${NAME}` placeholders with the matching environment variables.
///
/// Used for header values and the session cookie so secrets can stay out of
/// the configuration file.
pub fn expand_env_vars(value: &str) -> Result<String> {
    expand_with(value, |name| std::env::var(name).ok())
}

fn expand_with<F>(value: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == '}' {
                    closed = true;
                    break;
                }
                name.push(next);
            }

            if name.is_empty() {
                return Err(AppError::message(
                    "Encountered empty environment placeholder `${}`",
                ));
            }

            if !closed {
                return Err(AppError::message(format!(
                    "Unterminated environment placeholder `${{{name}`"
                )));
            }

            let value = lookup(&name).ok_or_else(|| {
                AppError::message(format!("Environment variable {name} is not set"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Build the default header map sent with every API request.
pub fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .with_context(|| format!("Invalid header name: {}", key))?;
        let expanded = expand_env_vars(value)?;
        let header_value = HeaderValue::from_str(&expanded)
            .with_context(|| format!("Invalid header value for {}", key))?;
        map.insert(name, header_value);
    }
    Ok(map)
}
