//! JSON-with-comments reader for `tsconfig.json` files.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::{Map, Number, Value};

#[derive(Parser)]
#[grammar = "jsonc.pest"]
pub struct JsoncParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    JsoncParser::parse(Rule::document, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

/// Parses JSONC text into a plain JSON value.
pub fn parse_value(input: &str) -> ParseResult<Value> {
    let document = parse(input)?
        .next()
        .ok_or_else(|| custom_error(input, "empty document"))?;

    let value = document
        .into_inner()
        .find(|pair| pair.as_rule() != Rule::EOI)
        .ok_or_else(|| custom_error(input, "expected a value"))?;

    to_value(value, input)
}

fn to_value(pair: Pair<'_, Rule>, input: &str) -> ParseResult<Value> {
    match pair.as_rule() {
        Rule::object => {
            let mut map = Map::new();
            for entry in pair.into_inner() {
                let mut parts = entry.into_inner();
                let (key, value) = match (parts.next(), parts.next()) {
                    (Some(key), Some(value)) => (key, value),
                    _ => return Err(custom_error(input, "malformed object member")),
                };
                map.insert(string_value(key, input)?, to_value(value, input)?);
            }
            Ok(Value::Object(map))
        }
        Rule::array => pair
            .into_inner()
            .map(|item| to_value(item, input))
            .collect::<ParseResult<Vec<_>>>()
            .map(Value::Array),
        Rule::string => string_value(pair, input).map(Value::String),
        Rule::number => {
            let text = pair.as_str();
            let number = text
                .parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
                .ok_or_else(|| custom_error(input, &format!("invalid number {}", text)))?;
            Ok(Value::Number(number))
        }
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "true")),
        Rule::null => Ok(Value::Null),
        other => Err(custom_error(input, &format!("unexpected {:?}", other))),
    }
}

fn string_value(pair: Pair<'_, Rule>, input: &str) -> ParseResult<String> {
    let raw = pair
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or("");
    serde_json::from_str::<String>(&format!("\"{}\"", raw))
        .map_err(|e| custom_error(input, &format!("invalid string: {}", e)))
}

fn custom_error(input: &str, message: &str) -> Box<pest::error::Error<Rule>> {
    Box::new(pest::error::Error::new_from_pos(
        pest::error::ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pest::Position::from_start(input),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let value = parse_value(r#"{"a": [1, 2.5, "x", true, null]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2.5, "x", true, null]}));
    }

    #[test]
    fn test_comments_and_trailing_commas() {
        let input = r#"
// project settings
{
  /* compiler */
  "compilerOptions": {
    "rootDir": "src", // trailing comment
  },
  "include": ["src/**/*",],
}
"#;
        let value = parse_value(input).unwrap();
        assert_eq!(
            value,
            json!({"compilerOptions": {"rootDir": "src"}, "include": ["src/**/*"]})
        );
    }

    #[test]
    fn test_comment_markers_inside_strings() {
        let value = parse_value(r#"{"url": "http://example.com/*x*/"}"#).unwrap();
        assert_eq!(value, json!({"url": "http://example.com/*x*/"}));
    }

    #[test]
    fn test_escapes() {
        let value = parse_value(r#"["a\"b", "A\n"]"#).unwrap();
        assert_eq!(value, json!(["a\"b", "A\n"]));
    }

    #[test]
    fn test_malformed_input() {
        assert!(!check("{"));
        assert!(!check(r#"{"a" 1}"#));
        assert!(!check(""));
        assert!(check("[]"));
    }
}
