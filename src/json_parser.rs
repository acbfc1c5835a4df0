// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Parses JSON text (json-typed parameter values, Fn::Select collections) into YAML values.

#[cfg(test)]
mod tests;

use std::rc::Rc;

use anyhow::{anyhow, Error};
use chumsky::prelude::*;

use crate::cow_yaml::{Mapping, Yaml};

pub struct JsonParser {
    parser: Box<dyn Parser<char, Yaml, Error = Simple<char>>>,
}

impl JsonParser {
    pub fn new() -> JsonParser {
        let parser = gen_json_parser();
        JsonParser {
            parser: Box::new(parser),
        }
    }

    pub fn parse(&self, input: &str) -> Result<Yaml, Error> {
        self.parser.parse(input).map_err(|errs| {
            let messages = errs.iter().map(|err| err.to_string()).collect::<Vec<_>>();
            anyhow!("invalid JSON: {}", messages.join("; "))
        })
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        JsonParser::new()
    }
}

thread_local! {
    static JSON_PARSER: JsonParser = JsonParser::new();
}

/// Parses JSON text with a parser built once per thread.
pub fn parse_json(input: &str) -> Result<Yaml, Error> {
    JSON_PARSER.with(|parser| parser.parse(input))
}

fn gen_json_parser() -> impl Parser<char, Yaml, Error = Simple<char>> {
    recursive(|value| {
        let frac = just('.').chain(text::digits(10));

        let exp = just('e')
            .or(just('E'))
            .chain(just('+').or(just('-')).or_not())
            .chain::<char, _, _>(text::digits(10));

        let number = just('-')
            .or_not()
            .chain::<char, _, _>(text::int(10))
            .chain::<char, _, _>(frac.or_not().flatten())
            .chain::<char, _, _>(exp.or_not().flatten())
            .collect::<String>()
            .map(|string| match string.parse::<i64>() {
                Ok(i) => Yaml::Integer(i),
                Err(_) => Yaml::Real(Rc::new(string)),
            })
            .labelled("number");

        let escape = just('\\').ignore_then(
            just('\\')
                .or(just('/'))
                .or(just('"'))
                .or(just('b').to('\x08'))
                .or(just('f').to('\x0C'))
                .or(just('n').to('\n'))
                .or(just('r').to('\r'))
                .or(just('t').to('\t'))
                .or(just('u').ignore_then(
                    filter(|c: &char| c.is_digit(16))
                        .repeated()
                        .exactly(4)
                        .collect::<String>()
                        .validate(|digits, span, emit| {
                            char::from_u32(u32::from_str_radix(&digits, 16).unwrap_or(0xFFFD)).unwrap_or_else(|| {
                                emit(Simple::custom(span, "invalid unicode character"));
                                '\u{FFFD}' // unicode replacement character
                            })
                        }),
                )),
        );

        let string = just('"')
            .ignore_then(filter(|c| *c != '\\' && *c != '"').or(escape).repeated())
            .then_ignore(just('"'))
            .collect::<String>()
            .labelled("string");

        let array = value
            .clone()
            .chain(just(',').ignore_then(value.clone()).repeated())
            .or_not()
            .flatten()
            .padded()
            .delimited_by(just('['), just(']'))
            .map(|values| Yaml::Array(Rc::new(values)))
            .labelled("array");

        let member = string.clone().then_ignore(just(':').padded()).then(value);

        let object = member
            .clone()
            .chain(just(',').padded().ignore_then(member).repeated())
            .or_not()
            .flatten()
            .padded()
            .delimited_by(just('{'), just('}'))
            .map(|members: Vec<(String, Yaml)>| {
                let map = members
                    .into_iter()
                    .map(|(key, value)| (Yaml::string(key), value))
                    .collect::<Mapping>();
                Yaml::Hash(Rc::new(map))
            })
            .labelled("object");

        just("null")
            .to(Yaml::Null)
            .labelled("null")
            .or(just("true").to(Yaml::Boolean(true)).labelled("true"))
            .or(just("false").to(Yaml::Boolean(false)).labelled("false"))
            .or(number)
            .or(string.map(|value| Yaml::string(value)))
            .or(array)
            .or(object)
            .padded()
    })
    .then_ignore(end())
}
