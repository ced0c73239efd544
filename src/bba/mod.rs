/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

/* Writer for nextpnr's symbolic "binary blob assembler" (.bba) format.
 *
 * The stream is one directive per line. Addresses are never computed here:
 * `ref` directives name labels that may appear later in the stream and are
 * resolved by bbasm. */

use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::error::{Error, Result};

#[cfg(test)]
mod tests;

/// Label name that bbasm treats as a null pointer. It is never declared.
pub const NULL_REF: &str = "None";

/// Delimiter of string literals. Literals must not contain it.
pub const STR_DELIMITER: char = '|';

pub struct BbaWriter<W> where W: Write {
    out: W,
    /* Labels declared in each open scope, root scope first */
    scopes: Vec<HashSet<String>>,
}

impl<W> BbaWriter<W> where W: Write {
    pub fn new(out: W) -> Self {
        Self { out, scopes: vec![HashSet::new()] }
    }

    fn line(&mut self, directive: &str, arg: &dyn std::fmt::Display, comment: &str)
        -> Result<()>
    {
        if comment.is_empty() {
            writeln!(self.out, "{} {}", directive, arg)?;
        } else {
            writeln!(self.out, "{} {} {}", directive, arg, comment)?;
        }
        Ok(())
    }

    /// Declares `name` at the current position. `ltype` is the optional type
    /// tag (e.g. `PipInfoPOD`) written after the name.
    pub fn label(&mut self, name: &str, ltype: Option<&str>) -> Result<()> {
        let scope = self.scopes.last_mut()
            .ok_or_else(|| Error::Bba("no open scope".into()))?;
        if !scope.insert(name.to_string()) {
            return Err(Error::Bba(format!("label {} declared twice in one scope", name)));
        }
        self.line("label", &name, ltype.unwrap_or(""))
    }

    pub fn reference(&mut self, name: &str, comment: &str) -> Result<()> {
        self.line("ref", &name, comment)
    }

    /// References `name` when `count` is non-zero, the null label otherwise.
    pub fn reference_if(&mut self, count: usize, name: &str, comment: &str) -> Result<()> {
        if count > 0 {
            self.reference(name, comment)
        } else {
            self.reference(NULL_REF, comment)
        }
    }

    pub fn string(&mut self, text: &str, comment: &str) -> Result<()> {
        if text.contains(STR_DELIMITER) {
            return Err(Error::Bba(format!("string literal {:?} contains '{}'", text, STR_DELIMITER)));
        }
        self.line("str", &format_args!("{}{}{}", STR_DELIMITER, text, STR_DELIMITER), comment)
    }

    pub fn u8(&mut self, v: u8, comment: &str) -> Result<()> {
        self.line("u8", &v, comment)
    }

    pub fn u16(&mut self, v: u16, comment: &str) -> Result<()> {
        self.line("u16", &v, comment)
    }

    pub fn u32(&mut self, v: u32, comment: &str) -> Result<()> {
        self.line("u32", &v, comment)
    }

    pub fn pre(&mut self, text: &str) -> Result<()> {
        self.line("pre", &text, "")
    }

    pub fn post(&mut self, text: &str) -> Result<()> {
        self.line("post", &text, "")
    }

    pub fn push(&mut self, name: &str) -> Result<()> {
        self.scopes.push(HashSet::new());
        self.line("push", &name, "")
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(Error::Bba("pop without a matching push".into()));
        }
        self.scopes.pop();
        writeln!(self.out, "pop")?;
        Ok(())
    }

    /// Checks that every scope was closed and hands back the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.scopes.len() != 1 {
            return Err(Error::Bba(format!("{} scope(s) left open", self.scopes.len() - 1)));
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// One parsed line of a .bba stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Label { name: String, ltype: Option<String> },
    Ref { name: String, comment: Option<String> },
    Str { text: String, comment: Option<String> },
    U8 { value: u64, comment: Option<String> },
    U16 { value: u64, comment: Option<String> },
    U32 { value: u64, comment: Option<String> },
    Pre(String),
    Post(String),
    Push(String),
    Pop,
}

impl Directive {
    /// Trailing comment of a scalar, reference or string directive.
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Ref { comment, .. } | Self::Str { comment, .. }
            | Self::U8 { comment, .. } | Self::U16 { comment, .. }
            | Self::U32 { comment, .. } => comment.as_deref(),
            _ => None,
        }
    }

    pub fn scalar(&self) -> Option<u64> {
        match self {
            Self::U8 { value, .. } | Self::U16 { value, .. } | Self::U32 { value, .. } =>
                Some(*value),
            _ => None,
        }
    }
}

fn split_word(s: &str) -> (&str, Option<String>) {
    match s.split_once(' ') {
        Some((word, rest)) => (word, Some(rest.to_string())),
        None => (s, None),
    }
}

pub fn parse_line(line: &str) -> Result<Directive> {
    let bad = || Error::Bba(format!("malformed directive: {}", line));
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));

    let scalar = |rest: &str| -> Result<(u64, Option<String>)> {
        let (value, comment) = split_word(rest);
        let value = value.parse::<u64>().map_err(|_| bad())?;
        Ok((value, comment))
    };

    let d = match keyword {
        "label" => {
            let (name, ltype) = split_word(rest);
            Directive::Label { name: name.to_string(), ltype }
        },
        "ref" => {
            let (name, comment) = split_word(rest);
            Directive::Ref { name: name.to_string(), comment }
        },
        "str" => {
            let body = rest.strip_prefix(STR_DELIMITER).ok_or_else(bad)?;
            let (text, tail) = body.split_once(STR_DELIMITER).ok_or_else(bad)?;
            let comment = tail.strip_prefix(' ').map(|c| c.to_string());
            Directive::Str { text: text.to_string(), comment }
        },
        "u8" => { let (value, comment) = scalar(rest)?; Directive::U8 { value, comment } },
        "u16" => { let (value, comment) = scalar(rest)?; Directive::U16 { value, comment } },
        "u32" => { let (value, comment) = scalar(rest)?; Directive::U32 { value, comment } },
        "pre" => Directive::Pre(rest.to_string()),
        "post" => Directive::Post(rest.to_string()),
        "push" => Directive::Push(rest.to_string()),
        "pop" => Directive::Pop,
        _ => return Err(bad()),
    };

    Ok(d)
}

pub fn parse_stream(text: &str) -> Result<Vec<Directive>> {
    text.lines().filter(|l| !l.is_empty()).map(parse_line).collect()
}

/// Verifies that scopes are balanced and that every non-null reference names
/// exactly one label visible from the scope the reference sits in.
pub fn check_closure(stream: &[Directive]) -> Result<()> {
    /* Scope frames are numbered in order of opening; frame 0 is the root. */
    let mut frames_open = 1usize;
    let mut chain: Vec<usize> = vec![0];
    let mut labels: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut refs: Vec<(&str, Vec<usize>)> = Vec::new();

    for d in stream {
        match d {
            Directive::Push(_) => {
                chain.push(frames_open);
                frames_open += 1;
            },
            Directive::Pop => {
                if chain.len() <= 1 {
                    return Err(Error::Bba("pop without a matching push".into()));
                }
                chain.pop();
            },
            Directive::Label { name, .. } => {
                let frame = *chain.last().unwrap_or(&0);
                let frames = labels.entry(name.as_str()).or_default();
                if frames.contains(&frame) {
                    return Err(Error::Bba(format!("label {} declared twice in one scope", name)));
                }
                frames.push(frame);
            },
            Directive::Ref { name, .. } if name != NULL_REF => {
                refs.push((name.as_str(), chain.clone()));
            },
            _ => (),
        }
    }

    if chain.len() != 1 {
        return Err(Error::Bba(format!("{} scope(s) left open", chain.len() - 1)));
    }

    for (name, visible) in refs {
        let found = labels.get(name)
            .map(|frames| frames.iter().filter(|f| visible.contains(f)).count())
            .unwrap_or(0);
        if found != 1 {
            return Err(Error::Bba(format!("reference {} matches {} labels", name, found)));
        }
    }

    Ok(())
}
