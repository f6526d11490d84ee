//! YAML → `Data`, driven by saphyr-parser's event stream.
//!
//! Scalars keep their raw text (no `true`/`null` coercion). Mappings become
//! `Map`, sequences become fixed-length `Array`. Only the first document of
//! a stream is read; trailing empty documents are skipped, while aliases,
//! non-scalar keys and further documents with content are rejected. A key
//! that repeats within one mapping keeps its first value.
use std::borrow::Cow;

use saphyr_parser::{Event, Parser, ScalarStyle, Span, StrInput};

use crate::backend::Backend;
use crate::data::{Data, Tag};
use crate::error::{Error, Result};

/// Same nesting limit serde_json applies to JSON.
const MAX_DEPTH: usize = 128;

pub fn from_str(text: &str) -> Result<Data> {
    log::debug!("yaml: ingesting {} bytes", text.len());
    // The parser lives only inside this call; it is dropped on every return path.
    let mut builder = Builder::new(text);
    let data = builder.document()?;
    log::debug!("yaml: root is {}", data.tag());
    Ok(data)
}

// ------------------------------ Builder ----------------------------------- //

struct Builder<'input> {
    parser: Parser<'input, StrInput<'input>>,
    depth: usize,
}

impl<'input> Builder<'input> {
    fn new(text: &'input str) -> Self {
        Self { parser: Parser::new_from_str(text), depth: 0 }
    }

    /// Next meaningful event; running out of events mid-document is a parse error.
    fn next(&mut self) -> Result<(Event<'input>, Span)> {
        loop {
            match self.parser.next_event() {
                Some(Ok((Event::Nothing, _))) => continue,
                Some(Ok(ev)) => return Ok(ev),
                Some(Err(e)) => return Err(Error::parse(Backend::Yaml, e)),
                None => return Err(Error::parse(Backend::Yaml, "unexpected end of stream")),
            }
        }
    }

    fn document(&mut self) -> Result<Data> {
        match self.next()?.0 {
            Event::StreamStart => {}
            other => return Err(unexpected(&other)),
        }
        match self.next()?.0 {
            Event::DocumentStart(_) => {}
            Event::StreamEnd => return Err(Error::parse(Backend::Yaml, "stream contains no document")),
            other => return Err(unexpected(&other)),
        }

        let mut root = Data::new();
        let (event, span) = self.next()?;
        self.build(&mut root, event, span)?;

        match self.next()?.0 {
            Event::DocumentEnd => {}
            other => return Err(unexpected(&other)),
        }
        loop {
            match self.next()?.0 {
                Event::StreamEnd => return Ok(root),
                Event::DocumentStart(_) => self.skip_empty_document()?,
                other => return Err(unexpected(&other)),
            }
        }
    }

    /// A trailing `---` with nothing under it carries no data and is passed
    /// over; any other document after the first is refused.
    fn skip_empty_document(&mut self) -> Result<()> {
        let (event, span) = self.next()?;
        let empty = match event {
            Event::Scalar(value, style, _anchor, _tag) => scalar_text(value, style, span).is_empty(),
            _ => false,
        };
        if !empty {
            return Err(Error::UnsupportedType("multi-document stream".into()));
        }
        match self.next()?.0 {
            Event::DocumentEnd => {
                log::debug!("yaml: skipped empty trailing document");
                Ok(())
            }
            other => Err(unexpected(&other)),
        }
    }

    fn build(&mut self, data: &mut Data, event: Event<'input>, span: Span) -> Result<()> {
        match event {
            Event::Scalar(value, style, _anchor, _tag) => {
                log::trace!("yaml: scalar {value:?}");
                data.assign(scalar_text(value, style, span))
            }
            Event::MappingStart(_anchor, _tag) => {
                self.enter()?;
                self.build_map(data)?;
                self.depth -= 1;
                Ok(())
            }
            Event::SequenceStart(_anchor, _tag) => {
                self.enter()?;
                self.build_sequence(data)?;
                self.depth -= 1;
                Ok(())
            }
            Event::Alias(id) => Err(Error::UnsupportedType(format!("alias to anchor #{id}"))),
            other => Err(unexpected(&other)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::parse(Backend::Yaml, format!("nesting deeper than {MAX_DEPTH}")));
        }
        Ok(())
    }

    fn build_map(&mut self, data: &mut Data) -> Result<()> {
        data.allocate(Tag::Map, 0)?;
        loop {
            let (event, span) = self.next()?;
            let key = match event {
                Event::MappingEnd => break,
                Event::Scalar(key, style, _anchor, _tag) => scalar_text(key, style, span),
                Event::Alias(id) => {
                    return Err(Error::UnsupportedType(format!("alias to anchor #{id} as mapping key")));
                }
                Event::MappingStart(..) | Event::SequenceStart(..) => {
                    return Err(Error::UnsupportedType("non-scalar mapping key".into()));
                }
                other => return Err(unexpected(&other)),
            };
            let mut child = Data::new();
            let (event, span) = self.next()?;
            self.build(&mut child, event, span)?;
            if data.get(&key).is_some() {
                log::debug!("yaml: duplicate key {key:?}, keeping the first value");
                continue;
            }
            data.insert(key, child)?;
        }
        log::trace!("yaml: mapping with {} keys", data.len());
        Ok(())
    }

    /// Items are collected first since the event stream does not announce a
    /// length, then moved into an array allocated at the final size.
    fn build_sequence(&mut self, data: &mut Data) -> Result<()> {
        let mut items = Vec::new();
        loop {
            let (event, span) = self.next()?;
            if matches!(event, Event::SequenceEnd) {
                break;
            }
            let mut child = Data::new();
            self.build(&mut child, event, span)?;
            items.push(child);
        }
        log::trace!("yaml: sequence of {}", items.len());

        data.allocate(Tag::Array, items.len())?;
        let slots = data
            .array_mut()
            .ok_or(Error::TagMismatch { expected: Tag::Array, found: Tag::None })?;
        for (slot, item) in slots.iter_mut().zip(items) {
            *slot = item;
        }
        Ok(())
    }
}

/// An empty node (`key:` with nothing after it) arrives as a zero-width `~`
/// placeholder; it reads back as empty text, the same as an empty scalar.
fn scalar_text(value: Cow<'_, str>, style: ScalarStyle, span: Span) -> String {
    let zero_width = span.start.index() == span.end.index();
    if zero_width && matches!(style, ScalarStyle::Plain) && value == "~" {
        return String::new();
    }
    value.into_owned()
}

fn unexpected(event: &Event<'_>) -> Error {
    Error::parse(Backend::Yaml, format!("unexpected event {event:?}"))
}

// ------------------------------- Tests ------------------------------------ //
