//! Shared plumbing for zipped-XML office containers.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

use super::ExtractError;

pub(crate) type Archive = ZipArchive<BufReader<File>>;

pub(crate) fn open_archive(path: &Path) -> Result<Archive, ExtractError> {
    let file = File::open(path)?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

pub(crate) fn read_entry(archive: &mut Archive, name: &str) -> Result<String, ExtractError> {
    let mut entry = archive.by_name(name)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParagraphScope {
    /// Only paragraphs that are direct children of `w:body`, with the text
    /// of their own runs (directly or under a hyperlink). Text boxes and
    /// other nested content are left out.
    Body,
    /// Every paragraph in the document, tables included.
    All,
}

/// Paragraph texts of a WordprocessingML `document.xml`, in document order.
pub(crate) fn paragraphs(xml: &str, scope: ParagraphScope) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    // (local name, whether this element opened a paragraph buffer)
    let mut stack: Vec<(Vec<u8>, bool)> = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut out = Vec::new();

    let opens = |stack: &[(Vec<u8>, bool)]| match scope {
        ParagraphScope::All => true,
        ParagraphScope::Body => stack.last().is_some_and(|(n, _)| n.as_slice() == b"body"),
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                let opened = name.as_slice() == b"p" && opens(&stack);
                if opened {
                    open.push(String::new());
                }
                stack.push((name, opened));
            }
            Event::Empty(e) => {
                let in_run = stack.last().is_some_and(|(n, _)| n.as_slice() == b"r")
                    && (scope == ParagraphScope::All || run_of_open_paragraph(&stack, &[]));
                match e.local_name().as_ref() {
                    b"p" if opens(&stack) => out.push(String::new()),
                    b"tab" if in_run => push_char(&mut open, '\t'),
                    b"br" | b"cr" if in_run => push_char(&mut open, '\n'),
                    _ => {}
                }
            }
            Event::Text(t) => {
                let in_text = stack.last().is_some_and(|(n, _)| n.as_slice() == b"t")
                    && (scope == ParagraphScope::All
                        || run_of_open_paragraph(&stack, &[b"t".as_slice()]));
                if in_text {
                    if let Some(buf) = open.last_mut() {
                        buf.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(_) => {
                if let Some((_, true)) = stack.pop() {
                    if let Some(text) = open.pop() {
                        out.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

/// Whether the elements opened since the innermost paragraph are a run
/// (optionally inside a hyperlink) followed by `tail`.
fn run_of_open_paragraph(stack: &[(Vec<u8>, bool)], tail: &[&[u8]]) -> bool {
    let Some(p) = stack.iter().rposition(|(_, opened)| *opened) else {
        return false;
    };
    let inner: Vec<&[u8]> = stack[p + 1..].iter().map(|(n, _)| n.as_slice()).collect();

    let follows = |prefix: &[&[u8]]| {
        inner.len() == prefix.len() + tail.len()
            && inner[..prefix.len()] == *prefix
            && inner[prefix.len()..] == *tail
    };
    follows(&[b"r".as_slice()]) || follows(&[b"hyperlink".as_slice(), b"r".as_slice()])
}

fn push_char(open: &mut [String], c: char) {
    if let Some(buf) = open.last_mut() {
        buf.push(c);
    }
}
