use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::ooxml::{open_archive, read_entry};
use super::ExtractError;
use crate::types::{Location, MatchRecord};

const PAGES_PART: &str = "visio/pages/pages.xml";
const PAGES_RELS_PART: &str = "visio/pages/_rels/pages.xml.rels";
const PAGES_DIR: &str = "visio/pages/";

#[derive(Debug, Default)]
struct Shape {
    text: String,
    children: Vec<Shape>,
}

#[derive(Debug)]
struct PageRef {
    name: String,
    rel_id: Option<String>,
}

/// Names of the pages holding at least one shape whose text contains the
/// term. A page stops being searched at its first matching shape.
pub fn search_diagram(path: &Path, term: &str) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut archive = open_archive(path)?;
    let pages = page_refs(&read_entry(&mut archive, PAGES_PART)?)?;
    let targets = relationships(&read_entry(&mut archive, PAGES_RELS_PART)?)?;
    let needle = term.to_lowercase();

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for page in pages {
        let Some(target) = page.rel_id.as_ref().and_then(|id| targets.get(id)) else {
            continue;
        };
        let xml = read_entry(&mut archive, &format!("{}{}", PAGES_DIR, target))?;

        if any_shape_matches(&shape_tree(&xml)?, &needle) && seen.insert(page.name.clone()) {
            records.push(MatchRecord::new(Location::PageName { name: page.name }, ""));
        }
    }

    Ok(records)
}

fn any_shape_matches(shapes: &[Shape], needle: &str) -> bool {
    shapes.iter().any(|shape| {
        shape.text.to_lowercase().contains(needle) || any_shape_matches(&shape.children, needle)
    })
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, ExtractError> {
    Ok(match e.try_get_attribute(key).map_err(quick_xml::Error::from)? {
        Some(attr) => Some(attr.unescape_value()?.into_owned()),
        None => None,
    })
}

fn page_refs(xml: &str) -> Result<Vec<PageRef>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut pages: Vec<PageRef> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"Page" => {
                    let name = match attribute(&e, b"Name")? {
                        Some(name) => name,
                        None => attribute(&e, b"NameU")?.unwrap_or_default(),
                    };
                    pages.push(PageRef { name, rel_id: None });
                }
                b"Rel" => {
                    let id = attribute(&e, b"r:id")?;
                    if let Some(page) = pages.last_mut() {
                        page.rel_id = id;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn relationships(xml: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut map = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    map.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(map)
}

/// Top-level shapes of a page with their nested sub-shapes.
fn shape_tree(xml: &str) -> Result<Vec<Shape>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut roots = Vec::new();
    let mut open: Vec<Shape> = Vec::new();
    let mut text_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Shape" => open.push(Shape::default()),
                b"Text" => text_depth += 1,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"Shape" => {
                attach(&mut open, &mut roots, Shape::default());
            }
            Event::Text(t) if text_depth > 0 => {
                if let Some(shape) = open.last_mut() {
                    shape.text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Shape" => {
                    if let Some(shape) = open.pop() {
                        attach(&mut open, &mut roots, shape);
                    }
                }
                b"Text" => text_depth = text_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(roots)
}

fn attach(open: &mut [Shape], roots: &mut Vec<Shape>, shape: Shape) {
    match open.last_mut() {
        Some(parent) => parent.children.push(shape),
        None => roots.push(shape),
    }
}
