use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::ExtractError;
use crate::matcher::{decode_lossy, highlight};
use crate::types::{Location, MatchRecord};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Line-by-line search of a log, gunzipping transparently when the file
/// starts with the gzip magic regardless of its name.
pub fn search_log(
    path: &Path,
    term: &str,
    case_sensitive: bool,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let mut file = File::open(path)?;
    let gzipped = has_gzip_magic(&mut file)?;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn BufRead> = if gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    search_lines(reader, term, case_sensitive)
}

fn has_gzip_magic(file: &mut File) -> std::io::Result<bool> {
    let mut magic = [0u8; 2];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..])? {
            0 => break,
            n => read += n,
        }
    }
    Ok(read == magic.len() && magic == GZIP_MAGIC)
}

fn search_lines<R: BufRead>(
    mut reader: R,
    term: &str,
    case_sensitive: bool,
) -> Result<Vec<MatchRecord>, ExtractError> {
    let needle = if case_sensitive {
        term.to_string()
    } else {
        term.to_lowercase()
    };
    let tag = highlight(term);

    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        for raw in split_lines(&buf) {
            line_number += 1;

            let line = decode_lossy(raw);
            let hit = if case_sensitive {
                line.contains(&needle)
            } else {
                line.to_lowercase().contains(&needle)
            };

            if hit {
                // Literal replacement: only occurrences in the term's own case
                // get tagged.
                let highlighted = line.replace(term, &tag);
                records.push(MatchRecord::new(
                    Location::Line {
                        number: line_number,
                    },
                    highlighted.trim(),
                ));
            }
        }
    }

    Ok(records)
}

/// Lines of one `\n`-terminated chunk. A lone `\r` also ends a line and
/// `\r\n` counts once.
fn split_lines(chunk: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    let body = body.strip_suffix(b"\r").unwrap_or(body);
    body.split(|&b| b == b'\r')
}
