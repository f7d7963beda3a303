use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use untrans_core::{KeyedRecord, RecordStore, Result, UntransError};

/// Read one resx file into a keyed store.
///
/// Returns `Ok(None)` when the file does not exist, so callers can tell an
/// absent optional translation apart from a broken one. Any structural
/// problem in a file that does exist is an error: malformed markup, a
/// `data` element without a `name` attribute or without a `value` child,
/// or a key appearing twice.
pub fn load_resx(path: &Path) -> Result<Option<RecordStore>> {
    let xml = match std::fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(parse_resx(&xml, path)?))
}

fn resx_err(path: &Path, message: impl Into<String>) -> UntransError {
    UntransError::Resx {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// The `name` attribute is what keys the record; its absence is malformed.
fn data_key(e: &BytesStart<'_>, path: &Path) -> Result<String> {
    let attr = e
        .try_get_attribute("name")
        .map_err(|e| resx_err(path, format!("{e}")))?
        .ok_or_else(|| resx_err(path, "data element without name attribute"))?;
    Ok(attr
        .unescape_value()
        .map_err(|e| resx_err(path, format!("{e}")))?
        .into_owned())
}

fn parse_resx(xml: &str, path: &Path) -> Result<RecordStore> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut store = RecordStore::new();
    // Key of the open <data> element and, once seen, its first <value> text.
    let mut current: Option<(String, Option<String>)> = None;
    // Some(..) while collecting text inside the first <value> of a <data>.
    let mut value_text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"data" => {
                    current = Some((data_key(&e, path)?, None));
                }
                b"value" => {
                    if let Some((_, first)) = &current {
                        if first.is_none() {
                            value_text = Some(String::new());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"data" => {
                    let key = data_key(&e, path)?;
                    return Err(resx_err(path, format!("data `{key}` has no value element")).into());
                }
                b"value" => {
                    if let Some((_, first)) = &mut current {
                        if first.is_none() {
                            *first = Some(String::new());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(text) = &mut value_text {
                    text.push_str(&t.unescape().map_err(|e| resx_err(path, format!("{e}")))?);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(text) = &mut value_text {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"value" => {
                    if let Some(text) = value_text.take() {
                        if let Some((_, first)) = &mut current {
                            if first.is_none() {
                                *first = Some(text);
                            }
                        }
                    }
                }
                b"data" => {
                    let (key, payload) = current
                        .take()
                        .ok_or_else(|| resx_err(path, "unbalanced data element"))?;
                    let payload = payload.ok_or_else(|| {
                        resx_err(path, format!("data `{key}` has no value element"))
                    })?;
                    if store.contains_key(&key) {
                        return Err(UntransError::DuplicateKey {
                            key,
                            path: path.to_path_buf(),
                        }
                        .into());
                    }
                    store.insert(key.clone(), KeyedRecord { key, payload });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(resx_err(path, format!("{e}")).into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(store)
}
