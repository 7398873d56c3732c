//! `META-INF/container.xml`: locates the package document.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::xml::{attr, local_name};
use crate::error::{Error, Result};

/// Path of the container descriptor inside every package.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Return the `full-path` of the first `rootfile`.
pub fn parse_container_xml(content: &str) -> Result<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e) | Event::Start(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attr(&e, b"full-path").filter(|p| !p.trim().is_empty()) {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::malformed(format!("container.xml: {e}"))),
            _ => {}
        }
    }

    Err(Error::malformed("no rootfile found in container.xml"))
}
