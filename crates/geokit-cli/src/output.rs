use std::io::Write;

use serde::Serialize;

use crate::error::CliError;
use crate::metadata::Metadata;

/// `{ "meta": ..., "data": ... }` document printed on stdout.
#[derive(Debug, Serialize)]
pub struct Document<T> {
    pub meta: Metadata,
    pub data: T,
}

impl<T: Serialize> Document<T> {
    pub fn new(meta: Metadata, data: T) -> Self {
        Self { meta, data }
    }
}

pub fn render<T: Serialize>(document: &Document<T>, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_document(&mut handle, document, pretty)
}

pub fn write_document<W, T>(writer: &mut W, document: &Document<T>, pretty: bool) -> Result<(), CliError>
where
    W: Write,
    T: Serialize,
{
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, document)?;
    } else {
        serde_json::to_writer(&mut *writer, document)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use geokit_core::ProviderId;

    use super::*;

    #[test]
    fn compact_output_is_one_line() {
        let document = Document::new(Metadata::new(Some(ProviderId::Bing), 7), vec![1, 2]);
        let mut buffer = Vec::new();
        write_document(&mut buffer, &document, false).expect("writes");

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains(r#""data":[1,2]"#));
    }

    #[test]
    fn pretty_output_is_indented() {
        let document = Document::new(Metadata::new(None, 7), "ok");
        let mut buffer = Vec::new();
        write_document(&mut buffer, &document, true).expect("writes");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("\n  \"meta\""));
    }
}
