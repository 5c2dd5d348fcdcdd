//! Shared fixtures for integration tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Minimal in-memory EPUB archive for end-to-end tests.
pub struct FixtureBook {
    chapters: Vec<(String, String, String)>,
    extras: Vec<(String, String, String, Vec<u8>)>,
    ncx: Option<String>,
}

impl FixtureBook {
    pub fn new() -> Self {
        Self {
            chapters: Vec::new(),
            extras: Vec::new(),
            ncx: None,
        }
    }

    pub fn chapter(mut self, id: &str, href: &str, body: &str) -> Self {
        self.chapters
            .push((id.to_string(), href.to_string(), body.to_string()));
        self
    }

    pub fn image(mut self, id: &str, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.extras.push((
            id.to_string(),
            href.to_string(),
            media_type.to_string(),
            data.to_vec(),
        ));
        self
    }

    pub fn ncx(mut self, content: &str) -> Self {
        self.ncx = Some(content.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", options).unwrap();
        zip.write_all(
            b"<?xml version=\"1.0\"?>\
              <container version=\"1.0\" \
              xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\
              <rootfiles>\
              <rootfile full-path=\"OEBPS/content.opf\" \
              media-type=\"application/oebps-package+xml\"/>\
              </rootfiles></container>",
        )
        .unwrap();

        let mut opf = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\">\
             <metadata><dc:title xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
             Fixture</dc:title></metadata><manifest>",
        );
        for (id, href, _) in &self.chapters {
            opf.push_str(&format!(
                "<item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>",
                id, href
            ));
        }
        for (id, href, media_type, _) in &self.extras {
            opf.push_str(&format!(
                "<item id=\"{}\" href=\"{}\" media-type=\"{}\"/>",
                id, href, media_type
            ));
        }
        if self.ncx.is_some() {
            opf.push_str(
                "<item id=\"ncx\" href=\"toc.ncx\" \
                 media-type=\"application/x-dtbncx+xml\"/>",
            );
            opf.push_str("</manifest><spine toc=\"ncx\">");
        } else {
            opf.push_str("</manifest><spine>");
        }
        for (id, _, _) in &self.chapters {
            opf.push_str(&format!("<itemref idref=\"{}\"/>", id));
        }
        opf.push_str("</spine></package>");

        zip.start_file("OEBPS/content.opf", options).unwrap();
        zip.write_all(opf.as_bytes()).unwrap();

        for (_, href, body) in &self.chapters {
            zip.start_file(format!("OEBPS/{}", href), options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        for (_, href, _, data) in &self.extras {
            zip.start_file(format!("OEBPS/{}", href), options).unwrap();
            zip.write_all(data).unwrap();
        }
        if let Some(ncx) = &self.ncx {
            zip.start_file("OEBPS/toc.ncx", options).unwrap();
            zip.write_all(ncx.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}
