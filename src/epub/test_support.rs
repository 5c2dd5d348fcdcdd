//! In-memory EPUB fixture builder for tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const OPF_DIR: &str = "OEBPS";

/// Builds a small EPUB archive in memory. Chapters are added to both the
/// manifest and the spine in call order.
pub struct EpubBuilder {
    manifest: Vec<(String, String, String)>,
    spine: Vec<String>,
    files: Vec<(String, Vec<u8>)>,
    has_ncx: bool,
    raw_opf: Option<String>,
    with_container: bool,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            manifest: Vec::new(),
            spine: Vec::new(),
            files: Vec::new(),
            has_ncx: false,
            raw_opf: None,
            with_container: true,
        }
    }

    pub fn chapter(mut self, id: &str, href: &str, body: &str) -> Self {
        self.manifest.push((
            id.to_string(),
            href.to_string(),
            "application/xhtml+xml".to_string(),
        ));
        self.spine.push(id.to_string());
        self.files
            .push((format!("{}/{}", OPF_DIR, href), body.as_bytes().to_vec()));
        self
    }

    /// A manifest-only resource (image, stylesheet); never in the spine.
    pub fn resource(mut self, id: &str, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.manifest
            .push((id.to_string(), href.to_string(), media_type.to_string()));
        self.files
            .push((format!("{}/{}", OPF_DIR, href), data.to_vec()));
        self
    }

    pub fn image(self, id: &str, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.resource(id, href, media_type, data)
    }

    /// A spine entry whose manifest media type is not a document type.
    pub fn spine_resource(mut self, id: &str, href: &str, media_type: &str, data: &[u8]) -> Self {
        self = self.resource(id, href, media_type, data);
        self.spine.push(id.to_string());
        self
    }

    pub fn ncx(mut self, content: &str) -> Self {
        self.manifest.push((
            "ncx".to_string(),
            "toc.ncx".to_string(),
            "application/x-dtbncx+xml".to_string(),
        ));
        self.files.push((
            format!("{}/toc.ncx", OPF_DIR),
            content.as_bytes().to_vec(),
        ));
        self.has_ncx = true;
        self
    }

    pub fn nav(mut self, content: &str) -> Self {
        self.manifest.push((
            "nav".to_string(),
            "nav.xhtml".to_string(),
            "application/xhtml+xml".to_string(),
        ));
        self.files.push((
            format!("{}/nav.xhtml", OPF_DIR),
            content.as_bytes().to_vec(),
        ));
        self
    }

    pub fn raw_opf(mut self, opf: &str) -> Self {
        self.raw_opf = Some(opf.to_string());
        self
    }

    pub fn without_container(mut self) -> Self {
        self.with_container = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        if self.with_container {
            zip.start_file("META-INF/container.xml", options).unwrap();
            zip.write_all(
                format!(
                    "<?xml version=\"1.0\"?>\
                     <container version=\"1.0\" \
                     xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\
                     <rootfiles>\
                     <rootfile full-path=\"{}/content.opf\" \
                     media-type=\"application/oebps-package+xml\"/>\
                     </rootfiles></container>",
                    OPF_DIR
                )
                .as_bytes(),
            )
            .unwrap();
        }

        let opf = self.raw_opf.clone().unwrap_or_else(|| self.generate_opf());
        zip.start_file(format!("{}/content.opf", OPF_DIR), options)
            .unwrap();
        zip.write_all(opf.as_bytes()).unwrap();

        for (path, data) in &self.files {
            zip.start_file(path.clone(), options).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn generate_opf(&self) -> String {
        let mut opf = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\">\
             <metadata><dc:title xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
             Fixture</dc:title></metadata><manifest>",
        );
        for (id, href, media_type) in &self.manifest {
            opf.push_str(&format!(
                "<item id=\"{}\" href=\"{}\" media-type=\"{}\"/>",
                id, href, media_type
            ));
        }
        opf.push_str("</manifest>");
        if self.has_ncx {
            opf.push_str("<spine toc=\"ncx\">");
        } else {
            opf.push_str("<spine>");
        }
        for id in &self.spine {
            opf.push_str(&format!("<itemref idref=\"{}\"/>", id));
        }
        opf.push_str("</spine></package>");
        opf
    }
}
