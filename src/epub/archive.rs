//! Archive reader for EPUB containers.
//!
//! Opens the zip container, locates the OPF package document through
//! `META-INF/container.xml`, and indexes the manifest, spine and raw
//! resource bytes. All entries are extracted up front so later lookups
//! never touch the zip again.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::de::from_str;
use serde::Deserialize;
use zip::ZipArchive;

use super::{EpubError, ManifestEntry};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Borrowed view of a resolved resource: bytes plus the media type to
/// present it with.
#[derive(Debug)]
pub struct ResourceRef<'a> {
    /// Archive path the href resolved to.
    pub path: &'a str,
    pub media_type: String,
    pub data: &'a [u8],
}

/// An opened EPUB container, scoped to a single processing request.
pub struct EpubBook {
    manifest: Vec<ManifestEntry>,
    manifest_by_id: HashMap<String, usize>,
    /// Manifest index keyed by resolved archive path.
    manifest_by_path: HashMap<String, usize>,
    spine: Vec<String>,
    resources: HashMap<String, Vec<u8>>,
    opf_dir: String,
    nav_path: Option<String>,
}

impl EpubBook {
    /// Open an EPUB from raw bytes.
    ///
    /// Fails when the zip cannot be unpacked, `container.xml` or the OPF is
    /// missing, or the OPF lacks a manifest or spine declaration. Content
    /// problems inside individual resources never fail here.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EpubError> {
        let cursor = Cursor::new(data);
        let mut archive = ZipArchive::new(cursor)?;

        let container_xml = read_entry_string(&mut archive, CONTAINER_PATH).map_err(|_| {
            EpubError::InvalidArchive(format!("missing {}", CONTAINER_PATH))
        })?;
        let opf_path = find_opf_path(&container_xml)?;
        let opf_dir = opf_path
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .unwrap_or_default();

        let opf_xml = read_entry_string(&mut archive, &opf_path).map_err(|_| {
            EpubError::InvalidArchive(format!("missing package document {}", opf_path))
        })?;
        let package: OpfPackage = from_str(&opf_xml)?;

        let Some(opf_manifest) = package.manifest else {
            return Err(EpubError::InvalidArchive(
                "package has no manifest declaration".to_string(),
            ));
        };
        let Some(opf_spine) = package.spine else {
            return Err(EpubError::InvalidArchive(
                "package has no spine declaration".to_string(),
            ));
        };

        let mut manifest = Vec::with_capacity(opf_manifest.item.len());
        let mut manifest_by_id = HashMap::new();
        let mut manifest_by_path = HashMap::new();
        let mut nav_property_path: Option<String> = None;
        for item in opf_manifest.item {
            let has_nav_property = item
                .properties
                .as_deref()
                .is_some_and(|p| p.split_whitespace().any(|p| p == "nav"));
            let (Some(id), Some(href), Some(media_type)) =
                (item.id, item.href, item.media_type)
            else {
                continue;
            };
            // First declaration wins; ids are unique by contract.
            if manifest_by_id.contains_key(&id) {
                tracing::warn!(id = %id, "duplicate manifest id ignored");
                continue;
            }
            let index = manifest.len();
            let path = join_archive_path(&opf_dir, &normalize_href(&href));
            if has_nav_property && nav_property_path.is_none() {
                nav_property_path = Some(path.clone());
            }
            manifest_by_id.insert(id.clone(), index);
            manifest_by_path.insert(path, index);
            manifest.push(ManifestEntry {
                id,
                href,
                media_type,
            });
        }

        // Spine order is significant and preserved exactly as declared.
        let spine: Vec<String> = opf_spine
            .itemref
            .into_iter()
            .filter_map(|r| r.idref)
            .collect();

        let mut resources = HashMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_file() {
                let name = file.name().to_string();
                let mut content = Vec::new();
                file.read_to_end(&mut content)?;
                resources.insert(name, content);
            }
        }

        let nav_path = find_navigation_path(
            &manifest,
            &manifest_by_id,
            opf_spine.toc.as_deref(),
            nav_property_path,
            &opf_dir,
        );

        Ok(Self {
            manifest,
            manifest_by_id,
            manifest_by_path,
            spine,
            resources,
            opf_dir,
            nav_path,
        })
    }

    pub fn manifest_entries(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Reading order as declared by the spine.
    pub fn spine_ids(&self) -> &[String] {
        &self.spine
    }

    pub fn entry_by_id(&self, id: &str) -> Option<&ManifestEntry> {
        self.manifest_by_id.get(id).map(|&i| &self.manifest[i])
    }

    /// Raw bytes of the navigation document, when one is declared.
    pub fn navigation_document(&self) -> Option<&[u8]> {
        let path = self.nav_path.as_deref()?;
        self.resources.get(path).map(Vec::as_slice)
    }

    /// Resolve an href against the manifest and return its bytes.
    ///
    /// A broken reference should degrade gracefully rather than abort the
    /// whole book, so unresolvable hrefs return `None`. The media type comes
    /// from the manifest declaration when the path matches one, falling back
    /// to a guess from the file extension.
    pub fn resource_by_href(&self, href: &str) -> Option<ResourceRef<'_>> {
        let path = self.resolve_archive_path(href)?;
        let (path, data) = self.resources.get_key_value(&path)?;

        let media_type = self
            .manifest_by_path
            .get(path.as_str())
            .map(|&i| self.manifest[i].media_type.clone())
            .unwrap_or_else(|| {
                mime_guess::from_path(path)
                    .first()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string())
            });

        Some(ResourceRef {
            path,
            media_type,
            data,
        })
    }

    /// Map an href to an archive path: exact resolution against the OPF
    /// directory first, then fuzzy suffix and basename matching to absorb
    /// the path inconsistencies real archives exhibit.
    fn resolve_archive_path(&self, href: &str) -> Option<String> {
        let cleaned = normalize_href(href);
        if cleaned.is_empty() {
            return None;
        }

        let joined = join_archive_path(&self.opf_dir, &cleaned);
        if self.resources.contains_key(&joined) {
            return Some(joined);
        }
        // The href may already be archive-absolute.
        if self.resources.contains_key(&cleaned) {
            return Some(cleaned);
        }

        let cleaned_lower = cleaned.to_lowercase();
        let suffix = format!("/{}", cleaned_lower);
        let basename = cleaned_lower
            .rsplit('/')
            .next()
            .unwrap_or(&cleaned_lower)
            .to_string();

        let mut names: Vec<&String> = self.resources.keys().collect();
        names.sort();

        for name in &names {
            if name.to_lowercase() == cleaned_lower {
                return Some((*name).clone());
            }
        }
        for name in &names {
            if name.to_lowercase().ends_with(&suffix) {
                return Some((*name).clone());
            }
        }
        for name in &names {
            let name_base = name.rsplit('/').next().unwrap_or(name).to_lowercase();
            if name_base == basename {
                return Some((*name).clone());
            }
        }

        None
    }
}

/// Strip the URL fragment, percent-decode, and normalize separators.
fn normalize_href(href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let decoded = urlencoding::decode(href).unwrap_or_else(|_| href.into());
    decoded
        .replace('\\', "/")
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

/// Join an href onto a base directory, collapsing `.` and `..` segments.
fn join_archive_path(base_dir: &str, href: &str) -> String {
    let mut segments: Vec<&str> = if base_dir.is_empty() {
        Vec::new()
    } else {
        base_dir.split('/').collect()
    };
    for part in href.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn read_entry_string(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    path: &str,
) -> Result<String, EpubError> {
    let mut file = archive.by_name(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn find_opf_path(container_xml: &str) -> Result<String, EpubError> {
    let container: Container = from_str(container_xml)?;
    container
        .rootfiles
        .and_then(|r| r.rootfile.into_iter().next())
        .and_then(|r| r.full_path)
        .ok_or_else(|| {
            EpubError::InvalidArchive("container.xml declares no rootfile".to_string())
        })
}

/// Locate the navigation document: the spine `toc` idref first, then any
/// NCX-typed manifest entry, then the EPUB 3 `properties="nav"` entry,
/// then a name-based guess.
fn find_navigation_path(
    manifest: &[ManifestEntry],
    manifest_by_id: &HashMap<String, usize>,
    spine_toc: Option<&str>,
    nav_property_path: Option<String>,
    opf_dir: &str,
) -> Option<String> {
    let entry = spine_toc
        .and_then(|id| manifest_by_id.get(id).map(|&i| &manifest[i]))
        .or_else(|| manifest.iter().find(|e| e.media_type == NCX_MEDIA_TYPE));
    if let Some(entry) = entry {
        return Some(join_archive_path(opf_dir, &normalize_href(&entry.href)));
    }
    if nav_property_path.is_some() {
        return nav_property_path;
    }
    manifest
        .iter()
        .find(|e| {
            e.media_type == "application/xhtml+xml" && e.href.to_lowercase().contains("nav")
        })
        .map(|e| join_archive_path(opf_dir, &normalize_href(&e.href)))
}

// Package document structures, deserialized with quick-xml.

#[derive(Debug, Deserialize)]
struct Container {
    rootfiles: Option<Rootfiles>,
}

#[derive(Debug, Deserialize)]
struct Rootfiles {
    #[serde(rename = "rootfile", default)]
    rootfile: Vec<Rootfile>,
}

#[derive(Debug, Deserialize)]
struct Rootfile {
    #[serde(rename = "@full-path", default)]
    full_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpfPackage {
    manifest: Option<OpfManifest>,
    spine: Option<OpfSpine>,
}

#[derive(Debug, Deserialize)]
struct OpfManifest {
    #[serde(rename = "item", default)]
    item: Vec<OpfItem>,
}

#[derive(Debug, Deserialize)]
struct OpfItem {
    #[serde(rename = "@id", default)]
    id: Option<String>,

    #[serde(rename = "@href", default)]
    href: Option<String>,

    #[serde(rename = "@media-type", default)]
    media_type: Option<String>,

    #[serde(rename = "@properties", default)]
    properties: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpfSpine {
    #[serde(rename = "@toc", default)]
    toc: Option<String>,

    #[serde(rename = "itemref", default)]
    itemref: Vec<OpfItemref>,
}

#[derive(Debug, Deserialize)]
struct OpfItemref {
    #[serde(rename = "@idref", default)]
    idref: Option<String>,
}
