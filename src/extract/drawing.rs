//! Locating and resolving image references inside a structural element.
//!
//! Word has accumulated two addressing schemes for pictures. Modern markup
//! wraps the graphic in `<w:drawing>` with a `<wp:inline>` or `<wp:anchor>`
//! container and references the payload through `<a:blip r:embed="...">`.
//! Legacy VML keeps a `<v:shape>` with a `<v:imagedata r:id="...">` child.
//! Resolution is tiered: modern first, then VML, then a last-resort scan of
//! every image relationship of the owning part. Each tier only runs when the
//! previous one produced nothing.

use crate::docx::format::attr_value;
use crate::error::{Error, Result};
use crate::extract::block::{AnchorEdge, PositionInfo};
use crate::extract::media::{MediaIndex, extension_for, persist_image, unique_image_name};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A located image reference with its placement metadata.
#[derive(Debug, Clone)]
pub struct DrawingRef {
    pub r_id: String,
    pub position: PositionInfo,
}

/// An image resolved to a file on disk.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub image_path: PathBuf,
    pub filename: String,
    pub position: PositionInfo,
    pub file_size: usize,
    pub content_type: String,
}

/// Which drawing container kind is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Inline,
    Anchor,
}

/// Which anchored axis is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// In-progress state for one inline/anchor container.
#[derive(Debug, Default)]
struct PendingDrawing {
    r_id: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    horizontal: Option<AnchorEdge>,
    vertical: Option<AnchorEdge>,
}

impl PendingDrawing {
    fn into_ref(self, kind: ContainerKind) -> Option<DrawingRef> {
        let r_id = self.r_id?;
        let position = match kind {
            ContainerKind::Inline => PositionInfo::Inline {
                width: self.width,
                height: self.height,
            },
            ContainerKind::Anchor => PositionInfo::Floating {
                horizontal: self.horizontal.unwrap_or_default(),
                vertical: self.vertical.unwrap_or_default(),
            },
        };
        Some(DrawingRef { r_id, position })
    }

    fn edge_mut(&mut self, axis: Axis) -> &mut AnchorEdge {
        let slot = match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        };
        slot.get_or_insert_with(AnchorEdge::default)
    }
}

/// Find all modern drawing containers (inline and anchored) in an element.
///
/// Returns one reference per container that carries an embedded or linked
/// blip, with extent or anchor placement captured alongside.
pub fn find_drawing_refs(element_xml: &[u8]) -> Result<SmallVec<[DrawingRef; 2]>> {
    let mut reader = Reader::from_reader(element_xml);
    reader.config_mut().trim_text(true);

    let mut refs = SmallVec::new();
    let mut buf = Vec::with_capacity(1024);

    let mut container: Option<(ContainerKind, PendingDrawing)> = None;
    let mut depth = 0usize;
    let mut axis: Option<Axis> = None;
    // Set while inside a <wp:align> or <wp:posOffset> leaf
    let mut capture_align = false;
    let mut capture_offset = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if let Some((kind, ref mut pending)) = container {
                    depth += 1;
                    match e.local_name().as_ref() {
                        b"positionH" if kind == ContainerKind::Anchor => {
                            axis = Some(Axis::Horizontal);
                            pending.edge_mut(Axis::Horizontal).relative_from =
                                attr_value(e, b"relativeFrom")?;
                        },
                        b"positionV" if kind == ContainerKind::Anchor => {
                            axis = Some(Axis::Vertical);
                            pending.edge_mut(Axis::Vertical).relative_from =
                                attr_value(e, b"relativeFrom")?;
                        },
                        b"align" if axis.is_some() => capture_align = true,
                        b"posOffset" if axis.is_some() => capture_offset = true,
                        _ => handle_leaf(e, kind, pending)?,
                    }
                } else {
                    match e.name().as_ref() {
                        b"wp:inline" | b"inline" => {
                            container = Some((ContainerKind::Inline, PendingDrawing::default()));
                            depth = 1;
                        },
                        b"wp:anchor" | b"anchor" => {
                            container = Some((ContainerKind::Anchor, PendingDrawing::default()));
                            depth = 1;
                        },
                        _ => {},
                    }
                }
            },
            Ok(Event::Empty(ref e)) => {
                if let Some((kind, ref mut pending)) = container {
                    match e.local_name().as_ref() {
                        b"positionH" if kind == ContainerKind::Anchor => {
                            pending.edge_mut(Axis::Horizontal).relative_from =
                                attr_value(e, b"relativeFrom")?;
                        },
                        b"positionV" if kind == ContainerKind::Anchor => {
                            pending.edge_mut(Axis::Vertical).relative_from =
                                attr_value(e, b"relativeFrom")?;
                        },
                        _ => handle_leaf(e, kind, pending)?,
                    }
                }
            },
            Ok(Event::Text(ref e)) => {
                if let Some((_, ref mut pending)) = container
                    && let Some(axis) = axis
                {
                    let text = crate::xml::text_content(e)?;
                    if capture_align {
                        pending.edge_mut(axis).align = Some(text);
                    } else if capture_offset {
                        pending.edge_mut(axis).offset = text.trim().parse::<i64>().ok();
                    }
                }
            },
            Ok(Event::End(ref e)) => {
                if container.is_some() {
                    match e.local_name().as_ref() {
                        b"positionH" | b"positionV" => axis = None,
                        b"align" => capture_align = false,
                        b"posOffset" => capture_offset = false,
                        _ => {},
                    }

                    depth -= 1;
                    if depth == 0
                        && let Some((kind, pending)) = container.take()
                        && let Some(drawing_ref) = pending.into_ref(kind)
                    {
                        refs.push(drawing_ref);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(refs)
}

/// Record blip references and inline extents found inside a container.
fn handle_leaf(
    e: &BytesStart<'_>,
    kind: ContainerKind,
    pending: &mut PendingDrawing,
) -> Result<()> {
    match e.local_name().as_ref() {
        b"blip" => {
            // r:embed for embedded parts, r:link for linked ones
            if pending.r_id.is_none() {
                pending.r_id = attr_value(e, b"embed")?;
            }
            if pending.r_id.is_none() {
                pending.r_id = attr_value(e, b"link")?;
            }
        },
        b"extent" if kind == ContainerKind::Inline => {
            if let Some(cx) = attr_value(e, b"cx")? {
                pending.width = cx.parse::<i64>().ok();
            }
            if let Some(cy) = attr_value(e, b"cy")? {
                pending.height = cy.parse::<i64>().ok();
            }
        },
        _ => {},
    }
    Ok(())
}

/// Find legacy VML image references: `<v:shape>` wrapping `<v:imagedata>`.
///
/// The shape's raw style string is carried as placement metadata.
pub fn find_vml_refs(element_xml: &[u8]) -> Result<SmallVec<[DrawingRef; 2]>> {
    let mut reader = Reader::from_reader(element_xml);
    reader.config_mut().trim_text(true);

    let mut refs = SmallVec::new();
    let mut buf = Vec::with_capacity(1024);

    let mut shape_style: Option<String> = None;
    let mut shape_rid: Option<String> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"shape" if shape_style.is_none() => {
                        shape_style = Some(attr_value(e, b"style")?.unwrap_or_default());
                        shape_rid = None;
                    },
                    b"imagedata" if shape_style.is_some() && shape_rid.is_none() => {
                        shape_rid = attr_value(e, b"id")?;
                        if shape_rid.is_none() {
                            shape_rid = attr_value(e, b"relid")?;
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"shape"
                    && let Some(style) = shape_style.take()
                    && let Some(r_id) = shape_rid.take()
                {
                    refs.push(DrawingRef {
                        r_id,
                        position: PositionInfo::LegacyShape { style },
                    });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(refs)
}

/// Resolve and persist every image referenced by one structural element.
///
/// Tiers are tried in order (modern, VML, all relationships) and a later
/// tier only runs when no earlier tier persisted anything. `seen` accumulates
/// relationship IDs already resolved within the current call so the same
/// image cannot be emitted twice across tiers. A failure on one image is
/// logged and skipped; the remaining references are still processed.
pub fn resolve_images(
    element_xml: &[u8],
    media: &MediaIndex<'_>,
    output_dir: &Path,
    seen: &mut HashSet<String>,
) -> Vec<ResolvedImage> {
    let mut results = Vec::new();

    match find_drawing_refs(element_xml) {
        Ok(refs) => {
            for drawing_ref in refs {
                resolve_one(drawing_ref, media, output_dir, seen, &mut results);
            }
        },
        Err(err) => log::error!("drawing scan failed: {}", err),
    }

    if results.is_empty() {
        match find_vml_refs(element_xml) {
            Ok(refs) => {
                for drawing_ref in refs {
                    resolve_one(drawing_ref, media, output_dir, seen, &mut results);
                }
            },
            Err(err) => log::error!("VML scan failed: {}", err),
        }
    }

    if results.is_empty() && mentions_graphic(element_xml) {
        for (r_id, _) in media.iter() {
            if seen.contains(r_id) {
                continue;
            }
            resolve_one(
                DrawingRef {
                    r_id: r_id.to_string(),
                    position: PositionInfo::Unknown,
                },
                media,
                output_dir,
                seen,
                &mut results,
            );
        }
    }

    results
}

/// Check whether an element carries any graphic markup at all.
///
/// The exhaustive relationship scan only makes sense when the element shows
/// signs of an image the structured tiers failed to parse. Without this gate
/// every plain paragraph would re-emit the document's whole image set.
fn mentions_graphic(element_xml: &[u8]) -> bool {
    const MARKERS: [&[u8]; 5] = [b"drawing", b"pict", b"blip", b"imagedata", b"shape"];
    MARKERS
        .iter()
        .any(|marker| memchr::memmem::find(element_xml, marker).is_some())
}

/// Resolve a single reference: look up the payload, pick a filename, persist.
///
/// The relationship ID is marked seen only after a successful persist, so a
/// transient failure in one tier can still be retried by the fallback scan.
fn resolve_one(
    drawing_ref: DrawingRef,
    media: &MediaIndex<'_>,
    output_dir: &Path,
    seen: &mut HashSet<String>,
    results: &mut Vec<ResolvedImage>,
) {
    let DrawingRef { r_id, position } = drawing_ref;
    if seen.contains(&r_id) {
        return;
    }

    let Some(entry) = media.get(&r_id) else {
        log::warn!("no image relationship for {}", r_id);
        return;
    };

    let ext = extension_for(entry.content_type);
    let filename = unique_image_name(ext);

    match persist_image(output_dir, &filename, entry.blob) {
        Ok(image_path) => {
            log::info!("saved image {} ({} bytes)", filename, entry.blob.len());
            results.push(ResolvedImage {
                image_path,
                filename,
                position,
                file_size: entry.blob.len(),
                content_type: entry.content_type.to_string(),
            });
            seen.insert(r_id);
        },
        Err(err) => log::error!("failed to persist image {}: {}", r_id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INLINE_XML: &[u8] = br#"<w:p><w:r><w:drawing>
        <wp:inline><wp:extent cx="914400" cy="457200"/>
        <a:graphic><a:graphicData><pic:pic><pic:blipFill>
        <a:blip r:embed="rId7"/>
        </pic:blipFill></pic:pic></a:graphicData></a:graphic>
        </wp:inline></w:drawing></w:r></w:p>"#;

    const ANCHOR_XML: &[u8] = br#"<w:p><w:r><w:drawing>
        <wp:anchor>
        <wp:positionH relativeFrom="column"><wp:align>center</wp:align></wp:positionH>
        <wp:positionV relativeFrom="paragraph"><wp:posOffset>635000</wp:posOffset></wp:positionV>
        <a:graphic><a:graphicData><pic:pic><pic:blipFill>
        <a:blip r:embed="rId9"/>
        </pic:blipFill></pic:pic></a:graphicData></a:graphic>
        </wp:anchor></w:drawing></w:r></w:p>"#;

    #[test]
    fn test_inline_drawing_ref() {
        let refs = find_drawing_refs(INLINE_XML).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].r_id, "rId7");
        match &refs[0].position {
            PositionInfo::Inline { width, height } => {
                assert_eq!(*width, Some(914400));
                assert_eq!(*height, Some(457200));
            },
            other => panic!("expected inline position, got {:?}", other),
        }
    }

    #[test]
    fn test_anchor_drawing_ref() {
        let refs = find_drawing_refs(ANCHOR_XML).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].r_id, "rId9");
        match &refs[0].position {
            PositionInfo::Floating {
                horizontal,
                vertical,
            } => {
                assert_eq!(horizontal.relative_from.as_deref(), Some("column"));
                assert_eq!(horizontal.align.as_deref(), Some("center"));
                assert_eq!(vertical.relative_from.as_deref(), Some("paragraph"));
                assert_eq!(vertical.offset, Some(635000));
            },
            other => panic!("expected floating position, got {:?}", other),
        }
    }

    #[test]
    fn test_blip_without_container_is_ignored() {
        let refs = find_drawing_refs(br#"<w:p><a:blip r:embed="rId1"/></w:p>"#).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_vml_shape_ref() {
        let xml = br#"<w:p><w:r><w:pict>
            <v:shape style="width:100pt;height:50pt">
            <v:imagedata r:id="rId4"/>
            </v:shape></w:pict></w:r></w:p>"#;
        let refs = find_vml_refs(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].r_id, "rId4");
        match &refs[0].position {
            PositionInfo::LegacyShape { style } => {
                assert_eq!(style, "width:100pt;height:50pt");
            },
            other => panic!("expected legacy shape, got {:?}", other),
        }
    }

    #[test]
    fn test_vml_relid_fallback_attribute() {
        let xml = br#"<v:shape><v:imagedata o:relid="rId12"/></v:shape>"#;
        let refs = find_vml_refs(xml).unwrap();
        assert_eq!(refs[0].r_id, "rId12");
    }

    #[test]
    fn test_blip_with_nondefault_relationship_prefix() {
        let xml = br#"<w:p><w:drawing><wp:inline>
            <a:blip rel:embed="rId3"/>
            </wp:inline></w:drawing></w:p>"#;
        let refs = find_drawing_refs(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].r_id, "rId3");
    }

    #[test]
    fn test_imagedata_with_nondefault_relationship_prefix() {
        let xml = br#"<v:shape style=""><v:imagedata rel:id="rId5"/></v:shape>"#;
        let refs = find_vml_refs(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].r_id, "rId5");
    }
}
