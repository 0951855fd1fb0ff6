//! Corporate template engine.
//!
//! Generates branded decks by filling slides into a pre-loaded .pptx
//! template. The template package is read-only: every build clones the part
//! map, removes the template's own slides, and grows new slides whose shapes
//! are deep-cloned from the chosen layouts. Masters and layouts are never
//! touched, so the template can be shared across concurrent builds.

use quick_xml::events::Event;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::OoxmlPackage;

use super::builder::FIRST_SLIDE_ID;
use super::shapes;
use super::slides::{Slide, SlideKind};

/// Placeholder indices used for one slide type in one specific template.
///
/// A role set to `None` does not exist on that layout. Missing `idx`
/// attributes in the template count as index 0 (the usual title convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderMapping {
    /// Title placeholder index.
    pub title: Option<u32>,
    /// Subtitle placeholder index.
    pub subtitle: Option<u32>,
    /// Body content placeholder index.
    pub content: Option<u32>,
    /// Date placeholder index, auto-filled with the current date.
    pub date: Option<u32>,
}

/// Static, immutable template configuration injected at construction.
///
/// Maps each semantic slide type to a layout display name and to the
/// placeholder indices of that layout. Never mutated at runtime.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    layout_names: HashMap<SlideKind, String>,
    placeholders: HashMap<SlideKind, PlaceholderMapping>,
    default_layout_name: String,
}

impl TemplateConfig {
    /// Build a configuration from explicit maps.
    pub fn new(
        layout_names: HashMap<SlideKind, String>,
        placeholders: HashMap<SlideKind, PlaceholderMapping>,
        default_layout_name: impl Into<String>,
    ) -> Self {
        Self {
            layout_names,
            placeholders,
            default_layout_name: default_layout_name.into(),
        }
    }

    /// Layout display name for a slide type.
    pub fn layout_name(&self, kind: SlideKind) -> Option<&str> {
        self.layout_names.get(&kind).map(String::as_str)
    }

    /// Placeholder mapping for a slide type.
    pub fn placeholders(&self, kind: SlideKind) -> PlaceholderMapping {
        self.placeholders.get(&kind).copied().unwrap_or_default()
    }

    /// Layout name used when a slide type has no match in the template.
    pub fn default_layout_name(&self) -> &str {
        &self.default_layout_name
    }
}

impl Default for TemplateConfig {
    /// The mapping for the corporate template this engine ships with.
    fn default() -> Self {
        let mut layout_names = HashMap::new();
        layout_names.insert(SlideKind::Forside, "Forside".to_string());
        layout_names.insert(SlideKind::Innhald, "Innhald".to_string());
        layout_names.insert(
            SlideKind::InnhaldMUndertittel,
            "Innhald med undertittel".to_string(),
        );
        layout_names.insert(SlideKind::Kapittel, "Kapittel".to_string());
        layout_names.insert(SlideKind::Avslutting, "Avslutting".to_string());

        let mut placeholders = HashMap::new();
        placeholders.insert(
            SlideKind::Forside,
            PlaceholderMapping {
                title: Some(0),
                subtitle: Some(1),
                content: None,
                date: Some(10),
            },
        );
        placeholders.insert(
            SlideKind::Innhald,
            PlaceholderMapping {
                title: Some(0),
                subtitle: None,
                content: Some(1),
                date: None,
            },
        );
        placeholders.insert(
            SlideKind::InnhaldMUndertittel,
            PlaceholderMapping {
                title: Some(0),
                subtitle: Some(13),
                content: Some(1),
                date: None,
            },
        );
        placeholders.insert(
            SlideKind::Kapittel,
            PlaceholderMapping {
                title: Some(0),
                subtitle: None,
                content: None,
                date: None,
            },
        );
        placeholders.insert(
            SlideKind::Avslutting,
            PlaceholderMapping {
                title: Some(0),
                subtitle: Some(1),
                content: None,
                date: None,
            },
        );

        Self::new(layout_names, placeholders, "Innhald")
    }
}

/// Template-based presentation generator.
pub struct PptxTemplateEngine {
    template: OoxmlPackage,
    config: TemplateConfig,
}

impl PptxTemplateEngine {
    /// Load a template package. The bytes must hold a valid .pptx with at
    /// least one slide master.
    pub fn from_bytes(data: &[u8], config: TemplateConfig) -> Result<Self> {
        let template = OoxmlPackage::from_bytes(data)?;
        if !template.exists("ppt/presentation.xml") {
            return Err(Error::MissingComponent("ppt/presentation.xml".to_string()));
        }
        if template.parts_with_prefix("ppt/slideMasters/").is_empty() {
            return Err(Error::MissingComponent("ppt/slideMasters/".to_string()));
        }
        Ok(Self { template, config })
    }

    /// Build a deck from slides.
    ///
    /// The loaded template is cloned per call; concurrent builds never share
    /// mutable state.
    pub fn build(&self, slides: &[Slide]) -> Result<Vec<u8>> {
        let mut package = self.template.clone();

        remove_all_slides(&mut package)?;
        for slide in slides {
            add_slide(&mut package, slide, &self.config)?;
        }

        package.to_bytes()
    }
}

/// One `<Relationship>` entry of a .rels part.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut rels = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if !id.is_empty() {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
    }

    Ok(rels)
}

fn relationships_xml(rels: &[Relationship]) -> String {
    let mut entries = String::new();
    for rel in rels {
        entries.push_str(&format!(
            r#"  <Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id, rel.rel_type, rel.target
        ));
        entries.push('\n');
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
{entries}</Relationships>"#
    )
}

/// Smallest unused `rIdN` in a relationship list.
fn next_rel_id(rels: &[Relationship]) -> String {
    let max = rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// Delete every slide part and its entry in the slide-ID list.
///
/// Masters, layouts and themes are untouched.
fn remove_all_slides(package: &mut OoxmlPackage) -> Result<()> {
    // Slide parts and their .rels.
    for name in package.parts_with_prefix("ppt/slides/") {
        package.remove(&name);
    }

    // Slide entries in the presentation relationships.
    let rels_xml = package.read_xml("ppt/_rels/presentation.xml.rels")?;
    let rels: Vec<Relationship> = parse_relationships(&rels_xml)?
        .into_iter()
        .filter(|r| !r.rel_type.ends_with("/slide"))
        .collect();
    package.insert_xml("ppt/_rels/presentation.xml.rels", relationships_xml(&rels));

    // Empty the slide-ID list.
    let presentation = package.read_xml("ppt/presentation.xml")?;
    let presentation = match shapes::element_span(&presentation, "p:sldIdLst") {
        Some(span) => {
            let mut xml = presentation.clone();
            xml.replace_range(span, "<p:sldIdLst/>");
            xml
        }
        None => presentation,
    };
    package.insert_xml("ppt/presentation.xml", presentation);

    // Slide overrides in [Content_Types].xml.
    let types_xml = package.read_xml("[Content_Types].xml")?;
    let filtered = remove_slide_overrides(&types_xml);
    package.insert_xml("[Content_Types].xml", filtered);

    Ok(())
}

fn remove_slide_overrides(types_xml: &str) -> String {
    let mut xml = types_xml.to_string();
    let mut from = 0;
    while let Some(span) = shapes::element_span_from(&xml, from, "Override") {
        let element = xml[span.clone()].to_string();
        let part_name = shapes::attr_value(&element, "PartName").unwrap_or_default();
        if part_name.starts_with("/ppt/slides/") {
            xml.replace_range(span.clone(), "");
            from = span.start;
        } else {
            from = span.end;
        }
    }
    xml
}

/// The slide IDs currently present in the presentation's slide-ID list.
fn slide_ids(presentation_xml: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    let mut reader = quick_xml::Reader::from_str(presentation_xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.name().local_name().as_ref() == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"id" {
                        if let Ok(id) = String::from_utf8_lossy(&attr.value).parse() {
                            ids.push(id);
                        }
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    ids
}

/// A layout part located by display name.
struct FoundLayout {
    part_name: String,
    display_name: String,
    xml: String,
}

/// Map the semantic key to a layout display name and search every layout
/// for an exact match, then a substring match. Returns `None` when the
/// requested name matches nothing, letting the caller retry with the
/// default layout name.
fn find_layout(package: &OoxmlPackage, wanted: &str) -> Option<FoundLayout> {
    let mut layouts = Vec::new();
    for part_name in package.parts_with_prefix("ppt/slideLayouts/") {
        if part_name.contains("_rels") {
            continue;
        }
        let Ok(xml) = package.read_xml(&part_name) else {
            continue;
        };
        let display_name = shapes::element_span(&xml, "p:cSld")
            .and_then(|span| shapes::attr_value(&xml[span], "name"))
            .unwrap_or_default();
        layouts.push(FoundLayout {
            part_name,
            display_name,
            xml,
        });
    }

    let wanted_lower = wanted.to_lowercase();

    if let Some(pos) = layouts
        .iter()
        .position(|l| l.display_name.eq_ignore_ascii_case(wanted))
    {
        return Some(layouts.swap_remove(pos));
    }

    let pos = layouts
        .iter()
        .position(|l| l.display_name.to_lowercase().contains(&wanted_lower))?;
    Some(layouts.swap_remove(pos))
}

/// Fill one placeholder role, failing fast when the mapping expects an index
/// the cloned shapes do not carry.
fn fill_role(
    shapes_vec: &mut [String],
    index: Option<u32>,
    text: &str,
    multiline: bool,
    layout_name: &str,
) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(index) = index else {
        return Ok(());
    };

    let position = shapes::find_placeholder_shape(shapes_vec, index).ok_or_else(|| {
        Error::MissingPlaceholder {
            layout: layout_name.to_string(),
            index,
        }
    })?;

    shapes_vec[position] = if multiline {
        shapes::set_placeholder_content(&shapes_vec[position], text)
    } else {
        shapes::set_placeholder_text(&shapes_vec[position], text)
    };
    Ok(())
}

/// Create a new slide part from the layout matching the slide's type and
/// append it to the slide-ID list with ID = current max + 1 (256 when the
/// list is empty).
fn add_slide(package: &mut OoxmlPackage, slide: &Slide, config: &TemplateConfig) -> Result<()> {
    let kind = slide.kind.unwrap_or(SlideKind::Innhald);

    // Exact match, then substring, then the configured default layout.
    let wanted = config
        .layout_name(kind)
        .unwrap_or_else(|| config.default_layout_name());
    let layout = match find_layout(package, wanted) {
        Some(layout) => layout,
        None => {
            debug!(
                "layout '{wanted}' not found in template, falling back to '{}'",
                config.default_layout_name()
            );
            find_layout(package, config.default_layout_name())
                .ok_or_else(|| Error::LayoutNotFound(config.default_layout_name().to_string()))?
        }
    };

    // Deep-clone the layout's shapes; the layout part itself is never touched.
    let mut cloned = shapes::extract_shapes(&layout.xml);

    let mapping = config.placeholders(kind);
    fill_role(
        &mut cloned,
        mapping.title,
        &slide.title,
        false,
        &layout.display_name,
    )?;

    // Layouts without a body placeholder put the slide content into the
    // subtitle, so front and closing slides still show their text.
    let (subtitle_text, content_text) = if mapping.content.is_none() {
        (slide.content.as_str(), "")
    } else {
        ("", slide.content.as_str())
    };
    fill_role(
        &mut cloned,
        mapping.subtitle,
        subtitle_text,
        false,
        &layout.display_name,
    )?;
    fill_role(
        &mut cloned,
        mapping.content,
        content_text,
        true,
        &layout.display_name,
    )?;

    // The date placeholder is auto-filled when the layout carries one.
    if let Some(date_idx) = mapping.date {
        if let Some(position) = shapes::find_placeholder_shape(&cloned, date_idx) {
            let today = chrono::Local::now().format("%d.%m.%Y").to_string();
            cloned[position] = shapes::set_placeholder_text(&cloned[position], &today);
        }
    }

    // Next free slide part number.
    let slide_num = package
        .parts_with_prefix("ppt/slides/slide")
        .iter()
        .filter_map(|n| {
            n.strip_prefix("ppt/slides/slide")
                .and_then(|rest| rest.strip_suffix(".xml"))
                .and_then(|num| num.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0)
        + 1;
    let part_name = format!("ppt/slides/slide{slide_num}.xml");

    package.insert_xml(&part_name, slide_part_xml(&cloned));
    package.insert_xml(
        format!("ppt/slides/_rels/slide{slide_num}.xml.rels"),
        slide_rels_xml(&layout.part_name),
    );

    // Content-type override for the new part.
    let types_xml = package.read_xml("[Content_Types].xml")?;
    let override_entry = format!(
        r#"  <Override PartName="/{part_name}" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
"#
    );
    let types_xml = match types_xml.rfind("</Types>") {
        Some(end) => {
            let mut xml = types_xml.clone();
            xml.insert_str(end, &override_entry);
            xml
        }
        None => return Err(Error::XmlParse("[Content_Types].xml has no root".to_string())),
    };
    package.insert_xml("[Content_Types].xml", types_xml);

    // Presentation relationship for the new slide.
    let rels_xml = package.read_xml("ppt/_rels/presentation.xml.rels")?;
    let mut rels = parse_relationships(&rels_xml)?;
    let rel_id = next_rel_id(&rels);
    rels.push(Relationship {
        id: rel_id.clone(),
        rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide"
            .to_string(),
        target: format!("slides/slide{slide_num}.xml"),
    });
    package.insert_xml("ppt/_rels/presentation.xml.rels", relationships_xml(&rels));

    // Append to the slide-ID list.
    let presentation = package.read_xml("ppt/presentation.xml")?;
    let slide_id = slide_ids(&presentation)
        .into_iter()
        .max()
        .map(|max| max + 1)
        .unwrap_or(FIRST_SLIDE_ID);
    let entry = format!(r#"<p:sldId id="{slide_id}" r:id="{rel_id}"/>"#);

    let span = shapes::element_span(&presentation, "p:sldIdLst")
        .ok_or_else(|| Error::XmlParse("presentation.xml has no slide-ID list".to_string()))?;
    let list = &presentation[span.clone()];
    let new_list = if let Some(stripped) = list.strip_suffix("/>") {
        // Self-closing empty list.
        format!("{stripped}>{entry}</p:sldIdLst>")
    } else {
        match list.rfind("</p:sldIdLst>") {
            Some(end) => format!("{}{}{}", &list[..end], entry, &list[end..]),
            None => return Err(Error::XmlParse("malformed slide-ID list".to_string())),
        }
    };
    let mut presentation = presentation.clone();
    presentation.replace_range(span, &new_list);
    package.insert_xml("ppt/presentation.xml", presentation);

    Ok(())
}

fn slide_part_xml(cloned_shapes: &[String]) -> String {
    let mut shape_xml = String::new();
    for shape in cloned_shapes {
        shape_xml.push_str(shape);
        shape_xml.push('\n');
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
  xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
{shape_xml}    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#
    )
}

fn slide_rels_xml(layout_part_name: &str) -> String {
    let target = layout_part_name
        .strip_prefix("ppt/")
        .unwrap_or(layout_part_name);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../{target}"/>
</Relationships>"#
    )
}
