//! Shape-level XML surgery for slide generation.
//!
//! The template engine clones layout shapes into new slides and rewrites
//! placeholder text while keeping the template's formatting. Shapes are
//! handled as raw XML fragments: balanced-element spans are located with a
//! small depth-tracking scanner, and attributes are read with `quick-xml`
//! on the opening tag. OOXML parts contain no comments or CDATA sections,
//! which keeps the span scan exact.

use quick_xml::events::Event;
use std::ops::Range;

/// Shape tags that can appear as direct children of a `<p:spTree>`.
const SHAPE_TAGS: [&str; 5] = ["p:sp", "p:grpSp", "p:graphicFrame", "p:pic", "p:cxnSp"];

/// Bullet character inserted for `- ` / `* ` lines.
const BULLET_CHAR: &str = "\u{2022}";

fn is_name_end(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/')
}

/// Find the byte offset of the next `<tag` opening whose name ends exactly
/// at `tag` (so `p:sp` never matches `<p:spPr`).
fn find_open(xml: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut at = from;
    while let Some(p) = xml.get(at..)?.find(&needle) {
        let abs = at + p;
        let after = abs + needle.len();
        if xml.as_bytes().get(after).is_none_or(|&b| is_name_end(b)) {
            return Some(abs);
        }
        at = abs + 1;
    }
    None
}

/// Byte span of the first balanced `tag` element at or after `from`,
/// including its opening and closing tags. Handles self-closing elements.
pub(crate) fn element_span_from(xml: &str, from: usize, tag: &str) -> Option<Range<usize>> {
    let start = find_open(xml, from, tag)?;
    let close_needle = format!("</{tag}>");

    let mut pos = start;
    let mut depth = 0usize;
    loop {
        let next_open = find_open(xml, pos, tag);
        let next_close = xml[pos..].find(&close_needle).map(|p| pos + p);

        match (next_open, next_close) {
            (Some(open), close) if close.is_none_or(|c| open < c) => {
                let gt = xml[open..].find('>').map(|p| open + p)?;
                let self_closing = xml.as_bytes()[gt - 1] == b'/';
                if self_closing {
                    if depth == 0 {
                        return Some(start..gt + 1);
                    }
                } else {
                    depth += 1;
                }
                pos = gt + 1;
            }
            (_, Some(close)) => {
                let end = close + close_needle.len();
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start..end);
                }
                pos = end;
            }
            (None, None) => return None,
            // Unreachable: when `next_close` is None, arm 1's guard
            // (`close.is_none_or(...)`) is satisfied, so any `(Some(_), None)`
            // is handled above. Present only to satisfy exhaustiveness.
            (Some(_), None) => unreachable!(),
        }
    }
}

/// Byte span of the first balanced `tag` element in `xml`.
pub(crate) fn element_span(xml: &str, tag: &str) -> Option<Range<usize>> {
    element_span_from(xml, 0, tag)
}

/// All top-level balanced `tag` spans, scanned sequentially.
fn element_spans(xml: &str, tag: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(span) = element_span_from(xml, from, tag) {
        from = span.end;
        spans.push(span);
    }
    spans
}

/// Read an attribute from the element's opening tag.
pub(crate) fn attr_value(element_xml: &str, name: &str) -> Option<String> {
    let gt = element_xml.find('>')?;
    let opening = &element_xml[..=gt];

    let mut reader = quick_xml::Reader::from_str(opening);
    let event = reader.read_event().ok()?;
    let e = match event {
        Event::Start(ref e) => e.to_owned(),
        Event::Empty(ref e) => e.to_owned(),
        _ => return None,
    };

    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

/// Deep-copy every top-level shape of the `<p:spTree>` in a layout or slide
/// part. The `nvGrpSpPr`/`grpSpPr` tree header is not a shape and is skipped;
/// shapes nested inside a group travel with their group.
pub(crate) fn extract_shapes(part_xml: &str) -> Vec<String> {
    let Some(tree_span) = element_span(part_xml, "p:spTree") else {
        return Vec::new();
    };
    let tree = &part_xml[tree_span];

    let mut shapes = Vec::new();
    let mut cursor = 0usize;
    loop {
        // Earliest next shape of any kind.
        let next = SHAPE_TAGS
            .iter()
            .filter_map(|tag| element_span_from(tree, cursor, tag))
            .min_by_key(|span| span.start);

        match next {
            Some(span) => {
                cursor = span.end;
                shapes.push(tree[span].to_string());
            }
            None => break,
        }
    }
    shapes
}

/// Placeholder descriptor read from a shape's `<p:ph>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaceholderRef {
    /// Placeholder type, e.g. `title`, `body`, `subTitle`, `dt`.
    pub kind: Option<String>,
    /// Placeholder index; a missing `idx` attribute means 0.
    pub index: u32,
}

/// Read the placeholder descriptor of a shape, if it has one.
pub(crate) fn placeholder_of(shape_xml: &str) -> Option<PlaceholderRef> {
    let span = element_span(shape_xml, "p:ph")?;
    let ph = &shape_xml[span];

    let kind = attr_value(ph, "type");
    let index = attr_value(ph, "idx")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Some(PlaceholderRef { kind, index })
}

/// Find the first shape in `shapes` whose placeholder carries `index`.
pub(crate) fn find_placeholder_shape(shapes: &[String], index: u32) -> Option<usize> {
    shapes
        .iter()
        .position(|s| placeholder_of(s).is_some_and(|ph| ph.index == index))
}

/// Formatting template taken from a shape's first paragraph: the raw
/// `<a:pPr>` fragment and the first `<a:rPr>` fragment, when present.
#[derive(Debug, Clone, Default)]
struct ParagraphTemplate {
    p_pr: Option<String>,
    r_pr: Option<String>,
}

fn paragraph_template(tx_body: &str) -> ParagraphTemplate {
    let Some(first_p) = element_span(tx_body, "a:p") else {
        return ParagraphTemplate::default();
    };
    let para = &tx_body[first_p];

    ParagraphTemplate {
        p_pr: element_span(para, "a:pPr").map(|s| para[s].to_string()),
        r_pr: element_span(para, "a:rPr").map(|s| para[s].to_string()),
    }
}

/// Replace every paragraph of the shape's text body with `paragraphs`,
/// keeping whatever precedes the first and follows the last paragraph
/// (`<a:bodyPr>`, `<a:lstStyle>`).
fn replace_paragraphs(shape_xml: &str, paragraphs: &str) -> String {
    let Some(body_span) = element_span(shape_xml, "p:txBody") else {
        return shape_xml.to_string();
    };
    let body = &shape_xml[body_span.clone()];

    let spans = element_spans(body, "a:p");
    let new_body = match (spans.first(), spans.last()) {
        (Some(first), Some(last)) => {
            format!("{}{}{}", &body[..first.start], paragraphs, &body[last.end..])
        }
        _ => match body.rfind("</p:txBody>") {
            Some(end_tag) => format!("{}{}{}", &body[..end_tag], paragraphs, &body[end_tag..]),
            None => body.to_string(),
        },
    };

    format!(
        "{}{}{}",
        &shape_xml[..body_span.start],
        new_body,
        &shape_xml[body_span.end..]
    )
}

/// Set single-paragraph text on a placeholder shape (title/subtitle roles).
///
/// The first existing paragraph donates its paragraph and run properties;
/// all other paragraphs are discarded.
pub(crate) fn set_placeholder_text(shape_xml: &str, text: &str) -> String {
    let body_span = match element_span(shape_xml, "p:txBody") {
        Some(span) => span,
        None => return shape_xml.to_string(),
    };
    let template = paragraph_template(&shape_xml[body_span]);

    let p_pr = template.p_pr.as_deref().unwrap_or("");
    let r_pr = template.r_pr.as_deref().unwrap_or("");
    let paragraph = format!(
        "<a:p>{p_pr}<a:r>{r_pr}<a:t>{}</a:t></a:r></a:p>",
        crate::package::xml_escape(text)
    );

    replace_paragraphs(shape_xml, &paragraph)
}

/// Set multi-line body content on a placeholder shape.
///
/// Blank lines become empty paragraphs; lines starting with `- ` or `* `
/// become bulleted paragraphs with the marker stripped; everything else is a
/// plain paragraph. All paragraphs reuse the first existing paragraph's
/// formatting.
pub(crate) fn set_placeholder_content(shape_xml: &str, content: &str) -> String {
    let body_span = match element_span(shape_xml, "p:txBody") {
        Some(span) => span,
        None => return shape_xml.to_string(),
    };
    let template = paragraph_template(&shape_xml[body_span]);

    let plain_p_pr = template.p_pr.as_deref().unwrap_or("");
    let bullet_p_pr = bulleted_paragraph_props(template.p_pr.as_deref());
    let r_pr = template.r_pr.as_deref().unwrap_or("");

    let mut paragraphs = String::new();
    for line in crate::package::normalize_newlines(content).split('\n') {
        if line.trim().is_empty() {
            paragraphs.push_str(&format!("<a:p>{plain_p_pr}</a:p>"));
            continue;
        }

        let (p_pr, text) = match line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            Some(stripped) => (bullet_p_pr.as_str(), stripped),
            None => (plain_p_pr, line),
        };

        paragraphs.push_str(&format!(
            "<a:p>{p_pr}<a:r>{r_pr}<a:t>{}</a:t></a:r></a:p>",
            crate::package::xml_escape(text)
        ));
    }

    replace_paragraphs(shape_xml, &paragraphs)
}

/// Build bullet paragraph properties from the template's `<a:pPr>`:
/// any `<a:buNone/>` override is removed and a bullet character inserted.
fn bulleted_paragraph_props(template_p_pr: Option<&str>) -> String {
    let bullet = format!(r#"<a:buChar char="{BULLET_CHAR}"/>"#);

    let Some(p_pr) = template_p_pr else {
        return format!("<a:pPr>{bullet}</a:pPr>");
    };

    let mut p_pr = p_pr.to_string();
    if let Some(span) = element_span(&p_pr, "a:buNone") {
        p_pr.replace_range(span, "");
    }

    if let Some(end_tag) = p_pr.rfind("</a:pPr>") {
        p_pr.insert_str(end_tag, &bullet);
        p_pr
    } else if let Some(stripped) = p_pr.strip_suffix("/>") {
        format!("{stripped}>{bullet}</a:pPr>")
    } else {
        format!("<a:pPr>{bullet}</a:pPr>")
    }
}
