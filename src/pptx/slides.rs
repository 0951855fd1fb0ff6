//! Slide-list parsing.
//!
//! The payload comes from a language model, so well-formed JSON is never
//! guaranteed. Parsing must always produce a usable slide list: malformed
//! JSON degrades to a single slide carrying the raw input, and the outcome
//! is tagged so tests can tell intended degradation from genuine bugs.

use serde::Deserialize;
use tracing::debug;

/// Semantic slide type selecting a corporate layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideKind {
    /// Front page.
    Forside,
    /// Content slide.
    Innhald,
    /// Content slide with subtitle.
    InnhaldMUndertittel,
    /// Chapter divider.
    Kapittel,
    /// Closing slide.
    Avslutting,
}

impl SlideKind {
    /// Parse a semantic key, e.g. `forside` or `innhald_m_undertittel`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "forside" => Some(Self::Forside),
            "innhald" => Some(Self::Innhald),
            "innhald_m_undertittel" => Some(Self::InnhaldMUndertittel),
            "kapittel" => Some(Self::Kapittel),
            "avslutting" => Some(Self::Avslutting),
            _ => None,
        }
    }

    /// The semantic key for this slide type.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Forside => "forside",
            Self::Innhald => "innhald",
            Self::InnhaldMUndertittel => "innhald_m_undertittel",
            Self::Kapittel => "kapittel",
            Self::Avslutting => "avslutting",
        }
    }
}

/// One slide of a presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    /// Slide title; empty means no title shape is emitted.
    pub title: String,
    /// Body content; lines starting with `- ` or `* ` render as bullets.
    pub content: String,
    /// Optional semantic type for template-based generation.
    pub kind: Option<SlideKind>,
}

impl Slide {
    /// Create a slide from title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            kind: None,
        }
    }

    /// The slide synthesized when parsing yields nothing at all.
    fn default_slide() -> Self {
        Self::new("Presentasjon", "")
    }
}

/// Wire shape of one slide object in the JSON payload.
#[derive(Debug, Deserialize)]
struct RawSlide {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl From<RawSlide> for Slide {
    fn from(raw: RawSlide) -> Self {
        Slide {
            title: raw.title,
            content: raw.content,
            kind: raw.kind.as_deref().and_then(SlideKind::from_key),
        }
    }
}

/// Outcome of slide parsing.
///
/// The public contract only ever exposes the slide list via
/// [`ParsedSlides::into_slides`]; the tag exists so callers and tests can
/// distinguish a clean parse from the defensive fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSlides {
    /// Input was parsed (or was plain text) and produced these slides.
    Parsed(Vec<Slide>),
    /// JSON parsing failed; the fallback slide carries the raw input.
    Degraded(Box<Slide>),
}

impl ParsedSlides {
    /// Collapse the tagged result into the slide list.
    pub fn into_slides(self) -> Vec<Slide> {
        match self {
            ParsedSlides::Parsed(slides) => slides,
            ParsedSlides::Degraded(slide) => vec![*slide],
        }
    }

    /// Number of slides in the result.
    pub fn len(&self) -> usize {
        match self {
            ParsedSlides::Parsed(slides) => slides.len(),
            ParsedSlides::Degraded(_) => 1,
        }
    }

    /// Whether the result holds no slides. Never true in practice: parsing
    /// always synthesizes at least one slide.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a slide-list payload. Never fails.
///
/// `[`-prefixed input is treated as a JSON array of `{title, content}`
/// objects (with an optional `type` key); anything else is a single slide
/// whose content is the whole input. Malformed JSON degrades to one slide
/// carrying the raw input, and an empty result synthesizes a default slide.
pub fn parse_slides(input: &str) -> ParsedSlides {
    let trimmed = input.trim();

    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<RawSlide>>(trimmed) {
            Ok(raw) => {
                let slides: Vec<Slide> = raw.into_iter().map(Slide::from).collect();
                if slides.is_empty() {
                    ParsedSlides::Parsed(vec![Slide::default_slide()])
                } else {
                    ParsedSlides::Parsed(slides)
                }
            }
            Err(err) => {
                debug!("slide JSON did not parse ({err}), degrading to a single slide");
                ParsedSlides::Degraded(Box::new(Slide::new("", input)))
            }
        }
    } else if trimmed.is_empty() {
        ParsedSlides::Parsed(vec![Slide::default_slide()])
    } else {
        ParsedSlides::Parsed(vec![Slide::new("", input)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_slide() {
        let parsed = parse_slides("not json at all");
        assert!(matches!(parsed, ParsedSlides::Parsed(_)));
        let slides = parsed.into_slides();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].content, "not json at all");
        assert_eq!(slides[0].title, "");
    }

    #[test]
    fn test_empty_array_synthesizes_default() {
        let slides = parse_slides("[]").into_slides();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Presentasjon");
    }

    #[test]
    fn test_two_slides_in_order() {
        let parsed =
            parse_slides(r#"[{"title":"A","content":"B"},{"title":"C","content":"D"}]"#);
        assert!(matches!(parsed, ParsedSlides::Parsed(_)));
        let slides = parsed.into_slides();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "A");
        assert_eq!(slides[1].content, "D");
    }

    #[test]
    fn test_malformed_json_degrades() {
        let input = r#"[{"title": "broken"#;
        let parsed = parse_slides(input);
        assert!(matches!(parsed, ParsedSlides::Degraded(_)));
        let slides = parsed.into_slides();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].content, input);
    }

    #[test]
    fn test_type_key_selects_slide_kind() {
        let slides = parse_slides(
            r#"[{"title":"Intro","content":"","type":"forside"},{"title":"Del 1","content":"x","type":"kapittel"}]"#,
        )
        .into_slides();
        assert_eq!(slides[0].kind, Some(SlideKind::Forside));
        assert_eq!(slides[1].kind, Some(SlideKind::Kapittel));
    }

    #[test]
    fn test_unknown_type_key_is_none() {
        let slides =
            parse_slides(r#"[{"title":"A","content":"B","type":"hero"}]"#).into_slides();
        assert_eq!(slides[0].kind, None);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let slides = parse_slides(r#"[{"title":"only title"}]"#).into_slides();
        assert_eq!(slides[0].content, "");
    }

    #[test]
    fn test_empty_input_synthesizes_default() {
        let slides = parse_slides("   ").into_slides();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Presentasjon");
    }

    #[test]
    fn test_slide_kind_keys_roundtrip() {
        for kind in [
            SlideKind::Forside,
            SlideKind::Innhald,
            SlideKind::InnhaldMUndertittel,
            SlideKind::Kapittel,
            SlideKind::Avslutting,
        ] {
            assert_eq!(SlideKind::from_key(kind.key()), Some(kind));
        }
    }
}
