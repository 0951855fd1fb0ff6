//! Generic PPTX builder implementation.

use crate::error::Result;
use crate::package::{normalize_newlines, xml_escape, OoxmlPackage};

use super::slides::Slide;

/// First slide ID in a presentation's slide list.
pub(crate) const FIRST_SLIDE_ID: u32 = 256;

/// Builder for self-contained generic presentations.
///
/// The package carries one slide master, one blank layout, one theme and N
/// slides. Each slide places a fixed-position title textbox (when the title
/// is non-empty) and a fixed-position content textbox (when the content is
/// non-empty) below it. Fonts and sizes are not configurable.
pub struct PptxBuilder;

impl PptxBuilder {
    /// Build a .pptx package from slides.
    pub fn build(slides: &[Slide]) -> Result<Vec<u8>> {
        let mut package = OoxmlPackage::new();

        package.insert_xml("[Content_Types].xml", content_types_xml(slides.len()));
        package.insert_xml("_rels/.rels", ROOT_RELS_XML);
        package.insert_xml("ppt/presentation.xml", presentation_xml(slides.len()));
        package.insert_xml(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(slides.len()),
        );
        package.insert_xml("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML);
        package.insert_xml(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS_XML,
        );
        package.insert_xml("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML);
        package.insert_xml(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS_XML,
        );
        package.insert_xml("ppt/theme/theme1.xml", THEME_XML);

        for (i, slide) in slides.iter().enumerate() {
            let slide_num = i + 1;
            package.insert_xml(
                format!("ppt/slides/slide{slide_num}.xml"),
                slide_xml(slide),
            );
            package.insert_xml(
                format!("ppt/slides/_rels/slide{slide_num}.xml.rels"),
                SLIDE_RELS_XML,
            );
        }

        package.to_bytes()
    }
}

fn content_types_xml(slide_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=slide_count {
        overrides.push_str(&format!(
            r#"  <Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
        overrides.push('\n');
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
  <Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
  <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
{overrides}</Types>"#
    )
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

fn presentation_xml(slide_count: usize) -> String {
    let mut slide_list = String::new();
    for i in 0..slide_count {
        slide_list.push_str(&format!(
            r#"    <p:sldId id="{}" r:id="rId{}"/>"#,
            FIRST_SLIDE_ID + i as u32,
            i + 3 // rId1=slideMaster, rId2=theme, slides start at rId3
        ));
        slide_list.push('\n');
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
  xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldMasterIdLst>
    <p:sldMasterId id="2147483648" r:id="rId1"/>
  </p:sldMasterIdLst>
  <p:sldIdLst>
{slide_list}  </p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = String::new();
    rels.push_str(
        r#"  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    );
    rels.push('\n');
    rels.push_str(
        r#"  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#,
    );
    rels.push('\n');
    for i in 1..=slide_count {
        rels.push_str(&format!(
            r#"  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#,
            i + 2
        ));
        rels.push('\n');
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
{rels}</Relationships>"#
    )
}

const SLIDE_MASTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
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
    </p:spTree>
  </p:cSld>
  <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
  <p:sldLayoutIdLst>
    <p:sldLayoutId id="2147483649" r:id="rId1"/>
  </p:sldLayoutIdLst>
</p:sldMaster>"#;

const SLIDE_MASTER_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>"#;

const SLIDE_LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
  xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank">
  <p:cSld name="Blank">
    <p:spTree>
      <p:nvGrpSpPr>
        <p:cNvPr id="1" name=""/>
        <p:cNvGrpSpPr/>
        <p:nvPr/>
      </p:nvGrpSpPr>
      <p:grpSpPr/>
    </p:spTree>
  </p:cSld>
</p:sldLayout>"#;

const SLIDE_LAYOUT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>"#;

const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Default Theme">
  <a:themeElements>
    <a:clrScheme name="Default">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Default">
      <a:majorFont><a:latin typeface="Calibri"/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Default">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#;

const SLIDE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
</Relationships>"#;

fn slide_xml(slide: &Slide) -> String {
    let mut shapes = String::new();

    if !slide.title.is_empty() {
        shapes.push_str(&format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="2" name="Tittel"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="838200" y="365125"/>
            <a:ext cx="10515600" cy="1325563"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
          <a:p>
            <a:r>
              <a:rPr lang="nb-NO" sz="3600" b="1" dirty="0"/>
              <a:t>{}</a:t>
            </a:r>
          </a:p>
        </p:txBody>
      </p:sp>
"#,
            xml_escape(&slide.title)
        ));
    }

    if !slide.content.is_empty() {
        let mut paragraphs = String::new();
        for line in normalize_newlines(&slide.content).split('\n') {
            if line.is_empty() {
                paragraphs.push_str("          <a:p><a:endParaRPr lang=\"nb-NO\"/></a:p>\n");
            } else {
                paragraphs.push_str(&format!(
                    "          <a:p><a:r><a:rPr lang=\"nb-NO\" sz=\"1800\" dirty=\"0\"/><a:t>{}</a:t></a:r></a:p>\n",
                    xml_escape(line)
                ));
            }
        }
        shapes.push_str(&format!(
            r#"      <p:sp>
        <p:nvSpPr>
          <p:cNvPr id="3" name="Innhald"/>
          <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
          <p:nvPr/>
        </p:nvSpPr>
        <p:spPr>
          <a:xfrm>
            <a:off x="838200" y="1825625"/>
            <a:ext cx="10515600" cy="4351338"/>
          </a:xfrm>
          <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
        </p:spPr>
        <p:txBody>
          <a:bodyPr/>
          <a:lstStyle/>
{paragraphs}        </p:txBody>
      </p:sp>
"#
        ));
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
{shapes}    </p:spTree>
  </p:cSld>
</p:sld>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_valid_package() {
        let slides = vec![Slide::new("Velkomen", "Hei!")];
        let bytes = PptxBuilder::build(&slides).unwrap();
        assert_eq!(&bytes[0..2], b"PK");

        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        assert!(package.exists("ppt/presentation.xml"));
        assert!(package.exists("ppt/slides/slide1.xml"));
        assert!(package.exists("ppt/slideMasters/slideMaster1.xml"));
        assert!(package.exists("ppt/slideLayouts/slideLayout1.xml"));
        assert!(package.exists("ppt/theme/theme1.xml"));
    }

    #[test]
    fn test_slide_ids_start_at_256() {
        let slides = vec![
            Slide::new("A", "1"),
            Slide::new("B", "2"),
            Slide::new("C", "3"),
        ];
        let bytes = PptxBuilder::build(&slides).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("ppt/presentation.xml").unwrap();

        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldId id="258" r:id="rId5"/>"#));
    }

    #[test]
    fn test_empty_title_omits_title_shape() {
        let slides = vec![Slide::new("", "berre innhald")];
        let bytes = PptxBuilder::build(&slides).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("ppt/slides/slide1.xml").unwrap();
        assert!(!xml.contains("Tittel"));
        assert!(xml.contains("berre innhald"));
    }

    #[test]
    fn test_empty_content_omits_content_shape() {
        let slides = vec![Slide::new("Berre tittel", "")];
        let bytes = PptxBuilder::build(&slides).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("ppt/slides/slide1.xml").unwrap();
        assert!(xml.contains("Berre tittel"));
        assert!(!xml.contains(r#"name="Innhald""#));
    }

    #[test]
    fn test_special_characters_escaped() {
        let slides = vec![Slide::new("Symbols & <Signs>", "\"quoted\"")];
        let bytes = PptxBuilder::build(&slides).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("ppt/slides/slide1.xml").unwrap();
        assert!(xml.contains("Symbols &amp; &lt;Signs&gt;"));
    }

    #[test]
    fn test_multiline_content_is_multiple_paragraphs() {
        let slides = vec![Slide::new("T", "one\ntwo\nthree")];
        let bytes = PptxBuilder::build(&slides).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        let xml = package.read_xml("ppt/slides/slide1.xml").unwrap();
        // Three content paragraphs plus one title paragraph.
        assert_eq!(xml.matches("<a:p>").count(), 4);
    }

    #[test]
    fn test_empty_deck_is_valid() {
        let bytes = PptxBuilder::build(&[]).unwrap();
        let package = OoxmlPackage::from_bytes(&bytes).unwrap();
        assert!(package.exists("ppt/presentation.xml"));
        assert!(package.parts_with_prefix("ppt/slides/").is_empty());
    }
}
