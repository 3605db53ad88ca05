//! In-memory vector scene graph for cached stroke diagrams.
//!
//! A [`VectorAsset`] is parsed from KanjiVG-style SVG text into an owned tree
//! of [`SceneNode`]s. The tree is mutable and fully owned, so fading a copy
//! toward white never touches the cached original, and two copies of the same
//! character can carry different fade strengths on one page.

use std::borrow::Cow;
use std::fmt::Write as _;

/// RGBA color with `f64` channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    /// Blends each color channel toward white by `strength`; alpha is kept.
    pub fn toward_white(self, strength: f64) -> Self {
        let s = strength.clamp(0.0, 1.0);
        Self {
            r: self.r * (1.0 - s) + s,
            g: self.g * (1.0 - s) + s,
            b: self.b * (1.0 - s) + s,
            a: self.a,
        }
    }

    /// Parses the paint grammar KanjiVG output actually uses: hex forms and
    /// a handful of keywords. Anything else (`rgb(...)`, `currentColor`,
    /// `url(#...)`) is intentionally unsupported; such values stay as
    /// passthrough attributes and are emitted verbatim, untouched by fades.
    pub fn parse(text: &str) -> Option<Self> {
        let s = text.trim().to_ascii_lowercase();
        match s.as_str() {
            "black" => return Some(Self::BLACK),
            "white" => return Some(Self::WHITE),
            "gray" | "grey" => return Some(Self::gray(0.5)),
            "red" => return Some(Self::rgb(1.0, 0.0, 0.0)),
            _ => {}
        }

        let hex = s.strip_prefix('#')?;
        fn hex2(b: &[u8]) -> Option<u8> {
            let hi = (*b.first()? as char).to_digit(16)? as u8;
            let lo = (*b.get(1)? as char).to_digit(16)? as u8;
            Some((hi << 4) | lo)
        }
        fn hex1(c: u8) -> Option<u8> {
            let v = (c as char).to_digit(16)? as u8;
            Some((v << 4) | v)
        }
        fn unit(v: u8) -> f64 {
            f64::from(v) / 255.0
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(
                unit(hex1(bytes[0])?),
                unit(hex1(bytes[1])?),
                unit(hex1(bytes[2])?),
            )),
            6 => Some(Self::rgb(
                unit(hex2(&bytes[0..2])?),
                unit(hex2(&bytes[2..4])?),
                unit(hex2(&bytes[4..6])?),
            )),
            8 => Some(Self {
                r: unit(hex2(&bytes[0..2])?),
                g: unit(hex2(&bytes[2..4])?),
                b: unit(hex2(&bytes[4..6])?),
                a: unit(hex2(&bytes[6..8])?),
            }),
            _ => None,
        }
    }

    /// Hex serialization; emits `#rrggbbaa` only when alpha is not opaque.
    pub fn to_hex(self) -> String {
        fn byte(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

/// A paint as SVG understands it: explicitly absent (`none`) or a color.
///
/// The distinction matters on emission: dropping an explicit `fill:none`
/// would fall back to SVG's default black fill and blot out stroke diagrams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    None,
    Color(Color),
}

impl Paint {
    fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if t.eq_ignore_ascii_case("none") {
            return Some(Paint::None);
        }
        Color::parse(t).map(Paint::Color)
    }

    fn to_svg_value(self) -> String {
        match self {
            Paint::None => "none".to_string(),
            Paint::Color(c) => c.to_hex(),
        }
    }
}

/// One element of the scene graph. Grouping nodes (`g`) carry children;
/// leaf shapes carry geometry in `attrs` (e.g. a path's `d`).
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub tag: String,
    pub stroke: Option<Paint>,
    pub fill: Option<Paint>,
    /// Non-paint attributes, in document order.
    pub attrs: Vec<(String, String)>,
    /// `style` declarations other than `fill`/`stroke`, joined back verbatim.
    pub style_rest: String,
    /// Concatenated character data (annotation labels).
    pub text: String,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn is_text(&self) -> bool {
        self.tag == "text"
    }
}

/// A parsed vector diagram with its natural size in user units.
#[derive(Debug, Clone)]
pub struct VectorAsset {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<SceneNode>,
}

impl VectorAsset {
    /// Returns a copy with every stroke/fill color blended toward white.
    ///
    /// Strength 0 is the identity, 1 is pure white. Colorless nodes and
    /// explicit `none` paints are left untouched; alpha is preserved.
    pub fn faded(&self, strength: f64) -> VectorAsset {
        let mut copy = self.clone();
        for node in &mut copy.nodes {
            fade_node(node, strength);
        }
        copy
    }

    /// Removes every `text` element from the tree, recursively.
    pub fn strip_text(&mut self) {
        strip_text_nodes(&mut self.nodes);
    }

    /// Serializes the asset back to a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            fmt_num(self.width),
            fmt_num(self.height),
            fmt_num(self.width),
            fmt_num(self.height)
        );
        out.push('\n');
        self.write_fragment(&mut out);
        out.push_str("</svg>\n");
        out
    }

    /// Writes only the child elements, for embedding into a larger document.
    pub fn write_fragment(&self, out: &mut String) {
        for node in &self.nodes {
            write_node(out, node);
        }
    }
}

fn fade_node(node: &mut SceneNode, strength: f64) {
    if let Some(Paint::Color(c)) = &mut node.stroke {
        *c = c.toward_white(strength);
    }
    if let Some(Paint::Color(c)) = &mut node.fill {
        *c = c.toward_white(strength);
    }
    for child in &mut node.children {
        fade_node(child, strength);
    }
}

fn strip_text_nodes(nodes: &mut Vec<SceneNode>) {
    nodes.retain(|n| !n.is_text());
    for node in nodes {
        strip_text_nodes(&mut node.children);
    }
}

/// Parses SVG text into a [`VectorAsset`].
///
/// Only attributes in the default (SVG) namespace are kept; vendor metadata
/// such as KanjiVG's `kvg:*` annotations is dropped. Errors are returned as
/// plain messages so the caller can attach the offending cache path.
pub fn parse_svg(text: &str) -> Result<VectorAsset, String> {
    let text = declare_kvg_namespace(text);
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(&text, options)
        .map_err(|e| e.to_string())?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(format!("expected <svg> root, found <{}>", root.tag_name().name()));
    }

    let (width, height) = natural_size(&root);
    let mut nodes = Vec::new();
    for child in root.children().filter(|c| c.is_element()) {
        nodes.push(build_node(&child));
    }
    Ok(VectorAsset { width, height, nodes })
}

/// KanjiVG declares its `kvg` attribute prefix in the DTD internal subset,
/// which namespace-aware parsers do not apply. Declare it on the root element
/// so the document parses; the attributes themselves are discarded anyway.
fn declare_kvg_namespace(text: &str) -> Cow<'_, str> {
    if !text.contains("kvg:") {
        return Cow::Borrowed(text);
    }
    let Some(pos) = text.find("<svg") else {
        return Cow::Borrowed(text);
    };
    // Only a declaration on the root start tag counts. KanjiVG declares the
    // prefix via `<!ATTLIST ... #FIXED ...>` in the DTD internal subset,
    // which namespace-aware parsers do not apply, so its presence elsewhere
    // in the document must not suppress the injection.
    let root_tag_end = text[pos..].find('>').map_or(text.len(), |i| pos + i);
    if text[pos..root_tag_end].contains("xmlns:kvg") {
        return Cow::Borrowed(text);
    }
    let insert_at = pos + "<svg".len();
    let mut out = String::with_capacity(text.len() + 48);
    out.push_str(&text[..insert_at]);
    out.push_str(r#" xmlns:kvg="http://kanjivg.tagaini.net""#);
    out.push_str(&text[insert_at..]);
    Cow::Owned(out)
}

fn natural_size(root: &roxmltree::Node<'_, '_>) -> (f64, f64) {
    if let Some(vb) = root.attribute("viewBox") {
        let mut it = vb.split_whitespace().filter_map(|v| v.parse::<f64>().ok());
        let (_min_x, _min_y) = (it.next(), it.next());
        if let (Some(w), Some(h)) = (it.next(), it.next()) {
            if w.is_finite() && h.is_finite() {
                return (w, h);
            }
        }
    }
    let w = root.attribute("width").and_then(parse_length).unwrap_or(0.0);
    let h = root.attribute("height").and_then(parse_length).unwrap_or(0.0);
    (w, h)
}

fn parse_length(value: &str) -> Option<f64> {
    let t = value
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    t.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn build_node(element: &roxmltree::Node<'_, '_>) -> SceneNode {
    let mut node = SceneNode {
        tag: element.tag_name().name().to_string(),
        stroke: None,
        fill: None,
        attrs: Vec::new(),
        style_rest: String::new(),
        text: String::new(),
        children: Vec::new(),
    };

    for attr in element.attributes() {
        if attr.namespace().is_some() {
            continue;
        }
        match attr.name() {
            "style" => apply_style(&mut node, attr.value()),
            "stroke" => match Paint::parse(attr.value()) {
                Some(p) => node.stroke = Some(p),
                None => node.attrs.push(("stroke".to_string(), attr.value().to_string())),
            },
            "fill" => match Paint::parse(attr.value()) {
                Some(p) => node.fill = Some(p),
                None => node.attrs.push(("fill".to_string(), attr.value().to_string())),
            },
            name => node.attrs.push((name.to_string(), attr.value().to_string())),
        }
    }

    for child in element.children() {
        if child.is_element() {
            node.children.push(build_node(&child));
        } else if child.is_text() {
            if let Some(t) = child.text() {
                node.text.push_str(t);
            }
        }
    }
    node.text = node.text.trim().to_string();
    node
}

/// Splits a `style` attribute, lifting `fill`/`stroke` into paint fields and
/// keeping every other declaration verbatim.
fn apply_style(node: &mut SceneNode, style: &str) {
    let mut rest = Vec::new();
    for decl in style.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((name, value)) = decl.split_once(':') else {
            rest.push(decl.to_string());
            continue;
        };
        match name.trim() {
            "stroke" => {
                if let Some(p) = Paint::parse(value) {
                    node.stroke = Some(p);
                } else {
                    rest.push(decl.to_string());
                }
            }
            "fill" => {
                if let Some(p) = Paint::parse(value) {
                    node.fill = Some(p);
                } else {
                    rest.push(decl.to_string());
                }
            }
            _ => rest.push(decl.to_string()),
        }
    }
    node.style_rest = rest.join(";");
}

fn write_node(out: &mut String, node: &SceneNode) {
    out.push('<');
    out.push_str(&node.tag);
    for (name, value) in &node.attrs {
        let _ = write!(out, r#" {}="{}""#, name, escape_xml_attr(value));
    }
    if let Some(stroke) = node.stroke {
        let _ = write!(out, r#" stroke="{}""#, stroke.to_svg_value());
    }
    if let Some(fill) = node.fill {
        let _ = write!(out, r#" fill="{}""#, fill.to_svg_value());
    }
    if !node.style_rest.is_empty() {
        let _ = write!(out, r#" style="{}""#, escape_xml_attr(&node.style_rest));
    }

    if node.children.is_empty() && node.text.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if !node.text.is_empty() {
        out.push_str(&escape_xml_text(&node.text));
    }
    for child in &node.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", node.tag);
}

fn escape_xml_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_xml_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Compact float formatting for SVG output: at most three decimals, no
/// trailing zeros.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 1000.0).round() / 1000.0;
    let mut s = format!("{r:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAGRAM: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="109" height="109" viewBox="0 0 109 109">
<g id="kvg:StrokePaths_04e00" style="fill:none;stroke:#000000;stroke-width:3;stroke-linecap:round;stroke-linejoin:round;">
<g id="kvg:04e00" kvg:element="&#19968;">
<path id="kvg:04e00-s1" kvg:type="a" d="M11,54.25c3.19,0.62,6.25,0.75,9.73,0.5"/>
</g>
</g>
<g id="kvg:StrokeNumbers_04e00" style="font-size:8;fill:#808080">
<text transform="matrix(1 0 0 1 3.5 50.5)">1</text>
</g>
</svg>"#;

    fn diagram() -> VectorAsset {
        parse_svg(DIAGRAM).expect("fixture parses")
    }

    #[test]
    fn parses_natural_size_from_viewbox() {
        let asset = diagram();
        assert_eq!(asset.width, 109.0);
        assert_eq!(asset.height, 109.0);
    }

    #[test]
    fn lifts_paints_out_of_style_attributes() {
        let asset = diagram();
        let strokes = &asset.nodes[0];
        assert_eq!(strokes.fill, Some(Paint::None));
        assert_eq!(strokes.stroke, Some(Paint::Color(Color::BLACK)));
        assert!(strokes.style_rest.contains("stroke-width:3"));
        assert!(!strokes.style_rest.contains("stroke:"));
    }

    #[test]
    fn drops_vendor_namespace_attributes() {
        let asset = diagram();
        let group = &asset.nodes[0].children[0];
        assert!(group.attrs.iter().all(|(name, _)| name != "element"));
        assert!(group.attrs.iter().any(|(name, _)| name == "id"));
    }

    #[test]
    fn fade_zero_is_identity() {
        let asset = diagram();
        let faded = asset.faded(0.0);
        assert_eq!(faded.nodes[0].stroke, asset.nodes[0].stroke);
        assert_eq!(faded.nodes[1].fill, asset.nodes[1].fill);
    }

    #[test]
    fn fade_one_is_pure_white_with_alpha_kept() {
        let mut asset = diagram();
        asset.nodes[0].stroke = Some(Paint::Color(Color {
            r: 0.2,
            g: 0.4,
            b: 0.6,
            a: 0.5,
        }));
        let faded = asset.faded(1.0);
        let Some(Paint::Color(c)) = faded.nodes[0].stroke else {
            panic!("stroke lost");
        };
        assert_eq!((c.r, c.g, c.b), (1.0, 1.0, 1.0));
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn fade_to_white_is_a_fixed_point() {
        let asset = diagram();
        let white = asset.faded(1.0);
        let again = white.faded(0.3);
        assert_eq!(again.nodes[0].stroke, white.nodes[0].stroke);
    }

    #[test]
    fn fade_leaves_explicit_none_paint_alone() {
        let asset = diagram().faded(0.5);
        assert_eq!(asset.nodes[0].fill, Some(Paint::None));
    }

    #[test]
    fn fade_does_not_mutate_the_source() {
        let asset = diagram();
        let _ = asset.faded(0.9);
        assert_eq!(asset.nodes[0].stroke, Some(Paint::Color(Color::BLACK)));
    }

    #[test]
    fn strip_text_removes_annotation_nodes_recursively() {
        let mut asset = diagram();
        asset.strip_text();
        fn count_text(nodes: &[SceneNode]) -> usize {
            nodes
                .iter()
                .map(|n| usize::from(n.is_text()) + count_text(&n.children))
                .sum()
        }
        assert_eq!(count_text(&asset.nodes), 0);
        // The stroke paths survive.
        assert_eq!(asset.nodes[0].children[0].children[0].tag, "path");
    }

    #[test]
    fn stripped_document_reparses() {
        let mut asset = diagram();
        asset.strip_text();
        let round = parse_svg(&asset.to_svg()).expect("emitted SVG parses");
        assert_eq!(round.height, 109.0);
        assert_eq!(round.nodes[0].fill, Some(Paint::None));
    }

    #[test]
    fn emission_keeps_explicit_none_fill() {
        let asset = diagram();
        let svg = asset.to_svg();
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r##"stroke="#000000""##));
    }

    // The header KanjiVG actually ships: the `kvg` prefix is declared only
    // through `#FIXED` attribute defaults in the DTD internal subset, which
    // namespace-aware parsers do not apply to the document.
    const KANJIVG_HEADER: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
<!ATTLIST g
xmlns:kvg CDATA #FIXED "http://kanjivg.tagaini.net"
kvg:element CDATA #IMPLIED
kvg:variant CDATA #IMPLIED
kvg:radical CDATA #IMPLIED >
<!ATTLIST path
xmlns:kvg CDATA #FIXED "http://kanjivg.tagaini.net"
kvg:type CDATA #IMPLIED >
]>
"##;

    #[test]
    fn parses_documents_with_the_kanjivg_dtd_header() {
        let with_dtd = format!("{KANJIVG_HEADER}{DIAGRAM}");
        let asset = parse_svg(&with_dtd).expect("real-world header parses");
        assert_eq!(asset.height, 109.0);
        assert_eq!(asset.nodes[0].stroke, Some(Paint::Color(Color::BLACK)));
    }

    #[test]
    fn dtd_subset_declaration_does_not_suppress_namespace_injection() {
        // `xmlns:kvg` appears in the internal subset but not on the root
        // tag; the injection must still happen or every `kvg:*` attribute
        // is an unknown-prefix parse error.
        let with_dtd = format!("{KANJIVG_HEADER}{DIAGRAM}");
        let fixed = declare_kvg_namespace(&with_dtd);
        let root_start = fixed.find("<svg").unwrap();
        let root_end = root_start + fixed[root_start..].find('>').unwrap();
        assert!(fixed[root_start..root_end].contains("xmlns:kvg"));
    }

    #[test]
    fn missing_dimensions_default_to_zero() {
        let asset = parse_svg(r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0"/></svg>"#)
            .expect("parses");
        assert_eq!(asset.height, 0.0);
    }

    #[test]
    fn rejects_non_svg_documents() {
        assert!(parse_svg("<html></html>").is_err());
        assert!(parse_svg("not xml at all").is_err());
    }

    #[test]
    fn color_parse_and_hex_round_trip() {
        assert_eq!(Color::parse("#808080"), Some(Color::gray(128.0 / 255.0)));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("nonsense"), None);
        assert_eq!(Color::gray(0.5).toward_white(0.0), Color::gray(0.5));
        assert_eq!(Color::BLACK.to_hex(), "#000000");
        assert_eq!(
            Color { r: 1.0, g: 0.0, b: 0.0, a: 0.0 }.to_hex(),
            "#ff000000"
        );
    }

    #[test]
    fn unrecognized_paint_values_pass_through_unfaded() {
        let asset = parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 109 109"><path d="M0,0" stroke="rgb(1,2,3)"/></svg>"#,
        )
        .expect("parses");
        let path = &asset.nodes[0];
        assert_eq!(path.stroke, None);
        assert!(path
            .attrs
            .iter()
            .any(|(name, value)| name == "stroke" && value == "rgb(1,2,3)"));

        let faded = asset.faded(1.0);
        assert!(faded.nodes[0]
            .attrs
            .iter()
            .any(|(_, value)| value == "rgb(1,2,3)"));
        assert!(faded.to_svg().contains(r#"stroke="rgb(1,2,3)""#));
    }

    #[test]
    fn fmt_num_trims_trailing_zeros() {
        assert_eq!(fmt_num(13.0), "13");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.23456), "1.235");
        assert_eq!(fmt_num(-0.0001), "0");
    }
}
