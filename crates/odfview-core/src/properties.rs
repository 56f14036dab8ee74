//! Style records and their mapping to CSS
//!
//! A [`StyleRecord`] holds the raw property groups of one OpenDocument style
//! (`<style:text-properties>`, `<style:paragraph-properties>`, ...).
//! [`map_style_to_css`] turns a record's *own* properties into a CSS
//! declaration list. Inheritance is handled by the resolver in
//! [`crate::styles`].

use std::collections::BTreeMap;

use crate::xml::QName;

/// Raw properties of one group, keyed by qualified attribute name
pub type Properties = BTreeMap<String, String>;

/// Property group categories understood by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyGroup {
    /// `<style:text-properties>`
    Text,
    /// `<style:paragraph-properties>`
    Paragraph,
    /// `<style:table-column-properties>`
    TableColumn,
    /// `<style:table-row-properties>`
    TableRow,
    /// `<style:table-cell-properties>`
    TableCell,
    /// `<style:graphic-properties>` and `<style:drawing-page-properties>`
    GraphicFill,
}

impl PropertyGroup {
    /// Map a property element name to its group
    pub fn from_element(name: &QName) -> Option<Self> {
        if name.prefix.as_deref() != Some("style") {
            return None;
        }
        match name.local.as_str() {
            "text-properties" => Some(Self::Text),
            "paragraph-properties" => Some(Self::Paragraph),
            "table-column-properties" => Some(Self::TableColumn),
            "table-row-properties" => Some(Self::TableRow),
            "table-cell-properties" => Some(Self::TableCell),
            "graphic-properties" | "drawing-page-properties" => Some(Self::GraphicFill),
            _ => None,
        }
    }
}

/// One named style definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRecord {
    /// Style name (`style:name`)
    pub name: String,
    /// Parent style name (`style:parent-style-name`)
    pub parent_name: Option<String>,
    /// Style family (`style:family`), informational
    pub family: Option<String>,
    groups: BTreeMap<PropertyGroup, Properties>,
}

impl StyleRecord {
    /// Create an empty record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: set the parent style
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    /// Builder: add one property
    pub fn with_property(mut self, group: PropertyGroup, name: &str, value: &str) -> Self {
        self.set_property(group, name, value);
        self
    }

    /// Set one property, creating the group if needed
    pub fn set_property(&mut self, group: PropertyGroup, name: &str, value: &str) {
        self.groups
            .entry(group)
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    /// Mutable access to a group, creating it if needed
    pub fn group_mut(&mut self, group: PropertyGroup) -> &mut Properties {
        self.groups.entry(group).or_default()
    }

    /// Properties of one group
    pub fn group(&self, group: PropertyGroup) -> Option<&Properties> {
        self.groups.get(&group)
    }

    /// Look up a single property
    pub fn property(&self, group: PropertyGroup, name: &str) -> Option<&str> {
        self.group(group).and_then(|props| get(props, name))
    }
}

/// Map a style's own properties to a CSS declaration list
///
/// Each declaration is emitted as `name:value;`. Groups are mapped in a fixed
/// order so equal records always give equal output.
pub fn map_style_to_css(style: &StyleRecord) -> String {
    let mut css = String::new();

    if let Some(props) = style.group(PropertyGroup::Text) {
        map_text(props, &mut css);
    }
    if let Some(props) = style.group(PropertyGroup::Paragraph) {
        map_paragraph(props, &mut css);
    }
    if let Some(props) = style.group(PropertyGroup::TableCell) {
        map_table_cell(props, &mut css);
    }
    if let Some(props) = style.group(PropertyGroup::TableRow) {
        map_table_row(props, &mut css);
    }
    if let Some(props) = style.group(PropertyGroup::TableColumn) {
        if let Some(width) = get(props, "style:column-width") {
            push_decl(&mut css, "width", width);
        }
    }
    if let Some(props) = style.group(PropertyGroup::GraphicFill) {
        map_graphic_fill(props, &mut css);
    }

    css
}

// =============================================================================
// Per-group mappings
// =============================================================================

fn map_text(props: &Properties, css: &mut String) {
    if let Some(v) = get(props, "fo:font-weight") {
        push_decl(css, "font-weight", v);
    }
    if let Some(v) = get(props, "fo:font-style") {
        push_decl(css, "font-style", v);
    }
    // Underline goes to border-bottom so it can coexist with line-through
    if let Some(v) = get(props, "style:text-underline-style") {
        match v {
            "none" => push_decl(css, "border-bottom", "none"),
            other => push_decl(css, "border-bottom", &format!("1px {}", border_style(other))),
        }
    }
    if let Some(v) = get(props, "style:text-line-through-style") {
        match v {
            "none" => push_decl(css, "text-decoration", "none"),
            other => push_decl(
                css,
                "text-decoration",
                &format!("line-through {}", decoration_style(other)),
            ),
        }
    }
    if let Some(v) = get(props, "fo:color") {
        push_decl(css, "color", v);
    }
    if let Some(v) = get(props, "fo:background-color") {
        push_decl(css, "background-color", v);
    }
    if let Some(v) = get(props, "fo:font-size") {
        push_decl(css, "font-size", v);
    }
    if let Some(v) = get(props, "style:font-name").or_else(|| get(props, "fo:font-family")) {
        push_decl(css, "font-family", &quote_family(v));
    }
    if let Some(v) = get(props, "style:text-position") {
        match v.split_whitespace().next() {
            Some("super") => push_decl(css, "vertical-align", "super"),
            Some("sub") => push_decl(css, "vertical-align", "sub"),
            _ => {}
        }
    }
    if let Some(v) = get(props, "fo:text-transform") {
        push_decl(css, "text-transform", v);
    }
}

fn map_paragraph(props: &Properties, css: &mut String) {
    if let Some(v) = get(props, "fo:text-align") {
        push_decl(css, "text-align", v);
    }
    if let Some(v) = get(props, "fo:text-indent") {
        push_decl(css, "text-indent", v);
    }
    if let Some(v) = get(props, "fo:line-height") {
        push_decl(css, "line-height", v);
    }
}

fn map_table_cell(props: &Properties, css: &mut String) {
    if let Some(v) = get(props, "fo:background-color") {
        push_decl(css, "background-color", v);
    }
    if let Some(v) = get(props, "fo:border") {
        push_decl(css, "border", v);
    }
    if let Some(v) = get(props, "fo:padding") {
        push_decl(css, "padding", v);
    }
    if let Some(v) = get(props, "style:vertical-align") {
        if v != "automatic" {
            push_decl(css, "vertical-align", v);
        }
    }
}

fn map_table_row(props: &Properties, css: &mut String) {
    if let Some(v) = get(props, "style:row-height") {
        push_decl(css, "height", v);
    }
    if let Some(v) = get(props, "style:min-row-height") {
        push_decl(css, "min-height", v);
    }
}

// Opacity and intensity attributes are not mapped.
fn map_graphic_fill(props: &Properties, css: &mut String) {
    match get(props, "draw:fill") {
        Some("solid") => {
            if let Some(color) = get(props, "draw:fill-color") {
                push_decl(css, "background-color", color);
            }
        }
        Some("gradient") => {
            let start = get(props, "draw:start-color").unwrap_or("#000000");
            let end = get(props, "draw:end-color").unwrap_or("#ffffff");
            let gradient = match get(props, "draw:style") {
                Some("radial") | Some("ellipsoid") => format!(
                    "radial-gradient(circle at {} {}, {}, {})",
                    percentage(get(props, "draw:cx")),
                    percentage(get(props, "draw:cy")),
                    start,
                    end
                ),
                _ => format!("linear-gradient({}, {})", start, end),
            };
            push_decl(css, "background", &gradient);
        }
        _ => {}
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn get<'a>(props: &'a Properties, name: &str) -> Option<&'a str> {
    props.get(name).map(String::as_str)
}

fn push_decl(css: &mut String, name: &str, value: &str) {
    let value = sanitize_value(value);
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    css.push_str(name);
    css.push(':');
    css.push_str(value);
    css.push(';');
}

/// Strip characters that could terminate a declaration, a rule or the
/// enclosing `<style>` element
pub(crate) fn sanitize_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '"' | '\\'))
        .collect()
}

fn border_style(odf: &str) -> &'static str {
    match odf {
        "dotted" => "dotted",
        "dash" | "long-dash" | "dot-dash" | "dot-dot-dash" => "dashed",
        _ => "solid",
    }
}

fn decoration_style(odf: &str) -> &'static str {
    match odf {
        "dotted" => "dotted",
        "dash" | "long-dash" | "dot-dash" | "dot-dot-dash" => "dashed",
        "wave" => "wavy",
        _ => "solid",
    }
}

fn quote_family(family: &str) -> String {
    let bare: String = family.chars().filter(|c| !matches!(c, '\'' | '"')).collect();
    format!("'{}'", bare.trim())
}

/// Gradient centre coordinate as a CSS percentage, defaulting to the middle
///
/// Accepts both `30%` and fractional `0.3` forms.
fn percentage(raw: Option<&str>) -> String {
    let value = raw.and_then(|raw| {
        let raw = raw.trim();
        match raw.strip_suffix('%') {
            Some(number) => number.trim().parse::<f64>().ok(),
            None => raw.parse::<f64>().ok().map(|fraction| fraction * 100.0),
        }
    });
    format!("{}%", format_number(value.unwrap_or(50.0)))
}

/// Format a number without a trailing `.0` or float noise
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let mut text = format!("{:.3}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_style(name: &str, value: &str) -> StyleRecord {
        StyleRecord::new("T1").with_property(PropertyGroup::Text, name, value)
    }

    #[test]
    fn test_empty_record_maps_to_nothing() {
        assert_eq!(map_style_to_css(&StyleRecord::new("Empty")), "");
    }

    #[test]
    fn test_text_properties_in_fixed_order() {
        let style = StyleRecord::new("T1")
            .with_property(PropertyGroup::Text, "fo:font-size", "12pt")
            .with_property(PropertyGroup::Text, "fo:color", "#ff0000")
            .with_property(PropertyGroup::Text, "fo:font-style", "italic")
            .with_property(PropertyGroup::Text, "fo:font-weight", "bold");

        assert_eq!(
            map_style_to_css(&style),
            "font-weight:bold;font-style:italic;color:#ff0000;font-size:12pt;"
        );
    }

    #[test]
    fn test_underline_uses_border_bottom() {
        let css = map_style_to_css(&text_style("style:text-underline-style", "solid"));
        assert_eq!(css, "border-bottom:1px solid;");

        let css = map_style_to_css(&text_style("style:text-underline-style", "dash"));
        assert_eq!(css, "border-bottom:1px dashed;");
    }

    #[test]
    fn test_underline_and_strike_coexist() {
        let style = text_style("style:text-underline-style", "solid").with_property(
            PropertyGroup::Text,
            "style:text-line-through-style",
            "solid",
        );

        assert_eq!(
            map_style_to_css(&style),
            "border-bottom:1px solid;text-decoration:line-through solid;"
        );
    }

    #[test]
    fn test_line_through_none_cancels() {
        let css = map_style_to_css(&text_style("style:text-line-through-style", "none"));
        assert_eq!(css, "text-decoration:none;");

        let css = map_style_to_css(&text_style("style:text-line-through-style", "wave"));
        assert_eq!(css, "text-decoration:line-through wavy;");
    }

    #[test]
    fn test_font_family_quoted() {
        let css = map_style_to_css(&text_style("style:font-name", "Liberation Serif"));
        assert_eq!(css, "font-family:'Liberation Serif';");

        let css = map_style_to_css(&text_style("fo:font-family", "'DejaVu Sans'"));
        assert_eq!(css, "font-family:'DejaVu Sans';");
    }

    #[test]
    fn test_text_position() {
        let css = map_style_to_css(&text_style("style:text-position", "super 58%"));
        assert_eq!(css, "vertical-align:super;");

        let css = map_style_to_css(&text_style("style:text-position", "0% 100%"));
        assert_eq!(css, "");
    }

    #[test]
    fn test_paragraph_alignment() {
        let style = StyleRecord::new("P1").with_property(
            PropertyGroup::Paragraph,
            "fo:text-align",
            "center",
        );
        assert_eq!(map_style_to_css(&style), "text-align:center;");
    }

    #[test]
    fn test_table_groups() {
        let cell = StyleRecord::new("ce1")
            .with_property(PropertyGroup::TableCell, "fo:background-color", "#eeeeee")
            .with_property(PropertyGroup::TableCell, "style:vertical-align", "automatic");
        assert_eq!(map_style_to_css(&cell), "background-color:#eeeeee;");

        let row =
            StyleRecord::new("ro1").with_property(PropertyGroup::TableRow, "style:row-height", "0.5in");
        assert_eq!(map_style_to_css(&row), "height:0.5in;");

        let column = StyleRecord::new("co1").with_property(
            PropertyGroup::TableColumn,
            "style:column-width",
            "2.258cm",
        );
        assert_eq!(map_style_to_css(&column), "width:2.258cm;");
    }

    #[test]
    fn test_supplementary_mappings() {
        let css = map_style_to_css(&text_style("fo:text-transform", "uppercase"));
        assert_eq!(css, "text-transform:uppercase;");

        let paragraph = StyleRecord::new("P2")
            .with_property(PropertyGroup::Paragraph, "fo:text-indent", "0.5cm")
            .with_property(PropertyGroup::Paragraph, "fo:line-height", "150%");
        assert_eq!(map_style_to_css(&paragraph), "text-indent:0.5cm;line-height:150%;");

        let cell = StyleRecord::new("ce2")
            .with_property(PropertyGroup::TableCell, "fo:padding", "0.1cm")
            .with_property(PropertyGroup::TableCell, "style:vertical-align", "middle");
        assert_eq!(map_style_to_css(&cell), "padding:0.1cm;vertical-align:middle;");

        let row = StyleRecord::new("ro2").with_property(
            PropertyGroup::TableRow,
            "style:min-row-height",
            "0.45cm",
        );
        assert_eq!(map_style_to_css(&row), "min-height:0.45cm;");
    }

    #[test]
    fn test_solid_fill() {
        let style = StyleRecord::new("gr1")
            .with_property(PropertyGroup::GraphicFill, "draw:fill", "solid")
            .with_property(PropertyGroup::GraphicFill, "draw:fill-color", "#729fcf");
        assert_eq!(map_style_to_css(&style), "background-color:#729fcf;");
    }

    #[test]
    fn test_no_fill() {
        let style = StyleRecord::new("gr1")
            .with_property(PropertyGroup::GraphicFill, "draw:fill", "none")
            .with_property(PropertyGroup::GraphicFill, "draw:fill-color", "#729fcf");
        assert_eq!(map_style_to_css(&style), "");
    }

    #[test]
    fn test_linear_gradient() {
        let style = StyleRecord::new("gr1")
            .with_property(PropertyGroup::GraphicFill, "draw:fill", "gradient")
            .with_property(PropertyGroup::GraphicFill, "draw:style", "linear")
            .with_property(PropertyGroup::GraphicFill, "draw:start-color", "#000080")
            .with_property(PropertyGroup::GraphicFill, "draw:end-color", "#ffffff");
        assert_eq!(
            map_style_to_css(&style),
            "background:linear-gradient(#000080, #ffffff);"
        );
    }

    #[test]
    fn test_radial_gradient_defaults_to_center() {
        let style = StyleRecord::new("gr1")
            .with_property(PropertyGroup::GraphicFill, "draw:fill", "gradient")
            .with_property(PropertyGroup::GraphicFill, "draw:style", "radial")
            .with_property(PropertyGroup::GraphicFill, "draw:start-color", "#ff0000")
            .with_property(PropertyGroup::GraphicFill, "draw:end-color", "#0000ff");
        assert_eq!(
            map_style_to_css(&style),
            "background:radial-gradient(circle at 50% 50%, #ff0000, #0000ff);"
        );
    }

    #[test]
    fn test_radial_gradient_center() {
        let style = StyleRecord::new("gr1")
            .with_property(PropertyGroup::GraphicFill, "draw:fill", "gradient")
            .with_property(PropertyGroup::GraphicFill, "draw:style", "radial")
            .with_property(PropertyGroup::GraphicFill, "draw:cx", "25%")
            .with_property(PropertyGroup::GraphicFill, "draw:cy", "0.75");
        assert_eq!(
            map_style_to_css(&style),
            "background:radial-gradient(circle at 25% 75%, #000000, #ffffff);"
        );
    }

    #[test]
    fn test_values_cannot_escape_stylesheet() {
        let css = map_style_to_css(&text_style("fo:color", "red;}</style><script>"));
        assert_eq!(css, "color:red/stylescript;");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(21.001), "21.001");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_property_group_from_element() {
        assert_eq!(
            PropertyGroup::from_element(&QName::parse("style:graphic-properties")),
            Some(PropertyGroup::GraphicFill)
        );
        assert_eq!(
            PropertyGroup::from_element(&QName::parse("style:page-layout-properties")),
            None
        );
        assert_eq!(
            PropertyGroup::from_element(&QName::parse("loext:text-properties")),
            None
        );
    }
}
