//! Style collection and cascade resolution (styles.xml + content.xml)
//!
//! Styles live in two places: common and master styles in `styles.xml`, and
//! automatic styles in `content.xml`. Both trees are walked, every style
//! definition becomes a [`StyleRecord`], and each record's CSS is resolved
//! against its `style:parent-style-name` chain.
//!
//! # Resolution
//!
//! Resolution is two-phase: records are first indexed by name, then resolved
//! parent-first with memoisation. A record's resolved CSS is its parent's
//! resolved CSS followed by its own mapped declarations, so later (child)
//! declarations win in the browser cascade. A parent that is currently being
//! resolved further up the stack (a cycle) contributes nothing.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::properties::{format_number, map_style_to_css, Properties, PropertyGroup, StyleRecord};
use crate::xml::Node;

/// Elements that carry `style:name` but are not class-addressable styles
const NON_CLASS_STYLES: &[&str] = &[
    "style:master-page",
    "style:page-layout",
    "style:font-face",
    "style:presentation-page-layout",
];

/// Page geometry from the first master page's layout
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page width in `unit`
    pub width: f64,
    /// Page height in `unit`
    pub height: f64,
    /// Length unit as written in the source (`cm`, `in`, ...)
    pub unit: String,
}

impl PageLayout {
    /// Read `fo:page-width` / `fo:page-height` from a
    /// `<style:page-layout-properties>` element
    pub fn from_properties(node: &Node) -> Option<Self> {
        let (width, unit) = split_length(node.attr("fo:page-width")?)?;
        let (height, _) = split_length(node.attr("fo:page-height")?)?;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            width,
            height,
            unit,
        })
    }

    /// Width as a CSS length
    pub fn css_width(&self) -> String {
        format!("{}{}", format_number(self.width), self.unit)
    }

    /// Height as a CSS length
    pub fn css_height(&self) -> String {
        format!("{}{}", format_number(self.height), self.unit)
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

fn split_length(raw: &str) -> Option<(f64, String)> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(raw.len());
    let value = raw[..split].parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((value, raw[split..].trim().to_string()))
}

/// Style name → cumulative CSS declarations
///
/// Iteration follows collection order, so generated stylesheets are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyleTable {
    order: Vec<String>,
    css: HashMap<String, String>,
}

impl ResolvedStyleTable {
    /// Resolved CSS for a style
    pub fn get(&self, name: &str) -> Option<&str> {
        self.css.get(name).map(String::as_str)
    }

    /// Whether the style exists
    pub fn contains(&self, name: &str) -> bool {
        self.css.contains_key(name)
    }

    /// Number of resolved styles
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All `(name, css)` pairs in collection order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.css[name].as_str()))
    }
}

/// Resolve the style table and page layout of a document
pub fn resolve_styles(
    style_tree: &Node,
    document_tree: &Node,
) -> (ResolvedStyleTable, Option<PageLayout>) {
    let records = collect_style_records(&[style_tree, document_tree]);
    let table = build_style_table(&records);
    let layout = locate_page_layout(style_tree);
    (table, layout)
}

// =============================================================================
// Collection
// =============================================================================

/// Collect style records from the given trees, depth-first in tree order
///
/// When two records share a name the later one replaces the earlier one in
/// place. Gradient fills are expanded from the `<draw:gradient>` definitions
/// found in the same trees.
pub fn collect_style_records(trees: &[&Node]) -> Vec<StyleRecord> {
    let mut collector = Collector::default();
    for tree in trees {
        collector.walk(tree);
    }
    collector.finish()
}

#[derive(Default)]
struct Collector {
    records: Vec<StyleRecord>,
    positions: HashMap<String, usize>,
    gradients: HashMap<String, Properties>,
}

impl Collector {
    fn walk(&mut self, node: &Node) {
        if node.is("draw:gradient") {
            if let Some(name) = node.attr("draw:name") {
                let props = node
                    .attrs()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();
                self.gradients.insert(name.to_string(), props);
            }
        } else if let Some(record) = record_from_node(node) {
            match self.positions.get(&record.name) {
                Some(&index) => self.records[index] = record,
                None => {
                    self.positions.insert(record.name.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }

        for child in node.elements() {
            self.walk(child);
        }
    }

    fn finish(mut self) -> Vec<StyleRecord> {
        for record in &mut self.records {
            let Some(fill) = record.group(PropertyGroup::GraphicFill) else {
                continue;
            };
            if fill.get("draw:fill").map(String::as_str) != Some("gradient") {
                continue;
            }
            let Some(name) = fill.get("draw:fill-gradient-name").cloned() else {
                continue;
            };
            match self.gradients.get(&name) {
                Some(gradient) => {
                    let fill = record.group_mut(PropertyGroup::GraphicFill);
                    for (key, value) in gradient {
                        fill.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
                None => debug!(style = %record.name, gradient = %name, "gradient definition not found"),
            }
        }
        self.records
    }
}

fn record_from_node(node: &Node) -> Option<StyleRecord> {
    let name = node.attr("style:name")?;
    if NON_CLASS_STYLES.iter().any(|tag| node.is(tag)) {
        return None;
    }

    let mut record = StyleRecord::new(name);
    record.parent_name = node.attr("style:parent-style-name").map(str::to_string);
    record.family = node.attr("style:family").map(str::to_string);

    for child in node.elements() {
        if let Some(group) = PropertyGroup::from_element(&child.name) {
            let props = record.group_mut(group);
            for (key, value) in child.attrs() {
                props.insert(key.to_string(), value.to_string());
            }
        }
    }
    Some(record)
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve every record against its ancestor chain
pub fn build_style_table(records: &[StyleRecord]) -> ResolvedStyleTable {
    let mut resolver = Resolver {
        index: records.iter().map(|r| (r.name.as_str(), r)).collect(),
        resolved: HashMap::new(),
        visiting: HashSet::new(),
    };

    let mut table = ResolvedStyleTable::default();
    for record in records {
        if table.css.contains_key(&record.name) {
            continue;
        }
        let css = resolver.resolve(&record.name);
        table.order.push(record.name.clone());
        table.css.insert(record.name.clone(), css);
    }
    table
}

struct Resolver<'a> {
    index: HashMap<&'a str, &'a StyleRecord>,
    resolved: HashMap<&'a str, String>,
    visiting: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, name: &'a str) -> String {
        if let Some(css) = self.resolved.get(name) {
            return css.clone();
        }
        let Some(record) = self.index.get(name).copied() else {
            return String::new();
        };
        if !self.visiting.insert(name) {
            debug!(style = name, "style inheritance cycle, ancestor treated as empty");
            return String::new();
        }

        let mut css = match record.parent_name.as_deref() {
            Some(parent) if self.index.contains_key(parent) => self.resolve(parent),
            Some(parent) => {
                debug!(style = name, parent, "parent style not found");
                String::new()
            }
            None => String::new(),
        };
        css.push_str(&map_style_to_css(record));

        self.visiting.remove(name);
        self.resolved.insert(name, css.clone());
        css
    }
}

// =============================================================================
// Page layout
// =============================================================================

/// Follow master page → page layout → layout properties
pub fn locate_page_layout(style_tree: &Node) -> Option<PageLayout> {
    let master = style_tree.find(|n| n.is("style:master-page"))?;
    let layout_name = master.attr("style:page-layout-name")?;
    let layout = style_tree
        .find(|n| n.is("style:page-layout") && n.attr("style:name") == Some(layout_name))?;
    PageLayout::from_properties(layout.child("style:page-layout-properties")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn bold(name: &str) -> StyleRecord {
        StyleRecord::new(name).with_property(PropertyGroup::Text, "fo:font-weight", "bold")
    }

    fn red(name: &str) -> StyleRecord {
        StyleRecord::new(name).with_property(PropertyGroup::Text, "fo:color", "#ff0000")
    }

    #[test]
    fn test_child_extends_parent() {
        let records = vec![bold("Parent"), red("Child").with_parent("Parent")];
        let table = build_style_table(&records);

        assert_eq!(table.get("Parent"), Some("font-weight:bold;"));
        assert_eq!(table.get("Child"), Some("font-weight:bold;color:#ff0000;"));
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let forward = vec![
            bold("A"),
            red("B").with_parent("A"),
            StyleRecord::new("C")
                .with_parent("B")
                .with_property(PropertyGroup::Paragraph, "fo:text-align", "end"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = build_style_table(&forward);
        let b = build_style_table(&backward);
        for name in ["A", "B", "C"] {
            assert_eq!(a.get(name), b.get(name), "style {}", name);
        }
        assert_eq!(
            b.get("C"),
            Some("font-weight:bold;color:#ff0000;text-align:end;")
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let records = vec![bold("A").with_parent("B"), red("B").with_parent("A")];
        let table = build_style_table(&records);

        // A resolves first; B sees A mid-resolution and contributes only itself
        assert_eq!(table.get("B"), Some("color:#ff0000;"));
        assert_eq!(table.get("A"), Some("color:#ff0000;font-weight:bold;"));
    }

    #[test]
    fn test_self_parent() {
        let table = build_style_table(&[bold("A").with_parent("A")]);
        assert_eq!(table.get("A"), Some("font-weight:bold;"));
    }

    #[test]
    fn test_dangling_parent() {
        let table = build_style_table(&[bold("A").with_parent("Missing")]);
        assert_eq!(table.get("A"), Some("font-weight:bold;"));
        assert!(!table.contains("Missing"));
    }

    #[test]
    fn test_iteration_follows_collection_order() {
        let table = build_style_table(&[red("Z"), bold("A")]);
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Z", "A"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_collect_from_both_trees() {
        let styles = parse(
            r##"<office:document-styles><office:styles><style:style style:name="Standard" style:family="paragraph"><style:text-properties fo:color="#333333"/></style:style></office:styles><office:master-styles><style:master-page style:name="Standard" style:page-layout-name="pm1"/></office:master-styles></office:document-styles>"##,
        )
        .unwrap();
        let content = parse(
            r#"<office:document-content><office:automatic-styles><style:style style:name="P1" style:parent-style-name="Standard"><style:paragraph-properties fo:text-align="center"/></style:style></office:automatic-styles></office:document-content>"#,
        )
        .unwrap();

        let records = collect_style_records(&[&styles, &content]);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        // The master page shares the name but is not a class style
        assert_eq!(names, vec!["Standard", "P1"]);
        assert_eq!(records[0].family.as_deref(), Some("paragraph"));
        assert_eq!(
            records[1].property(PropertyGroup::Paragraph, "fo:text-align"),
            Some("center")
        );

        let (table, _) = resolve_styles(&styles, &content);
        assert_eq!(table.get("P1"), Some("color:#333333;text-align:center;"));
    }

    #[test]
    fn test_later_record_overwrites() {
        let styles = parse(
            r##"<r><style:style style:name="P1"><style:text-properties fo:color="#000000"/></style:style></r>"##,
        )
        .unwrap();
        let content = parse(
            r##"<r><style:style style:name="P1"><style:text-properties fo:color="#ffffff"/></style:style></r>"##,
        )
        .unwrap();

        let (table, _) = resolve_styles(&styles, &content);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("P1"), Some("color:#ffffff;"));
    }

    #[test]
    fn test_gradient_expanded_into_fill() {
        let styles = parse(
            r##"<office:document-styles><office:styles><draw:gradient draw:name="Sunset" draw:style="radial" draw:cx="50%" draw:cy="50%" draw:start-color="#ff8000" draw:end-color="#800000"/></office:styles></office:document-styles>"##,
        )
        .unwrap();
        let content = parse(
            r#"<office:document-content><office:automatic-styles><style:style style:name="gr1" style:family="graphic"><style:graphic-properties draw:fill="gradient" draw:fill-gradient-name="Sunset"/></style:style></office:automatic-styles></office:document-content>"#,
        )
        .unwrap();

        let (table, _) = resolve_styles(&styles, &content);
        assert_eq!(
            table.get("gr1"),
            Some("background:radial-gradient(circle at 50% 50%, #ff8000, #800000);")
        );
    }

    #[test]
    fn test_page_layout_located() {
        let styles = parse(
            r#"<office:document-styles><office:automatic-styles><style:page-layout style:name="pm1"><style:page-layout-properties fo:page-width="28cm" fo:page-height="15.75cm"/></style:page-layout></office:automatic-styles><office:master-styles><style:master-page style:name="Default" style:page-layout-name="pm1"/></office:master-styles></office:document-styles>"#,
        )
        .unwrap();

        let layout = locate_page_layout(&styles).unwrap();
        assert_eq!(layout.width, 28.0);
        assert_eq!(layout.height, 15.75);
        assert_eq!(layout.unit, "cm");
        assert_eq!(layout.css_width(), "28cm");
        assert_eq!(layout.css_height(), "15.75cm");
    }

    #[test]
    fn test_page_layout_absent() {
        let no_master = parse("<office:document-styles/>").unwrap();
        assert_eq!(locate_page_layout(&no_master), None);

        let wrong_name = parse(
            r#"<r><style:page-layout style:name="pm1"><style:page-layout-properties fo:page-width="8.5in" fo:page-height="11in"/></style:page-layout><style:master-page style:name="Default" style:page-layout-name="pm9"/></r>"#,
        )
        .unwrap();
        assert_eq!(locate_page_layout(&wrong_name), None);
    }

    #[test]
    fn test_split_length() {
        assert_eq!(split_length("21.001cm"), Some((21.001, "cm".to_string())));
        assert_eq!(split_length("11in"), Some((11.0, "in".to_string())));
        assert_eq!(split_length("wide"), None);
    }
}
