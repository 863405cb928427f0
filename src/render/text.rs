//! Text nodes.
//!
//! Each `<text>` carries its own `font-family` both as attribute and inline
//! style, so no stylesheet from a surrounding page (batch sheets, editor
//! previews) can restyle label text.

use crate::fonts::{FALLBACK_FAMILY, is_system_font};
use crate::template::{TextAlign, TextElement};
use crate::units::fmt_num;

/// Escape the five XML-significant characters.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// CSS `font-family` value for an element's font name.
pub(crate) fn font_family_value(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '<' | '>' | '&' | ';' | '{' | '}' | '\\'))
        .collect();

    if cleaned.is_empty()
        || cleaned.eq_ignore_ascii_case("system")
        || cleaned.eq_ignore_ascii_case("default")
    {
        return FALLBACK_FAMILY.to_string();
    }
    if is_system_font(&cleaned) && !cleaned.contains(' ') {
        return format!("{}, {}", cleaned, FALLBACK_FAMILY);
    }
    format!("'{}', {}", cleaned, FALLBACK_FAMILY)
}

/// Anchor and x offset (px) inside the box for an alignment.
pub(crate) fn anchor(align: TextAlign, box_width: f64) -> (&'static str, f64) {
    match align {
        TextAlign::Left => ("start", 0.0),
        TextAlign::Center => ("middle", box_width / 2.0),
        TextAlign::Right => ("end", box_width),
    }
}

/// `<text>` node for an element whose content is already resolved.
pub(crate) fn text_node(element: &TextElement, content: &str) -> String {
    let bounds = &element.bounds;
    let font_size = element.font_size_px();
    let (text_anchor, dx) = anchor(element.text_align, bounds.width_px());
    let family = escape_xml(&font_family_value(&element.font_family));

    // Baseline one font size below the top of the box.
    format!(
        concat!(
            r#"<text x="{x}" y="{y}" font-size="{fs}" font-family="{ff}" style="font-family: {ff}" "#,
            r#"fill="{fill}" text-anchor="{anchor}" xml:space="preserve">{content}</text>"#
        ),
        x = fmt_num(bounds.x_px() + dx),
        y = fmt_num(bounds.y_px() + font_size),
        fs = fmt_num(font_size),
        ff = family,
        fill = escape_xml(&element.color),
        anchor = text_anchor,
        content = escape_xml(content),
    )
}
