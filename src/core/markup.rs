//! Declarative marker pass over well-formed markup.
//!
//! Elements carrying a recognized `data-format` attribute are formatting
//! markers: their text content is the numeric input and is replaced by the
//! formatted string. `data-decimales` and `data-simbolo` carry per-element
//! options. Elements with an unrecognized `data-format` value are not
//! markers and pass through untouched.
//!
//! The pass is one-shot: it replaces the numeric source text with the
//! display string, so running it again re-parses formatted output (which
//! coerces to 0). Run it once per document, at render time.
//!
//! Markers do not nest. Inside a marked element, descendant text is
//! accumulated as the input (mirroring DOM `textContent`), and the rewrite
//! replaces the element's entire content, children included.

use crate::core::format;
use crate::domain::model::{FormatMode, FormatSpec, Marker};
use crate::utils::error::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Marker attribute selecting the format mode.
pub const ATTR_FORMAT: &str = "data-format";
/// Optional decimal-places override.
pub const ATTR_DECIMALS: &str = "data-decimales";
/// Optional currency symbol, `moneda` only.
pub const ATTR_SYMBOL: &str = "data-simbolo";

/// Scans a document and collects its markers in document order.
pub fn scan_markers(source: &str) -> Result<Vec<Marker>> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut markers: Vec<Marker> = Vec::new();
    let mut depth: usize = 0;
    // Ordinal and depth of the currently open marked element.
    let mut capture: Option<(usize, usize)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if capture.is_none() {
                    if let Some(spec) = marker_spec(&e) {
                        let ordinal = markers.len();
                        markers.push(Marker {
                            ordinal,
                            raw_text: String::new(),
                            spec,
                        });
                        capture = Some((ordinal, depth));
                    }
                }
            }
            Event::Empty(e) => {
                if capture.is_none() {
                    if let Some(spec) = marker_spec(&e) {
                        // No content: the input is absent and coerces to 0.
                        markers.push(Marker {
                            ordinal: markers.len(),
                            raw_text: String::new(),
                            spec,
                        });
                    }
                }
            }
            Event::Text(e) => {
                if let Some((ordinal, _)) = capture {
                    markers[ordinal].raw_text.push_str(&decode_text(e.as_ref()));
                }
            }
            Event::CData(e) => {
                if let Some((ordinal, _)) = capture {
                    markers[ordinal]
                        .raw_text
                        .push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(_) => {
                if let Some((_, open_depth)) = capture {
                    if depth == open_depth {
                        capture = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(markers)
}

/// Re-emits the document with each marked element's content replaced by the
/// replacement at its ordinal. The traversal pairs markers exactly as
/// [`scan_markers`] enumerated them. Self-closing marked elements are
/// expanded so the text has somewhere to live.
pub fn rewrite(source: &str, replacements: &[String]) -> Result<String> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();

    let mut next_ordinal: usize = 0;
    let mut depth: usize = 0;
    let mut capture: Option<(usize, usize)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if capture.is_none() {
                    if marker_spec(&e).is_some() {
                        capture = Some((next_ordinal, depth));
                        next_ordinal += 1;
                    }
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if capture.is_none() {
                    if marker_spec(&e).is_some() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        let replacement = replacements
                            .get(next_ordinal)
                            .map(String::as_str)
                            .unwrap_or("");
                        next_ordinal += 1;
                        writer.write_event(Event::Start(e))?;
                        writer.write_event(Event::Text(BytesText::new(replacement)))?;
                        writer.write_event(Event::End(BytesEnd::new(name)))?;
                    } else {
                        writer.write_event(Event::Empty(e))?;
                    }
                }
            }
            Event::End(e) => {
                match capture {
                    Some((ordinal, open_depth)) if depth == open_depth => {
                        let replacement =
                            replacements.get(ordinal).map(String::as_str).unwrap_or("");
                        writer.write_event(Event::Text(BytesText::new(replacement)))?;
                        writer.write_event(Event::End(e))?;
                        capture = None;
                    }
                    Some(_) => {}
                    None => writer.write_event(Event::End(e))?,
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            other => {
                if capture.is_none() {
                    writer.write_event(other)?;
                }
            }
        }
        buf.clear();
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// One-shot pass: scan, format each marker, rewrite.
pub fn apply_declarative_formatting(source: &str) -> Result<String> {
    let markers = scan_markers(source)?;
    let replacements: Vec<String> = markers
        .iter()
        .map(|marker| format::apply_to_input(&marker.spec, &marker.raw_text))
        .collect();
    rewrite(source, &replacements)
}

/// Reads the marker attributes off an element, if its `data-format` value is
/// recognized. Malformed attributes and unparseable option values fall back
/// silently, matching the module's fail-soft policy.
fn marker_spec(e: &BytesStart) -> Option<FormatSpec> {
    let mut mode = None;
    let mut decimals = None;
    let mut symbol = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"data-format" => {
                if let Ok(value) = attr.unescape_value() {
                    mode = FormatMode::from_marker(&value);
                }
            }
            b"data-decimales" => {
                decimals = attr
                    .unescape_value()
                    .ok()
                    .and_then(|value| value.trim().parse::<u32>().ok());
            }
            b"data-simbolo" => {
                symbol = attr.unescape_value().ok().map(|value| value.into_owned());
            }
            _ => {}
        }
    }

    mode.map(|mode| FormatSpec {
        mode,
        decimals,
        symbol,
    })
}

fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&text) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FormatMode;

    #[test]
    fn test_scan_collects_markers_in_document_order() {
        let source = r#"<div>
            <span data-format="numero">100000</span>
            <span data-format="moneda" data-decimales="2" data-simbolo="$">1500000.50</span>
            <span class="plain">ignored</span>
        </div>"#;

        let markers = scan_markers(source).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].spec.mode, FormatMode::Plain);
        assert_eq!(markers[0].raw_text, "100000");
        assert_eq!(markers[1].spec.mode, FormatMode::Currency);
        assert_eq!(markers[1].spec.decimals, Some(2));
        assert_eq!(markers[1].spec.symbol.as_deref(), Some("$"));
    }

    #[test]
    fn test_apply_formats_each_mode() {
        let source = r#"<section>
            <td data-format="numero">100000</td>
            <td data-format="moneda" data-decimales="2">1500000.50</td>
            <td data-format="porcentaje">0.855</td>
            <td data-format="compacto">2500000</td>
        </section>"#;

        let output = apply_declarative_formatting(source).unwrap();
        assert!(output.contains(">100.000<"));
        assert!(output.contains(">$1.500.000,50<"));
        assert!(output.contains(">85,5%<"));
        assert!(output.contains(">2.5M<"));
    }

    #[test]
    fn test_unrecognized_mode_left_untouched() {
        let source = r#"<div><span data-format="fecha">2024</span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_marker_attributes_survive_the_pass() {
        let source = r#"<div><span id="total" data-format="numero">100000</span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        assert_eq!(
            output,
            r#"<div><span id="total" data-format="numero">100.000</span></div>"#
        );
    }

    #[test]
    fn test_missing_text_formats_as_zero() {
        let source = r#"<div><span data-format="moneda"></span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        assert!(output.contains(">$0<"));
    }

    #[test]
    fn test_self_closing_marker_gains_content() {
        let source = r#"<div><span data-format="porcentaje"/></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        assert_eq!(
            output,
            r#"<div><span data-format="porcentaje">0,0%</span></div>"#
        );
    }

    #[test]
    fn test_invalid_decimales_falls_back_to_default() {
        let source = r#"<div><span data-format="numero" data-decimales="muchos">1234.5</span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        // Plain default is 0 decimals.
        assert!(output.contains(">1.234<"));
    }

    #[test]
    fn test_non_numeric_text_formats_as_zero() {
        let source = r#"<div><span data-format="numero">sin datos</span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        assert!(output.contains(">0<"));
    }

    #[test]
    fn test_marked_element_content_is_fully_replaced() {
        let source = r#"<div><span data-format="numero">1<b>2</b>3</span></div>"#;
        let output = apply_declarative_formatting(source).unwrap();
        // textContent semantics: descendant text "123" is the input and the
        // children are dropped by the rewrite.
        assert_eq!(
            output,
            r#"<div><span data-format="numero">123</span></div>"#
        );
    }

    #[test]
    fn test_pass_is_single_shot() {
        let source = r#"<div><span data-format="porcentaje">0.855</span></div>"#;
        let once = apply_declarative_formatting(source).unwrap();
        assert!(once.contains(">85,5%<"));

        // Re-running re-parses "85,5%", which coerces to 0. The pass must
        // only ever run once per document.
        let twice = apply_declarative_formatting(&once).unwrap();
        assert!(twice.contains(">0,0%<"));
    }

    #[test]
    fn test_surrounding_document_is_preserved() {
        let source = "<table><tr><td>Valor</td><td data-format=\"moneda\">100000</td></tr></table>";
        let output = apply_declarative_formatting(source).unwrap();
        assert_eq!(
            output,
            "<table><tr><td>Valor</td><td data-format=\"moneda\">$100.000</td></tr></table>"
        );
    }
}
