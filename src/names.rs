//! Tag and QName helpers
//!
//! Schema documents spell their tags as `xs:element`, `xsd:element` or a bare
//! `element` under a default namespace. Only the two conventional schema
//! prefixes are stripped; any other prefix is kept verbatim.

/// Prefixes recognised as the XML Schema namespace
pub const SCHEMA_PREFIXES: [&str; 2] = ["xs", "xsd"];

/// Strip an `xs:`/`xsd:` prefix from a tag name
pub fn strip_schema_prefix(tag: &str) -> &str {
    match split_qname(tag) {
        (Some(prefix), local) if SCHEMA_PREFIXES.contains(&prefix) => local,
        _ => tag,
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a QName, whatever its prefix
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}
