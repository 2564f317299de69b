//! Parser WKT minimal (WKT1 et WKT2)
//!
//! On ne construit qu'un arbre de mots-clés: assez pour retrouver les
//! sous-systèmes d'un CRS composé et leur identifiant d'autorité.

use memchr::memchr;

use super::{CrsKind, SubCrs};
use crate::LasMetaError;

/// Valeur d'un nœud WKT
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue<'a> {
    Node(WktNode<'a>),
    /// Chaîne entre guillemets (sans les guillemets)
    Text(&'a str),
    /// Nombre ou énumération nue (ex: `-1.5`, `north`)
    Token(&'a str),
}

/// Nœud `KEYWORD[...]`
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode<'a> {
    pub keyword: &'a str,
    pub children: Vec<WktValue<'a>>,
}

impl<'a> WktNode<'a> {
    /// Sous-nœuds directs
    pub fn nodes(&self) -> impl Iterator<Item = &WktNode<'a>> {
        self.children.iter().filter_map(|c| match c {
            WktValue::Node(n) => Some(n),
            _ => None,
        })
    }

    /// Premier sous-nœud direct portant ce mot-clé
    pub fn child(&self, keyword: &str) -> Option<&WktNode<'a>> {
        self.nodes()
            .find(|n| n.keyword.eq_ignore_ascii_case(keyword))
    }

    /// Nom du nœud (première valeur entre guillemets)
    pub fn name(&self) -> Option<&'a str> {
        match self.children.first() {
            Some(WktValue::Text(t)) => Some(*t),
            _ => None,
        }
    }

    /// Code EPSG déclaré directement sur ce nœud.
    ///
    /// `AUTHORITY["EPSG","2154"]` en WKT1, `ID["EPSG",2154]` en WKT2.
    /// Les identifiants des nœuds imbriqués (datum, GEOGCS de base...) sont ignorés.
    pub fn epsg(&self) -> Option<u32> {
        self.nodes()
            .filter(|n| {
                n.keyword.eq_ignore_ascii_case("AUTHORITY") || n.keyword.eq_ignore_ascii_case("ID")
            })
            .find_map(|n| {
                let authority = scalar(n.children.first()?)?;
                if !authority.eq_ignore_ascii_case("EPSG") {
                    return None;
                }
                scalar(n.children.get(1)?)?.trim().parse().ok()
            })
    }
}

fn scalar<'a>(value: &WktValue<'a>) -> Option<&'a str> {
    match value {
        WktValue::Text(t) | WktValue::Token(t) => Some(*t),
        WktValue::Node(_) => None,
    }
}

/// Parse une chaîne WKT complète
pub fn parse(input: &str) -> Result<WktNode<'_>, LasMetaError> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let root = parser.parse_node()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.error("trailing characters after root node"));
    }
    Ok(root)
}

/// Profondeur d'imbrication maximale acceptée
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &str) -> LasMetaError {
        LasMetaError::malformed_crs("wkt", format!("{} at offset {}", reason, self.pos))
    }

    fn scan_keyword(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn parse_node(&mut self) -> Result<WktNode<'a>, LasMetaError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let node = self.parse_node_body();
        self.depth -= 1;
        node
    }

    fn parse_node_body(&mut self) -> Result<WktNode<'a>, LasMetaError> {
        self.skip_ws();
        let keyword = self.scan_keyword();
        if keyword.is_empty() {
            return Err(self.error("expected keyword"));
        }

        self.skip_ws();
        let close = match self.peek() {
            Some(b'[') => b']',
            Some(b'(') => b')',
            _ => return Err(self.error("expected opening bracket")),
        };
        self.pos += 1;

        let mut children = Vec::new();
        self.skip_ws();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(WktNode { keyword, children });
        }

        loop {
            self.skip_ws();
            children.push(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("unexpected character")),
                None => return Err(self.error("unterminated node")),
            }
        }

        Ok(WktNode { keyword, children })
    }

    fn parse_value(&mut self) -> Result<WktValue<'a>, LasMetaError> {
        match self.peek() {
            Some(b'"') => self.parse_text(),
            Some(b) if b.is_ascii_alphabetic() => {
                let start = self.pos;
                let word = self.scan_keyword();
                self.skip_ws();
                if matches!(self.peek(), Some(b'[') | Some(b'(')) {
                    self.pos = start;
                    Ok(WktValue::Node(self.parse_node()?))
                } else {
                    Ok(WktValue::Token(word))
                }
            }
            Some(_) => {
                let start = self.pos;
                let rest = &self.bytes()[start..];
                let len = rest
                    .iter()
                    .position(|&b| matches!(b, b',' | b']' | b')' | b'[' | b'('))
                    .unwrap_or(rest.len());
                self.pos += len;
                let token = self.src[start..self.pos].trim();
                if token.is_empty() {
                    return Err(self.error("empty value"));
                }
                Ok(WktValue::Token(token))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Chaîne entre guillemets; `""` est un guillemet échappé
    fn parse_text(&mut self) -> Result<WktValue<'a>, LasMetaError> {
        self.pos += 1;
        let start = self.pos;
        loop {
            let rest = &self.bytes()[self.pos..];
            let Some(offset) = memchr(b'"', rest) else {
                return Err(self.error("unterminated string"));
            };
            self.pos += offset + 1;
            if self.peek() == Some(b'"') {
                self.pos += 1;
                continue;
            }
            return Ok(WktValue::Text(&self.src[start..self.pos - 1]));
        }
    }
}

/// Classe un mot-clé de CRS. `None` si ce n'est pas un CRS.
fn crs_kind(node: &WktNode<'_>) -> Option<CrsKind> {
    let keyword = node.keyword.to_ascii_uppercase();
    let kind = match keyword.as_str() {
        "PROJCS" | "PROJCRS" | "PROJECTEDCRS" => CrsKind::Projected,
        "GEOGCS" | "GEOGCRS" | "GEOGRAPHICCRS" => CrsKind::Geographic,
        "GEODCRS" | "GEODETICCRS" => {
            // Un GEODCRS cartésien est géocentrique, pas géographique
            let cartesian = node
                .child("CS")
                .and_then(|cs| cs.children.first())
                .and_then(scalar)
                .map_or(false, |t| t.eq_ignore_ascii_case("cartesian"));
            if cartesian {
                CrsKind::Other
            } else {
                CrsKind::Geographic
            }
        }
        "VERT_CS" | "VERTCRS" | "VERTICALCRS" => CrsKind::Vertical,
        "GEOCCS" | "LOCAL_CS" | "ENGCRS" | "ENGINEERINGCRS" | "PARAMETRICCRS" | "TIMECRS" => {
            CrsKind::Other
        }
        _ => return None,
    };
    Some(kind)
}

fn is_compound(node: &WktNode<'_>) -> bool {
    node.keyword.eq_ignore_ascii_case("COMPD_CS") || node.keyword.eq_ignore_ascii_case("COMPOUNDCRS")
}

fn is_bound(node: &WktNode<'_>) -> bool {
    node.keyword.eq_ignore_ascii_case("BOUNDCRS")
}

/// Décompose la racine en sous-systèmes, dans l'ordre du WKT
pub fn decompose(root: &WktNode<'_>) -> Vec<SubCrs> {
    let mut out = Vec::new();
    collect(root, &mut out, true);
    out
}

fn collect(node: &WktNode<'_>, out: &mut Vec<SubCrs>, is_root: bool) {
    if is_compound(node) {
        for child in node.nodes() {
            if is_compound(child) || is_bound(child) || crs_kind(child).is_some() {
                collect(child, out, false);
            }
        }
        return;
    }

    if is_bound(node) {
        if let Some(source) = node.child("SOURCECRS") {
            for child in source.nodes() {
                collect(child, out, false);
            }
        }
        return;
    }

    let kind = match crs_kind(node) {
        Some(kind) => kind,
        // Racine inconnue: on la garde, non classée
        None if is_root => CrsKind::Other,
        None => return,
    };

    out.push(SubCrs {
        kind,
        name: node.name().map(str::to_string),
        epsg: node.epsg(),
    });
}
