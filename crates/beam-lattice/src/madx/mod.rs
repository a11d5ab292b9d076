//! Loader for the subset of MAD-X used to describe linear lattices.
//!
//! Supported statements: variable assignments (`=`, `:=`), element
//! definitions (`label: type, key=value, ...;`), `line` definitions with
//! repetition and reversal, `beam` and `use`. Other commands are skipped
//! with a warning.

mod expr;
mod lexer;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use beam_core::errors::{BeamError, ErrorInfo};
use beam_core::{RefPart, Species};
use log::{debug, info, warn};

use crate::element::Element;
use crate::lattice::Lattice;
use crate::thick::{Drift, Quad, Sbend};
use crate::thin::{DipEdge, Marker, Multipole, NonlinearLens};

use expr::{eval, Cursor, Scope};
use lexer::{tokenize, Spanned, Token};

/// Value of an element or command attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Scalar expression result.
    Number(f64),
    /// Brace-delimited list such as `knl={0, 0.1}`.
    Array(Vec<f64>),
    /// Bare word or quoted string, e.g. `particle=electron`.
    Name(String),
}

/// A labelled element definition before conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    /// Base MAD-X type after resolving inheritance.
    pub kind: String,
    /// Attributes in definition order of keys.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl ElementDef {
    fn number(&self, key: &str) -> Option<f64> {
        match self.attrs.get(key) {
            Some(AttrValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    fn array(&self, key: &str) -> Vec<f64> {
        match self.attrs.get(key) {
            Some(AttrValue::Array(values)) => values.clone(),
            Some(AttrValue::Number(value)) => vec![*value],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LineItem {
    Name {
        name: String,
        repeat: usize,
        reversed: bool,
    },
    Group {
        items: Vec<LineItem>,
        repeat: usize,
        reversed: bool,
    },
}

/// Parsed MAD-X input.
#[derive(Debug, Clone, Default)]
pub struct MadxDeck {
    variables: BTreeMap<String, f64>,
    elements: BTreeMap<String, ElementDef>,
    lines: BTreeMap<String, Vec<LineItem>>,
    last_line: Option<String>,
    beam: Option<BTreeMap<String, AttrValue>>,
    sequence: Option<String>,
}

impl Scope for MadxDeck {
    fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    fn attribute(&self, element: &str, attribute: &str) -> Option<f64> {
        self.elements.get(element)?.number(attribute)
    }
}

fn lattice_error(code: &str, message: impl Into<String>) -> BeamError {
    BeamError::Lattice(ErrorInfo::new(code, message))
}

/// Attributes whose bare-word values are names rather than expressions.
const NAME_KEYS: &[&str] = &["particle", "sequence", "period", "refer", "apertype", "from"];

const SKIPPED_COMMANDS: &[&str] = &[
    "option", "title", "twiss", "select", "show", "value", "print", "stop", "return", "exit",
    "quit", "set", "system", "help", "survey", "plot", "write", "save", "assign", "emit",
];

impl MadxDeck {
    /// Parses MAD-X source text.
    pub fn parse(source: &str) -> Result<Self, BeamError> {
        let tokens = tokenize(source)?;
        let mut deck = MadxDeck::default();
        for statement in tokens.split(|t| t.token == Token::Semicolon) {
            if !statement.is_empty() {
                deck.statement(statement)?;
            }
        }
        Ok(deck)
    }

    /// Reads and parses a MAD-X file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BeamError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|err| BeamError::io("madx-read", path, err))?;
        let deck = Self::parse(&source).map_err(|err| match err {
            BeamError::Parse(info) => {
                BeamError::Parse(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })?;
        info!(
            "loaded MAD-X deck {}: {} variables, {} elements, {} lines",
            path.display(),
            deck.variables.len(),
            deck.elements.len(),
            deck.lines.len()
        );
        Ok(deck)
    }

    /// Value of a global variable.
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(&name.to_ascii_lowercase()).copied()
    }

    /// Definition of a labelled element.
    pub fn element(&self, label: &str) -> Option<&ElementDef> {
        self.elements.get(&label.to_ascii_lowercase())
    }

    /// Name of the beamline that [`MadxDeck::lattice`] expands.
    ///
    /// This is the argument of the last `use` command, or else the last
    /// `line` defined in the file.
    pub fn selected_line(&self) -> Option<&str> {
        self.sequence.as_deref().or(self.last_line.as_deref())
    }

    /// Expands the selected beamline into elements with `nslice` slices per
    /// thick element.
    pub fn lattice(&self, nslice: usize) -> Result<Lattice, BeamError> {
        let name = self.selected_line().ok_or_else(|| {
            lattice_error("madx-no-line", "no line defined and no 'use' command given")
        })?;
        self.lattice_for(name, nslice)
    }

    /// Expands the named beamline.
    pub fn lattice_for(&self, name: &str, nslice: usize) -> Result<Lattice, BeamError> {
        let name = name.to_ascii_lowercase();
        let items = self.lines.get(&name).ok_or_else(|| {
            lattice_error("madx-unknown-line", "line is not defined").named(&name)
        })?;
        let mut labels = Vec::new();
        let mut stack = BTreeSet::from([name.clone()]);
        self.expand(items, false, &mut stack, &mut labels)?;

        let mut elements = Vec::new();
        for label in &labels {
            let def = self.elements.get(label).ok_or_else(|| {
                lattice_error("madx-unknown-element", "line references an undefined name")
                    .named(label)
            })?;
            elements.extend(convert(label, def, nslice)?);
        }
        debug!(
            "expanded line '{name}' into {} labels and {} elements",
            labels.len(),
            elements.len()
        );
        Lattice::new(elements)
    }

    /// Reference particle described by the `beam` command.
    pub fn reference_particle(&self) -> Result<RefPart, BeamError> {
        let beam = self.beam.as_ref().ok_or_else(|| {
            BeamError::Config(
                ErrorInfo::new("madx-no-beam", "no beam command in MAD-X input")
                    .with_hint("add e.g. 'beam, particle=electron, energy=5.0;'"),
            )
        })?;
        let number = |key: &str| match beam.get(key) {
            Some(AttrValue::Number(value)) => Some(*value),
            _ => None,
        };

        let species = match beam.get("particle") {
            Some(AttrValue::Name(name)) => Some(Species::from_name(name).ok_or_else(|| {
                BeamError::Config(
                    ErrorInfo::new("madx-particle", "unknown particle name")
                        .with_context("particle", name.clone()),
                )
            })?),
            Some(_) => {
                return Err(BeamError::Config(ErrorInfo::new(
                    "madx-particle",
                    "particle must be a name",
                )))
            }
            None if number("mass").is_none() => Some(Species::Positron),
            None => None,
        };

        let mass_mev = match (number("mass"), species) {
            (Some(mass_gev), _) => mass_gev * 1.0e3,
            (None, Some(species)) => species.mass_mev(),
            (None, None) => missing_mass()?,
        };
        let charge = number("charge")
            .or_else(|| species.map(|s| s.charge_qe()))
            .unwrap_or(1.0);

        let total_mev = if let Some(energy) = number("energy") {
            energy * 1.0e3
        } else if let Some(pc) = number("pc") {
            ((pc * 1.0e3).powi(2) + mass_mev.powi(2)).sqrt()
        } else if let Some(gamma) = number("gamma") {
            gamma * mass_mev
        } else {
            1.0e3
        };

        let mut refpart = RefPart::default();
        refpart
            .set_charge_qe(charge)
            .set_mass_mev(mass_mev)?
            .set_energy_mev(total_mev - mass_mev)?;
        Ok(refpart)
    }

    fn statement(&mut self, tokens: &[Spanned]) -> Result<(), BeamError> {
        let mut cursor = Cursor::new(tokens);
        while let Some(Token::Ident(word)) = cursor.peek() {
            if matches!(word.as_str(), "real" | "const" | "int" | "shared")
                && matches!(cursor.peek_at(1), Some(Token::Ident(_)))
            {
                cursor.advance();
            } else {
                break;
            }
        }

        let head = cursor.ident()?.to_string();
        match cursor.peek() {
            Some(Token::Assign) | Some(Token::DeferredAssign) => {
                cursor.advance();
                let value = eval(&mut cursor, self)?;
                self.finish(&cursor)?;
                self.variables.insert(head, value);
            }
            Some(Token::Arrow) => {
                cursor.advance();
                let key = cursor.ident()?.to_string();
                if !(cursor.eat(&Token::Assign) || cursor.eat(&Token::DeferredAssign)) {
                    return Err(cursor.error("madx-syntax", "expected '=' after attribute"));
                }
                let value = self.attr_value(&key, &mut cursor)?;
                self.finish(&cursor)?;
                let def = self.elements.get_mut(&head).ok_or_else(|| {
                    cursor.error("madx-unknown-element", format!("'{head}' is not defined"))
                })?;
                def.attrs.insert(key, value);
            }
            Some(Token::Colon) => {
                cursor.advance();
                let kind = cursor.ident()?.to_string();
                match kind.as_str() {
                    "line" => {
                        cursor.expect(&Token::Assign)?;
                        cursor.expect(&Token::LParen)?;
                        let items = self.line_items(&mut cursor)?;
                        self.finish(&cursor)?;
                        self.lines.insert(head.clone(), items);
                        self.last_line = Some(head);
                    }
                    "sequence" => {
                        return Err(cursor.error(
                            "madx-unsupported",
                            "sequence blocks are not supported; use a line",
                        ))
                    }
                    _ => {
                        let attrs = self.attributes(&mut cursor)?;
                        let def = match self.elements.get(&kind) {
                            Some(parent) => {
                                let mut merged = parent.attrs.clone();
                                merged.extend(attrs);
                                ElementDef {
                                    kind: parent.kind.clone(),
                                    attrs: merged,
                                }
                            }
                            None => ElementDef { kind, attrs },
                        };
                        self.elements.insert(head, def);
                    }
                }
            }
            _ => match head.as_str() {
                "beam" => {
                    let attrs = self.attributes(&mut cursor)?;
                    self.beam.get_or_insert_with(BTreeMap::new).extend(attrs);
                }
                "use" => {
                    let attrs = self.attributes(&mut cursor)?;
                    let line = ["sequence", "period"]
                        .iter()
                        .find_map(|key| match attrs.get(*key) {
                            Some(AttrValue::Name(name)) => Some(name.clone()),
                            _ => None,
                        })
                        .ok_or_else(|| {
                            cursor.error("madx-syntax", "use needs sequence= or period=")
                        })?;
                    self.sequence = Some(line);
                }
                other if SKIPPED_COMMANDS.contains(&other) => {
                    debug!("skipping MAD-X command '{other}'");
                }
                other => {
                    warn!("ignoring unsupported MAD-X statement '{other}' (line {})", cursor.line());
                }
            },
        }
        Ok(())
    }

    fn finish(&self, cursor: &Cursor<'_>) -> Result<(), BeamError> {
        if cursor.is_done() {
            Ok(())
        } else {
            Err(cursor.error(
                "madx-syntax",
                format!("unexpected {:?} before ';'", cursor.peek()),
            ))
        }
    }

    /// Parses `, key=value, flag, ...` up to the end of the statement.
    fn attributes(
        &self,
        cursor: &mut Cursor<'_>,
    ) -> Result<BTreeMap<String, AttrValue>, BeamError> {
        let mut attrs = BTreeMap::new();
        while !cursor.is_done() {
            cursor.expect(&Token::Comma)?;
            let key = cursor.ident()?.to_string();
            if cursor.eat(&Token::Assign) || cursor.eat(&Token::DeferredAssign) {
                let value = self.attr_value(&key, cursor)?;
                attrs.insert(key, value);
            } else {
                attrs.insert(key, AttrValue::Number(1.0));
            }
        }
        Ok(attrs)
    }

    fn attr_value(&self, key: &str, cursor: &mut Cursor<'_>) -> Result<AttrValue, BeamError> {
        match (cursor.peek(), cursor.peek_at(1)) {
            (Some(Token::LBrace), _) => {
                cursor.advance();
                let mut values = Vec::new();
                if !cursor.eat(&Token::RBrace) {
                    loop {
                        values.push(eval(cursor, self)?);
                        if cursor.eat(&Token::RBrace) {
                            break;
                        }
                        cursor.expect(&Token::Comma)?;
                    }
                }
                Ok(AttrValue::Array(values))
            }
            (Some(Token::Str(text)), _) => {
                cursor.advance();
                Ok(AttrValue::Name(text.to_ascii_lowercase()))
            }
            (Some(Token::Ident(name)), None | Some(Token::Comma)) if NAME_KEYS.contains(&key) => {
                cursor.advance();
                Ok(AttrValue::Name(name.clone()))
            }
            _ => Ok(AttrValue::Number(eval(cursor, self)?)),
        }
    }

    /// Parses line items after the opening parenthesis, consuming the closing one.
    fn line_items(&self, cursor: &mut Cursor<'_>) -> Result<Vec<LineItem>, BeamError> {
        let mut items = Vec::new();
        loop {
            let reversed = cursor.eat(&Token::Minus);
            let mut repeat = 1;
            if let (Some(Token::Number(count)), Some(Token::Star)) = (cursor.peek(), cursor.peek_at(1)) {
                if *count < 0.0 || count.fract() != 0.0 {
                    return Err(cursor.error("madx-syntax", "repeat count must be a whole number"));
                }
                repeat = *count as usize;
                cursor.advance();
                cursor.advance();
            }
            if cursor.eat(&Token::LParen) {
                let inner = self.line_items(cursor)?;
                items.push(LineItem::Group {
                    items: inner,
                    repeat,
                    reversed,
                });
            } else {
                let name = cursor.ident()?.to_string();
                items.push(LineItem::Name {
                    name,
                    repeat,
                    reversed,
                });
            }
            if cursor.eat(&Token::RParen) {
                return Ok(items);
            }
            cursor.expect(&Token::Comma)?;
        }
    }

    fn expand(
        &self,
        items: &[LineItem],
        reversed: bool,
        stack: &mut BTreeSet<String>,
        out: &mut Vec<String>,
    ) -> Result<(), BeamError> {
        let ordered: Vec<&LineItem> = if reversed {
            items.iter().rev().collect()
        } else {
            items.iter().collect()
        };
        for item in ordered {
            match item {
                LineItem::Name {
                    name,
                    repeat,
                    reversed: item_reversed,
                } => {
                    for _ in 0..*repeat {
                        if let Some(sub) = self.lines.get(name) {
                            if !stack.insert(name.clone()) {
                                return Err(lattice_error(
                                    "madx-recursive-line",
                                    "line contains itself",
                                )
                                .named(name));
                            }
                            self.expand(sub, reversed ^ item_reversed, stack, out)?;
                            stack.remove(name);
                        } else {
                            out.push(name.clone());
                        }
                    }
                }
                LineItem::Group {
                    items,
                    repeat,
                    reversed: item_reversed,
                } => {
                    for _ in 0..*repeat {
                        self.expand(items, reversed ^ item_reversed, stack, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn missing_mass() -> Result<f64, BeamError> {
    Err(BeamError::Config(ErrorInfo::new(
        "madx-mass",
        "beam needs a particle name or a mass",
    )))
}

trait Named {
    fn named(self, name: &str) -> Self;
}

impl Named for BeamError {
    fn named(self, name: &str) -> Self {
        match self {
            BeamError::Lattice(info) => BeamError::Lattice(info.with_context("name", name)),
            other => other,
        }
    }
}

/// Maps one MAD-X element onto beamline elements.
fn convert(label: &str, def: &ElementDef, nslice: usize) -> Result<Vec<Element>, BeamError> {
    let length = def.number_or("l", 0.0);
    let elements: Vec<Element> = match def.kind.as_str() {
        "drift" => vec![Drift::new(length, nslice)?.into()],
        "quadrupole" => vec![Quad::new(length, def.number_or("k1", 0.0), nslice)?.into()],
        "sbend" => {
            let angle = def.number_or("angle", 0.0);
            if angle == 0.0 {
                vec![Drift::new(length, nslice)?.into()]
            } else {
                let rc = length / angle;
                let g = 2.0 * def.number_or("hgap", 0.0);
                let fint = def.number_or("fint", 0.0);
                let fintx = def.number_or("fintx", fint);
                vec![
                    DipEdge::new(def.number_or("e1", 0.0), rc, g, fint)?.into(),
                    Sbend::new(length, rc, nslice)?.into(),
                    DipEdge::new(def.number_or("e2", 0.0), rc, g, fintx)?.into(),
                ]
            }
        }
        "dipedge" => {
            let h = def.number_or("h", 0.0);
            if h == 0.0 {
                return Err(lattice_error("madx-dipedge", "dipedge needs a non-zero h")
                    .named(label));
            }
            vec![DipEdge::new(
                def.number_or("e1", 0.0),
                1.0 / h,
                2.0 * def.number_or("hgap", 0.0),
                def.number_or("fint", 0.0),
            )?
            .into()]
        }
        "multipole" => {
            let knl = def.array("knl");
            let ksl = def.array("ksl");
            let orders = knl.len().max(ksl.len());
            let first = (0..orders).find(|&i| {
                knl.get(i).copied().unwrap_or(0.0) != 0.0 || ksl.get(i).copied().unwrap_or(0.0) != 0.0
            });
            match first {
                Some(i) => vec![Multipole::new(
                    i as u32 + 1,
                    knl.get(i).copied().unwrap_or(0.0),
                    ksl.get(i).copied().unwrap_or(0.0),
                )?
                .into()],
                None => vec![Marker {}.into()],
            }
        }
        "nllens" => vec![NonlinearLens::new(def.number_or("knll", 0.0), def.number_or("cnll", 0.0))?.into()],
        "marker" | "monitor" | "hmonitor" | "vmonitor" | "instrument" => vec![Marker {}.into()],
        other => {
            return Err(BeamError::Lattice(
                ErrorInfo::new("madx-unknown-type", "unsupported MAD-X element type")
                    .with_context("element", label)
                    .with_context("type", other),
            ))
        }
    };
    Ok(elements)
}

/// Loads the selected beamline of a MAD-X file.
pub fn load_lattice_file(path: impl AsRef<Path>, nslice: usize) -> Result<Lattice, BeamError> {
    MadxDeck::from_file(path)?.lattice(nslice)
}

/// Loads the reference particle from the `beam` command of a MAD-X file.
pub fn load_ref_particle_file(path: impl AsRef<Path>) -> Result<RefPart, BeamError> {
    MadxDeck::from_file(path)?.reference_particle()
}
