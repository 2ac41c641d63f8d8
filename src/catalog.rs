// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gettext PO catalog model: translation units, header metadata,
//! duplicate resolution and serialization.
//!
//! The catalog preserves insertion order throughout. Order matters:
//! location-based merge tooling downstream keys off it, and duplicate
//! resolution qualifies units by their first location.

use std::collections::HashMap;
use std::io::{self, Write};

/// How to reconcile units that share an identical source string.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum DuplicateStyle {
    /// Qualify duplicates with a `msgctxt` derived from their first
    /// location so they survive as distinct entries.
    #[default]
    Msgctxt,
    /// Merge duplicates into the first occurrence, unioning their
    /// locations and notes.
    Merge,
    /// Leave duplicates untouched.
    Keep,
}

/// One translation unit: a source/target string pair with provenance.
///
/// The target may be empty, which means "untranslated". `context` is
/// `None` until duplicate resolution assigns a disambiguator.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Unit {
    pub context: Option<String>,
    pub source: String,
    pub target: String,
    /// Location references, each `"<key>.<subfield>"`.
    pub locations: Vec<String>,
    /// Developer notes (`#.` comments).
    pub notes: Vec<String>,
}

impl Unit {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Unit {
        Unit {
            source: source.into(),
            target: target.into(),
            ..Unit::default()
        }
    }

    /// Fold a duplicate into this unit: union locations and notes,
    /// keep the first non-empty target.
    fn merge(&mut self, other: Unit) {
        for location in other.locations {
            if !self.locations.contains(&location) {
                self.locations.push(location);
            }
        }
        for note in other.notes {
            if !self.notes.contains(&note) {
                self.notes.push(note);
            }
        }
        if self.target.is_empty() {
            self.target = other.target;
        }
    }
}

/// PO header metadata.
///
/// Translator-facing fields keep the standard gettext template
/// placeholders; the rest is synthesized per input file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub project_id_version: String,
    pub report_msgid_bugs_to: String,
    pub pot_creation_date: String,
    pub po_revision_date: String,
    pub last_translator: String,
    pub language_team: String,
    pub source_language: String,
    pub target_language: String,
    pub accelerator_marker: String,
    pub merge_on: String,
    /// Developer note shown above the header entry (`#.`).
    pub comment: String,
}

impl Header {
    pub fn new() -> Header {
        Header {
            project_id_version: String::from("PACKAGE VERSION"),
            report_msgid_bugs_to: String::new(),
            pot_creation_date: chrono::Local::now().format("%Y-%m-%d %H:%M%z").to_string(),
            po_revision_date: String::from("YEAR-MO-DA HO:MI+ZONE"),
            last_translator: String::from("FULL NAME <EMAIL@ADDRESS>"),
            language_team: String::from("LANGUAGE <LL@li.org>"),
            source_language: String::new(),
            target_language: String::new(),
            accelerator_marker: String::from("~"),
            merge_on: String::from("location"),
            comment: String::new(),
        }
    }
}

impl Default for Header {
    fn default() -> Header {
        Header::new()
    }
}

/// The output catalog: header metadata plus translation units in
/// insertion order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub header: Header,
    units: Vec<Unit>,
}

impl Catalog {
    pub fn new(header: Header) -> Catalog {
        Catalog {
            header,
            units: Vec::new(),
        }
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Reconcile units sharing an identical source string.
    ///
    /// Idempotent for every style: a second pass over an already
    /// resolved catalog is a no-op.
    pub fn remove_duplicates(&mut self, style: DuplicateStyle) {
        match style {
            DuplicateStyle::Keep => {}
            DuplicateStyle::Merge => {
                let mut units: Vec<Unit> = Vec::with_capacity(self.units.len());
                let mut seen: HashMap<String, usize> = HashMap::new();
                for unit in self.units.drain(..) {
                    match seen.get(&unit.source) {
                        Some(&pos) => units[pos].merge(unit),
                        None => {
                            seen.insert(unit.source.clone(), units.len());
                            units.push(unit);
                        }
                    }
                }
                self.units = units;
            }
            DuplicateStyle::Msgctxt => {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for unit in &self.units {
                    *counts.entry(&unit.source).or_default() += 1;
                }
                let duplicated: Vec<bool> = self
                    .units
                    .iter()
                    .map(|unit| counts[unit.source.as_str()] > 1)
                    .collect();
                let mut units: Vec<Unit> = Vec::with_capacity(self.units.len());
                let mut seen: HashMap<(Option<String>, String), usize> = HashMap::new();
                for (mut unit, duplicated) in self.units.drain(..).zip(duplicated) {
                    if duplicated {
                        // The first location is stable across repeated
                        // passes, so re-resolving yields the same
                        // context.
                        unit.context = unit.locations.first().cloned();
                    }
                    let id = (unit.context.clone(), unit.source.clone());
                    match seen.get(&id) {
                        Some(&pos) => units[pos].merge(unit),
                        None => {
                            seen.insert(id, units.len());
                            units.push(unit);
                        }
                    }
                }
                self.units = units;
            }
        }
    }

    /// Serialize the catalog as a PO file.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let header = &self.header;
        if !header.comment.is_empty() {
            writeln!(out, "#. {}", header.comment)?;
        }
        writeln!(out, "msgid \"\"")?;
        writeln!(out, "msgstr \"\"")?;
        writeln!(
            out,
            "\"Project-Id-Version: {}\\n\"",
            header.project_id_version
        )?;
        writeln!(
            out,
            "\"Report-Msgid-Bugs-To: {}\\n\"",
            header.report_msgid_bugs_to
        )?;
        writeln!(out, "\"POT-Creation-Date: {}\\n\"", header.pot_creation_date)?;
        writeln!(out, "\"PO-Revision-Date: {}\\n\"", header.po_revision_date)?;
        writeln!(out, "\"Last-Translator: {}\\n\"", header.last_translator)?;
        writeln!(out, "\"Language-Team: {}\\n\"", header.language_team)?;
        writeln!(out, "\"Language: {}\\n\"", header.target_language)?;
        writeln!(out, "\"MIME-Version: 1.0\\n\"")?;
        writeln!(out, "\"Content-Type: text/plain; charset=UTF-8\\n\"")?;
        writeln!(out, "\"Content-Transfer-Encoding: 8bit\\n\"")?;
        writeln!(
            out,
            "\"X-Source-Language: {}\\n\"",
            header.source_language
        )?;
        writeln!(
            out,
            "\"X-Accelerator-Marker: {}\\n\"",
            header.accelerator_marker
        )?;
        writeln!(out, "\"X-Merge-On: {}\\n\"", header.merge_on)?;

        for unit in &self.units {
            writeln!(out)?;
            for note in &unit.notes {
                for line in note.lines() {
                    writeln!(out, "#. {line}")?;
                }
            }
            if !unit.locations.is_empty() {
                writeln!(out, "#: {}", unit.locations.join(" "))?;
            }
            if let Some(context) = &unit.context {
                writeln!(out, "msgctxt \"{}\"", escape(context))?;
            }
            writeln!(out, "msgid \"{}\"", escape(&unit.source))?;
            writeln!(out, "msgstr \"{}\"", escape(&unit.target))?;
        }
        Ok(())
    }
}

/// Escape a string for a single-line PO string literal.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unit(source: &str, target: &str, location: &str) -> Unit {
        let mut unit = Unit::new(source, target);
        unit.locations.push(String::from(location));
        unit
    }

    fn catalog(units: Vec<Unit>) -> Catalog {
        let mut catalog = Catalog::new(Header::new());
        for unit in units {
            catalog.add_unit(unit);
        }
        catalog
    }

    fn summary(catalog: &Catalog) -> Vec<(Option<&str>, &str, &str, Vec<&str>)> {
        catalog
            .units()
            .map(|unit| {
                (
                    unit.context.as_deref(),
                    unit.source.as_str(),
                    unit.target.as_str(),
                    unit.locations.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_remove_duplicates_keep() {
        let mut catalog = catalog(vec![
            unit("OK", "", "a.src#1.text"),
            unit("OK", "", "b.src#2.text"),
        ]);
        catalog.remove_duplicates(DuplicateStyle::Keep);
        assert_eq!(
            summary(&catalog),
            vec![
                (None, "OK", "", vec!["a.src#1.text"]),
                (None, "OK", "", vec!["b.src#2.text"]),
            ]
        );
    }

    #[test]
    fn test_remove_duplicates_msgctxt() {
        let mut catalog = catalog(vec![
            unit("OK", "", "a.src#1.text"),
            unit("Cancel", "", "a.src#2.text"),
            unit("OK", "", "b.src#3.text"),
        ]);
        catalog.remove_duplicates(DuplicateStyle::Msgctxt);
        assert_eq!(
            summary(&catalog),
            vec![
                (Some("a.src#1.text"), "OK", "", vec!["a.src#1.text"]),
                (None, "Cancel", "", vec!["a.src#2.text"]),
                (Some("b.src#3.text"), "OK", "", vec!["b.src#3.text"]),
            ]
        );
    }

    #[test]
    fn test_remove_duplicates_merge() {
        let mut first = unit("OK", "", "a.src#1.text");
        first.notes.push(String::from("first note"));
        let mut second = unit("OK", "Oui", "b.src#2.text");
        second.notes.push(String::from("second note"));
        let mut catalog = catalog(vec![first, second, unit("Cancel", "", "a.src#3.text")]);
        catalog.remove_duplicates(DuplicateStyle::Merge);
        assert_eq!(
            summary(&catalog),
            vec![
                (None, "OK", "Oui", vec!["a.src#1.text", "b.src#2.text"]),
                (None, "Cancel", "", vec!["a.src#3.text"]),
            ]
        );
        assert_eq!(
            catalog.units().next().unwrap().notes,
            vec!["first note", "second note"]
        );
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        for style in [
            DuplicateStyle::Msgctxt,
            DuplicateStyle::Merge,
            DuplicateStyle::Keep,
        ] {
            let mut once = catalog(vec![
                unit("OK", "", "a.src#1.text"),
                unit("OK", "", "b.src#2.text"),
                unit("Cancel", "", "a.src#3.text"),
            ]);
            once.remove_duplicates(style);
            let mut twice = once.clone();
            twice.remove_duplicates(style);
            assert_eq!(summary(&once), summary(&twice), "style {style:?}");
        }
    }

    #[test]
    fn test_remove_duplicates_msgctxt_identical_context_merges() {
        // Two units with the same msgid and the same first location
        // cannot stay distinct once qualified.
        let mut catalog = catalog(vec![
            unit("OK", "", "a.src#1.text"),
            unit("OK", "", "a.src#1.text"),
        ]);
        catalog.remove_duplicates(DuplicateStyle::Msgctxt);
        assert_eq!(
            summary(&catalog),
            vec![(Some("a.src#1.text"), "OK", "", vec!["a.src#1.text"])]
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a \"quote\""), "a \\\"quote\\\"");
        assert_eq!(escape("back\\slash"), "back\\\\slash");
        assert_eq!(escape("line\nbreak\ttab"), "line\\nbreak\\ttab");
    }

    #[test]
    fn test_write_to() {
        let mut header = Header::new();
        header.pot_creation_date = String::from("2023-01-01 12:00+0000");
        header.report_msgid_bugs_to = String::from("http://example.com/bugs");
        header.source_language = String::from("en-US");
        header.target_language = String::from("fr");
        header.comment = String::from("extracted from test.sdf");
        let mut catalog = Catalog::new(header);
        let mut first = unit("Hello", "Bonjour", "dialog.src#grp.lid.text");
        first.notes.push(String::from("a developer note"));
        catalog.add_unit(first);
        let mut second = unit("OK", "", "dialog.src#grp.ok.text");
        second.context = Some(String::from("dialog.src#grp.ok.text"));
        catalog.add_unit(second);

        let mut out = Vec::new();
        catalog.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#. extracted from test.sdf\n\
             msgid \"\"\n\
             msgstr \"\"\n\
             \"Project-Id-Version: PACKAGE VERSION\\n\"\n\
             \"Report-Msgid-Bugs-To: http://example.com/bugs\\n\"\n\
             \"POT-Creation-Date: 2023-01-01 12:00+0000\\n\"\n\
             \"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\\n\"\n\
             \"Last-Translator: FULL NAME <EMAIL@ADDRESS>\\n\"\n\
             \"Language-Team: LANGUAGE <LL@li.org>\\n\"\n\
             \"Language: fr\\n\"\n\
             \"MIME-Version: 1.0\\n\"\n\
             \"Content-Type: text/plain; charset=UTF-8\\n\"\n\
             \"Content-Transfer-Encoding: 8bit\\n\"\n\
             \"X-Source-Language: en-US\\n\"\n\
             \"X-Accelerator-Marker: ~\\n\"\n\
             \"X-Merge-On: location\\n\"\n\
             \n\
             #. a developer note\n\
             #: dialog.src#grp.lid.text\n\
             msgid \"Hello\"\n\
             msgstr \"Bonjour\"\n\
             \n\
             #: dialog.src#grp.ok.text\n\
             msgctxt \"dialog.src#grp.ok.text\"\n\
             msgid \"OK\"\n\
             msgstr \"\"\n"
        );
    }
}
