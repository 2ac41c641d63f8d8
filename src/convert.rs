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

//! The SDF-to-PO conversion core.
//!
//! [`Converter::convert_file`] makes a single ordered pass over a
//! parsed [`SdfFile`]: for every record it selects the source, target
//! and comment projections, fans the record out into one unit per
//! non-empty translatable subfield, and finally resolves duplicate
//! source strings. Missing-language conditions are reported as
//! [`Diagnostic`] values rather than logged, so callers (and tests)
//! can observe them.

use std::fmt;

use crate::catalog::{Catalog, DuplicateStyle, Header, Unit};
use crate::sdf::{make_key, RecordKey, SdfFile, SdfLine, SdfRecord, Subfield, COMMENT_LANGUAGE};

/// A per-run or per-record condition encountered during conversion.
///
/// None of these abort the conversion: a record without the source
/// language simply contributes no units, and a missing target language
/// means "untranslated".
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A record has no projection for the requested source language.
    SourceLanguageMissing { key: String, language: String },
    /// The requested source language appears nowhere in the input.
    SourceLanguageAbsent {
        language: String,
        filename: String,
        present: Vec<String>,
    },
    /// The requested target language appears nowhere in the input.
    TargetLanguageAbsent {
        language: String,
        filename: String,
        present: Vec<String>,
    },
}

impl Diagnostic {
    /// Whether this should be surfaced as an error (as opposed to a
    /// warning).
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::SourceLanguageMissing { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SourceLanguageMissing { key, language } => {
                write!(f, "{key} language not found: {language}")
            }
            Diagnostic::SourceLanguageAbsent {
                language,
                filename,
                present,
            } => write!(
                f,
                "source language '{language}' not found in input file '{filename}' (contains {})",
                present.join(", ")
            ),
            Diagnostic::TargetLanguageAbsent {
                language,
                filename,
                present,
            } => write!(
                f,
                "target language '{language}' not found in input file '{filename}' (contains {})",
                present.join(", ")
            ),
        }
    }
}

/// Infer the source language when none was given.
///
/// Legacy SDF exports number their source language (e.g. `"01"`)
/// instead of tagging it, so a numeric-looking probe selects the fixed
/// numeric tag; everything else defaults to `en-US`. The probe is the
/// requested target language if any, otherwise the first language tag
/// seen in the input.
pub fn infer_source_language(target_language: Option<&str>, languages: &[String]) -> String {
    let probe = target_language
        .or_else(|| languages.first().map(String::as_str))
        .unwrap_or_default();
    if !probe.is_empty() && probe.chars().all(|ch| ch.is_ascii_digit()) {
        String::from("01")
    } else {
        String::from("en-US")
    }
}

/// Converts parsed SDF records into a PO catalog for one
/// source/target language pair.
pub struct Converter {
    source_language: String,
    target_language: Option<String>,
    blank_target: bool,
    long_keys: bool,
}

impl Converter {
    /// Construct a converter for the given language pair.
    ///
    /// `blank_target` forces every emitted unit's target to be empty
    /// (POT/template generation); `long_keys` selects fully-qualified
    /// location keys for multi-file merges.
    pub fn new(
        source_language: impl Into<String>,
        target_language: Option<String>,
        blank_target: bool,
        long_keys: bool,
    ) -> Converter {
        Converter {
            source_language: source_language.into(),
            target_language,
            blank_target,
            long_keys,
        }
    }

    /// Resolve the source, target and comment projections of a record.
    ///
    /// A missing source language yields `None` (the record contributes
    /// nothing); a missing target language silently resolves to the
    /// blank projection.
    fn resolve<'a>(
        &self,
        record: &'a SdfRecord,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(&'a SdfLine, &'a SdfLine, &'a SdfLine)> {
        let Some(source) = record.language(&self.source_language) else {
            diagnostics.push(Diagnostic::SourceLanguageMissing {
                key: record.key.to_string(),
                language: self.source_language.clone(),
            });
            return None;
        };
        let target = if self.blank_target {
            SdfLine::blank()
        } else {
            self.target_language
                .as_deref()
                .and_then(|tag| record.language(tag))
                .unwrap_or_else(|| SdfLine::blank())
        };
        let comment = record.language(COMMENT_LANGUAGE).unwrap_or_else(|| SdfLine::blank());
        Some((source, target, comment))
    }

    /// Produce the units for one record, in fixed subfield order.
    ///
    /// A subfield that is empty in the source projection yields no
    /// unit, whatever the target holds.
    fn make_units(
        &self,
        source: &SdfLine,
        target: &SdfLine,
        comment: &SdfLine,
        key: &RecordKey,
    ) -> Vec<Unit> {
        let location_key = make_key(key, self.long_keys);
        let mut units = Vec::new();
        for subfield in Subfield::ALL {
            let text = source.subfield(subfield);
            if text.is_empty() {
                continue;
            }
            let mut unit = Unit::new(text, target.subfield(subfield));
            unit.locations
                .push(format!("{location_key}.{}", subfield.name()));
            let note = comment.subfield(subfield);
            if !note.trim().is_empty() {
                unit.notes.push(String::from(note));
            }
            units.push(unit);
        }
        units
    }

    fn make_header(&self, filename: &str) -> Header {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("subcomponent", "ui")
            .append_pair("comment", "")
            .append_pair(
                "short_desc",
                &format!("Localization issue in file: {filename}"),
            )
            .append_pair("component", "l10n")
            .append_pair("form_name", "enter_issue")
            .finish();
        Header {
            report_msgid_bugs_to: format!("http://qa.openoffice.org/issues/enter_bug.cgi?{query}"),
            comment: format!("extracted from {filename}"),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone().unwrap_or_default(),
            ..Header::new()
        }
    }

    /// Convert a whole SDF store into a PO catalog.
    ///
    /// Records are processed in input order and duplicate resolution
    /// runs once over the complete catalog. An empty catalog is a
    /// valid outcome (nothing worth translating), not an error.
    pub fn convert_file(
        &self,
        file: &SdfFile,
        duplicates: DuplicateStyle,
    ) -> (Catalog, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        if !file.languages.contains(&self.source_language) {
            diagnostics.push(Diagnostic::SourceLanguageAbsent {
                language: self.source_language.clone(),
                filename: file.filename.clone(),
                present: file.languages.clone(),
            });
        }
        if let Some(target) = &self.target_language {
            if !file.languages.contains(target) {
                diagnostics.push(Diagnostic::TargetLanguageAbsent {
                    language: target.clone(),
                    filename: file.filename.clone(),
                    present: file.languages.clone(),
                });
            }
        }

        let mut catalog = Catalog::new(self.make_header(&file.filename));
        for record in &file.units {
            if let Some((source, target, comment)) = self.resolve(record, &mut diagnostics) {
                for unit in self.make_units(source, target, comment, &record.key) {
                    catalog.add_unit(unit);
                }
            }
        }
        catalog.remove_duplicates(duplicates);
        (catalog, diagnostics)
    }
}
