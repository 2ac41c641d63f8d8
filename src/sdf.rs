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

//! Parsing and in-memory model for OpenOffice.org SDF/GSI files.
//!
//! An SDF file is a flat, line-oriented export: every line is one
//! language's rendering of one translatable resource, with exactly 15
//! tab-separated fields. Lines sharing the same structural key form a
//! multilingual record ([`SdfRecord`]), and a whole file (or a merged
//! set of files) is an [`SdfFile`].

use std::collections::HashMap;
use std::fmt;

use log::warn;

/// Pseudo-language tag whose lines carry translator/developer
/// annotations instead of translated text.
pub const COMMENT_LANGUAGE: &str = "x-comment";

/// One of the three translatable subfields carried per language.
///
/// The iteration order of [`Subfield::ALL`] is fixed and significant:
/// downstream tooling relies on units being emitted in this order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Subfield {
    Text,
    QuickHelpText,
    Title,
}

impl Subfield {
    pub const ALL: [Subfield; 3] = [Subfield::Text, Subfield::QuickHelpText, Subfield::Title];

    /// The subfield name as it appears in location references.
    pub fn name(self) -> &'static str {
        match self {
            Subfield::Text => "text",
            Subfield::QuickHelpText => "quickhelptext",
            Subfield::Title => "title",
        }
    }
}

/// Structural key identifying one translatable resource across
/// languages.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RecordKey {
    pub project: String,
    pub source_file: String,
    pub resource_type: String,
    pub group_id: String,
    pub local_id: String,
    pub platform: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.project,
            self.source_file,
            self.resource_type,
            self.group_id,
            self.local_id,
            self.platform
        )
    }
}

/// Build the textual location key for a record.
///
/// With `long_keys` the key is qualified with the project and the full
/// source file path, which keeps keys from distinct source files from
/// colliding when several SDF files are merged into one catalog. The
/// short form uses only the last path component of the source file.
pub fn make_key(key: &RecordKey, long_keys: bool) -> String {
    let source_file = key.source_file.replace('\\', "/");
    let source_base = if long_keys {
        format!("{}/{}", key.project, source_file)
    } else {
        source_file
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    };
    let mut id = if key.group_id.is_empty() || key.local_id.is_empty() {
        format!("{}{}", key.group_id, key.local_id)
    } else {
        format!("{}.{}", key.group_id, key.local_id)
    };
    if !key.resource_type.is_empty() {
        id = format!("{}.{}", id, key.resource_type);
    }
    format!("{source_base}#{id}").replace([' ', '\t'], "_")
}

/// One SDF line: a single language's rendering of one record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SdfLine {
    pub project: String,
    pub source_file: String,
    pub dummy: String,
    pub resource_type: String,
    pub group_id: String,
    pub local_id: String,
    pub help_id: String,
    pub platform: String,
    pub width: String,
    pub language: String,
    pub text: String,
    pub help_text: String,
    pub quick_help_text: String,
    pub title: String,
    pub timestamp: String,
}

impl SdfLine {
    /// Parse one raw SDF line. Returns `None` unless the line has
    /// exactly 15 tab-separated fields.
    fn parse(line: &str) -> Option<SdfLine> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [project, source_file, dummy, resource_type, group_id, local_id, help_id, platform, width, language, text, help_text, quick_help_text, title, timestamp] =
            fields.as_slice()
        else {
            return None;
        };
        Some(SdfLine {
            project: String::from(*project),
            source_file: String::from(*source_file),
            dummy: String::from(*dummy),
            resource_type: String::from(*resource_type),
            group_id: String::from(*group_id),
            local_id: String::from(*local_id),
            help_id: String::from(*help_id),
            platform: String::from(*platform),
            width: String::from(*width),
            language: String::from(*language),
            text: String::from(*text),
            help_text: String::from(*help_text),
            quick_help_text: String::from(*quick_help_text),
            title: String::from(*title),
            timestamp: String::from(*timestamp),
        })
    }

    /// The structural key shared by all languages of the same record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            project: self.project.clone(),
            source_file: self.source_file.clone(),
            resource_type: self.resource_type.clone(),
            group_id: self.group_id.clone(),
            local_id: self.local_id.clone(),
            platform: self.platform.clone(),
        }
    }

    /// Read one of the three translatable subfields.
    pub fn subfield(&self, subfield: Subfield) -> &str {
        match subfield {
            Subfield::Text => &self.text,
            Subfield::QuickHelpText => &self.quick_help_text,
            Subfield::Title => &self.title,
        }
    }

    /// The designated all-empty projection, used wherever a language is
    /// missing from a record ("untranslated", not an error).
    pub fn blank() -> &'static SdfLine {
        static BLANK: SdfLine = SdfLine {
            project: String::new(),
            source_file: String::new(),
            dummy: String::new(),
            resource_type: String::new(),
            group_id: String::new(),
            local_id: String::new(),
            help_id: String::new(),
            platform: String::new(),
            width: String::new(),
            language: String::new(),
            text: String::new(),
            help_text: String::new(),
            quick_help_text: String::new(),
            title: String::new(),
            timestamp: String::new(),
        };
        &BLANK
    }
}

/// One multilingual record: the same string observed across several
/// language projections.
#[derive(Clone, Debug)]
pub struct SdfRecord {
    pub key: RecordKey,
    languages: HashMap<String, SdfLine>,
}

impl SdfRecord {
    fn new(key: RecordKey, line: SdfLine) -> SdfRecord {
        let mut record = SdfRecord {
            key,
            languages: HashMap::new(),
        };
        record.add_line(line);
        record
    }

    fn add_line(&mut self, line: SdfLine) {
        // A later line for the same language replaces the earlier one.
        self.languages.insert(line.language.clone(), line);
    }

    /// Look up one language's projection of this record.
    pub fn language(&self, tag: &str) -> Option<&SdfLine> {
        self.languages.get(tag)
    }
}

/// A parsed SDF store: all records of one file, or of several files
/// merged together, in input order.
#[derive(Clone, Debug, Default)]
pub struct SdfFile {
    pub filename: String,
    /// Language tags in first-seen order.
    pub languages: Vec<String>,
    pub units: Vec<SdfRecord>,
    index: HashMap<RecordKey, usize>,
}

impl SdfFile {
    pub fn new(filename: impl Into<String>) -> SdfFile {
        SdfFile {
            filename: filename.into(),
            ..SdfFile::default()
        }
    }

    /// Parse raw SDF bytes and append the records to this store.
    ///
    /// May be called once per input file when merging a directory of
    /// SDF files. Empty lines are ignored; lines that do not have
    /// exactly 15 fields are logged and skipped, so parsing never
    /// fails.
    pub fn parse(&mut self, bytes: &[u8]) {
        let content = String::from_utf8_lossy(bytes);
        for (lineno, raw) in content.lines().enumerate() {
            if raw.is_empty() {
                continue;
            }
            match SdfLine::parse(raw) {
                Some(line) => self.add_line(line),
                None => warn!(
                    "{}:{}: skipping malformed SDF line",
                    self.filename,
                    lineno + 1
                ),
            }
        }
    }

    fn add_line(&mut self, line: SdfLine) {
        if !self.languages.contains(&line.language) {
            self.languages.push(line.language.clone());
        }
        let key = line.key();
        match self.index.get(&key) {
            Some(&pos) => self.units[pos].add_line(line),
            None => {
                self.index.insert(key.clone(), self.units.len());
                self.units.push(SdfRecord::new(key, line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Format a 15-field SDF line for the given key, language and
    /// subfields.
    fn sdf_line(
        file: &str,
        group: &str,
        local: &str,
        language: &str,
        text: &str,
        quick_help: &str,
        title: &str,
    ) -> String {
        [
            "proj",
            file,
            "0",
            "fixedtext",
            group,
            local,
            "",
            "",
            "0",
            language,
            text,
            "",
            quick_help,
            title,
            "2023-01-01",
        ]
        .join("\t")
    }

    fn parse(content: &str) -> SdfFile {
        let mut file = SdfFile::new("test.sdf");
        file.parse(content.as_bytes());
        file
    }

    #[test]
    fn test_parse_groups_languages_into_records() {
        let content = [
            sdf_line("dialog.src", "grp", "lid", "en-US", "Hello", "", ""),
            sdf_line("dialog.src", "grp", "lid", "fr", "Bonjour", "", ""),
            sdf_line("dialog.src", "grp", "other", "en-US", "Bye", "", ""),
        ]
        .join("\n");
        let file = parse(&content);

        assert_eq!(file.languages, vec!["en-US", "fr"]);
        assert_eq!(file.units.len(), 2);
        assert_eq!(file.units[0].language("en-US").unwrap().text, "Hello");
        assert_eq!(file.units[0].language("fr").unwrap().text, "Bonjour");
        assert_eq!(file.units[1].language("en-US").unwrap().text, "Bye");
        assert_eq!(file.units[1].language("fr"), None);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let content = format!(
            "not\ta\tvalid\tline\n\n{}",
            sdf_line("dialog.src", "grp", "lid", "en-US", "Hello", "", "")
        );
        let file = parse(&content);
        assert_eq!(file.units.len(), 1);
    }

    #[test]
    fn test_parse_later_line_replaces_same_language() {
        let content = [
            sdf_line("dialog.src", "grp", "lid", "en-US", "Old", "", ""),
            sdf_line("dialog.src", "grp", "lid", "en-US", "New", "", ""),
        ]
        .join("\n");
        let file = parse(&content);
        assert_eq!(file.units.len(), 1);
        assert_eq!(file.units[0].language("en-US").unwrap().text, "New");
    }

    #[test]
    fn test_record_key_display() {
        let content = sdf_line("dialog.src", "grp", "lid", "en-US", "Hello", "", "");
        let file = parse(&content);
        assert_eq!(
            file.units[0].key.to_string(),
            "proj/dialog.src/fixedtext/grp/lid/"
        );
    }

    #[test]
    fn test_blank_projection_is_empty() {
        let blank = SdfLine::blank();
        for subfield in Subfield::ALL {
            assert_eq!(blank.subfield(subfield), "");
        }
    }

    fn key(project: &str, source_file: &str, resource_type: &str, group: &str, local: &str) -> RecordKey {
        RecordKey {
            project: String::from(project),
            source_file: String::from(source_file),
            resource_type: String::from(resource_type),
            group_id: String::from(group),
            local_id: String::from(local),
            platform: String::new(),
        }
    }

    #[test]
    fn test_make_key_short() {
        let key = key("proj", "source\\ui\\dialog.src", "fixedtext", "grp", "lid");
        assert_eq!(make_key(&key, false), "dialog.src#grp.lid.fixedtext");
    }

    #[test]
    fn test_make_key_long() {
        let key = key("proj", "source\\ui\\dialog.src", "fixedtext", "grp", "lid");
        assert_eq!(
            make_key(&key, true),
            "proj/source/ui/dialog.src#grp.lid.fixedtext"
        );
    }

    #[test]
    fn test_make_key_empty_parts() {
        assert_eq!(
            make_key(&key("proj", "dialog.src", "", "grp", ""), false),
            "dialog.src#grp"
        );
        assert_eq!(
            make_key(&key("proj", "dialog.src", "", "", "lid"), false),
            "dialog.src#lid"
        );
    }

    #[test]
    fn test_make_key_normalizes_whitespace() {
        assert_eq!(
            make_key(&key("proj", "some file.src", "", "a group", "lid"), false),
            "some_file.src#a_group.lid"
        );
    }

    #[test]
    fn test_make_key_long_distinct_across_files() {
        let first = key("proj", "a\\dialog.src", "fixedtext", "grp", "lid");
        let second = key("proj", "b\\dialog.src", "fixedtext", "grp", "lid");
        // The short forms collide, the long forms must not.
        assert_eq!(make_key(&first, false), make_key(&second, false));
        assert_ne!(make_key(&first, true), make_key(&second, true));
    }
}
