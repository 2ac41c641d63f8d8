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

//! Convert OpenOffice.org (SDF) localization files to Gettext PO
//! localization files.
//!
//! An SDF export carries every string of the office suite in several
//! languages at once. The [`sdf`] module parses such a file into
//! multilingual records; the [`convert`] module extracts one
//! source/target language pair per record into translation units with
//! provenance metadata; the [`catalog`] module holds the resulting PO
//! catalog, resolves duplicate source strings and serializes the
//! output.
//!
//! The `sdf2po` binary wires these together behind a command line
//! interface.

pub mod catalog;
pub mod convert;
pub mod sdf;
