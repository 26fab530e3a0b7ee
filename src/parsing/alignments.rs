use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{
    ContextError, Context, Contig, ContigContainer, ContigError, ContigIdGenerator, ContigRegion,
    ContigType, Region, RegionError,
};
use crate::utils::validation::{
    base_extension, check_record_limit, check_sequence_length, is_gzipped, normalize_sequence,
    MAX_ALIGNMENTS,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid alignment input: {0}")]
    InvalidFormat(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Too many alignments: {0} exceeds maximum allowed ({MAX_ALIGNMENTS})")]
    TooManyRecords(usize),

    #[error(transparent)]
    Contig(#[from] ContigError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

fn default_circular() -> bool {
    true
}

fn default_start_index() -> i64 {
    1
}

/// Length, topology and coordinate origin of the sequence being assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub name: String,
    pub length: i64,
    #[serde(default = "default_circular")]
    pub circular: bool,
    #[serde(default = "default_start_index")]
    pub start_index: i64,
}

impl TargetInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, length: i64, circular: bool) -> Self {
        Self {
            name: name.into(),
            length,
            circular,
            start_index: default_start_index(),
        }
    }

    /// Build the shared coordinate context for the target
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if the length is unusable.
    pub fn context(&self) -> Result<Arc<Context>, ParseError> {
        if let Some(msg) = check_sequence_length(self.length) {
            return Err(ParseError::InvalidFormat(format!(
                "Target '{}': {msg}",
                self.name
            )));
        }
        let context =
            Context::new(self.length, self.circular, self.start_index)?.with_name(&self.name);
        Ok(Arc::new(context))
    }
}

/// Orientation of the subject span relative to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    #[serde(alias = "+")]
    Plus,
    #[serde(alias = "-")]
    Minus,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "+" | "plus" | "forward" | "1" => Ok(Strand::Plus),
            "-" | "minus" | "reverse" | "-1" => Ok(Strand::Minus),
            other => Err(format!("unknown strand '{other}'")),
        }
    }
}

/// One aligned span pair as produced by an external aligner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub query_start: i64,
    pub query_end: i64,
    pub subject_id: String,
    pub subject_start: i64,
    pub subject_end: i64,
    pub subject_length: i64,
    #[serde(default)]
    pub subject_circular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<Strand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_filename: Option<String>,
}

impl AlignmentRecord {
    /// Explicit strand, or minus when a linear subject runs backwards
    #[must_use]
    pub fn resolved_strand(&self) -> Strand {
        self.strand.unwrap_or(
            if self.subject_start > self.subject_end && !self.subject_circular {
                Strand::Minus
            } else {
                Strand::Plus
            },
        )
    }
}

/// Parsed alignment input. TSV and CSV files carry no target description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetInfo>,
    pub alignments: Vec<AlignmentRecord>,
}

/// Parse an alignment file, choosing the reader from its extension
///
/// `.json`, `.tsv`/`.txt`/`.tab` and `.csv` are recognised, each optionally
/// gzip-compressed (`.gz`/`.bgz`).
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read,
/// `ParseError::UnsupportedFormat` for unknown extensions, or other parse
/// errors if the content is invalid.
pub fn parse_file(path: &Path) -> Result<AlignmentSet, ParseError> {
    let text = read_text(path)?;
    match base_extension(path).as_deref() {
        Some("json") => parse_json_text(&text),
        Some("tsv" | "txt" | "tab") => parse_tsv_text(&text, '\t'),
        Some("csv") => parse_tsv_text(&text, ','),
        Some(ext) => Err(ParseError::UnsupportedFormat(ext.to_string())),
        None => parse_text(&text),
    }
}

/// Parse text of unknown format: JSON if it opens with `{`, TSV otherwise
///
/// # Errors
///
/// See [`parse_json_text`] and [`parse_tsv_text`].
pub fn parse_text(text: &str) -> Result<AlignmentSet, ParseError> {
    if text.trim_start().starts_with('{') {
        parse_json_text(text)
    } else {
        parse_tsv_text(text, '\t')
    }
}

fn read_text(path: &Path) -> Result<String, ParseError> {
    let mut text = String::new();
    if is_gzipped(path) {
        let file = std::fs::File::open(path)?;
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        text = std::fs::read_to_string(path)?;
    }
    Ok(text)
}

/// Parse `{"target": {...}, "alignments": [...]}`
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_json_text(text: &str) -> Result<AlignmentSet, ParseError> {
    let set: AlignmentSet = serde_json::from_str(text)?;
    if set.alignments.len() > MAX_ALIGNMENTS {
        return Err(ParseError::TooManyRecords(set.alignments.len()));
    }
    Ok(set)
}

const QUERY_START: &str = "query_start";
const QUERY_END: &str = "query_end";
const SUBJECT_ID: &str = "subject_id";
const SUBJECT_START: &str = "subject_start";
const SUBJECT_END: &str = "subject_end";
const SUBJECT_LENGTH: &str = "subject_length";
const SUBJECT_CIRCULAR: &str = "subject_circular";
const STRAND: &str = "strand";
const QUERY_SEQUENCE: &str = "query_sequence";
const SUBJECT_SEQUENCE: &str = "subject_sequence";

/// Column order assumed when a file has no header line
const DEFAULT_COLUMNS: [&str; 10] = [
    QUERY_START,
    QUERY_END,
    SUBJECT_ID,
    SUBJECT_START,
    SUBJECT_END,
    SUBJECT_LENGTH,
    SUBJECT_CIRCULAR,
    STRAND,
    QUERY_SEQUENCE,
    SUBJECT_SEQUENCE,
];

const REQUIRED_COLUMNS: [&str; 6] = [
    QUERY_START,
    QUERY_END,
    SUBJECT_ID,
    SUBJECT_START,
    SUBJECT_END,
    SUBJECT_LENGTH,
];

/// Map header names, including BLAST tabular names, to column keys
fn canonical_column(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "query_start" | "qstart" => Some(QUERY_START),
        "query_end" | "qend" => Some(QUERY_END),
        "subject_id" | "sseqid" | "subject" => Some(SUBJECT_ID),
        "subject_start" | "sstart" => Some(SUBJECT_START),
        "subject_end" | "send" => Some(SUBJECT_END),
        "subject_length" | "slen" => Some(SUBJECT_LENGTH),
        "subject_circular" | "circular" => Some(SUBJECT_CIRCULAR),
        "strand" | "sstrand" => Some(STRAND),
        "query_sequence" | "qseq" => Some(QUERY_SEQUENCE),
        "subject_sequence" | "sseq" => Some(SUBJECT_SEQUENCE),
        _ => None,
    }
}

struct Layout {
    columns: Vec<Option<&'static str>>,
}

impl Layout {
    fn positional() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().copied().map(Some).collect(),
        }
    }

    fn from_header(fields: &[&str]) -> Result<Self, ParseError> {
        let columns: Vec<Option<&'static str>> =
            fields.iter().map(|f| canonical_column(f)).collect();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| !columns.contains(&Some(**name)))
        {
            return Err(ParseError::InvalidFormat(format!(
                "Header is missing the '{missing}' column"
            )));
        }
        Ok(Self { columns })
    }

    fn field<'a>(&self, fields: &[&'a str], name: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|c| *c == Some(name))?;
        fields
            .get(index)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
    }
}

fn is_header(fields: &[&str]) -> bool {
    fields
        .first()
        .and_then(|f| canonical_column(f))
        .is_some_and(|c| c == QUERY_START)
}

fn parse_int(value: Option<&str>, column: &str, line_num: usize) -> Result<i64, ParseError> {
    let value = value.ok_or_else(|| {
        ParseError::InvalidFormat(format!("Line {line_num} is missing '{column}'"))
    })?;
    value.parse().map_err(|_| {
        ParseError::InvalidFormat(format!(
            "Invalid {column} on line {line_num}: '{value}'"
        ))
    })
}

fn parse_bool(value: &str, line_num: usize) -> Result<bool, ParseError> {
    match value.to_lowercase().as_str() {
        "true" | "t" | "yes" | "1" | "circular" => Ok(true),
        "false" | "f" | "no" | "0" | "linear" => Ok(false),
        _ => Err(ParseError::InvalidFormat(format!(
            "Invalid {SUBJECT_CIRCULAR} on line {line_num}: '{value}'"
        ))),
    }
}

/// Parse TSV/CSV text with one alignment per line
///
/// A header line is optional; without one, columns are read in the order
/// `query_start, query_end, subject_id, subject_start, subject_end,
/// subject_length, [subject_circular], [strand], [query_sequence],
/// [subject_sequence]`.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if required fields are missing or
/// not numbers, or `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_tsv_text(text: &str, delimiter: char) -> Result<AlignmentSet, ParseError> {
    let mut alignments = Vec::new();
    let mut layout = Layout::positional();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).collect();

        if first_data_line {
            first_data_line = false;
            if is_header(&fields) {
                layout = Layout::from_header(&fields)?;
                continue;
            }
        }

        let line_num = i + 1;

        let subject_id = layout
            .field(&fields, SUBJECT_ID)
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!("Line {line_num} is missing '{SUBJECT_ID}'"))
            })?
            .to_string();
        let subject_circular = layout
            .field(&fields, SUBJECT_CIRCULAR)
            .map(|v| parse_bool(v, line_num))
            .transpose()?
            .unwrap_or(false);
        let strand = layout
            .field(&fields, STRAND)
            .map(|v| {
                v.parse::<Strand>().map_err(|e| {
                    ParseError::InvalidFormat(format!("Line {line_num}: {e}"))
                })
            })
            .transpose()?;

        let record = AlignmentRecord {
            query_start: parse_int(layout.field(&fields, QUERY_START), QUERY_START, line_num)?,
            query_end: parse_int(layout.field(&fields, QUERY_END), QUERY_END, line_num)?,
            subject_id,
            subject_start: parse_int(layout.field(&fields, SUBJECT_START), SUBJECT_START, line_num)?,
            subject_end: parse_int(layout.field(&fields, SUBJECT_END), SUBJECT_END, line_num)?,
            subject_length: parse_int(
                layout.field(&fields, SUBJECT_LENGTH),
                SUBJECT_LENGTH,
                line_num,
            )?,
            subject_circular,
            strand,
            query_sequence: layout.field(&fields, QUERY_SEQUENCE).map(str::to_string),
            subject_sequence: layout.field(&fields, SUBJECT_SEQUENCE).map(str::to_string),
            query_filename: None,
            subject_filename: None,
        };

        // Check record limit for DOS protection
        if check_record_limit(alignments.len()).is_some() {
            return Err(ParseError::TooManyRecords(alignments.len()));
        }

        alignments.push(record);
    }

    if alignments.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No alignments found in file".to_string(),
        ));
    }

    Ok(AlignmentSet {
        target: None,
        alignments,
    })
}

/// Contigs built from alignment records, ready for planning
#[derive(Debug)]
pub struct BuiltContainer {
    pub target: Arc<Context>,
    pub container: ContigContainer,
    /// Records dropped because their query and subject spans disagree in length
    pub skipped: usize,
}

/// Turn alignment records into one contig per record
///
/// Every subject id gets one shared context. Records whose query and subject
/// lengths differ are skipped with a warning; any other problem is an error.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the target or a subject length is
/// unusable or a subject id is declared with two different shapes,
/// `ParseError::Region` if a span does not fit its sequence, or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn build_container(
    target: &TargetInfo,
    records: &[AlignmentRecord],
) -> Result<BuiltContainer, ParseError> {
    if records.len() > MAX_ALIGNMENTS {
        return Err(ParseError::TooManyRecords(records.len()));
    }

    let target_context = target.context()?;
    let mut subjects: HashMap<&str, Arc<Context>> = HashMap::new();
    let mut container = ContigContainer::new();
    let mut skipped = 0;

    for (i, record) in records.iter().enumerate() {
        let record_num = i + 1;
        let subject = match subjects.entry(record.subject_id.as_str()) {
            Entry::Occupied(entry) => {
                let context = entry.get();
                if context.length() != record.subject_length
                    || context.is_circular() != record.subject_circular
                {
                    return Err(ParseError::InvalidFormat(format!(
                        "Alignment {record_num}: subject '{}' declared with conflicting length or topology",
                        record.subject_id
                    )));
                }
                Arc::clone(context)
            }
            Entry::Vacant(entry) => {
                if let Some(msg) = check_sequence_length(record.subject_length) {
                    return Err(ParseError::InvalidFormat(format!(
                        "Alignment {record_num}: subject '{}': {msg}",
                        record.subject_id
                    )));
                }
                let context = Context::new(
                    record.subject_length,
                    record.subject_circular,
                    target.start_index,
                )?
                .with_name(&record.subject_id);
                Arc::clone(entry.insert(Arc::new(context)))
            }
        };

        match record_to_contig(record, &target_context, subject, container.ids()) {
            Ok(contig) => container.add_contig(contig)?,
            Err(ParseError::Contig(err @ ContigError::LengthMismatch { .. })) => {
                warn!("Skipping alignment {record_num} against '{}': {err}", record.subject_id);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        contigs = container.len(),
        subjects = subjects.len(),
        skipped,
        "Built contig container"
    );

    Ok(BuiltContainer {
        target: target_context,
        container,
        skipped,
    })
}

fn with_sequence(region: ContigRegion, sequence: Option<&str>) -> Result<ContigRegion, ParseError> {
    match sequence {
        Some(raw) => {
            let sequence = normalize_sequence(raw).ok_or_else(|| {
                ParseError::InvalidFormat(format!("Invalid nucleotide sequence '{raw}'"))
            })?;
            Ok(region.with_sequence(sequence))
        }
        None => Ok(region),
    }
}

fn with_filename(region: ContigRegion, filename: Option<&String>) -> ContigRegion {
    match filename {
        Some(name) => region.with_filename(name.as_str()),
        None => region,
    }
}

fn record_to_contig(
    record: &AlignmentRecord,
    target: &Arc<Context>,
    subject: Arc<Context>,
    ids: &ContigIdGenerator,
) -> Result<Contig, ParseError> {
    let strand = record.resolved_strand();
    let query = Region::forward(record.query_start, record.query_end, Arc::clone(target))?;
    let subject_region = match strand {
        Strand::Plus => Region::forward(record.subject_start, record.subject_end, subject)?,
        Strand::Minus => Region::reverse(record.subject_start, record.subject_end, subject)?,
    }
    .with_name(record.subject_id.as_str());

    let query = with_filename(
        with_sequence(ContigRegion::new(query), record.query_sequence.as_deref())?,
        record.query_filename.as_ref(),
    );
    let subject_region = with_filename(
        with_sequence(
            ContigRegion::new(subject_region),
            record.subject_sequence.as_deref(),
        )?,
        record.subject_filename.as_ref(),
    );

    let contig = Contig::new(query, subject_region, ContigType::Alignment, ids)?
        .with_metadata("subject_id", record.subject_id.as_str())
        .with_metadata("strand", strand.to_string());
    Ok(contig)
}
