use crate::config::IngestConfig;
use crate::dataset::{DataRow, DataTable, TableKind};
use crate::error::{MaveError, MaveResult};
use crate::hgvs::{parse, CoordinateSpace, Prefix, VariantNotation};
use crate::io::ReadReport;
use crate::report::{Issue, IssueCode, RowError};
use crate::seq::SequenceType;
use crate::validate::{check_variant, ValidatedTarget};
use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Alternative header for the transcript column.
pub const HGVS_TX: &str = "hgvs_tx";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What a table is and what its variants are checked against.
#[derive(Clone, Copy, Debug)]
pub struct TableSpec<'a> {
    pub kind: TableKind,
    pub target: Option<&'a ValidatedTarget>,
    pub config: &'a IngestConfig,
}

impl<'a> TableSpec<'a> {
    pub fn new(kind: TableKind, config: &'a IngestConfig) -> Self {
        Self {
            kind,
            target: None,
            config,
        }
    }

    pub fn with_target(mut self, target: &'a ValidatedTarget) -> Self {
        self.target = Some(target);
        self
    }
}

/// Column layout resolved from the header row.
#[derive(Debug)]
struct Layout {
    width: usize,
    hgvs: Vec<(CoordinateSpace, usize)>,
    numeric: Vec<(String, usize)>,
}

impl Layout {
    fn declares(&self, space: CoordinateSpace) -> bool {
        self.hgvs.iter().any(|(s, _)| *s == space)
    }
}

/// A row that passed every per-cell check but has no primary key yet.
struct ParsedRow {
    line: usize,
    hgvs_nt: Option<VariantNotation>,
    hgvs_tx: Option<VariantNotation>,
    hgvs_pro: Option<VariantNotation>,
    values: Vec<Option<f64>>,
}

impl ParsedRow {
    fn with_key(self, key_space: CoordinateSpace) -> Result<DataRow, usize> {
        let key = match key_space {
            CoordinateSpace::Nucleotide => &self.hgvs_nt,
            CoordinateSpace::Transcript => &self.hgvs_tx,
            CoordinateSpace::Protein => &self.hgvs_pro,
        };
        let Some(primary_key) = key.clone() else {
            return Err(self.line);
        };
        Ok(DataRow {
            line: self.line,
            primary_key,
            hgvs_nt: self.hgvs_nt,
            hgvs_tx: self.hgvs_tx,
            hgvs_pro: self.hgvs_pro,
            values: self.values,
        })
    }
}

/// Hands the csv reader a table's lines minus comments, blank lines and a
/// leading BOM, remembering the physical line each forwarded line came from.
///
/// Lines are `\n` terminated on the way out so the reader's line count and
/// ours agree. Lines inside an open quoted cell are always forwarded.
struct SourceLines<R> {
    inner: R,
    line: Vec<u8>,
    consumed: usize,
    physical: usize,
    in_quotes: bool,
    origins: VecDeque<usize>,
    /// Forwarded line number of `origins[0]`.
    first: u64,
}

impl<R: BufRead> SourceLines<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line: Vec::new(),
            consumed: 0,
            physical: 0,
            in_quotes: false,
            origins: VecDeque::new(),
            first: 1,
        }
    }

    /// Physical line of forwarded line `forwarded`. Lines before it are
    /// forgotten, so lookups must not go backwards.
    fn physical_line(&mut self, forwarded: u64) -> usize {
        while self.first < forwarded && self.origins.len() > 1 {
            self.origins.pop_front();
            self.first += 1;
        }
        self.origins.front().copied().unwrap_or(self.physical)
    }

    fn next_line(&mut self) -> io::Result<bool> {
        loop {
            self.line.clear();
            self.consumed = 0;
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(false);
            }
            self.physical += 1;
            if self.physical == 1 && self.line.starts_with(UTF8_BOM) {
                self.line.drain(..UTF8_BOM.len());
            }
            if self.line.ends_with(b"\r\n") {
                self.line.truncate(self.line.len() - 2);
                self.line.push(b'\n');
            }

            let ignored = !self.in_quotes && {
                let text = self.line.trim_ascii_start();
                text.is_empty() || text.starts_with(b"#")
            };
            let quotes = self.line.iter().filter(|&&b| b == b'"').count();
            self.in_quotes ^= quotes % 2 == 1;
            if !ignored {
                self.origins.push_back(self.physical);
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> Read for SourceLines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.consumed == self.line.len() && !self.next_line()? {
            return Ok(0);
        }
        let pending = &self.line[self.consumed..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.consumed += n;
        Ok(n)
    }
}

pub fn ingest_path(
    path: impl AsRef<Path>,
    spec: &TableSpec<'_>,
) -> MaveResult<ReadReport<DataTable>> {
    let file = File::open(path.as_ref())?;
    ingest(file, spec)
}

/// Stream one scores or counts table.
///
/// Blank lines and lines starting with `#` are skipped; row numbers in the
/// report are physical line numbers. Rows that fail are dropped and
/// reported; header problems, unreadable input and schema violations found
/// mid-stream are returned as `Err`.
///
/// The primary key is `hgvs_nt`, unless that column is missing or null in
/// every row, in which case it is `hgvs_pro`.
pub fn ingest<R: Read>(reader: R, spec: &TableSpec<'_>) -> MaveResult<ReadReport<DataTable>> {
    let table = spec.kind;
    let csv_error = |source| MaveError::CsvParse { table, source };
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(SourceLines::new(BufReader::new(reader)));

    let mut record = StringRecord::new();
    if !rdr.read_record(&mut record).map_err(csv_error)? {
        info!(%table, "empty table");
        return Ok(ReadReport {
            data: DataTable::empty(table),
            skipped: Vec::new(),
        });
    }
    let layout = resolve_layout(&record, spec)?;

    let mut parsed: Vec<ParsedRow> = Vec::new();
    let mut skipped: Vec<RowError> = Vec::new();
    let mut filled: HashSet<CoordinateSpace> = HashSet::new();

    while rdr.read_record(&mut record).map_err(csv_error)? {
        let line = match record.position() {
            Some(pos) => rdr.get_mut().physical_line(pos.line()),
            None => 0,
        };
        for &(space, idx) in &layout.hgvs {
            if record.get(idx).is_some_and(|cell| !spec.config.is_null(cell)) {
                filled.insert(space);
            }
        }
        match read_row(&record, line, &layout, spec) {
            Ok(row) => parsed.push(row),
            Err(issue) if issue.code.is_row_local() => {
                debug!(%table, line, code = %issue.code, "dropping row");
                skipped.push(issue);
            }
            Err(issue) => {
                return Err(MaveError::schema(
                    table,
                    format!("line {line}: {}", issue.message),
                ))
            }
        }
    }

    let nt_filled = filled.contains(&CoordinateSpace::Nucleotide);
    if filled.contains(&CoordinateSpace::Transcript) && !nt_filled {
        return Err(MaveError::schema(
            table,
            "transcript variants require genomic variants in 'hgvs_nt'",
        ));
    }
    let key_space = if !nt_filled && layout.declares(CoordinateSpace::Protein) {
        CoordinateSpace::Protein
    } else {
        CoordinateSpace::Nucleotide
    };

    let mut rows: Vec<DataRow> = Vec::with_capacity(parsed.len());
    let mut seen: HashMap<VariantNotation, usize> = HashMap::new();
    for row in parsed {
        let row = match row.with_key(key_space) {
            Ok(row) => row,
            Err(line) => {
                skipped.push(Issue::row(
                    table,
                    line,
                    IssueCode::ParseError,
                    format!("missing variant in key column '{}'", key_space.column()),
                ));
                continue;
            }
        };
        if let Some(first) = seen.get(&row.primary_key) {
            skipped.push(Issue::row(
                table,
                row.line,
                IssueCode::DuplicateKeyError,
                format!(
                    "variant '{}' was already defined on line {first}",
                    row.primary_key
                ),
            ));
            continue;
        }
        seen.insert(row.primary_key.clone(), row.line);
        rows.push(row);
    }
    skipped.sort_by_key(|issue| issue.row_number);

    info!(
        %table,
        key = key_space.column(),
        rows = rows.len(),
        dropped = skipped.len(),
        "table ingested"
    );
    let columns = layout.numeric.into_iter().map(|(name, _)| name).collect();
    Ok(ReadReport {
        data: DataTable::new(table, Some(key_space), columns, rows),
        skipped,
    })
}

fn resolve_layout(headers: &StringRecord, spec: &TableSpec<'_>) -> MaveResult<Layout> {
    let table = spec.kind;
    let config = spec.config;

    let mut names = HashSet::new();
    for name in headers.iter() {
        if config.is_null(name) {
            return Err(MaveError::schema(
                table,
                format!("column names cannot be empty or null-like ('{name}')"),
            ));
        }
        if !names.insert(name) {
            return Err(MaveError::schema(
                table,
                format!("column '{name}' appears more than once"),
            ));
        }
    }

    let position = |name: &str| headers.iter().position(|h| h == name);
    let nt = position(CoordinateSpace::Nucleotide.column());
    let pro = position(CoordinateSpace::Protein.column());
    let splice = position(CoordinateSpace::Transcript.column());
    let tx = position(HGVS_TX);

    let transcript = match (splice, tx) {
        (Some(_), Some(_)) => {
            return Err(MaveError::schema(
                table,
                format!(
                    "only one of '{}' and '{HGVS_TX}' may be given",
                    CoordinateSpace::Transcript.column()
                ),
            ))
        }
        (a, b) => a.or(b),
    };
    if transcript.is_some() && nt.is_none() {
        return Err(MaveError::schema(
            table,
            "transcript variants require a genomic 'hgvs_nt' column",
        ));
    }
    if nt.is_none() && pro.is_none() {
        return Err(MaveError::schema(
            table,
            "at least one of 'hgvs_nt' or 'hgvs_pro' must be present",
        ));
    }
    if table == TableKind::Scores
        && config.require_score_column
        && position(&config.score_column).is_none()
    {
        return Err(MaveError::schema(
            table,
            format!("a '{}' column is required", config.score_column),
        ));
    }

    let mut hgvs = Vec::new();
    if let Some(i) = nt {
        hgvs.push((CoordinateSpace::Nucleotide, i));
    }
    if let Some(i) = transcript {
        hgvs.push((CoordinateSpace::Transcript, i));
    }
    if let Some(i) = pro {
        hgvs.push((CoordinateSpace::Protein, i));
    }
    let numeric = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !hgvs.iter().any(|(_, h)| h == i))
        .map(|(i, name)| (name.to_string(), i))
        .collect();

    Ok(Layout {
        width: headers.len(),
        hgvs,
        numeric,
    })
}

fn read_row(
    record: &StringRecord,
    line: usize,
    layout: &Layout,
    spec: &TableSpec<'_>,
) -> Result<ParsedRow, RowError> {
    let table = spec.kind;
    let config = spec.config;
    let issue = |code, message: String| Issue::row(table, line, code, message);

    if record.len() != layout.width {
        return Err(issue(
            IssueCode::MalformedRowError,
            format!("expected {} cells, found {}", layout.width, record.len()),
        ));
    }
    let has_transcript = layout.declares(CoordinateSpace::Transcript);
    let protein_target = spec
        .target
        .is_some_and(|t| t.sequence_type() == SequenceType::Protein);

    let mut hgvs_nt = None;
    let mut hgvs_tx = None;
    let mut hgvs_pro = None;

    for &(space, idx) in &layout.hgvs {
        let cell = &record[idx];
        if config.is_null(cell) {
            continue;
        }
        if space == CoordinateSpace::Nucleotide && protein_target {
            return Err(issue(
                IssueCode::SchemaError,
                "'hgvs_nt' variants cannot be defined against a protein target".to_string(),
            ));
        }

        let variant = parse(cell, space).map_err(|e| issue(e.code(), e.to_string()))?;
        if space == CoordinateSpace::Nucleotide {
            let genomic = variant.prefix() == Prefix::Genomic;
            if has_transcript && !genomic {
                return Err(issue(
                    IssueCode::SchemaError,
                    format!(
                        "'{variant}': 'hgvs_nt' variants must use the 'g.' prefix \
                         when transcript variants are given"
                    ),
                ));
            }
            if !has_transcript && genomic {
                return Err(issue(
                    IssueCode::PrefixError,
                    format!("'{variant}': 'g.' variants require a transcript column"),
                ));
            }
        }
        let checked = space != CoordinateSpace::Protein || config.validate_protein;
        if let Some(target) = spec.target.filter(|_| checked) {
            check_variant(&variant, target).map_err(|e| issue(e.code(), e.to_string()))?;
        }

        match space {
            CoordinateSpace::Nucleotide => hgvs_nt = Some(variant),
            CoordinateSpace::Transcript => hgvs_tx = Some(variant),
            CoordinateSpace::Protein => hgvs_pro = Some(variant),
        }
    }

    let mut values = Vec::with_capacity(layout.numeric.len());
    for (name, idx) in &layout.numeric {
        let cell = &record[*idx];
        if config.is_null(cell) {
            values.push(None);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => values.push(Some(value)),
            _ => {
                return Err(issue(
                    IssueCode::MalformedRowError,
                    format!("column '{name}': '{cell}' is not a finite number"),
                ))
            }
        }
    }
    Ok(ParsedRow {
        line,
        hgvs_nt,
        hgvs_tx,
        hgvs_pro,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::TargetSequence;
    use crate::validate::validate;

    fn target(seq: &str) -> ValidatedTarget {
        validate(&TargetSequence::infer(seq)).unwrap()
    }

    fn read(
        csv: &str,
        kind: TableKind,
        target: Option<&ValidatedTarget>,
    ) -> MaveResult<ReadReport<DataTable>> {
        let config = IngestConfig::default();
        let mut spec = TableSpec::new(kind, &config);
        spec.target = target;
        ingest(csv.as_bytes(), &spec)
    }

    fn codes(report: &ReadReport<DataTable>) -> Vec<(usize, IssueCode)> {
        report.skipped.iter().map(|i| (i.row_number, i.code)).collect()
    }

    #[test]
    fn basic_scores_table() {
        let t = target("ATGGTTTAA");
        let report = read(
            "# exported scores\n\
             hgvs_nt,hgvs_pro,score,se\n\
             c.4G>A,p.Val2Ile,1.2,NA\n\n\
             c.1A>G,,-0.5,0.1\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        let table = report.data;
        assert_eq!(table.key_space(), Some(CoordinateSpace::Nucleotide));
        assert_eq!(table.columns(), &["score".to_string(), "se".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].line, 3);
        assert_eq!(
            table.rows()[0].hgvs_pro.as_ref().map(|v| v.to_string()).as_deref(),
            Some("p.Val2Ile")
        );
        assert_eq!(table.value(0, "score"), Some(1.2));
        assert_eq!(table.value(0, "se"), None);
        assert_eq!(table.rows()[1].line, 5);
        assert_eq!(table.rows()[1].hgvs_pro, None);
        assert_eq!(table.value(1, "score"), Some(-0.5));
    }

    #[test]
    fn protein_key_when_no_nucleotide_column() {
        let t = target("ATGGTTTAA");
        let report =
            read("hgvs_pro,score\np.Met1Val,0.3\n", TableKind::Scores, Some(&t)).unwrap();
        assert_eq!(report.data.key_space(), Some(CoordinateSpace::Protein));
        assert_eq!(report.data.rows()[0].primary_key.to_string(), "p.Met1Val");
    }

    #[test]
    fn row_errors_do_not_stop_ingestion() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,score\n\
             c.4G>A,1.0\n\
             c.4G>A,2.0\n\
             c.10A>T,1.0\n\
             c.4C>A,1.0\n\
             c.2x,1.0\n\
             p.Val2Ile,1.0\n\
             c.1A>G,abc\n\
             c.1A>G,1.0,extra\n\
             NA,1.0\n\
             c.[1A>G;1A>T],1.0\n\
             c.1A>G,inf\n\
             g.1A>G,1.0\n\
             c.1A>G,\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert_eq!(
            codes(&report),
            vec![
                (3, IssueCode::DuplicateKeyError),
                (4, IssueCode::OutOfBoundsError),
                (5, IssueCode::ReferenceMismatchError),
                (6, IssueCode::ParseError),
                (7, IssueCode::PrefixError),
                (8, IssueCode::MalformedRowError),
                (9, IssueCode::MalformedRowError),
                (10, IssueCode::ParseError),
                (11, IssueCode::OverlapError),
                (12, IssueCode::MalformedRowError),
                (13, IssueCode::PrefixError),
            ]
        );
        let keys: Vec<String> = report
            .data
            .rows()
            .iter()
            .map(|r| r.primary_key.to_string())
            .collect();
        assert_eq!(keys, vec!["c.4G>A", "c.1A>G"]);
        assert_eq!(report.data.value(1, "score"), None);
    }

    #[test]
    fn protein_column_checked_against_translation() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,hgvs_pro,score\nc.4G>A,p.Leu2Ile,1.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert_eq!(codes(&report), vec![(2, IssueCode::ReferenceMismatchError)]);
        assert!(report.data.is_empty());

        let config = IngestConfig {
            validate_protein: false,
            ..IngestConfig::default()
        };
        let spec = TableSpec::new(TableKind::Scores, &config).with_target(&t);
        let csv = "hgvs_nt,hgvs_pro,score\nc.4G>A,p.Leu2Ile,1.0\n";
        let report = ingest(csv.as_bytes(), &spec).unwrap();
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn transcript_tables() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,hgvs_tx,score\ng.4G>A,c.500A>T,1.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert_eq!(report.data.len(), 1);
        assert_eq!(
            report.data.rows()[0].hgvs_tx.as_ref().map(|v| v.to_string()).as_deref(),
            Some("c.500A>T")
        );

        let err = read(
            "hgvs_nt,hgvs_splice,score\nc.4G>A,c.500A>T,1.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap_err();
        assert!(matches!(err, MaveError::Schema { table: TableKind::Scores, .. }));
    }

    #[test]
    fn schema_errors() {
        let cases = [
            "hgvs_splice,score\nc.1A>G,1.0\n",
            "hgvs_nt,hgvs_splice,hgvs_tx,score\n",
            "score,se\n1.0,2.0\n",
            "hgvs_nt,score,score\n",
            "hgvs_nt,,score\n",
            "hgvs_nt,NA,score\n",
        ];
        for csv in cases {
            let err = read(csv, TableKind::Scores, None).unwrap_err();
            assert!(matches!(err, MaveError::Schema { .. }), "{csv}: {err:?}");
        }
    }

    #[test]
    fn nucleotide_column_against_protein_target() {
        let t = target("MVLK");
        let err = read("hgvs_nt,score\nc.1A>G,1.0\n", TableKind::Scores, Some(&t)).unwrap_err();
        assert!(matches!(err, MaveError::Schema { .. }));
    }

    #[test]
    fn required_score_column() {
        let config = IngestConfig {
            require_score_column: true,
            ..IngestConfig::default()
        };
        let spec = TableSpec::new(TableKind::Scores, &config);
        let err = ingest("hgvs_nt,se\nc.1A>G,1.0\n".as_bytes(), &spec).unwrap_err();
        assert!(matches!(err, MaveError::Schema { .. }));

        let spec = TableSpec::new(TableKind::Counts, &config);
        assert!(ingest("hgvs_nt,count\nc.1A>G,1\n".as_bytes(), &spec).is_ok());
    }

    #[test]
    fn empty_stream() {
        let report = read("", TableKind::Counts, None).unwrap();
        assert!(report.data.is_empty());
        assert_eq!(report.data.key_space(), None);
        let report = read("# nothing here\n", TableKind::Counts, None).unwrap();
        assert!(report.data.is_empty());
    }

    #[test]
    fn header_only() {
        let report = read("hgvs_nt,score\n", TableKind::Scores, None).unwrap();
        assert!(report.data.is_empty());
        assert_eq!(report.data.key_space(), Some(CoordinateSpace::Nucleotide));
    }

    #[test]
    fn ingest_from_path() {
        let path =
            std::env::temp_dir().join(format!("mavedb_scores_{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, "hgvs_nt,score\nc.1A>G,1.0\n").unwrap();
        let config = IngestConfig::default();
        let report = ingest_path(&path, &TableSpec::new(TableKind::Scores, &config)).unwrap();
        assert_eq!(report.data.len(), 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn ingestion_is_idempotent() {
        let t = target("ATGGTTTAA");
        let csv = "hgvs_nt,score\nc.4G>A,1.0\nc.1A>G,2.0\nc.4G>A,3.0\n";
        let a = read(csv, TableKind::Scores, Some(&t)).unwrap();
        let b = read(csv, TableKind::Scores, Some(&t)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn null_nucleotide_column_keys_on_protein() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,hgvs_pro,score\nNA,p.Met1Val,1.0\nNA,p.Val2Ala,2.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        assert_eq!(report.data.key_space(), Some(CoordinateSpace::Protein));
        let keys: Vec<String> = report
            .data
            .rows()
            .iter()
            .map(|r| r.primary_key.to_string())
            .collect();
        assert_eq!(keys, vec!["p.Met1Val", "p.Val2Ala"]);
        assert_eq!(report.data.rows()[0].hgvs_nt, None);
    }

    #[test]
    fn partly_null_nucleotide_column_drops_rows() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,hgvs_pro,score\nc.4G>A,p.Val2Ile,1.0\nNA,p.Met1Val,2.0\nc.2x,,3.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert_eq!(report.data.key_space(), Some(CoordinateSpace::Nucleotide));
        assert_eq!(
            codes(&report),
            vec![(3, IssueCode::ParseError), (4, IssueCode::ParseError)]
        );
        assert!(report.skipped[0].message.contains("key column"));
    }

    #[test]
    fn transcript_values_without_nucleotide_values() {
        let err = read(
            "hgvs_nt,hgvs_tx,score\nNA,c.5A>T,1.0\n",
            TableKind::Scores,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MaveError::Schema { .. }));
    }

    #[test]
    fn schema_violation_mid_stream_aborts_table() {
        let t = target("ATGGTTTAA");
        let err = read(
            "hgvs_nt,hgvs_tx,score\ng.4G>A,c.5A>T,1.0\ng.1A>G,c.6A>T,2.0\nc.4G>A,c.7A>T,3.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap_err();
        match err {
            MaveError::Schema { table, msg } => {
                assert_eq!(table, TableKind::Scores);
                assert!(msg.starts_with("line 4:"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let report = read(
            "\u{feff}hgvs_nt,score\r\nc.1A>G,1.0\r\n\r\nc.4G>A,2.0\r\n",
            TableKind::Scores,
            None,
        )
        .unwrap();
        assert_eq!(report.data.key_space(), Some(CoordinateSpace::Nucleotide));
        assert_eq!(report.data.columns(), &["score".to_string()]);
        let lines: Vec<usize> = report.data.rows().iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn quoted_cells_may_span_lines() {
        let report = read(
            "hgvs_nt,score\n\"c.1A>G\",\"1.0\n\n# 2.0\"\n# comment\n\nc.4G>A,2.0\n",
            TableKind::Scores,
            None,
        )
        .unwrap();
        assert_eq!(codes(&report), vec![(2, IssueCode::MalformedRowError)]);
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data.rows()[0].line, 7);
    }

    #[test]
    fn overflowing_insertion_is_a_row_error() {
        let t = target("ATGGTTTAA");
        let report = read(
            "hgvs_nt,score\nc.4G>A,1.0\nc.1A>G,2.0\nc.4294967295insA,3.0\n",
            TableKind::Scores,
            Some(&t),
        )
        .unwrap();
        assert_eq!(codes(&report), vec![(4, IssueCode::ParseError)]);
        assert_eq!(report.data.len(), 2);
    }
}
