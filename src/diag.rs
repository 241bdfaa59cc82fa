use std::fmt;

/// Identifies a source file registered with [`Diagnostics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u32);

/// A position in a source file. Lines and columns are 1-based;
/// the zero location marks compiler-defined entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    /// Location of entities that have no source text (package Standard).
    pub const BUILTIN: Self = Self {
        file: FileId(0),
        line: 0,
        column: 0,
    };

    #[must_use]
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.line == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One reported problem.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub loc: SourceLoc,
    pub severity: Severity,
    pub message: String,
}

/// Accumulates diagnostics for a whole compilation.
///
/// Passes keep going past errors so that as many problems as possible are
/// reported in one run; the compilation is rejected at the end if
/// [`Diagnostics::has_errors`] is true. Warnings never affect acceptance.
#[derive(Debug, Default)]
pub struct Diagnostics {
    files: Vec<String>,
    list: Vec<Diagnostic>,
    errors: usize,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // File 0 is reserved for compiler-defined entities.
            files: vec!["<standard>".to_string()],
            list: Vec::new(),
            errors: 0,
        }
    }

    pub fn add_file(&mut self, path: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(path.into());
        id
    }

    #[must_use]
    pub fn file_path(&self, file: FileId) -> &str {
        &self.files[file.0 as usize]
    }

    pub fn report(&mut self, loc: SourceLoc, severity: Severity, message: impl Into<String>) {
        if severity == Severity::Error {
            self.errors += 1;
        }
        self.list.push(Diagnostic {
            loc,
            severity,
            message: message.into(),
        });
    }

    pub fn error(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.report(loc, Severity::Error, message);
    }

    pub fn warning(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.report(loc, Severity::Warning, message);
    }

    pub fn note(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.report(loc, Severity::Note, message);
    }

    /// An invariant breach inside the compiler itself. Aborts the compilation.
    pub fn fatal(&self, loc: SourceLoc, message: &str) -> ! {
        panic!("{}: fatal: {message}", LocDisplay { diags: self, loc })
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    /// Renders one diagnostic as `file:line:column: severity: message`.
    #[must_use]
    pub fn format(&self, d: &Diagnostic) -> String {
        format!(
            "{}: {}: {}",
            LocDisplay {
                diags: self,
                loc: d.loc
            },
            d.severity,
            d.message
        )
    }
}

struct LocDisplay<'a> {
    diags: &'a Diagnostics,
    loc: SourceLoc,
}

impl fmt::Display for LocDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.diags.file_path(self.loc.file),
            self.loc.line,
            self.loc.column
        )
    }
}

/// Edit distance used for "did you mean" suggestions.
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { prev } else { prev + 1 };
            prev = row[j + 1];
            row[j + 1] = cost.min(prev + 1).min(row[j] + 1);
        }
    }
    row[b.len()]
}

/// Picks the closest visible name within edit distance 2, if any.
#[must_use]
pub fn closest_match<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| (edit_distance(name, c), c))
        .filter(|&(d, _)| d > 0 && d <= 2)
        .min_by_key(|&(d, _)| d)
        .map(|(_, c)| c)
}

#[test]
fn test_edit_distance() {
    assert_eq!(0, edit_distance("Put_Line", "put_line"));
    assert_eq!(1, edit_distance("Put_Lin", "Put_Line"));
    assert_eq!(2, edit_distance("Pt_Lin", "Put_Line"));
    assert_eq!(3, edit_distance("abc", "xyz"));
}

#[test]
fn test_closest_match() {
    let names = ["Integer", "Boolean", "Character"];
    assert_eq!(
        Some("Integer"),
        closest_match("Intger", names.iter().copied())
    );
    assert_eq!(None, closest_match("Unrelated", names.iter().copied()));
    // An exact match is not a suggestion.
    assert_eq!(None, closest_match("integer", names.iter().copied()));
}

#[test]
fn test_format() {
    let mut diags = Diagnostics::new();
    let file = diags.add_file("hello.adb");
    diags.error(SourceLoc::new(file, 3, 14), "undeclared name");
    let rendered: Vec<String> = diags.iter().map(|d| diags.format(d)).collect();
    assert_eq!(rendered, ["hello.adb:3:14: error: undeclared name"]);
    assert!(diags.has_errors());
    assert_eq!(1, diags.error_count());
}
