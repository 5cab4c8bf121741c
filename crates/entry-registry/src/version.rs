//! Version parsing, ordering and constraint checking.
//!
//! Versions follow the Python packaging scheme: an optional epoch (`1!`),
//! any number of numeric release components, then optional pre-release
//! (`a1`, `b2`, `rc1`), post-release (`.post1`) and development (`.dev3`)
//! parts, and a `+local` label. Release components compare with zero
//! padding, so `2.0` and `2.0.0` are the same version.
//!
//! Constraints are comma-separated clauses such as `>=1.0,<2`, `==1.4.*`,
//! `~=1.4.2`, `!=1.3.0` or `===1.0-custom`. Every clause must match.
//!
//! # Examples
//!
//! ```
//! use entry_registry::version::VersionConstraint;
//!
//! let constraint = VersionConstraint::parse(">=1.2,<2").unwrap();
//! assert!(constraint.satisfies("1.2"));
//! assert!(constraint.satisfies("1.9.3.1"));
//! assert!(constraint.satisfies("1.4.post2"));
//! assert!(!constraint.satisfies("2.0.0"));
//!
//! let compatible = VersionConstraint::parse("~=1.4.2").unwrap();
//! assert!(compatible.satisfies("1.4.9rc1"));
//! assert!(!compatible.satisfies("1.5.0"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

type ParseResult<T> = std::result::Result<T, &'static str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

/// One dot-separated part of a `+local` label. Numbers sort after text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum LocalSegment {
    Text(String),
    Number(u64),
}

/// Where the pre-release part puts a version relative to its release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// `1.0.dev0` sorts before every pre-release of `1.0`.
    DevRelease,
    Pre(PreKind, u64),
    Final,
}

/// A parsed package version.
///
/// Equality and ordering ignore trailing zero release components.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl PackageVersion {
    pub fn parse(version: &str) -> Result<Self> {
        parse_version(version).map_err(|reason| Error::InvalidVersion {
            version: version.trim().to_string(),
            reason: reason.to_string(),
        })
    }

    /// Numeric release components as written (`1.4` -> `[1, 4]`).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    pub fn is_local(&self) -> bool {
        self.local.is_some()
    }

    /// The version without its local label.
    pub fn public(&self) -> Self {
        Self {
            local: None,
            ..self.clone()
        }
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            (None, None, Some(_)) => PreKey::DevRelease,
            _ => PreKey::Final,
        }
    }

    /// Same epoch and release, whatever the pre/post/dev parts.
    fn same_release(&self, other: &Self) -> bool {
        self.epoch == other.epoch && cmp_release(&self.release, &other.release).is_eq()
    }

    /// Whether the release starts with `prefix`, padding with zeros.
    fn has_release_prefix(&self, epoch: u64, prefix: &[u64]) -> bool {
        self.epoch == epoch
            && prefix
                .iter()
                .enumerate()
                .all(|(i, n)| self.release.get(i).copied().unwrap_or(0) == *n)
    }
}

fn cmp_release(lhs: &[u64], rhs: &[u64]) -> Ordering {
    (0..lhs.len().max(rhs.len()))
        .map(|i| {
            let l = lhs.get(i).copied().unwrap_or(0);
            let r = rhs.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Development releases sort before the same version without `.dev`.
fn dev_key(dev: Option<u64>) -> (bool, u64) {
    (dev.is_none(), dev.unwrap_or(0))
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| dev_key(self.dev).cmp(&dev_key(other.dev)))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for PackageVersion {}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((kind, n)) = self.pre {
            let tag = match kind {
                PreKind::Alpha => "a",
                PreKind::Beta => "b",
                PreKind::Rc => "rc",
            };
            write!(f, "{tag}{n}")?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }
        if let Some(local) = &self.local {
            let segments: Vec<String> = local
                .iter()
                .map(|segment| match segment {
                    LocalSegment::Text(text) => text.clone(),
                    LocalSegment::Number(n) => n.to_string(),
                })
                .collect();
            write!(f, "+{}", segments.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

const PRE_TAGS: &[(&str, PreKind)] = &[
    ("alpha", PreKind::Alpha),
    ("a", PreKind::Alpha),
    ("beta", PreKind::Beta),
    ("b", PreKind::Beta),
    ("preview", PreKind::Rc),
    ("pre", PreKind::Rc),
    ("rc", PreKind::Rc),
    ("c", PreKind::Rc),
];

const POST_TAGS: &[(&str, ())] = &[("post", ()), ("rev", ()), ("r", ())];

const DEV_TAGS: &[(&str, ())] = &[("dev", ())];

fn parse_version(input: &str) -> ParseResult<PackageVersion> {
    let lowered = input.trim().to_ascii_lowercase();
    let s = lowered.strip_prefix('v').unwrap_or(lowered.as_str());

    let (public, local) = match s.split_once('+') {
        Some((public, label)) => (public, Some(parse_local(label)?)),
        None => (s, None),
    };
    let (epoch, mut rest) = match public.split_once('!') {
        Some((epoch, rest)) => (epoch.parse().map_err(|_| "invalid epoch")?, rest),
        None => (0, public),
    };

    let mut release = Vec::new();
    loop {
        let (number, after) = take_number(rest).ok_or("expected a release number")?;
        release.push(number);
        match after.strip_prefix('.') {
            Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
            _ => {
                rest = after;
                break;
            }
        }
    }

    let mut pre = None;
    if let Some((kind, after)) = take_tag(rest, PRE_TAGS) {
        let (n, after) = take_tag_number(after);
        pre = Some((kind, n));
        rest = after;
    }

    let mut post = None;
    if let Some((n, after)) = rest.strip_prefix('-').and_then(take_number) {
        post = Some(n);
        rest = after;
    } else if let Some(((), after)) = take_tag(rest, POST_TAGS) {
        let (n, after) = take_tag_number(after);
        post = Some(n);
        rest = after;
    }

    let mut dev = None;
    if let Some(((), after)) = take_tag(rest, DEV_TAGS) {
        let (n, after) = take_tag_number(after);
        dev = Some(n);
        rest = after;
    }

    if !rest.is_empty() {
        return Err("unexpected trailing characters");
    }

    Ok(PackageVersion {
        epoch,
        release,
        pre,
        post,
        dev,
        local,
    })
}

fn parse_local(label: &str) -> ParseResult<Vec<LocalSegment>> {
    label
        .split(['.', '-', '_'])
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err("invalid local version label");
            }
            Ok(match segment.parse() {
                Ok(n) => LocalSegment::Number(n),
                Err(_) => LocalSegment::Text(segment.to_string()),
            })
        })
        .collect()
}

fn strip_separator(s: &str) -> &str {
    s.strip_prefix(['.', '-', '_']).unwrap_or(s)
}

fn take_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let number = s[..end].parse().ok()?;
    Some((number, &s[end..]))
}

/// Strip an optional separator followed by one of `tags`.
fn take_tag<'a, T: Copy>(s: &'a str, tags: &[(&str, T)]) -> Option<(T, &'a str)> {
    let body = strip_separator(s);
    tags.iter()
        .find_map(|(tag, value)| body.strip_prefix(tag).map(|rest| (*value, rest)))
}

/// Number after a tag, `0` when omitted (`1.0a` is `1.0a0`).
fn take_tag_number(s: &str) -> (u64, &str) {
    take_number(strip_separator(s)).unwrap_or((0, s))
}

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Ne,
    /// `~=`: at least the given version, within the same release series.
    Compatible,
}

/// Operators ordered so that two-character prefixes are tried first.
const OPERATORS: &[(&str, Op)] = &[
    ("~=", Op::Compatible),
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("==", Op::Eq),
    ("!=", Op::Ne),
    (">", Op::Gt),
    ("<", Op::Lt),
];

#[derive(Debug, Clone)]
enum Test {
    /// `===`: case-insensitive string equality, no version semantics.
    Arbitrary(String),
    Compare {
        op: Op,
        version: PackageVersion,
        /// `==1.4.*` / `!=1.4.*`
        wildcard: bool,
    },
}

#[derive(Debug, Clone)]
struct Clause {
    /// Clause text without whitespace, e.g. `>=1.0`.
    text: String,
    test: Test,
}

impl Clause {
    fn matches(&self, raw: &str, parsed: Option<&PackageVersion>) -> bool {
        match &self.test {
            Test::Arbitrary(expected) => raw.trim().eq_ignore_ascii_case(expected),
            Test::Compare {
                op,
                version,
                wildcard,
            } => parsed.is_some_and(|candidate| compare(*op, candidate, version, *wildcard)),
        }
    }
}

fn compare(op: Op, candidate: &PackageVersion, base: &PackageVersion, wildcard: bool) -> bool {
    match op {
        Op::Eq if wildcard => candidate.has_release_prefix(base.epoch, &base.release),
        Op::Ne if wildcard => !candidate.has_release_prefix(base.epoch, &base.release),
        Op::Eq => equals(candidate, base),
        Op::Ne => !equals(candidate, base),
        Op::Ge => candidate >= base,
        Op::Le => candidate.public() <= *base,
        // `<2.0` does not admit `2.0rc1`, unless the bound is itself a pre-release.
        Op::Lt => {
            candidate < base
                && !(candidate.is_prerelease()
                    && !base.is_prerelease()
                    && candidate.same_release(base))
        }
        // `>1.0` does not admit `1.0.post1` or `1.0+local`.
        Op::Gt => {
            candidate > base
                && !(candidate.is_postrelease()
                    && !base.is_postrelease()
                    && candidate.same_release(base))
                && !(candidate.is_local() && candidate.public() == *base)
        }
        Op::Compatible => {
            let series = &base.release[..base.release.len() - 1];
            candidate >= base && candidate.has_release_prefix(base.epoch, series)
        }
    }
}

/// `==` ignores the candidate's local label unless the bound has one.
fn equals(candidate: &PackageVersion, base: &PackageVersion) -> bool {
    if base.is_local() {
        candidate == base
    } else {
        candidate.public() == *base
    }
}

/// A parsed version constraint that can be checked against concrete versions.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    clauses: Vec<Clause>,
    raw: String,
}

impl VersionConstraint {
    /// Parse a constraint such as `>=1.0,<2.0` or `~=3.4`.
    ///
    /// A bare version (`1.2.0`) is read as `==1.2.0`.
    pub fn parse(constraint: &str) -> Result<Self> {
        let raw = constraint.trim().to_string();
        let clauses = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_clause)
            .collect::<Result<Vec<_>>>()?;

        if clauses.is_empty() {
            return Err(Error::VersionConstraintParse {
                constraint: raw,
                reason: "empty constraint".to_string(),
            });
        }

        Ok(Self { clauses, raw })
    }

    /// Check a version string against every clause.
    ///
    /// A malformed version satisfies only `===` clauses that spell it exactly.
    pub fn satisfies(&self, version: &str) -> bool {
        let parsed = PackageVersion::parse(version).ok();
        self.clauses
            .iter()
            .all(|clause| clause.matches(version, parsed.as_ref()))
    }

    pub fn satisfies_version(&self, version: &PackageVersion) -> bool {
        let raw = version.to_string();
        self.clauses
            .iter()
            .all(|clause| clause.matches(&raw, Some(version)))
    }

    /// The constraint as written, trimmed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Clauses sorted and joined without whitespace: `<3,>=2.0`.
impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses: Vec<&str> = self.clauses.iter().map(|c| c.text.as_str()).collect();
        clauses.sort_unstable();
        f.write_str(&clauses.join(","))
    }
}

fn parse_clause(clause: &str) -> Result<Clause> {
    let text: String = clause.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = |reason: &str| Error::VersionConstraintParse {
        constraint: clause.to_string(),
        reason: reason.to_string(),
    };

    if let Some(expected) = text.strip_prefix("===") {
        if expected.is_empty() {
            return Err(invalid("missing version"));
        }
        let test = Test::Arbitrary(expected.to_string());
        return Ok(Clause { text, test });
    }

    let (op, operand) = OPERATORS
        .iter()
        .find_map(|(prefix, op)| text.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((Op::Eq, text.as_str()));

    let (version_str, wildcard) = match operand.strip_suffix(".*") {
        Some(prefix) => (prefix, true),
        None => (operand, false),
    };
    if wildcard && !matches!(op, Op::Eq | Op::Ne) {
        return Err(invalid("wildcard only allowed with '==' and '!='"));
    }

    let version = parse_version(version_str).map_err(invalid)?;
    if wildcard && (version.pre.is_some() || version.post.is_some() || version.dev.is_some()) {
        return Err(invalid("wildcard needs a plain release"));
    }
    if version.is_local() && (wildcard || !matches!(op, Op::Eq | Op::Ne)) {
        return Err(invalid("local versions only allowed with '==' and '!='"));
    }
    if op == Op::Compatible && version.release.len() < 2 {
        return Err(invalid("'~=' needs at least two release components"));
    }

    let test = Test::Compare {
        op,
        version,
        wildcard,
    };
    Ok(Clause { text, test })
}
