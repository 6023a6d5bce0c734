// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Chained verification of converted path values.
//!
//! A [Verification] is an ordered list of [Group]s joined by "or". Each
//! group is a conjunction of [Check]s, evaluated in a fixed priority order.
//! The first group whose checks all pass accepts the value; if a check
//! fails the next group is tried, and the failure of the last group is the
//! one reported.
//!
//! ```
//! use argmatch::Verification;
//!
//! // The path must not exist, or it must exist and be readable.
//! let v = Verification::new().not_exists().or().exists().can_read();
//!
//! assert_eq!(v.groups().len(), 2);
//! ```

use std::fmt;
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;

#[cfg(unix)]
use nix::unistd::{access, AccessFlags};

/// Filesystem questions asked by the checks.
pub trait Filesystem {
    /// The path exists.
    fn exists(&self, path: &Path) -> bool;
    /// The path is a regular file.
    fn is_file(&self, path: &Path) -> bool;
    /// The path is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// The path can be read.
    fn can_read(&self, path: &Path) -> bool;
    /// The path can be written.
    fn can_write(&self, path: &Path) -> bool;
    /// The path can be executed.
    fn can_execute(&self, path: &Path) -> bool;
    /// The path is an empty file or an empty directory.
    fn is_empty(&self, path: &Path) -> bool;
}

/// [Filesystem] backed by the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostFilesystem;

impl Filesystem for HostFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn can_read(&self, path: &Path) -> bool {
        if path.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            fs::File::open(path).is_ok()
        }
    }

    #[cfg(unix)]
    fn can_write(&self, path: &Path) -> bool {
        access(path, AccessFlags::W_OK).is_ok()
    }

    #[cfg(not(unix))]
    fn can_write(&self, path: &Path) -> bool {
        fs::metadata(path)
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    #[cfg(unix)]
    fn can_execute(&self, path: &Path) -> bool {
        access(path, AccessFlags::X_OK).is_ok()
    }

    #[cfg(not(unix))]
    fn can_execute(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_empty(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(m) if m.is_dir() => fs::read_dir(path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false),
            Ok(m) => m.len() == 0,
            Err(_) => false,
        }
    }
}

/// Signature of a caller supplied predicate.
pub type Predicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// One predicate. The declaration order of the variants is the order in
/// which a [Group] evaluates them.
#[derive(Clone)]
pub enum Check {
    /// The path exists.
    Exists,
    /// The path does not exist.
    NotExists,
    /// The path is a regular file.
    IsFile,
    /// The path is a directory.
    IsDirectory,
    /// The path is readable.
    CanRead,
    /// The path is writable.
    CanWrite,
    /// The parent directory of the path is writable.
    CanWriteParent,
    /// The path could be created: its nearest existing ancestor is a
    /// writable directory.
    CanCreate,
    /// The path is executable.
    CanExecute,
    /// The path is absolute.
    IsAbsolute,
    /// The path has at least this many normal components.
    MinDepth(usize),
    /// The path is an empty file or directory.
    IsEmpty,
    /// A named caller supplied predicate, evaluated last.
    Custom {
        /// Name reported on failure.
        name: String,
        /// The predicate.
        predicate: Predicate,
    },
}

impl Check {
    /// The name reported when this check fails.
    pub fn name(&self) -> String {
        match self {
            Check::Exists => "exists".into(),
            Check::NotExists => "not-exists".into(),
            Check::IsFile => "is-file".into(),
            Check::IsDirectory => "is-directory".into(),
            Check::CanRead => "can-read".into(),
            Check::CanWrite => "can-write".into(),
            Check::CanWriteParent => "can-write-parent".into(),
            Check::CanCreate => "can-create".into(),
            Check::CanExecute => "can-execute".into(),
            Check::IsAbsolute => "is-absolute".into(),
            Check::MinDepth(n) => format!("min-depth({})", n),
            Check::IsEmpty => "is-empty".into(),
            Check::Custom { name, .. } => name.clone(),
        }
    }

    fn priority(&self) -> usize {
        match self {
            Check::Exists => 0,
            Check::NotExists => 1,
            Check::IsFile => 2,
            Check::IsDirectory => 3,
            Check::CanRead => 4,
            Check::CanWrite => 5,
            Check::CanWriteParent => 6,
            Check::CanCreate => 7,
            Check::CanExecute => 8,
            Check::IsAbsolute => 9,
            Check::MinDepth(_) => 10,
            Check::IsEmpty => 11,
            Check::Custom { .. } => 12,
        }
    }

    /// Evaluate the check against the path.
    pub fn test(&self, filesystem: &dyn Filesystem, path: &Path) -> bool {
        match self {
            Check::Exists => filesystem.exists(path),
            Check::NotExists => !filesystem.exists(path),
            Check::IsFile => filesystem.is_file(path),
            Check::IsDirectory => filesystem.is_dir(path),
            Check::CanRead => filesystem.can_read(path),
            Check::CanWrite => filesystem.can_write(path),
            Check::CanWriteParent => match parent(path) {
                Some(dir) => filesystem.is_dir(dir) && filesystem.can_write(dir),
                None => false,
            },
            Check::CanCreate => can_create(filesystem, path),
            Check::CanExecute => filesystem.can_execute(path),
            Check::IsAbsolute => path.is_absolute(),
            Check::MinDepth(n) => depth(path) >= *n,
            Check::IsEmpty => filesystem.is_empty(path),
            Check::Custom { predicate, .. } => predicate(path),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Check({})", self.name())
    }
}

/// The parent of a relative single component path is the current
/// directory.
fn parent(path: &Path) -> Option<&Path> {
    if path == Path::new(".") {
        return None;
    }

    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

fn can_create(filesystem: &dyn Filesystem, path: &Path) -> bool {
    if filesystem.exists(path) {
        return false;
    }

    let mut current = parent(path);

    while let Some(dir) = current {
        if filesystem.exists(dir) {
            return filesystem.is_dir(dir) && filesystem.can_write(dir);
        }

        current = parent(dir);
    }

    false
}

fn depth(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

/// A conjunction of checks, kept in evaluation order.
#[derive(Clone, Debug, Default)]
pub struct Group {
    checks: Vec<Check>,
}

impl Group {
    /// Create an empty group (which accepts everything).
    pub fn new() -> Self {
        Group::default()
    }

    /// Add a check.
    pub fn with(mut self, check: Check) -> Self {
        let pos = self
            .checks
            .iter()
            .position(|c| c.priority() > check.priority())
            .unwrap_or(self.checks.len());

        self.checks.insert(pos, check);
        self
    }

    /// Add a named caller supplied predicate.
    pub fn check<F>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.with(Check::Custom {
            name: name.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// The checks in evaluation order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Returns the first failing check, if any.
    fn first_failure(&self, filesystem: &dyn Filesystem, path: &Path) -> Option<&Check> {
        self.checks.iter().find(|c| !c.test(filesystem, path))
    }
}

/// A failed verification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    /// Index of the group that failed last.
    pub group: usize,
    /// Name of the check that failed in that group.
    pub check: String,
}

/// An ordered chain of [Group]s joined by "or".
#[derive(Clone, Debug)]
pub struct Verification {
    groups: Vec<Group>,
    accept_stdin: bool,
}

impl Default for Verification {
    fn default() -> Self {
        Verification {
            groups: vec![Group::new()],
            accept_stdin: false,
        }
    }
}

macro_rules! check_method {
    ($(#[$doc:meta] $name:ident => $check:expr;)*) => {
        $(
            #[$doc]
            pub fn $name(self) -> Self {
                self.push($check)
            }
        )*
    };
}

impl Verification {
    /// Create a chain with one empty group.
    pub fn new() -> Self {
        Verification::default()
    }

    /// Build a chain from explicit groups.
    pub fn from_groups(groups: Vec<Group>) -> Self {
        Verification {
            groups,
            accept_stdin: false,
        }
    }

    fn push(mut self, check: Check) -> Self {
        if let Some(group) = self.groups.pop() {
            self.groups.push(group.with(check));
        } else {
            self.groups.push(Group::new().with(check));
        }

        self
    }

    /// Start a new group; the checks added after this form the
    /// alternative.
    pub fn or(mut self) -> Self {
        self.groups.push(Group::new());
        self
    }

    check_method! {
        /// The path must exist.
        exists => Check::Exists;
        /// The path must not exist.
        not_exists => Check::NotExists;
        /// The path must be a regular file.
        is_file => Check::IsFile;
        /// The path must be a directory.
        is_directory => Check::IsDirectory;
        /// The path must be readable.
        can_read => Check::CanRead;
        /// The path must be writable.
        can_write => Check::CanWrite;
        /// The parent directory must be writable.
        can_write_parent => Check::CanWriteParent;
        /// The path must be creatable.
        can_create => Check::CanCreate;
        /// The path must be executable.
        can_execute => Check::CanExecute;
        /// The path must be absolute.
        is_absolute => Check::IsAbsolute;
        /// The path must be an empty file or directory.
        is_empty => Check::IsEmpty;
    }

    /// The path must have at least `n` normal components.
    pub fn min_depth(self, n: usize) -> Self {
        self.push(Check::MinDepth(n))
    }

    /// Add a named caller supplied predicate to the current group.
    pub fn check<F>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.push(Check::Custom {
            name: name.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// Let the literal `-` (standard input) through without verification.
    pub fn accept_stdin(self) -> Self {
        Verification {
            accept_stdin: true,
            ..self
        }
    }

    /// The groups in evaluation order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Verify the path against the real filesystem.
    pub fn verify(&self, path: &Path) -> Result<(), Failure> {
        self.verify_with(&HostFilesystem, path)
    }

    /// Verify the path using the specified filesystem.
    pub fn verify_with(&self, filesystem: &dyn Filesystem, path: &Path) -> Result<(), Failure> {
        if self.accept_stdin && path == Path::new("-") {
            return Ok(());
        }

        let mut failure = None;

        for (index, group) in self.groups.iter().enumerate() {
            match group.first_failure(filesystem, path) {
                None => return Ok(()),
                Some(check) => {
                    failure = Some(Failure {
                        group: index,
                        check: check.name(),
                    })
                }
            }
        }

        match failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Clone, Copy, Debug, Default)]
    struct Entry {
        dir: bool,
        read: bool,
        write: bool,
        exec: bool,
        empty: bool,
    }

    /// Filesystem stand-in, so permission failures can be tested even when
    /// the tests run as root.
    #[derive(Debug, Default)]
    struct MockFilesystem {
        entries: HashMap<PathBuf, Entry>,
    }

    impl MockFilesystem {
        fn add(mut self, path: &str, entry: Entry) -> Self {
            self.entries.insert(PathBuf::from(path), entry);
            self
        }

        fn entry(&self, path: &Path) -> Option<&Entry> {
            self.entries.get(path)
        }
    }

    impl Filesystem for MockFilesystem {
        fn exists(&self, path: &Path) -> bool {
            self.entry(path).is_some()
        }
        fn is_file(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| !e.dir)
        }
        fn is_dir(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| e.dir)
        }
        fn can_read(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| e.read)
        }
        fn can_write(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| e.write)
        }
        fn can_execute(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| e.exec)
        }
        fn is_empty(&self, path: &Path) -> bool {
            self.entry(path).map_or(false, |e| e.empty)
        }
    }

    fn mock_filesystem() -> MockFilesystem {
        let dir = Entry {
            dir: true,
            read: true,
            write: true,
            exec: true,
            ..Default::default()
        };

        MockFilesystem::default()
            .add(".", dir)
            .add("/", dir)
            .add("/data", dir)
            .add(
                "/ro",
                Entry {
                    write: false,
                    ..dir
                },
            )
            .add(
                "/data/readable",
                Entry {
                    read: true,
                    ..Default::default()
                },
            )
            .add(
                "/data/secret",
                Entry {
                    read: false,
                    ..Default::default()
                },
            )
            .add(
                "/data/empty",
                Entry {
                    read: true,
                    empty: true,
                    ..Default::default()
                },
            )
            .add(
                "/data/run.sh",
                Entry {
                    read: true,
                    exec: true,
                    ..Default::default()
                },
            )
    }

    #[test]
    fn test_group_orders_checks() {
        let group = Group::new()
            .with(Check::IsEmpty)
            .with(Check::CanRead)
            .with(Check::Exists)
            .check("custom", |_| true)
            .with(Check::MinDepth(2));

        let names: Vec<String> = group.checks().iter().map(Check::name).collect();

        assert_eq!(
            names,
            vec!["exists", "can-read", "min-depth(2)", "is-empty", "custom"]
        );
    }

    #[test]
    fn test_or_chain() {
        let filesystem = mock_filesystem();
        let v = Verification::new().not_exists().or().exists().can_read();

        #[derive(Debug)]
        struct TestData<'a> {
            path: &'a str,
            result: Result<(), Failure>,
        }

        let tests = &[
            TestData {
                path: "/data/new",
                result: Ok(()),
            },
            TestData {
                path: "/data/readable",
                result: Ok(()),
            },
            TestData {
                path: "/data/secret",
                result: Err(Failure {
                    group: 1,
                    check: "can-read".into(),
                }),
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let result = v.verify_with(&filesystem, Path::new(d.path));

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            assert_eq!(result, d.result, "{}", msg);
        }
    }

    #[test]
    fn test_single_checks() {
        #[derive(Debug)]
        struct TestData<'a> {
            verification: Verification,
            path: &'a str,
            failed: Option<&'a str>,
        }

        let tests = vec![
            TestData {
                verification: Verification::new().exists().is_file(),
                path: "/data/readable",
                failed: None,
            },
            TestData {
                verification: Verification::new().is_directory(),
                path: "/data/readable",
                failed: Some("is-directory"),
            },
            TestData {
                verification: Verification::new().is_file(),
                path: "/data",
                failed: Some("is-file"),
            },
            TestData {
                verification: Verification::new().can_write_parent(),
                path: "/data/new",
                failed: None,
            },
            TestData {
                verification: Verification::new().can_write_parent(),
                path: "/ro/new",
                failed: Some("can-write-parent"),
            },
            TestData {
                verification: Verification::new().can_write_parent(),
                path: "relative",
                failed: None,
            },
            TestData {
                verification: Verification::new().can_create(),
                path: "/data/a/b/c",
                failed: None,
            },
            TestData {
                verification: Verification::new().can_create(),
                path: "/ro/a",
                failed: Some("can-create"),
            },
            TestData {
                verification: Verification::new().can_create(),
                path: "/data/readable",
                failed: Some("can-create"),
            },
            TestData {
                verification: Verification::new().can_execute(),
                path: "/data/run.sh",
                failed: None,
            },
            TestData {
                verification: Verification::new().can_execute(),
                path: "/data/readable",
                failed: Some("can-execute"),
            },
            TestData {
                verification: Verification::new().is_absolute(),
                path: "relative/path",
                failed: Some("is-absolute"),
            },
            TestData {
                verification: Verification::new().min_depth(2),
                path: "/data/readable",
                failed: None,
            },
            TestData {
                verification: Verification::new().min_depth(3),
                path: "/data/readable",
                failed: Some("min-depth(3)"),
            },
            TestData {
                verification: Verification::new().is_empty(),
                path: "/data/empty",
                failed: None,
            },
            TestData {
                verification: Verification::new().is_empty(),
                path: "/data/readable",
                failed: Some("is-empty"),
            },
            TestData {
                verification: Verification::new().check("has-ext", |p| p.extension().is_some()),
                path: "/data/run.sh",
                failed: None,
            },
            TestData {
                verification: Verification::new().check("has-ext", |p| p.extension().is_some()),
                path: "/data/readable",
                failed: Some("has-ext"),
            },
            TestData {
                verification: Verification::new(),
                path: "/anything",
                failed: None,
            },
        ];

        let filesystem = mock_filesystem();

        for (i, d) in tests.iter().enumerate() {
            let result = d.verification.verify_with(&filesystem, Path::new(d.path));

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            match d.failed {
                None => assert!(result.is_ok(), "{}", msg),
                Some(name) => {
                    let failure = result.unwrap_err();
                    assert_eq!(failure.check, name, "{}", msg);
                    assert_eq!(failure.group, 0, "{}", msg);
                }
            }
        }
    }

    #[test]
    fn test_first_passing_group_wins() {
        let filesystem = mock_filesystem();

        // The second group would fail, but is never evaluated.
        let v = Verification::new()
            .exists()
            .or()
            .check("never", |_| panic!("evaluated a later group"));

        assert!(v.verify_with(&filesystem, Path::new("/data")).is_ok());
    }

    #[test]
    fn test_accept_stdin() {
        let filesystem = mock_filesystem();

        let v = Verification::new().exists();
        assert!(v.verify_with(&filesystem, Path::new("-")).is_err());

        let v = v.accept_stdin();
        assert!(v.verify_with(&filesystem, Path::new("-")).is_ok());
    }

    #[test]
    fn test_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");

        let v = Verification::new().not_exists().can_create();
        assert!(v.verify(&file).is_ok());

        fs::write(&file, "data").unwrap();

        let v = Verification::new().exists().is_file().can_read();
        assert!(v.verify(&file).is_ok());

        let v = Verification::new().is_empty();
        assert!(v.verify(&file).is_err());
        assert!(v.verify(dir.path()).is_err());

        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert!(v.verify(&empty).is_ok());

        let v = Verification::new().is_directory().can_write();
        assert!(v.verify(dir.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_host_filesystem_permissions_match_access() {
        use std::fs::OpenOptions;
        use std::os::unix::fs::PermissionsExt;

        #[derive(Debug)]
        struct TestData {
            mode: u32,
        }

        let tests = &[
            TestData { mode: 0o644 },
            TestData { mode: 0o444 },
            TestData { mode: 0o755 },
            TestData { mode: 0o555 },
        ];

        let dir = tempfile::tempdir().unwrap();

        for (i, d) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, d);

            let file = dir.path().join(format!("file{}", i));
            fs::write(&file, "data").unwrap();
            fs::set_permissions(&file, fs::Permissions::from_mode(d.mode)).unwrap();

            let writable = OpenOptions::new().write(true).open(&file).is_ok();

            assert_eq!(HostFilesystem.can_write(&file), writable, "{}", msg);

            // Nobody may execute a file with no execute bit, while the
            // owner may always execute one with the owner bit set.
            let executable = d.mode & 0o100 != 0;

            assert_eq!(HostFilesystem.can_execute(&file), executable, "{}", msg);
        }

        let missing = dir.path().join("missing");
        assert!(!HostFilesystem.can_write(&missing));
        assert!(!HostFilesystem.can_execute(&missing));
    }
}
