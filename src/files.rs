//! Where recordings are written.
//!
//! The recorder names its output files, and a `Storage` decides what those
//! names mean. `Files` puts them in a directory on disk; `Memory` keeps them
//! in a map, which is what the tests use.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::diag::Error;

/// A place to create named output streams.
pub trait Storage {
    /// Create the stream `name`, discarding anything previously there.
    fn create(&mut self, name: &str) -> Result<Box<dyn Write>, Error>;

    /// Open the stream `name` for appending, creating it if necessary.
    fn append(&mut self, name: &str) -> Result<Box<dyn Write>, Error>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn create(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        (**self).create(name)
    }

    fn append(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        (**self).append(name)
    }
}

/// Output files in a directory on disk.
pub struct Files {
    dir: PathBuf,
}

impl Files {
    /// Use `dir` for output, creating it if it doesn't exist.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Files, Error> {
        let dir = dir.as_ref();

        match fs::create_dir_all(dir) {
            Err(e) if e.kind() != io::ErrorKind::AlreadyExists => {
                return Err(Error::Open { path: dir.to_owned(), source: e });
            }
            _ => (),
        }

        Ok(Files { dir: dir.to_owned() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn open(&self, name: &str, options: &fs::OpenOptions) -> Result<Box<dyn Write>, Error> {
        let path = self.dir.join(name);
        match options.open(&path) {
            Ok(file) => Ok(Box::new(io::BufWriter::new(file))),
            Err(source) => Err(Error::Open { path, source }),
        }
    }
}

impl Storage for Files {
    fn create(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        self.open(name, fs::OpenOptions::new().write(true).create(true).truncate(true))
    }

    fn append(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        self.open(name, fs::OpenOptions::new().append(true).create(true))
    }
}

type Shared = Rc<RefCell<BTreeMap<String, Vec<u8>>>>;

/// Output streams kept in memory.
///
/// Clones share the same set of streams, so a test can hand one clone to
/// the recorder and inspect the output through another.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    streams: Shared,
}

impl Memory {
    pub fn new() -> Memory {
        Memory::default()
    }

    /// The contents of the stream `name`, as text.
    pub fn contents(&self, name: &str) -> Option<String> {
        self.streams
            .borrow()
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The names of all the streams created so far, in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.streams.borrow().keys().cloned().collect()
    }
}

/// A stream that appends to an entry in a `Memory`.
struct MemoryStream {
    name: String,
    streams: Shared,
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.streams
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Storage for Memory {
    fn create(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        self.streams.borrow_mut().insert(name.to_string(), Vec::new());
        self.append(name)
    }

    fn append(&mut self, name: &str) -> Result<Box<dyn Write>, Error> {
        self.streams.borrow_mut().entry(name.to_string()).or_default();
        Ok(Box::new(MemoryStream {
            name: name.to_string(),
            streams: self.streams.clone(),
        }))
    }
}

#[test]
fn test_memory_streams() {
    let memory = Memory::new();
    let mut storage = memory.clone();

    let mut out = storage.create("a.c").unwrap();
    write!(out, "int a;\n").unwrap();
    let mut more = storage.append("a.c").unwrap();
    write!(more, "int b;\n").unwrap();
    assert_eq!(memory.contents("a.c").as_deref(), Some("int a;\nint b;\n"));

    // Creating again truncates.
    storage.create("a.c").unwrap();
    assert_eq!(memory.contents("a.c").as_deref(), Some(""));
    assert_eq!(memory.names(), vec!["a.c".to_string()]);
}

#[test]
fn test_files_directory() {
    let dir = std::env::temp_dir().join(format!("glimp-replay-files-{}", std::process::id()));
    let mut files = Files::create(&dir).unwrap();
    assert_eq!(files.dir(), dir.as_path());
    {
        let mut out = files.create("frame_0001.c").unwrap();
        out.write_all(b"void frame_0001(void) {\n}\n").unwrap();
    }
    {
        let mut out = files.append("frame_0001.c").unwrap();
        out.write_all(b"/* more */\n").unwrap();
    }
    let text = fs::read_to_string(dir.join("frame_0001.c")).unwrap();
    assert_eq!(text, "void frame_0001(void) {\n}\n/* more */\n");

    // Creating an existing directory is fine.
    assert!(Files::create(&dir).is_ok());
    fs::remove_dir_all(&dir).unwrap();
}
