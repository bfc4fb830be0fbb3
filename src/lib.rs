pub mod doc;
pub mod docidset;
pub mod engine;
pub mod extractor;
pub mod heap;
pub mod index;
pub mod markup;
pub mod schema;
pub mod scoring;

#[macro_use]
extern crate serde_derive;

pub(crate) use fnv::FnvHashSet as HashSet;

/// Internal dense document identifier. Allocated from a monotonic counter
/// and never reused within an index's lifetime.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Copy, Clone, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DocId(pub u32);

impl DocId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Internal dense term identifier. Allocated from a monotonic counter when a
/// term is first seen; the id is retired (but never recycled) once the
/// term's posting set becomes empty.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Copy, Clone, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(pub u32);

#[derive(Debug)]
pub enum Error {
    /// Construction-time schema problem (e.g. an unrecognized stemmer name).
    UnknownStemmer(String),
    /// The debug-mode consistency checker found a broken invariant.
    InvariantViolation(String),
    /// A TermId referenced from a document's DocTermIds is missing from the
    /// term table. Treated as an InvariantViolation.
    DanglingTermId(TermId),
    Context(String, Box<Error>),
}

impl Error {
    pub fn with_context<S>(self, msg: S) -> Error
    where
        S: Into<String>,
    {
        Error::Context(msg.into(), Box::new(self))
    }
}
