use std::path::PathBuf;

use dashmap::{DashMap, Entry};

#[salsa::input(debug)]
pub struct SourceFile {
    #[returns(ref)]
    pub path: PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::db]
pub trait Db: salsa::Database {
    fn input(&self, path: PathBuf) -> Result<SourceFile, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Default, Clone)]
#[salsa::db]
pub struct CicodeDatabaseImpl {
    storage: salsa::Storage<Self>,
    /// Cache of loaded source files, keyed by canonical path.
    files: DashMap<PathBuf, SourceFile>,
}

#[salsa::db]
impl salsa::Database for CicodeDatabaseImpl {}

#[salsa::db]
impl Db for CicodeDatabaseImpl {
    fn input(&self, path: PathBuf) -> Result<SourceFile, Box<dyn std::error::Error + Send + Sync>> {
        let path = path.canonicalize()?;
        match self.files.entry(path.clone()) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let contents = std::fs::read_to_string(&path)?;
                tracing::debug!(path = %path.display(), bytes = contents.len(), "Loaded source");
                let source_file = SourceFile::new(self, path, contents);
                Ok(*entry.insert(source_file))
            }
        }
    }
}
