use std::io::BufRead as _;

/// A reader for JSON Lines (jsonl) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlReader {
    /// Whether to skip entries that fail to parse instead of failing the whole read.
    pub allow_invalid_entries: bool,
}

impl JsonlReader {
    /// Parses JSON Lines from the given reader into a vector of type `T`.
    ///
    /// Blank lines are ignored.
    pub fn parse<R, T>(&self, reader: R) -> Result<Vec<T>, JsonlError>
    where
        R: std::io::Read,
        T: serde::de::DeserializeOwned,
    {
        let mut results = Vec::new();
        for (index, line) in std::io::BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(value) => results.push(value),
                Err(e) if self.allow_invalid_entries => {
                    log::warn!("Skipping invalid entry on line {}: {e}", index + 1);
                    continue;
                }
                Err(source) => {
                    return Err(JsonlError::Serde {
                        line: index + 1,
                        source,
                    })
                }
            }
        }
        Ok(results)
    }

    /// Parses a JSON Lines file from the specified path into a vector of type `T`.
    pub fn parse_from_file<P, T>(&self, path: P) -> Result<Vec<T>, JsonlError>
    where
        P: AsRef<std::path::Path>,
        T: serde::de::DeserializeOwned,
    {
        let file = std::fs::File::open(path)?;
        self.parse(file)
    }
}

/// An error type for [`JsonlReader::parse`].
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde JSON error on line {line}: {source}")]
    Serde {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
