//! Bundled and downloaded dataset sources.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{info, instrument};

use crate::reader::read_dataset;
use crate::{DataError, Dataset, DatasetName};

const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Local path of `name`'s source inside `data_home`, downloading it first if
/// it is missing. Bundled datasets return `None`.
///
/// The download is written to a `.part` file and renamed into place, so an
/// interrupted transfer never leaves a truncated source behind. A failed
/// transfer removes the `.part` file.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::Io`] | `data_home` or the file cannot be created or written |
/// | [`DataError::Download`] | The HTTP request fails or returns an error status |
#[instrument(skip(data_home), fields(data_home = %data_home.display()))]
pub fn ensure_source(name: DatasetName, data_home: &Path) -> Result<Option<PathBuf>, DataError> {
    let Some(url) = name.remote_url() else {
        return Ok(None);
    };
    let path = data_home.join(name.cache_file_name());
    if path.exists() {
        return Ok(Some(path));
    }

    fs::create_dir_all(data_home).map_err(|source| DataError::Io {
        path: data_home.to_path_buf(),
        source,
    })?;

    info!(dataset = %name, url, "downloading dataset");
    let download_error = |source| DataError::Download {
        dataset: name,
        url: url.to_string(),
        source,
    };
    let mut response = reqwest::blocking::get(url)
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(download_error)?;

    let n_bytes = write_via_part(&path, |file| response.copy_to(file).map_err(download_error))?;

    info!(dataset = %name, n_bytes, path = %path.display(), "download complete");
    Ok(Some(path))
}

/// Write `path` through a sibling `.part` file, renamed into place once
/// `write` succeeds and removed when anything fails.
fn write_via_part<F>(path: &Path, write: F) -> Result<u64, DataError>
where
    F: FnOnce(&mut File) -> Result<u64, DataError>,
{
    let part = path.with_extension("part");
    let mut file = File::create(&part).map_err(|source| DataError::Io {
        path: part.clone(),
        source,
    })?;
    let written = write(&mut file);
    drop(file);

    let renamed = written.and_then(|n_bytes| {
        fs::rename(&part, path)
            .map(|()| n_bytes)
            .map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })
    });
    if renamed.is_err() {
        let _ = fs::remove_file(&part);
    }
    renamed
}

/// Load and parse a dataset, downloading its source into `data_home` if needed.
///
/// # Errors
///
/// Any error from [`ensure_source`] or from parsing the source.
pub fn load_dataset(name: DatasetName, data_home: &Path) -> Result<Dataset, DataError> {
    let Some(path) = ensure_source(name, data_home)? else {
        return read_dataset(name, IRIS_CSV.as_bytes());
    };

    let file = File::open(&path).map_err(|source| DataError::Io {
        path: path.clone(),
        source,
    })?;
    let reader: Box<dyn Read> = if name.is_gzipped() {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    read_dataset(name, reader)
}
